//! Operation kind from a query's leading keyword.
//!
//! Only the first keyword is inspected, after skipping whitespace and
//! leading `--` comment lines. The rest of the query is never validated;
//! `WITH … SELECT` classifies as a generic write.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Returns a sequence of row mappings.
    Select,
    /// Returns the generated row identifier.
    Insert,
    /// Returns the affected-row count.
    Change,
}

impl OperationKind {
    /// Method of the runtime's data connector that executes this kind.
    pub fn execute_method(self) -> &'static str {
        match self {
            Self::Select => "executeSelect",
            Self::Insert => "executeInsert",
            Self::Change => "executeChange",
        }
    }

    /// Type the generated callable resolves to.
    pub fn return_type(self) -> &'static str {
        match self {
            Self::Select => "list<array<string, mixed>>",
            Self::Insert | Self::Change => "int",
        }
    }
}

pub fn classify(query: &str) -> OperationKind {
    let keyword: String = leading_code(query)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if keyword.eq_ignore_ascii_case("select") {
        OperationKind::Select
    } else if keyword.eq_ignore_ascii_case("insert") {
        OperationKind::Insert
    } else {
        OperationKind::Change
    }
}

fn leading_code(query: &str) -> &str {
    let mut rest = query.trim_start();
    while rest.starts_with("--") {
        rest = match rest.find('\n') {
            Some(end) => rest[end + 1..].trim_start(),
            None => "",
        };
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_any_case_with_leading_whitespace() {
        assert_eq!(classify("  \n\tSeLeCt * FROM t"), OperationKind::Select);
        assert_eq!(classify("SELECT*FROM t"), OperationKind::Select);
    }

    #[test]
    fn insert_returns_generated_id() {
        let kind = classify("insert into t values (1)");
        assert_eq!(kind, OperationKind::Insert);
        assert_eq!(kind.execute_method(), "executeInsert");
        assert_eq!(kind.return_type(), "int");
    }

    #[test]
    fn everything_else_is_a_change() {
        assert_eq!(classify("UPDATE t SET a = 1"), OperationKind::Change);
        assert_eq!(classify("DELETE FROM t"), OperationKind::Change);
        assert_eq!(
            classify("WITH x AS (SELECT 1) SELECT * FROM x"),
            OperationKind::Change
        );
        assert_eq!(classify("selections"), OperationKind::Change);
        assert_eq!(classify(""), OperationKind::Change);
    }

    #[test]
    fn leading_line_comments_are_skipped() {
        assert_eq!(
            classify("-- fetch everything\n  -- twice\nSELECT 1"),
            OperationKind::Select
        );
    }
}
