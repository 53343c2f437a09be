//! Generated identifiers for statement names.
//!
//! A statement name becomes an upper-case constant-style identifier
//! (`players.get-top` → `PLAYERS_GET_TOP`) and, from that, a camel-cased
//! method name (`playersGetTop`). Both are unique within one run; later
//! names that collide get the smallest free numeric suffix.

use crate::diagnostics::{Diagnostics, Notice};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Z0-9]+").expect("separator regex must compile"))
}

/// Upper-case `name`, collapse every non-alphanumeric run to `_`, and
/// escape a leading digit with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    let sanitized = separator_re().replace_all(&upper, "_");
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{sanitized}")
    } else {
        sanitized.into_owned()
    }
}

/// Camel-case an identifier and strip `prefix` from the front.
///
/// The prefix is matched case-insensitively and kept when stripping it
/// would leave nothing or a name starting with a digit.
pub fn method_name(prefix: &str, identifier: &str) -> String {
    let camel: String = identifier.split('_').map(capitalize).collect();
    let stripped = match camel.get(..prefix.len()) {
        Some(head) if !prefix.is_empty() && head.eq_ignore_ascii_case(prefix) => {
            &camel[prefix.len()..]
        }
        _ => camel.as_str(),
    };
    let name = if stripped.is_empty() || stripped.starts_with(|c: char| c.is_ascii_digit()) {
        camel.as_str()
    } else {
        stripped
    };

    let mut chars = name.chars();
    match chars.next() {
        None => "_".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{name}"),
        Some(first) => format!("{}{}", first.to_ascii_lowercase(), chars.as_str()),
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Assigns identifiers and method names in aggregation order.
#[derive(Debug, Clone, Default)]
pub struct IdentifierAssigner {
    prefix: String,
    /// identifier → first statement name that claimed it
    identifiers: HashMap<String, String>,
    /// lower-cased method name → first statement name that claimed it
    methods: HashMap<String, String>,
}

/// Names generated for one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedNames {
    pub identifier: String,
    pub method: String,
}

impl IdentifierAssigner {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn assign(&mut self, name: &str, diagnostics: &mut Diagnostics) -> AssignedNames {
        let identifier = self.claim_identifier(name, diagnostics);
        let method = self.claim_method(name, &identifier, diagnostics);
        AssignedNames { identifier, method }
    }

    fn claim_identifier(&mut self, name: &str, diagnostics: &mut Diagnostics) -> String {
        let base = sanitize_identifier(name);
        let identifier = match self.identifiers.get(&base) {
            None => base,
            Some(first) => {
                let first = first.clone();
                let mut suffix = 2;
                while self.identifiers.contains_key(&format!("{base}_{suffix}")) {
                    suffix += 1;
                }
                let identifier = format!("{base}_{suffix}");
                diagnostics.notice(Notice::identifier_collision(&first, name, &identifier));
                identifier
            }
        };
        self.identifiers
            .insert(identifier.clone(), name.to_string());
        identifier
    }

    // Method names are compared case-insensitively, so `GET_USER` and
    // `GETUSER` (`getUser` / `getuser`) still collide.
    fn claim_method(
        &mut self,
        name: &str,
        identifier: &str,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let base = method_name(&self.prefix, identifier);
        let method = match self.methods.get(&base.to_ascii_lowercase()) {
            None => base,
            Some(first) => {
                let first = first.clone();
                let mut suffix = 2;
                while self
                    .methods
                    .contains_key(&format!("{base}{suffix}").to_ascii_lowercase())
                {
                    suffix += 1;
                }
                let method = format!("{base}{suffix}");
                diagnostics.notice(Notice::method_collision(&first, name, &method));
                method
            }
        };
        self.methods
            .insert(method.to_ascii_lowercase(), name.to_string());
        method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NoticeKind;

    #[test]
    fn sanitizes_separators_and_leading_digits() {
        assert_eq!(sanitize_identifier("players.get-top"), "PLAYERS_GET_TOP");
        assert_eq!(sanitize_identifier("getUser"), "GETUSER");
        assert_eq!(sanitize_identifier("a..b__c"), "A_B_C");
        assert_eq!(sanitize_identifier("1st.query"), "_1ST_QUERY");
    }

    #[test]
    fn method_names_are_camel_cased() {
        assert_eq!(method_name("", "PLAYERS_GET_TOP"), "playersGetTop");
        assert_eq!(method_name("", "GETUSER"), "getuser");
        assert_eq!(method_name("", "GET_USER_2"), "getUser2");
        assert_eq!(method_name("", "_1ST_QUERY"), "_1stQuery");
    }

    #[test]
    fn prefix_is_stripped_case_insensitively() {
        assert_eq!(method_name("players", "PLAYERS_GET_TOP"), "getTop");
        assert_eq!(method_name("Players", "PLAYERS_GET_TOP"), "getTop");
        assert_eq!(method_name("other", "PLAYERS_GET_TOP"), "playersGetTop");
        assert_eq!(method_name("players", "PLAYERS"), "players");
        assert_eq!(method_name("q", "Q_1"), "q1");
    }

    #[test]
    fn colliding_names_get_numeric_suffixes() {
        let mut diagnostics = Diagnostics::new();
        let mut assigner = IdentifierAssigner::new("");
        let first = assigner.assign("get-user", &mut diagnostics);
        let second = assigner.assign("get_user", &mut diagnostics);
        let third = assigner.assign("get.user", &mut diagnostics);
        assert_eq!(first.identifier, "GET_USER");
        assert_eq!(second.identifier, "GET_USER_2");
        assert_eq!(third.identifier, "GET_USER_3");
        assert_eq!(second.method, "getUser2");
        assert_eq!(diagnostics.count(NoticeKind::IdentifierCollision), 2);
        assert_eq!(
            diagnostics.notices()[0].message,
            "Similar query names get-user and get_user, generating numerically-assigned identifier GET_USER_2"
        );
    }

    #[test]
    fn suffixed_identifier_blocks_a_later_natural_claim() {
        let mut diagnostics = Diagnostics::new();
        let mut assigner = IdentifierAssigner::new("");
        assigner.assign("a-b", &mut diagnostics);
        assigner.assign("a_b", &mut diagnostics);
        let natural = assigner.assign("a_b_2", &mut diagnostics);
        assert_eq!(natural.identifier, "A_B_2_2");
    }

    #[test]
    fn case_insensitive_method_collisions_are_resolved() {
        let mut diagnostics = Diagnostics::new();
        let mut assigner = IdentifierAssigner::new("");
        let a = assigner.assign("get_user", &mut diagnostics);
        let b = assigner.assign("getUser", &mut diagnostics);
        assert_eq!(a.method, "getUser");
        assert_eq!(b.identifier, "GETUSER");
        assert_eq!(b.method, "getuser2");
        assert_eq!(diagnostics.count(NoticeKind::IdentifierCollision), 1);
    }
}
