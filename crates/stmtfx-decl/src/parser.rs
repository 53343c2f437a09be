//! Parser for comment-directive SQL declaration files.
//!
//! Directives live in SQL comments that start with `-- #`; every other line
//! is query text belonging to the innermost open group. Whitespace between
//! `#` and the directive marker is ignored, so directives can be indented to
//! follow the group nesting.
//!
//! ```text
//! -- #!sqlite
//! -- #{ players
//! -- #  { get
//! -- #    * Fetch one player by name.
//! -- #    :name string
//! SELECT * FROM players WHERE name = :name;
//! -- #  }
//! -- #}
//! ```
//!
//! The example declares one statement, `players.get`.

use crate::error::DeclError;
use crate::statement::StatementRecord;
use crate::variable::{DefaultValue, ScalarType, VariableDecl};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

const DIRECTIVE_PREFIX: &str = "-- #";
const LIST_PREFIX: &str = "list:";
/// Generated callables cannot take a parameter with this name.
const RESERVED_VARIABLE: &str = "this";

/// Parsed contents of one declaration file.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationFile {
    pub path: PathBuf,
    pub dialect: Option<String>,
    pub statements: Vec<StatementRecord>,
}

/// Reads declaration files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationParser;

impl DeclarationParser {
    pub fn parse_path(&self, path: &Path) -> Result<DeclarationFile, DeclError> {
        let bytes = fs::read(path).map_err(|e| DeclError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let text = String::from_utf8(bytes).map_err(|_| DeclError::Encoding {
            path: path.to_path_buf(),
        })?;
        let file = parse_declarations(path, &text)?;
        debug!(
            path = %path.display(),
            dialect = ?file.dialect,
            statements = file.statements.len(),
            "Parsed declaration file."
        );
        Ok(file)
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex must compile"))
}

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s+(\S+)(?:\s+(.+))?$").expect("variable regex must compile")
    })
}

/// Parse declaration text. `path` is recorded as the provenance of every
/// statement and used in error messages.
pub fn parse_declarations(
    path: impl AsRef<Path>,
    text: &str,
) -> Result<DeclarationFile, DeclError> {
    let mut parser = Parser::new(path.as_ref());
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    parser.finish()
}

/// Parse a variable type (`[list:][?]scalar`) and optional default literal.
pub fn parse_variable(type_spec: &str, default: Option<&str>) -> Result<VariableDecl, String> {
    let (list, spec) = match type_spec.strip_prefix(LIST_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, type_spec),
    };
    let (nullable, spec) = match spec.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    let scalar: ScalarType = spec.parse()?;

    let decl = VariableDecl {
        scalar,
        nullable,
        list,
        optional: false,
        default: None,
    };
    match default {
        None => Ok(decl),
        Some(_) if list => Err("list variables cannot have a default value".to_string()),
        Some(raw) => Ok(decl.with_default(parse_default(scalar, nullable, raw)?)),
    }
}

fn parse_default(scalar: ScalarType, nullable: bool, raw: &str) -> Result<DefaultValue, String> {
    if raw == "null" {
        return if nullable {
            Ok(DefaultValue::Null)
        } else {
            Err(format!("`null` default requires a nullable type, got `{scalar}`"))
        };
    }

    match scalar {
        ScalarType::Int => raw
            .parse::<i64>()
            .map(DefaultValue::Int)
            .map_err(|_| format!("invalid int default `{raw}`")),
        ScalarType::Float => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(DefaultValue::Float(value)),
            _ => Err(format!("invalid float default `{raw}`")),
        },
        ScalarType::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(DefaultValue::Bool(true)),
            "false" | "off" | "no" | "0" => Ok(DefaultValue::Bool(false)),
            _ => Err(format!("invalid bool default `{raw}`")),
        },
        ScalarType::String => {
            if raw.starts_with('"') {
                quoted_string(raw).map(DefaultValue::String)
            } else {
                Ok(DefaultValue::String(raw.to_string()))
            }
        }
        ScalarType::Timestamp => {
            if raw.eq_ignore_ascii_case("now") {
                Ok(DefaultValue::Now)
            } else if raw.starts_with('"') {
                quoted_string(raw).map(DefaultValue::String)
            } else {
                Err(format!(
                    "invalid timestamp default `{raw}`: expected NOW or a quoted string"
                ))
            }
        }
    }
}

fn quoted_string(raw: &str) -> Result<String, String> {
    serde_json::from_str::<String>(raw).map_err(|e| format!("invalid string literal {raw}: {e}"))
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> DeclError {
    DeclError::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

#[derive(Debug, Default)]
struct Group {
    name: String,
    line: usize,
    doc: Vec<String>,
    variables: IndexMap<String, VariableDecl>,
    body: Vec<String>,
    has_children: bool,
}

impl Group {
    fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    fn has_header(&self) -> bool {
        !self.doc.is_empty() || !self.variables.is_empty()
    }
}

struct Parser<'a> {
    path: &'a Path,
    dialect: Option<String>,
    seen_directive: bool,
    stack: Vec<Group>,
    statements: Vec<StatementRecord>,
    names: HashSet<String>,
}

impl<'a> Parser<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            dialect: None,
            seen_directive: false,
            stack: Vec::new(),
            statements: Vec::new(),
            names: HashSet::new(),
        }
    }

    fn line(&mut self, line_no: usize, raw: &str) -> Result<(), DeclError> {
        let trimmed = raw.trim();
        if let Some(directive) = trimmed.strip_prefix(DIRECTIVE_PREFIX) {
            let result = self.directive(line_no, directive.trim_start());
            self.seen_directive = true;
            return result;
        }
        self.text(line_no, raw, trimmed)
    }

    fn text(&mut self, line_no: usize, raw: &str, trimmed: &str) -> Result<(), DeclError> {
        let ignorable = trimmed.is_empty() || trimmed.starts_with("--");
        let Some(group) = self.stack.last_mut() else {
            if ignorable {
                return Ok(());
            }
            return Err(parse_error(
                self.path,
                line_no,
                "query text outside of a statement",
            ));
        };

        if group.has_children {
            if ignorable {
                return Ok(());
            }
            let message = format!(
                "query text in group `{}`, which contains statements",
                group.name
            );
            return Err(parse_error(self.path, line_no, message));
        }
        // Blank and comment lines only count once real query text started.
        if ignorable && !group.has_body() {
            return Ok(());
        }
        group.body.push(raw.trim_end().to_string());
        Ok(())
    }

    fn directive(&mut self, line_no: usize, directive: &str) -> Result<(), DeclError> {
        let mut chars = directive.chars();
        let Some(marker) = chars.next() else {
            // A bare `-- #` is an ordinary comment.
            return Ok(());
        };
        let rest = chars.as_str().trim();
        match marker {
            '!' => self.dialect(line_no, rest),
            '{' => self.open(line_no, rest),
            '}' => self.close(line_no, rest),
            '*' => self.describe(line_no, rest),
            ':' => self.variable(line_no, rest),
            _ => Err(parse_error(
                self.path,
                line_no,
                format!("unknown directive `{DIRECTIVE_PREFIX}{directive}`"),
            )),
        }
    }

    fn dialect(&mut self, line_no: usize, rest: &str) -> Result<(), DeclError> {
        if self.seen_directive {
            return Err(parse_error(
                self.path,
                line_no,
                "dialect must be declared once, before any other directive",
            ));
        }
        if !identifier_re().is_match(rest) {
            return Err(parse_error(
                self.path,
                line_no,
                format!("invalid dialect `{rest}`"),
            ));
        }
        self.dialect = Some(rest.to_ascii_lowercase());
        Ok(())
    }

    fn open(&mut self, line_no: usize, name: &str) -> Result<(), DeclError> {
        let invalid = name.is_empty()
            || name.contains(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '.'));
        if invalid {
            return Err(parse_error(
                self.path,
                line_no,
                format!("invalid statement name `{name}`"),
            ));
        }

        if let Some(parent) = self.stack.last_mut() {
            if parent.has_body() {
                let message = format!(
                    "group `{name}` opened after query text of `{}`",
                    parent.name
                );
                return Err(parse_error(self.path, line_no, message));
            }
            if parent.has_header() {
                let message = format!(
                    "group `{}` declares variables or a description but contains statements",
                    parent.name
                );
                return Err(parse_error(self.path, line_no, message));
            }
            parent.has_children = true;
        }

        self.stack.push(Group {
            name: name.to_string(),
            line: line_no,
            ..Group::default()
        });
        Ok(())
    }

    fn close(&mut self, line_no: usize, rest: &str) -> Result<(), DeclError> {
        if !rest.is_empty() {
            return Err(parse_error(
                self.path,
                line_no,
                format!("unexpected text after `}}`: `{rest}`"),
            ));
        }
        let Some(group) = self.stack.pop() else {
            return Err(parse_error(self.path, line_no, "unmatched `}`"));
        };
        if group.has_children {
            return Ok(());
        }

        let name = self
            .stack
            .iter()
            .map(|parent| parent.name.as_str())
            .chain(std::iter::once(group.name.as_str()))
            .collect::<Vec<_>>()
            .join(".");
        if !group.has_body() {
            return Err(parse_error(
                self.path,
                line_no,
                format!("empty statement `{name}`"),
            ));
        }
        if !self.names.insert(name.clone()) {
            return Err(parse_error(
                self.path,
                group.line,
                format!("duplicate statement `{name}`"),
            ));
        }

        self.statements.push(StatementRecord {
            name,
            query: group.body.join("\n").trim_end().to_string(),
            variables: group.variables,
            doc: group.doc.join("\n").trim().to_string(),
            source_file: self.path.to_path_buf(),
            source_line: group.line,
        });
        Ok(())
    }

    fn current_header(&mut self, line_no: usize, what: &str) -> Result<&mut Group, DeclError> {
        let path = self.path;
        let Some(group) = self.stack.last_mut() else {
            return Err(parse_error(
                path,
                line_no,
                format!("{what} outside of a statement"),
            ));
        };
        if group.has_body() {
            return Err(parse_error(
                path,
                line_no,
                format!("{what} must precede the query text"),
            ));
        }
        if group.has_children {
            let message = format!("{what} on group `{}`, which contains statements", group.name);
            return Err(parse_error(path, line_no, message));
        }
        Ok(group)
    }

    fn describe(&mut self, line_no: usize, text: &str) -> Result<(), DeclError> {
        let group = self.current_header(line_no, "description")?;
        group.doc.push(text.to_string());
        Ok(())
    }

    fn variable(&mut self, line_no: usize, rest: &str) -> Result<(), DeclError> {
        let path = self.path;
        let Some(captures) = variable_re().captures(rest) else {
            return Err(parse_error(
                path,
                line_no,
                format!("malformed variable declaration `:{rest}`"),
            ));
        };
        let name = &captures[1];
        if name == RESERVED_VARIABLE {
            return Err(parse_error(
                path,
                line_no,
                format!("`:{name}` is reserved and cannot name a variable"),
            ));
        }
        let default = captures.get(3).map(|m| m.as_str().trim());
        let decl = parse_variable(&captures[2], default)
            .map_err(|message| parse_error(path, line_no, format!(":{name}: {message}")))?;

        let group = self.current_header(line_no, "variable declaration")?;
        if group.variables.contains_key(name) {
            return Err(parse_error(
                path,
                line_no,
                format!("duplicate variable `:{name}`"),
            ));
        }
        group.variables.insert(name.to_string(), decl);
        Ok(())
    }

    fn finish(self) -> Result<DeclarationFile, DeclError> {
        if let Some(group) = self.stack.last() {
            return Err(parse_error(
                self.path,
                group.line,
                format!("unclosed group `{}`", group.name),
            ));
        }
        Ok(DeclarationFile {
            path: self.path.to_path_buf(),
            dialect: self.dialect,
            statements: self.statements,
        })
    }
}
