//! # stmtfx-decl
//!
//! Statement declarations and how they are read.
//!
//! This crate provides:
//! - `StatementRecord` and `VariableDecl` (one file's declaration of a statement)
//! - the `StatementSource` seam and its default `DeclarationParser`
//! - input discovery (explicit file lists or recursive directory scans)
//!
//! It does not merge declarations across files; that lives in
//! `stmtfx-kernel`.
//!
//! ## Data model
//!
//! ```text
//! .sql file  ──parse──▶  Vec<StatementRecord>
//!                          name, query, doc, source_file:source_line
//!                          variables: name → VariableDecl { type, nullable, list, optional, default }
//! ```

pub mod discover;
pub mod error;
pub mod parser;
pub mod source;
pub mod statement;
pub mod variable;

pub use discover::{DECLARATION_EXTENSION, InputSpec, resolve_inputs};
pub use error::{DeclError, DiscoverError};
pub use parser::{DeclarationFile, DeclarationParser, parse_declarations, parse_variable};
pub use source::StatementSource;
pub use statement::StatementRecord;
pub use variable::{DeclDiff, DefaultValue, ScalarType, VarAttribute, VariableDecl};
