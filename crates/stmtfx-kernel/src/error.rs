//! Error types for stmtfx runs.

use stmtfx_decl::{DeclError, DiscoverError, VarAttribute};
use std::path::PathBuf;

/// Exit code for malformed invocations.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for parse failures, conflicts and output failures.
pub const EXIT_FAILURE: i32 = 1;

/// Fatal conditions that abort a run before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum FxError {
    /// The invocation itself is malformed.
    #[error("{0}")]
    Usage(String),

    /// A declaration file was rejected by the parser.
    #[error(transparent)]
    Parse(#[from] DeclError),

    /// Two variants of one statement disagree on a parameter's shape.
    #[error(transparent)]
    Conflict(#[from] StructuralConflict),

    /// The artifact could not be written.
    #[error("{}: {message}", .path.display())]
    Output { path: PathBuf, message: String },
}

impl FxError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Parse(_) | Self::Conflict(_) | Self::Output { .. } => EXIT_FAILURE,
        }
    }
}

impl From<DiscoverError> for FxError {
    fn from(err: DiscoverError) -> Self {
        Self::Usage(err.to_string())
    }
}

/// A parameter declared with incompatible shapes in two files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Conflict: {operation} :{parameter} have different declarations ({}) in {} and {}",
    attribute_list(.attributes),
    .base_file.display(),
    .other_file.display()
)]
pub struct StructuralConflict {
    pub operation: String,
    pub parameter: String,
    pub base_file: PathBuf,
    pub other_file: PathBuf,
    pub attributes: Vec<VarAttribute>,
}

fn attribute_list(attributes: &[VarAttribute]) -> String {
    attributes
        .iter()
        .map(|attribute| attribute.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
