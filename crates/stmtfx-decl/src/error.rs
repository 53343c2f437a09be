//! Error types for reading declaration files.

use std::path::PathBuf;

/// Errors arising while reading or parsing a declaration file.
#[derive(Debug, thiserror::Error)]
pub enum DeclError {
    /// The file could not be read.
    #[error("{}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// The file is not valid UTF-8.
    #[error("{}: contains non-UTF-8 byte sequence(s)", .path.display())]
    Encoding { path: PathBuf },

    /// The file violates the declaration grammar.
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Errors resolving the set of input files.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("{}: No such file", .0.display())]
    MissingFile(PathBuf),

    #[error("{}: No such directory", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to scan {}: {message}", .path.display())]
    Walk { path: PathBuf, message: String },

    #[error("Missing input files")]
    NoInputs,
}
