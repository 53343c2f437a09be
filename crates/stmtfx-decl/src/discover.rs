//! Resolve the ordered list of declaration files to read.

use crate::error::DiscoverError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension recognised when scanning a directory.
pub const DECLARATION_EXTENSION: &str = "sql";

/// Where the input files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Explicit files, read in the order given.
    Files(Vec<PathBuf>),
    /// Every `.sql` file below a directory, in file-name order.
    Directory(PathBuf),
}

pub fn resolve_inputs(spec: &InputSpec) -> Result<Vec<PathBuf>, DiscoverError> {
    let files = match spec {
        InputSpec::Files(files) => explicit_files(files)?,
        InputSpec::Directory(dir) => scan_directory(dir)?,
    };
    if files.is_empty() {
        return Err(DiscoverError::NoInputs);
    }
    debug!(count = files.len(), "Resolved declaration files.");
    Ok(files)
}

fn explicit_files(files: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(files.len());
    for file in files {
        if !file.is_file() {
            return Err(DiscoverError::MissingFile(file.clone()));
        }
        if seen.insert(file.clone()) {
            resolved.push(file.clone());
        }
    }
    Ok(resolved)
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, DiscoverError> {
    if !dir.is_dir() {
        return Err(DiscoverError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| DiscoverError::Walk {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && has_declaration_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn has_declaration_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DECLARATION_EXTENSION))
}
