//! The seam between the merge pipeline and whatever reads declarations.

use crate::error::DeclError;
use crate::parser::DeclarationParser;
use crate::statement::StatementRecord;
use std::path::Path;

/// Produces the statement records declared in one file.
///
/// Implementations must report every statement of the file or fail; a
/// partial result is never acceptable.
pub trait StatementSource {
    fn parse_file(&self, path: &Path) -> Result<Vec<StatementRecord>, DeclError>;
}

impl StatementSource for DeclarationParser {
    fn parse_file(&self, path: &Path) -> Result<Vec<StatementRecord>, DeclError> {
        Ok(self.parse_path(path)?.statements)
    }
}

impl<T: StatementSource + ?Sized> StatementSource for &T {
    fn parse_file(&self, path: &Path) -> Result<Vec<StatementRecord>, DeclError> {
        (**self).parse_file(path)
    }
}
