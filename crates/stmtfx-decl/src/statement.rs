//! Statement records as produced by a declaration parser.

use crate::variable::VariableDecl;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One statement declared in one file.
///
/// `variables` keeps declaration order; that order becomes the parameter
/// order of the generated callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
    pub name: String,
    pub query: String,
    pub variables: IndexMap<String, VariableDecl>,
    pub doc: String,
    pub source_file: PathBuf,
    pub source_line: usize,
}

impl StatementRecord {
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        source_file: impl Into<PathBuf>,
        source_line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            variables: IndexMap::new(),
            doc: String::new(),
            source_file: source_file.into(),
            source_line,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, decl: VariableDecl) -> Self {
        self.variables.insert(name.into(), decl);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}
