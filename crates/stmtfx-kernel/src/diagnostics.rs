//! Non-fatal notices collected during a run.
//!
//! The log is an explicit accumulator: callers create a [`Diagnostics`],
//! lend it to each stage, and read it back afterwards, including after a
//! stage failed, so every notice recorded before an abort is still reported.

use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// What kind of benign drift a notice describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    /// A parameter is optional in one variant and required in another.
    OptionalityDrift,
    /// A canonical parameter is not declared by a later variant.
    MissingInVariant,
    /// A later variant declares a parameter the canonical variant lacks.
    ExtraInVariant,
    /// Two statement names map to the same generated identifier.
    IdentifierCollision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub operation: String,
    pub message: String,
}

fn optionality(optional: bool) -> &'static str {
    if optional { "optional" } else { "required" }
}

impl Notice {
    pub fn optionality_drift(
        operation: &str,
        parameter: &str,
        base_file: &Path,
        base_optional: bool,
        other_file: &Path,
    ) -> Self {
        Self {
            kind: NoticeKind::OptionalityDrift,
            operation: operation.to_string(),
            message: format!(
                ":{parameter} is {} for {operation} in {} but {} in {}",
                optionality(base_optional),
                base_file.display(),
                optionality(!base_optional),
                other_file.display()
            ),
        }
    }

    pub fn missing_in_variant(
        operation: &str,
        parameter: &str,
        base_file: &Path,
        other_file: &Path,
    ) -> Self {
        Self {
            kind: NoticeKind::MissingInVariant,
            operation: operation.to_string(),
            message: format!(
                ":{parameter} is defined for {operation} in {} but not in {}",
                base_file.display(),
                other_file.display()
            ),
        }
    }

    pub fn extra_in_variant(
        operation: &str,
        parameter: &str,
        optional: bool,
        other_file: &Path,
        base_file: &Path,
    ) -> Self {
        Self {
            kind: NoticeKind::ExtraInVariant,
            operation: operation.to_string(),
            message: format!(
                ":{parameter} is {} for {operation} in {} but not defined in {}",
                optionality(optional),
                other_file.display(),
                base_file.display()
            ),
        }
    }

    pub fn identifier_collision(first: &str, second: &str, identifier: &str) -> Self {
        Self {
            kind: NoticeKind::IdentifierCollision,
            operation: second.to_string(),
            message: format!(
                "Similar query names {first} and {second}, generating numerically-assigned identifier {identifier}"
            ),
        }
    }

    pub fn method_collision(first: &str, second: &str, method: &str) -> Self {
        Self {
            kind: NoticeKind::IdentifierCollision,
            operation: second.to_string(),
            message: format!(
                "Similar method names for {first} and {second}, generating numerically-assigned method {method}"
            ),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered notice log for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    notices: Vec<Notice>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&mut self, notice: Notice) {
        debug!(
            kind = ?notice.kind,
            operation = %notice.operation,
            "{}",
            notice.message
        );
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices.iter().filter(|n| n.kind == kind).count()
    }

    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }
}
