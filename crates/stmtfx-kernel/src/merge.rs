//! Merge aggregated entries into one conflict-checked contract.

use crate::aggregate::AggregateEntry;
use crate::classify::{OperationKind, classify};
use crate::diagnostics::Diagnostics;
use crate::error::StructuralConflict;
use crate::ident::IdentifierAssigner;
use crate::reconcile::{ReconciledParameterSet, reconcile};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// The longest description among a statement's variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSource {
    pub file: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub file: PathBuf,
    pub line: usize,
}

/// One statement after merging all of its variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedOperation {
    pub name: String,
    pub identifier: String,
    pub method: String,
    pub kind: OperationKind,
    pub doc: Option<DocSource>,
    pub provenance: Vec<Provenance>,
    pub parameters: ReconciledParameterSet,
}

/// All merged operations, in natural order of statement name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub operations: Vec<MergedOperation>,
}

/// Merge every entry. The first structural conflict aborts the merge;
/// notices recorded up to that point stay in `diagnostics`.
pub fn merge(
    entries: &[AggregateEntry],
    prefix: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Contract, StructuralConflict> {
    let mut assigner = IdentifierAssigner::new(prefix);
    let mut operations = Vec::with_capacity(entries.len());

    for entry in entries {
        let parameters = reconcile(entry, diagnostics)?;
        let names = assigner.assign(entry.name(), diagnostics);
        let kind = classify(&entry.base().query);
        debug!(
            operation = entry.name(),
            identifier = %names.identifier,
            variants = entry.variants().len(),
            kind = ?kind,
            "Merged statement."
        );

        operations.push(MergedOperation {
            name: entry.name().to_string(),
            identifier: names.identifier,
            method: names.method,
            kind,
            doc: longest_doc(entry),
            provenance: entry
                .variants()
                .iter()
                .map(|variant| Provenance {
                    file: variant.source_file.clone(),
                    line: variant.source_line,
                })
                .collect(),
            parameters,
        });
    }

    Ok(Contract { operations })
}

// Ties go to the first-seen variant.
fn longest_doc(entry: &AggregateEntry) -> Option<DocSource> {
    let mut best: Option<DocSource> = None;
    for variant in entry.variants() {
        let longer = match &best {
            None => !variant.doc.is_empty(),
            Some(current) => variant.doc.len() > current.text.len(),
        };
        if longer {
            best = Some(DocSource {
                file: variant.source_file.clone(),
                text: variant.doc.clone(),
            });
        }
    }
    best
}
