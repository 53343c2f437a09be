//! Reconcile one statement's parameters across its variants.
//!
//! The base variant fixes the parameter set and every parameter's shape.
//! Later variants are compared against the base only, never against each
//! other: a later variant that conflicts with the base aborts the run even
//! if a third variant would have matched it.

use crate::aggregate::AggregateEntry;
use crate::diagnostics::{Diagnostics, Notice};
use crate::error::StructuralConflict;
use indexmap::IndexMap;
use serde::Serialize;
use stmtfx_decl::{VarAttribute, VariableDecl};
use std::path::PathBuf;
use tracing::debug;

/// A canonical parameter and the optionality each declaring file gives it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledParameter {
    pub name: String,
    pub decl: VariableDecl,
    pub optional_in: IndexMap<PathBuf, bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledParameterSet {
    /// Canonical parameters in base declaration order.
    pub parameters: Vec<ReconciledParameter>,
    /// Parameters only later variants declare, with their optionality per
    /// file. Informational; they never reach the generated signature.
    pub extra: IndexMap<String, IndexMap<PathBuf, bool>>,
}

impl ReconciledParameterSet {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ReconciledParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

pub fn reconcile(
    entry: &AggregateEntry,
    diagnostics: &mut Diagnostics,
) -> Result<ReconciledParameterSet, StructuralConflict> {
    let base = entry.base();
    let base_file = &base.source_file;

    let mut parameters: Vec<ReconciledParameter> = base
        .variables
        .iter()
        .map(|(name, decl)| ReconciledParameter {
            name: name.clone(),
            decl: decl.clone(),
            optional_in: IndexMap::from([(base_file.clone(), decl.optional)]),
        })
        .collect();
    let mut extra: IndexMap<String, IndexMap<PathBuf, bool>> = IndexMap::new();

    for other in entry.others() {
        let other_file = &other.source_file;

        for parameter in &mut parameters {
            let Some(decl) = other.variables.get(&parameter.name) else {
                diagnostics.notice(Notice::missing_in_variant(
                    entry.name(),
                    &parameter.name,
                    base_file,
                    other_file,
                ));
                continue;
            };

            let diff = parameter.decl.diff(decl);
            let structural = diff.structural();
            if !structural.is_empty() {
                return Err(StructuralConflict {
                    operation: entry.name().to_string(),
                    parameter: parameter.name.clone(),
                    base_file: base_file.clone(),
                    other_file: other_file.clone(),
                    attributes: structural,
                });
            }
            if diff.contains(VarAttribute::Optional) {
                diagnostics.notice(Notice::optionality_drift(
                    entry.name(),
                    &parameter.name,
                    base_file,
                    parameter.decl.optional,
                    other_file,
                ));
            } else if diff.contains(VarAttribute::DefaultValue) {
                debug!(
                    operation = entry.name(),
                    parameter = %parameter.name,
                    file = %other_file.display(),
                    "Default value differs from the base declaration."
                );
            }
            parameter
                .optional_in
                .insert(other_file.clone(), decl.optional);
        }

        for (name, decl) in &other.variables {
            if base.variables.contains_key(name) {
                continue;
            }
            diagnostics.notice(Notice::extra_in_variant(
                entry.name(),
                name,
                decl.optional,
                other_file,
                base_file,
            ));
            extra
                .entry(name.clone())
                .or_default()
                .insert(other_file.clone(), decl.optional);
        }
    }

    Ok(ReconciledParameterSet { parameters, extra })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::diagnostics::NoticeKind;
    use stmtfx_decl::{DefaultValue, ScalarType, StatementRecord};
    use std::path::Path;

    fn get_user(file: &str, id: VariableDecl) -> StatementRecord {
        StatementRecord::new("getUser", "SELECT * FROM users WHERE id = :id", file, 1)
            .with_variable("id", id)
    }

    fn single_entry(records: Vec<StatementRecord>) -> AggregateEntry {
        aggregate(records).remove(0)
    }

    #[test]
    fn identical_variants_reconcile_silently() {
        let entry = single_entry(vec![
            get_user("a.sql", VariableDecl::required(ScalarType::Int)),
            get_user("b.sql", VariableDecl::required(ScalarType::Int)),
        ]);
        let mut diagnostics = Diagnostics::new();
        let set = reconcile(&entry, &mut diagnostics).expect("should reconcile");
        assert!(diagnostics.is_empty());
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(
            set.parameters[0].decl,
            entry.others()[0].variables["id"].clone()
        );
        assert_eq!(set.parameters[0].optional_in.len(), 2);
    }

    #[test]
    fn type_drift_is_a_structural_conflict() {
        let entry = single_entry(vec![
            get_user("a.sql", VariableDecl::required(ScalarType::Int)),
            get_user("b.sql", VariableDecl::required(ScalarType::String)),
        ]);
        let conflict = reconcile(&entry, &mut Diagnostics::new()).unwrap_err();
        assert_eq!(conflict.parameter, "id");
        assert_eq!(conflict.base_file, Path::new("a.sql"));
        assert_eq!(conflict.other_file, Path::new("b.sql"));
        assert_eq!(conflict.attributes, vec![VarAttribute::Type]);
    }

    #[test]
    fn optional_drift_keeps_base_and_emits_notice() {
        let limit_optional =
            VariableDecl::required(ScalarType::Int).with_default(DefaultValue::Int(10));
        let entry = single_entry(vec![
            StatementRecord::new("top", "SELECT 1", "a.sql", 1)
                .with_variable("limit", limit_optional.clone()),
            StatementRecord::new("top", "SELECT 1", "b.sql", 1)
                .with_variable("limit", VariableDecl::required(ScalarType::Int)),
        ]);
        let mut diagnostics = Diagnostics::new();
        let set = reconcile(&entry, &mut diagnostics).expect("should reconcile");
        assert_eq!(set.parameters[0].decl, limit_optional);
        assert_eq!(diagnostics.count(NoticeKind::OptionalityDrift), 1);
        assert_eq!(
            diagnostics.notices()[0].message,
            ":limit is optional for top in a.sql but required in b.sql"
        );
        assert_eq!(
            set.parameters[0].optional_in.get(Path::new("b.sql")),
            Some(&false)
        );
    }

    #[test]
    fn missing_and_extra_parameters_are_noticed_not_merged() {
        let entry = single_entry(vec![
            StatementRecord::new("q", "SELECT 1", "a.sql", 1)
                .with_variable("a", VariableDecl::required(ScalarType::Int)),
            StatementRecord::new("q", "SELECT 1", "b.sql", 1)
                .with_variable("b", VariableDecl::required(ScalarType::Bool)),
        ]);
        let mut diagnostics = Diagnostics::new();
        let set = reconcile(&entry, &mut diagnostics).expect("should reconcile");
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["a"]);
        assert!(set.extra.contains_key("b"));
        let kinds: Vec<NoticeKind> = diagnostics.notices().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NoticeKind::MissingInVariant, NoticeKind::ExtraInVariant]
        );
        assert_eq!(
            diagnostics.notices()[1].message,
            ":b is required for q in b.sql but not defined in a.sql"
        );
    }

    #[test]
    fn later_variants_are_compared_to_the_base_only() {
        let entry = single_entry(vec![
            get_user("a.sql", VariableDecl::required(ScalarType::Int)),
            get_user("b.sql", VariableDecl::required(ScalarType::String)),
            get_user("c.sql", VariableDecl::required(ScalarType::Int)),
        ]);
        let conflict = reconcile(&entry, &mut Diagnostics::new()).unwrap_err();
        assert_eq!(conflict.other_file, Path::new("b.sql"));
    }

    #[test]
    fn notices_before_a_conflict_survive() {
        let entry = single_entry(vec![
            StatementRecord::new("q", "SELECT 1", "a.sql", 1)
                .with_variable("a", VariableDecl::required(ScalarType::Int))
                .with_variable("b", VariableDecl::required(ScalarType::Int)),
            StatementRecord::new("q", "SELECT 1", "b.sql", 1)
                .with_variable("b", VariableDecl::required(ScalarType::Int).list()),
        ]);
        let mut diagnostics = Diagnostics::new();
        assert!(reconcile(&entry, &mut diagnostics).is_err());
        assert_eq!(diagnostics.count(NoticeKind::MissingInVariant), 1);
    }
}
