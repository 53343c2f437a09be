//! Group statement records by name across files.

use crate::natural::natural_cmp;
use indexmap::IndexMap;
use stmtfx_decl::StatementRecord;
use std::path::Path;
use tracing::debug;

/// Every file's declaration of one statement name.
///
/// Variants are kept in first-seen file order; the first one is the base
/// variant whose parameters are canonical. An entry is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    name: String,
    variants: Vec<StatementRecord>,
}

impl AggregateEntry {
    fn new(record: StatementRecord) -> Self {
        Self {
            name: record.name.clone(),
            variants: vec![record],
        }
    }

    /// Add a variant; a second record from the same file replaces the first
    /// in place.
    fn insert(&mut self, record: StatementRecord) {
        match self
            .variants
            .iter_mut()
            .find(|variant| variant.source_file == record.source_file)
        {
            Some(existing) => *existing = record,
            None => self.variants.push(record),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &StatementRecord {
        &self.variants[0]
    }

    pub fn variants(&self) -> &[StatementRecord] {
        &self.variants
    }

    /// Variants after the base, in first-seen order.
    pub fn others(&self) -> &[StatementRecord] {
        &self.variants[1..]
    }

    pub fn variant(&self, file: &Path) -> Option<&StatementRecord> {
        self.variants
            .iter()
            .find(|variant| variant.source_file == file)
    }
}

/// Collects records file by file.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    entries: IndexMap<String, AggregateEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: StatementRecord) {
        match self.entries.get_mut(&record.name) {
            Some(entry) => entry.insert(record),
            None => {
                self.entries
                    .insert(record.name.clone(), AggregateEntry::new(record));
            }
        }
    }

    pub fn add_file(&mut self, records: impl IntoIterator<Item = StatementRecord>) {
        for record in records {
            self.add(record);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in natural order of statement name.
    pub fn finish(self) -> Vec<AggregateEntry> {
        let mut entries: Vec<AggregateEntry> = self.entries.into_values().collect();
        entries.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        debug!(entries = entries.len(), "Aggregated statement declarations.");
        entries
    }
}

/// Aggregate a flat record stream in one go.
pub fn aggregate(records: impl IntoIterator<Item = StatementRecord>) -> Vec<AggregateEntry> {
    let mut aggregator = Aggregator::new();
    aggregator.add_file(records);
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(name: &str, file: &str, line: usize) -> StatementRecord {
        StatementRecord::new(name, "SELECT 1", file, line)
    }

    #[test]
    fn groups_same_name_across_files_in_first_seen_order() {
        let entries = aggregate(vec![
            record("getUser", "b.sql", 3),
            record("listUsers", "b.sql", 9),
            record("getUser", "a.sql", 5),
        ]);
        assert_eq!(entries.len(), 2);
        let get_user = &entries[0];
        assert_eq!(get_user.name(), "getUser");
        let files: Vec<&PathBuf> = get_user.variants().iter().map(|v| &v.source_file).collect();
        assert_eq!(files, vec![&PathBuf::from("b.sql"), &PathBuf::from("a.sql")]);
        assert_eq!(get_user.base().source_line, 3);
        assert_eq!(get_user.others().len(), 1);
    }

    #[test]
    fn entries_are_naturally_sorted() {
        let entries = aggregate(vec![
            record("q10", "a.sql", 1),
            record("q2", "a.sql", 2),
            record("Q1", "a.sql", 3),
        ]);
        let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Q1", "q2", "q10"]);
    }

    #[test]
    fn same_file_replaces_variant_in_place() {
        let entries = aggregate(vec![
            record("a", "x.sql", 1),
            record("a", "y.sql", 1),
            record("a", "x.sql", 7),
        ]);
        let entry = &entries[0];
        assert_eq!(entry.variants().len(), 2);
        assert_eq!(entry.base().source_line, 7);
        assert!(entry.variant(Path::new("y.sql")).is_some());
    }
}
