// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result reconciliation: enhance, deduplicate, group, summarize.
//!
//! Pure functions over record sequences. Deduplication is order-sensitive:
//! with the fixed runner order (symbol, external, scanner) the record
//! inserted last for a physical location wins, while the location keeps its
//! first-seen position in the output sequence.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;

use crate::filters::file_type_of;
use crate::model::{EnhancedRecord, LocationKey, MatchRecord, SearchSummary};

/// Everything the reconciler derives from one record sequence.
#[derive(Debug, Clone)]
pub struct ReconciledSet {
    pub references: Vec<EnhancedRecord>,
    pub grouped_by_file_type: IndexMap<String, Vec<EnhancedRecord>>,
    pub summary: SearchSummary,
}

/// Project a raw record to an enhanced one. Never alters the identity key.
pub fn enhance(record: MatchRecord, root: &Path) -> EnhancedRecord {
    let path = Path::new(&record.file_path);
    let relative_path = path
        .strip_prefix(root)
        .ok()
        .map(|rel| rel.display().to_string())
        .filter(|rel| !rel.is_empty())
        .unwrap_or_else(|| record.file_path.clone());
    let file_type = file_type_of(path);
    let context = record.text.clone();

    EnhancedRecord {
        record,
        relative_path,
        file_type,
        context,
    }
}

/// Collapse records sharing an identity key; the last record for a key wins,
/// output order is the first-seen order of keys.
pub fn dedupe(records: Vec<EnhancedRecord>) -> Vec<EnhancedRecord> {
    let mut unique: IndexMap<LocationKey, EnhancedRecord> = IndexMap::with_capacity(records.len());
    for record in records {
        unique.insert(record.key(), record);
    }
    unique.into_values().collect()
}

/// Partition by file type, preserving relative order within each group.
pub fn group_by_file_type(records: &[EnhancedRecord]) -> IndexMap<String, Vec<EnhancedRecord>> {
    let mut groups: IndexMap<String, Vec<EnhancedRecord>> = IndexMap::new();
    for record in records {
        groups
            .entry(record.file_type.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Derive aggregate counts from the deduplicated sequence.
pub fn summarize(records: &[EnhancedRecord]) -> SearchSummary {
    let total_files = records
        .iter()
        .map(|r| r.record.file_path.as_str())
        .collect::<HashSet<_>>()
        .len();
    let exact_matches = records.iter().filter(|r| r.record.is_exact_match).count();

    let mut file_types: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        *file_types.entry(record.file_type.clone()).or_insert(0) += 1;
    }

    let has_definition_metadata = records.iter().any(|r| r.record.is_definition.is_some());
    let (definition_count, reference_count) = if has_definition_metadata {
        (
            Some(
                records
                    .iter()
                    .filter(|r| r.record.is_definition == Some(true))
                    .count(),
            ),
            Some(
                records
                    .iter()
                    .filter(|r| r.record.is_definition == Some(false))
                    .count(),
            ),
        )
    } else {
        (None, None)
    };

    SearchSummary {
        total_files,
        total_matches: records.len(),
        exact_matches,
        partial_matches: records.len() - exact_matches,
        file_types,
        definition_count,
        reference_count,
    }
}

/// Full reconciliation pipeline over the concatenated runner output.
pub fn reconcile(raw: Vec<MatchRecord>, root: &Path) -> ReconciledSet {
    let enhanced: Vec<EnhancedRecord> = raw.into_iter().map(|r| enhance(r, root)).collect();
    let references = dedupe(enhanced);
    let grouped_by_file_type = group_by_file_type(&references);
    let summary = summarize(&references);

    ReconciledSet {
        references,
        grouped_by_file_type,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, line: usize, column: usize, text: &str, exact: bool) -> MatchRecord {
        MatchRecord::new(path.to_string(), line, column, text, exact)
    }

    #[test]
    fn enhancement_computes_relative_path_and_file_type() {
        let raw = record("/repo/src/app.ts", 3, 7, "const foo = 1;", true);
        let enhanced = enhance(raw, Path::new("/repo"));

        assert_eq!(enhanced.relative_path, "src/app.ts");
        assert_eq!(enhanced.file_type, "ts");
        assert_eq!(enhanced.context, "const foo = 1;");
        assert_eq!(enhanced.record.line, 3);
        assert_eq!(enhanced.record.column, 7);
    }

    #[test]
    fn enhancement_falls_back_to_the_full_path_outside_the_root() {
        let raw = record("/elsewhere/x.rs", 1, 1, "fn x() {}", true);
        let enhanced = enhance(raw, Path::new("/repo"));
        assert_eq!(enhanced.relative_path, "/elsewhere/x.rs");
    }

    #[test]
    fn dedupe_keeps_first_position_and_last_value() {
        let root = Path::new("/repo");
        let records = vec![
            enhance(record("/repo/a.ts", 1, 5, "foo()", true), root),
            enhance(record("/repo/b.ts", 2, 1, "foo()", true), root),
            // Same location as the first, reported later by another runner
            // with a different classification: the later record wins.
            enhance(record("/repo/a.ts", 1, 5, "foo()", false), root),
        ];

        let unique = dedupe(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].relative_path, "a.ts");
        assert!(!unique[0].record.is_exact_match, "last writer wins");
        assert_eq!(unique[1].relative_path, "b.ts");
    }

    #[test]
    fn dedupe_is_idempotent() {
        let root = Path::new("/repo");
        let records = vec![
            enhance(record("/repo/a.ts", 1, 5, "foo()", true), root),
            enhance(record("/repo/a.ts", 1, 5, "foo()", false), root),
            enhance(record("/repo/b.ts", 9, 2, "foo()", true), root),
        ];

        let once = dedupe(records);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn summary_counts_are_consistent() {
        let root = Path::new("/repo");
        let raw = vec![
            record("/repo/a.ts", 1, 7, "const foo = 1;", true),
            record("/repo/a.ts", 2, 7, "const foobar = 2;", false),
            record("/repo/b.rs", 4, 1, "foo();", true),
        ];

        let set = reconcile(raw, root);

        assert_eq!(set.summary.total_matches, set.references.len());
        assert_eq!(
            set.summary.exact_matches + set.summary.partial_matches,
            set.summary.total_matches
        );
        assert_eq!(set.summary.total_files, 2);
        assert_eq!(set.summary.file_types.get("ts"), Some(&2));
        assert_eq!(set.summary.file_types.get("rs"), Some(&1));
        assert_eq!(set.summary.definition_count, None);
    }

    #[test]
    fn definition_counts_appear_only_with_symbol_metadata() {
        let root = Path::new("/repo");
        let mut definition = record("/repo/a.ts", 1, 10, "function foo() {}", true);
        definition.is_definition = Some(true);
        definition.symbol_name = Some("foo".into());
        let mut usage = record("/repo/a.ts", 5, 1, "foo();", true);
        usage.is_definition = Some(false);

        let set = reconcile(vec![definition, usage], root);
        assert_eq!(set.summary.definition_count, Some(1));
        assert_eq!(set.summary.reference_count, Some(1));
    }

    #[test]
    fn grouping_preserves_insertion_order() {
        let root = Path::new("/repo");
        let raw = vec![
            record("/repo/z.ts", 1, 1, "foo", true),
            record("/repo/a.rs", 1, 1, "foo", true),
            record("/repo/m.ts", 1, 1, "foo", true),
        ];

        let set = reconcile(raw, root);
        let keys: Vec<_> = set.grouped_by_file_type.keys().cloned().collect();
        assert_eq!(keys, vec!["ts".to_string(), "rs".to_string()]);
        assert_eq!(set.grouped_by_file_type["ts"].len(), 2);
        assert_eq!(set.grouped_by_file_type["ts"][0].relative_path, "z.ts");
        assert_eq!(set.grouped_by_file_type["ts"][1].relative_path, "m.ts");
    }

    #[test]
    fn reconciling_an_already_unique_sequence_is_stable() {
        let root = Path::new("/repo");
        let raw = vec![
            record("/repo/a.ts", 1, 1, "foo", true),
            record("/repo/b.ts", 2, 2, "foo bar", false),
        ];

        let first = reconcile(raw, root);
        let again = dedupe(first.references.clone());
        assert_eq!(first.references, again);
        assert_eq!(summarize(&again), first.summary);
    }
}
