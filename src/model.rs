// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result model shared by every strategy, the reconciler and the wire surface.
//!
//! Field names serialize in camelCase because the HTTP protocol predates this
//! implementation and clients already parse that shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One occurrence of the search term, as produced by a strategy runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Absolute path of the file containing the occurrence.
    pub file_path: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// The matched line, trimmed.
    pub text: String,
    /// True when the term matched as a whole word/token at this occurrence.
    pub is_exact_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_definition: Option<bool>,
}

impl MatchRecord {
    pub fn new(file_path: String, line: usize, column: usize, text: &str, exact: bool) -> Self {
        Self {
            file_path,
            line,
            column,
            text: text.trim().to_string(),
            is_exact_match: exact,
            symbol_name: None,
            syntax_kind: None,
            is_definition: None,
        }
    }
}

/// A match record augmented with root-relative location context.
///
/// Enhancement is a pure projection: it never alters the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedRecord {
    #[serde(flatten)]
    pub record: MatchRecord,
    /// Path relative to the query's root directory.
    pub relative_path: String,
    /// Extension without the dot.
    pub file_type: String,
    /// Context line; defaults to the matched text.
    pub context: String,
}

impl EnhancedRecord {
    /// Identity key of the physical location this record points at.
    pub fn key(&self) -> LocationKey {
        LocationKey {
            path: self.relative_path.clone(),
            line: self.record.line,
            column: self.record.column,
        }
    }
}

/// Composite identity key for a physical occurrence.
///
/// A real type rather than a `path:line:column` string so paths containing
/// delimiter characters cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub path: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// Which backend(s) a query should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Symbol-aware search via AST parsing. Legacy wire name: "typescript".
    #[serde(alias = "typescript")]
    Symbol,
    /// External line-oriented tool with its internal fallback chain.
    /// Legacy wire name: "grep".
    #[serde(alias = "grep")]
    External,
    /// Pure in-process scanner. Legacy wire name: "node".
    #[serde(alias = "node")]
    Scan,
    /// All strategies in fixed order, scanner only when nothing was found.
    #[default]
    All,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Symbol => "symbol",
            Strategy::External => "external",
            Strategy::Scan => "scan",
            Strategy::All => "all",
        };
        write!(f, "{name}")
    }
}

/// Aggregate counts over the deduplicated reference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    /// Distinct files among the returned records.
    pub total_files: usize,
    pub total_matches: usize,
    pub exact_matches: usize,
    pub partial_matches: usize,
    /// Per-file-type counts, in first-seen order.
    pub file_types: IndexMap<String, usize>,
    /// Present only when some record carried definition metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_count: Option<usize>,
}

/// Query provenance attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub strategy: Strategy,
    pub elapsed_ms: f64,
    pub search_term: String,
    pub directory: String,
    pub timestamp: String,
}

/// The aggregate returned to a caller (HTTP handler or terminal loop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Ordered sequence of unique enhanced records.
    pub references: Vec<EnhancedRecord>,
    /// File type -> subsequence of records of that type, insertion order kept.
    pub grouped_by_file_type: IndexMap<String, Vec<EnhancedRecord>>,
    pub summary: SearchSummary,
    pub metadata: SearchMetadata,
}

/// One parsed search request, shared by the HTTP handler, the CLI and the
/// terminal loop.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub term: String,
    pub root: std::path::PathBuf,
    pub strategy: Strategy,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, root: impl AsRef<Path>, strategy: Strategy) -> Self {
        Self {
            term: term.into(),
            root: root.as_ref().to_path_buf(),
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_accepts_legacy_wire_names() {
        for (wire, expected) in [
            ("\"typescript\"", Strategy::Symbol),
            ("\"grep\"", Strategy::External),
            ("\"node\"", Strategy::Scan),
            ("\"symbol\"", Strategy::Symbol),
            ("\"external\"", Strategy::External),
            ("\"scan\"", Strategy::Scan),
            ("\"all\"", Strategy::All),
        ] {
            let parsed: Strategy = serde_json::from_str(wire).expect("strategy json");
            assert_eq!(parsed, expected, "wire name {wire}");
        }
    }

    #[test]
    fn match_record_serializes_camel_case_without_empty_symbol_fields() {
        let record = MatchRecord::new("/tmp/a.rs".into(), 3, 7, "  let foo = 1;  ", true);
        let json = serde_json::to_value(&record).expect("json");
        assert_eq!(json["filePath"], "/tmp/a.rs");
        assert_eq!(json["isExactMatch"], true);
        assert_eq!(json["text"], "let foo = 1;");
        assert!(json.get("symbolName").is_none());
        assert!(json.get("isDefinition").is_none());
    }

    #[test]
    fn location_key_distinguishes_columns_on_the_same_line() {
        let first = EnhancedRecord {
            record: MatchRecord::new("/r/a.rs".into(), 4, 1, "foo foo", true),
            relative_path: "a.rs".into(),
            file_type: "rs".into(),
            context: "foo foo".into(),
        };
        let mut shifted = first.clone();
        shifted.record.column = 5;
        assert_ne!(first.key(), shifted.key());
    }
}
