// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search orchestration: strategy selection, fallback and timing.
//!
//! One query runs the applicable runners in fixed order (symbol, external,
//! scanner) and hands the concatenated records to the reconciler. A runner
//! failure is logged and skipped; only malformed input fails the query.

use std::time::Instant;

use crate::errors::SearchError;
use crate::model::{SearchMetadata, SearchQuery, SearchResult, Strategy};
use crate::reconcile::reconcile;
use crate::strategy::external::ExternalToolSearch;
use crate::strategy::scanner::ScanSearch;
use crate::strategy::symbol::SymbolSearch;
use crate::strategy::SearchStrategy;

pub struct SearchOrchestrator {
    extra_excludes: Vec<String>,
}

impl Default for SearchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchOrchestrator {
    pub fn new() -> Self {
        Self {
            extra_excludes: Vec::new(),
        }
    }

    pub fn with_excludes(extra_excludes: Vec<String>) -> Self {
        Self { extra_excludes }
    }

    /// Run one query to completion. Elapsed time spans from entry to
    /// reconciler completion.
    pub async fn run(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let term = query.term.trim();
        if term.is_empty() {
            return Err(SearchError::EmptyTerm);
        }
        if !query.root.is_dir() {
            return Err(SearchError::DirectoryNotFound(
                query.root.display().to_string(),
            ));
        }
        let root = query
            .root
            .canonicalize()
            .map_err(|e| SearchError::DirectoryNotFound(format!("{}: {e}", query.root.display())))?;

        let started = Instant::now();
        let mut records = Vec::new();

        if matches!(query.strategy, Strategy::All | Strategy::Symbol) {
            let runner = SymbolSearch::with_excludes(
                query.strategy == Strategy::Symbol,
                self.extra_excludes.clone(),
            );
            match runner.run(term, &root).await {
                Ok(mut found) => {
                    tracing::debug!("symbol strategy produced {} records", found.len());
                    records.append(&mut found);
                }
                Err(e) => tracing::warn!("symbol strategy failed, continuing: {e}"),
            }
        }

        if matches!(query.strategy, Strategy::All | Strategy::External) {
            let runner = ExternalToolSearch::with_excludes(self.extra_excludes.clone());
            match runner.run(term, &root).await {
                Ok(mut found) => {
                    tracing::debug!("external strategy produced {} records", found.len());
                    records.append(&mut found);
                }
                Err(e) => tracing::warn!("external strategy failed, continuing: {e}"),
            }
        }

        if query.strategy == Strategy::Scan
            || (query.strategy == Strategy::All && records.is_empty())
        {
            let runner = ScanSearch::with_excludes(self.extra_excludes.clone());
            match runner.run(term, &root).await {
                Ok(mut found) => {
                    tracing::debug!("scan strategy produced {} records", found.len());
                    records.append(&mut found);
                }
                Err(e) => tracing::warn!("scan strategy failed, continuing: {e}"),
            }
        }

        let set = reconcile(records, &root);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        Ok(SearchResult {
            references: set.references,
            grouped_by_file_type: set.grouped_by_file_type,
            summary: set.summary,
            metadata: SearchMetadata {
                strategy: query.strategy,
                elapsed_ms,
                search_term: term.to_string(),
                directory: root.display().to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write file");
    }

    #[tokio::test]
    async fn empty_term_is_a_user_error_and_runs_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let orchestrator = SearchOrchestrator::new();
        let query = SearchQuery::new("   ", dir.path(), Strategy::All);

        let err = orchestrator.run(&query).await.expect_err("must fail");
        assert!(matches!(err, SearchError::EmptyTerm));
    }

    #[tokio::test]
    async fn nonexistent_directory_is_a_user_error() {
        let orchestrator = SearchOrchestrator::new();
        let query = SearchQuery::new("foo", "/definitely/not/here", Strategy::All);

        let err = orchestrator.run(&query).await.expect_err("must fail");
        match err {
            SearchError::DirectoryNotFound(details) => {
                assert!(details.contains("/definitely/not/here"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn scan_strategy_alone_satisfies_the_summary_invariants() {
        let dir = TempDir::new().expect("tempdir");
        write_file(
            &dir.path().join("src/app.js"),
            "const foo = 1;\nconst foobar = 2;\n",
        );

        let orchestrator = SearchOrchestrator::new();
        let query = SearchQuery::new("foo", dir.path(), Strategy::Scan);
        let result = orchestrator.run(&query).await.expect("search");

        assert_eq!(result.summary.total_matches, result.references.len());
        assert_eq!(
            result.summary.exact_matches + result.summary.partial_matches,
            result.summary.total_matches
        );
        assert_eq!(result.summary.exact_matches, 1);
        assert_eq!(result.summary.partial_matches, 1);
        assert_eq!(result.metadata.strategy, Strategy::Scan);
        assert_eq!(result.metadata.search_term, "foo");
    }

    #[tokio::test]
    async fn all_strategies_deduplicate_shared_locations() {
        let dir = TempDir::new().expect("tempdir");
        write_file(&dir.path().join("package.json"), "{}");
        write_file(&dir.path().join("src/app.js"), "const marker = 1;\nmarker;\n");

        let orchestrator = SearchOrchestrator::new();
        let query = SearchQuery::new("marker", dir.path(), Strategy::All);
        let result = orchestrator.run(&query).await.expect("search");

        // Symbol and external/scan runners both report the same physical
        // locations; after reconciliation each location appears once.
        let mut keys: Vec<String> = result
            .references
            .iter()
            .map(|r| r.key().to_string())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), result.references.len());
        assert!(result.summary.total_matches >= 2);
    }

    #[tokio::test]
    async fn excluded_directories_never_reach_the_result() {
        let dir = TempDir::new().expect("tempdir");
        write_file(&dir.path().join("src/keep.js"), "const needle = 1;\n");
        write_file(
            &dir.path().join("node_modules/dep/skip.js"),
            "const needle = 2;\n",
        );

        let orchestrator = SearchOrchestrator::new();
        let query = SearchQuery::new("needle", dir.path(), Strategy::All);
        let result = orchestrator.run(&query).await.expect("search");

        assert!(!result.references.is_empty());
        for reference in &result.references {
            assert!(
                !reference.relative_path.contains("node_modules"),
                "excluded dir leaked: {}",
                reference.relative_path
            );
        }
    }
}
