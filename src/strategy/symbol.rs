// SPDX-License-Identifier: MIT OR Apache-2.0

//! Symbol-aware runner: AST-level identifier matching via tree-sitter.
//!
//! With a project manifest discoverable at or above the root, runs in project
//! mode: matching tokens carry symbol metadata, declarations are flagged, and
//! in symbol mode write-access usages are excluded. Without one, degrades to
//! per-file token matching with no symbol metadata.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::filters::{detect_language, file_type_of};
use crate::model::MatchRecord;
use crate::parser::identifiers::{IdentifierIndex, TokenRole};
use crate::strategy::scanner::collect_source_files;
use crate::strategy::{SearchStrategy, StrategyFailure};

/// Manifest files whose presence switches the runner into project mode.
pub const PROJECT_MANIFESTS: &[&str] = &[
    "tsconfig.json",
    "jsconfig.json",
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
];

pub struct SymbolSearch {
    /// True when the query asked for this strategy explicitly; enables
    /// project-wide usage resolution with write-access exclusion.
    symbol_mode: bool,
    extra_excludes: Vec<String>,
}

impl SymbolSearch {
    pub fn new(symbol_mode: bool) -> Self {
        Self {
            symbol_mode,
            extra_excludes: Vec::new(),
        }
    }

    pub fn with_excludes(symbol_mode: bool, extra_excludes: Vec<String>) -> Self {
        Self {
            symbol_mode,
            extra_excludes,
        }
    }
}

#[async_trait]
impl SearchStrategy for SymbolSearch {
    fn name(&self) -> &'static str {
        "symbol"
    }

    async fn run(&self, term: &str, root: &Path) -> Result<Vec<MatchRecord>, StrategyFailure> {
        let project_mode = project_manifest_above(root).is_some();
        let mut index = IdentifierIndex::new();
        let mut records: Vec<MatchRecord> = Vec::new();

        for path in collect_source_files(root, &self.extra_excludes) {
            let Some(language) = detect_language(&file_type_of(&path)) else {
                continue;
            };
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(hits) = index.occurrences(&content, language, term) else {
                tracing::debug!("no symbol information for {}", path.display());
                continue;
            };
            if hits.is_empty() {
                continue;
            }

            let path_str = path.display().to_string();
            let lines: Vec<&str> = content.lines().collect();
            for hit in hits {
                if project_mode && self.symbol_mode && hit.role == TokenRole::Write {
                    // Write accesses are excluded from symbol-mode resolution.
                    continue;
                }
                let text = lines.get(hit.line.saturating_sub(1)).copied().unwrap_or("");
                if text.trim().is_empty() {
                    continue;
                }
                let mut record =
                    MatchRecord::new(path_str.clone(), hit.line, hit.column, text, true);
                if project_mode {
                    record.symbol_name = Some(term.to_string());
                    record.syntax_kind = Some(hit.syntax_kind);
                    record.is_definition = Some(hit.role == TokenRole::Definition);
                }
                records.push(record);
            }
        }

        Ok(records)
    }
}

/// Find a project manifest at `root` or any ancestor directory.
pub fn project_manifest_above(root: &Path) -> Option<PathBuf> {
    let mut dir = Some(root);
    while let Some(current) = dir {
        for manifest in PROJECT_MANIFESTS {
            let candidate = current.join(manifest);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        dir = current.parent();
    }
    None
}
