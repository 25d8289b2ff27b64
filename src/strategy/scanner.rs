// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process scanner: the final fallback, always available.
//!
//! Walks the directory tree, reads every searchable file and applies two
//! regex passes per line: whole-word (exact) and unconstrained substring
//! (partial). Directory symlinks are not followed, but real paths are not
//! resolved either, so a file reachable through two link names can be
//! reported under both. Known limitation, kept from the original behavior.

use async_trait::async_trait;
use ignore::WalkBuilder;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::filters::{file_type_of, is_excluded_dir, is_searchable_extension};
use crate::model::MatchRecord;
use crate::strategy::{SearchStrategy, StrategyFailure};

pub struct ScanSearch {
    extra_excludes: Vec<String>,
}

impl Default for ScanSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSearch {
    pub fn new() -> Self {
        Self {
            extra_excludes: Vec::new(),
        }
    }

    pub fn with_excludes(extra_excludes: Vec<String>) -> Self {
        Self { extra_excludes }
    }
}

#[async_trait]
impl SearchStrategy for ScanSearch {
    fn name(&self) -> &'static str {
        "scan"
    }

    async fn run(&self, term: &str, root: &Path) -> Result<Vec<MatchRecord>, StrategyFailure> {
        let word_re = word_regex(term)?;
        let substring_re = substring_regex(term)?;

        let mut exact: Vec<MatchRecord> = Vec::new();
        let mut partial: Vec<MatchRecord> = Vec::new();
        let mut exact_keys: HashSet<(String, usize, usize, String)> = HashSet::new();

        for path in collect_source_files(root, &self.extra_excludes) {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            let path_str = path.display().to_string();

            for (idx, line) in content.lines().enumerate() {
                let line_num = idx + 1;

                if let Some(m) = word_re.find(line) {
                    let record =
                        MatchRecord::new(path_str.clone(), line_num, m.start() + 1, line, true);
                    exact_keys.insert((
                        path_str.clone(),
                        line_num,
                        m.start() + 1,
                        record.text.clone(),
                    ));
                    exact.push(record);
                }

                if let Some(m) = substring_re.find(line) {
                    let key = (
                        path_str.clone(),
                        line_num,
                        m.start() + 1,
                        line.trim().to_string(),
                    );
                    if !exact_keys.contains(&key) {
                        partial.push(MatchRecord::new(
                            path_str.clone(),
                            line_num,
                            m.start() + 1,
                            line,
                            false,
                        ));
                    }
                }
            }
        }

        exact.append(&mut partial);
        Ok(exact)
    }
}

/// Case-insensitive whole-word pattern for a literal term.
pub fn word_regex(term: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(true)
        .build()
}

/// Case-insensitive substring pattern for a literal term.
pub fn substring_regex(term: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
}

/// Walk `root` serially, yielding searchable files in traversal order.
///
/// Excluded directory names are pruned during the walk; unreadable entries
/// are logged and skipped.
pub(crate) fn collect_source_files(root: &Path, extra_excludes: &[String]) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !is_excluded_dir(&name)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("walk error: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !extra_excludes.is_empty() {
            let path_str = path.to_string_lossy();
            if extra_excludes.iter().any(|p| path_str.contains(p.as_str())) {
                continue;
            }
        }
        if is_searchable_extension(&file_type_of(path)) {
            files.push(path.to_path_buf());
        }
    }
    files
}
