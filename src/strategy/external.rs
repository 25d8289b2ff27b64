// SPDX-License-Identifier: MIT OR Apache-2.0

//! External-tool runner: ripgrep first, then grep, then the in-process
//! scanner.
//!
//! Each query makes two passes with the selected tool: a whole-word pass
//! (trusted as the exact set) and an unconstrained substring pass whose
//! remainder, after subtracting the exact set by `file:line:text`, becomes
//! the partial set. Tool invocations are bounded by a hard timeout that
//! kills the child and yields an empty result instead of blocking the query.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::bootstrap::locate_tool;
use crate::filters::{EXCLUDED_DIRS, SEARCHABLE_EXTENSIONS};
use crate::model::MatchRecord;
use crate::strategy::scanner::ScanSearch;
use crate::strategy::{SearchStrategy, StrategyFailure};

/// Hard wall-clock bound for one external process invocation.
pub const EXTERNAL_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// The prioritized attempts this runner makes, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalBackend {
    Ripgrep,
    Grep,
    Scanner,
}

/// Fixed fallback order. The scanner terminates the chain: it cannot be
/// unavailable.
pub const FALLBACK_ORDER: &[ExternalBackend] = &[
    ExternalBackend::Ripgrep,
    ExternalBackend::Grep,
    ExternalBackend::Scanner,
];

pub struct ExternalToolSearch {
    ripgrep: Option<PathBuf>,
    grep: Option<PathBuf>,
    extra_excludes: Vec<String>,
}

impl ExternalToolSearch {
    /// Probe the system for the supported tools.
    pub fn probed() -> Self {
        Self {
            ripgrep: locate_tool("rg"),
            grep: locate_tool("grep"),
            extra_excludes: Vec::new(),
        }
    }

    pub fn with_excludes(extra_excludes: Vec<String>) -> Self {
        Self {
            extra_excludes,
            ..Self::probed()
        }
    }

    /// Build with explicit tool paths; used to exercise the fallback chain.
    pub fn with_tools(
        ripgrep: Option<PathBuf>,
        grep: Option<PathBuf>,
        extra_excludes: Vec<String>,
    ) -> Self {
        Self {
            ripgrep,
            grep,
            extra_excludes,
        }
    }

    async fn attempt(
        &self,
        backend: ExternalBackend,
        term: &str,
        root: &Path,
    ) -> Result<Vec<MatchRecord>, StrategyFailure> {
        match backend {
            ExternalBackend::Ripgrep => {
                let tool = self
                    .ripgrep
                    .clone()
                    .ok_or(StrategyFailure::ToolUnavailable { tool: "rg" })?;
                self.two_pass(term, root, |word| self.ripgrep_command(&tool, term, root, word))
                    .await
            }
            ExternalBackend::Grep => {
                let tool = self
                    .grep
                    .clone()
                    .ok_or(StrategyFailure::ToolUnavailable { tool: "grep" })?;
                self.two_pass(term, root, |word| self.grep_command(&tool, term, root, word))
                    .await
            }
            ExternalBackend::Scanner => {
                ScanSearch::with_excludes(self.extra_excludes.clone())
                    .run(term, root)
                    .await
            }
        }
    }

    /// Run the whole-word and substring passes and merge them: exact first,
    /// then partial candidates not already present by `file:line:text`.
    async fn two_pass<F>(
        &self,
        term: &str,
        root: &Path,
        make_command: F,
    ) -> Result<Vec<MatchRecord>, StrategyFailure>
    where
        F: Fn(bool) -> (Command, &'static str),
    {
        let (word_cmd, tool) = make_command(true);
        let has_column = tool == "rg";
        let exact = match capture(word_cmd, tool).await? {
            Some(stdout) => parse_line_tool_output(&stdout, root, term, true, has_column),
            None => Vec::new(),
        };

        let (substring_cmd, tool) = make_command(false);
        let candidates = match capture(substring_cmd, tool).await? {
            Some(stdout) => parse_line_tool_output(&stdout, root, term, false, has_column),
            None => Vec::new(),
        };

        let exact_keys: HashSet<(String, usize, String)> = exact
            .iter()
            .map(|r| (r.file_path.clone(), r.line, r.text.clone()))
            .collect();

        let mut records = exact;
        records.extend(
            candidates
                .into_iter()
                .filter(|r| !exact_keys.contains(&(r.file_path.clone(), r.line, r.text.clone()))),
        );
        Ok(records)
    }

    fn ripgrep_command(
        &self,
        tool: &Path,
        term: &str,
        root: &Path,
        whole_word: bool,
    ) -> (Command, &'static str) {
        let mut cmd = Command::new(tool);
        cmd.arg("--line-number")
            .arg("--column")
            .arg("--no-heading")
            .arg("--with-filename")
            .arg("--ignore-case")
            .arg("--fixed-strings")
            .arg("--no-messages");
        if whole_word {
            cmd.arg("--word-regexp");
        }
        for ext in SEARCHABLE_EXTENSIONS {
            cmd.arg("--glob").arg(format!("*.{ext}"));
        }
        for dir in EXCLUDED_DIRS {
            cmd.arg("--glob").arg(format!("!**/{dir}/**"));
        }
        for pattern in &self.extra_excludes {
            cmd.arg("--glob").arg(format!("!{pattern}"));
        }
        cmd.arg("--").arg(term).arg(".");
        cmd.current_dir(root);
        (cmd, "rg")
    }

    fn grep_command(
        &self,
        tool: &Path,
        term: &str,
        root: &Path,
        whole_word: bool,
    ) -> (Command, &'static str) {
        let mut cmd = Command::new(tool);
        cmd.arg("-r")
            .arg("-n")
            .arg("-i")
            .arg("-I")
            .arg("--fixed-strings");
        if whole_word {
            cmd.arg("-w");
        }
        for ext in SEARCHABLE_EXTENSIONS {
            cmd.arg(format!("--include=*.{ext}"));
        }
        for dir in EXCLUDED_DIRS {
            cmd.arg(format!("--exclude-dir={dir}"));
        }
        cmd.arg("--").arg(term).arg(".");
        cmd.current_dir(root);
        (cmd, "grep")
    }
}

#[async_trait]
impl SearchStrategy for ExternalToolSearch {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn run(&self, term: &str, root: &Path) -> Result<Vec<MatchRecord>, StrategyFailure> {
        let mut last_failure = StrategyFailure::ToolUnavailable { tool: "rg" };
        for backend in FALLBACK_ORDER {
            match self.attempt(*backend, term, root).await {
                Ok(records) => return Ok(records),
                Err(failure) => {
                    tracing::warn!("external backend {:?} unusable: {}", backend, failure);
                    last_failure = failure;
                }
            }
        }
        Err(last_failure)
    }
}

/// Spawn the command and collect stdout within the timeout.
///
/// `Ok(None)` means the timeout elapsed: the child is killed and the
/// invocation contributes an empty result. Exit status 1 (no matches) is not
/// an error for either tool.
async fn capture(mut cmd: Command, tool: &'static str) -> Result<Option<String>, StrategyFailure> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|source| StrategyFailure::Spawn { tool, source })?;

    let output = match tokio::time::timeout(EXTERNAL_TOOL_TIMEOUT, child.wait_with_output()).await {
        Ok(result) => result.map_err(StrategyFailure::Io)?,
        Err(_) => {
            tracing::warn!(
                "{} timed out after {:?}; discarding this invocation",
                tool,
                EXTERNAL_TOOL_TIMEOUT
            );
            return Ok(None);
        }
    };

    match output.status.code() {
        Some(0) | Some(1) => Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned())),
        status => Err(StrategyFailure::ToolFailed {
            tool,
            status: status.unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
    }
}

static WITH_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<path>.+?):(?P<line>\d+):(?P<col>\d+):(?P<text>.*)$").expect("static pattern"));
static WITHOUT_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<path>.+?):(?P<line>\d+):(?P<text>.*)$").expect("static pattern"));

/// Parse line-oriented tool output into match records. Pure: no process or
/// filesystem access.
///
/// `has_column` selects between `path:line:column:text` (ripgrep with
/// `--column`) and `path:line:text` (grep); for the latter the column is
/// recovered from the first case-insensitive occurrence of the term in the
/// line.
pub fn parse_line_tool_output(
    raw: &str,
    root: &Path,
    term: &str,
    exact: bool,
    has_column: bool,
) -> Vec<MatchRecord> {
    let term_lower = term.to_lowercase();
    let pattern: &Regex = if has_column {
        &WITH_COLUMN
    } else {
        &WITHOUT_COLUMN
    };
    let mut records = Vec::new();

    for line in raw.lines() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };
        let Ok(line_num) = caps["line"].parse::<usize>() else {
            continue;
        };
        let text = caps["text"].to_string();
        let column = if has_column {
            match caps["col"].parse::<usize>() {
                Ok(column) => column,
                Err(_) => continue,
            }
        } else {
            text.to_lowercase()
                .find(&term_lower)
                .map(|idx| idx + 1)
                .unwrap_or(1)
        };

        let rel_path = &caps["path"];
        let rel = rel_path.strip_prefix("./").unwrap_or(rel_path);
        let absolute = root.join(rel).display().to_string();
        records.push(MatchRecord::new(absolute, line_num, column, &text, exact));
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ripgrep_column_output() {
        let raw = "./src/app.ts:3:7:const foo = 1;\n./src/app.ts:9:1:foo();\n";
        let records = parse_line_tool_output(raw, Path::new("/repo"), "foo", true, true);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_path, "/repo/src/app.ts");
        assert_eq!(records[0].line, 3);
        assert_eq!(records[0].column, 7);
        assert_eq!(records[0].text, "const foo = 1;");
        assert!(records[0].is_exact_match);
    }

    #[test]
    fn parses_grep_output_and_recovers_the_column() {
        let raw = "./lib/util.py:12:value = Needle(1)\n";
        let records = parse_line_tool_output(raw, Path::new("/repo"), "needle", false, false);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 12);
        assert_eq!(records[0].column, 9);
        assert!(!records[0].is_exact_match);
    }

    #[test]
    fn malformed_lines_are_dropped() {
        let raw = "garbage without location\n./ok.rs:4:2:let x = 1;\n";
        let records = parse_line_tool_output(raw, Path::new("/r"), "x", true, true);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 4);
    }

    #[tokio::test]
    async fn chain_falls_back_to_the_scanner_when_no_tool_exists() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("a.js"), "const probe = 1;\n").expect("write");

        let runner = ExternalToolSearch::with_tools(None, None, Vec::new());
        let records = runner.run("probe", dir.path()).await.expect("fallback run");

        assert_eq!(records.len(), 1);
        assert!(records[0].is_exact_match);
    }

    #[tokio::test]
    async fn missing_binary_is_a_typed_failure_not_a_crash() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let runner = ExternalToolSearch::with_tools(
            Some(PathBuf::from("/nonexistent/rg-binary")),
            None,
            Vec::new(),
        );

        // The rg attempt fails to spawn, grep is unavailable, the scanner
        // still answers.
        let records = runner.run("anything", dir.path()).await.expect("fallback");
        assert!(records.is_empty());
    }

    #[test]
    fn fallback_order_is_fixed() {
        assert_eq!(
            FALLBACK_ORDER,
            &[
                ExternalBackend::Ripgrep,
                ExternalBackend::Grep,
                ExternalBackend::Scanner
            ]
        );
    }
}
