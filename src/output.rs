// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output helpers shared by the find command and the terminal loop.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::IsTerminal;

use crate::model::SearchResult;

/// Print a value as JSON to stdout (pretty by default, compact on request).
pub fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// True when stdout is an interactive terminal.
pub fn use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Print a search result grouped per file, with a stats line on stderr.
pub fn print_result_text(result: &SearchResult) {
    let use_color = use_colors();

    if result.references.is_empty() {
        if use_color {
            println!(
                "{} No references found for: {}",
                "✗".red(),
                result.metadata.search_term.yellow()
            );
        } else {
            println!(
                "No references found for: {}",
                result.metadata.search_term
            );
        }
        return;
    }

    if use_color {
        println!(
            "\n{} Found {} references for: {} ({} exact, {} partial)\n",
            "✓".green(),
            result.summary.total_matches.to_string().cyan(),
            result.metadata.search_term.yellow(),
            result.summary.exact_matches,
            result.summary.partial_matches
        );
    } else {
        println!(
            "\nFound {} references for: {} ({} exact, {} partial)\n",
            result.summary.total_matches,
            result.metadata.search_term,
            result.summary.exact_matches,
            result.summary.partial_matches
        );
    }

    for (file_type, group) in &result.grouped_by_file_type {
        let label = if file_type.is_empty() {
            "(no extension)".to_string()
        } else {
            format!(".{file_type}")
        };
        if use_color {
            println!("{} ({} matches)", label.bold(), group.len());
        } else {
            println!("{label} ({} matches)", group.len());
        }

        let mut last_path: Option<&str> = None;
        for reference in group {
            if last_path != Some(reference.relative_path.as_str()) {
                if use_color {
                    println!("  {}", reference.relative_path.cyan());
                } else {
                    println!("  {}", reference.relative_path);
                }
                last_path = Some(reference.relative_path.as_str());
            }
            let marker = if reference.record.is_exact_match {
                "="
            } else {
                "~"
            };
            if use_color {
                println!(
                    "    {} {}:{} {}",
                    marker,
                    reference.record.line.to_string().yellow(),
                    reference.record.column.to_string().dimmed(),
                    reference.record.text.dimmed()
                );
            } else {
                println!(
                    "    {} {}:{} {}",
                    marker, reference.record.line, reference.record.column, reference.record.text
                );
            }
        }
        println!();
    }

    eprintln!(
        "{} files | {} matches | {:.2}ms",
        result.summary.total_files, result.summary.total_matches, result.metadata.elapsed_ms
    );
}
