// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive terminal search loop.
//!
//! Prompts for a search term, runs the same engine the HTTP surface uses
//! against a fixed root directory, and prints grouped results with timing.
//! An error is printed and the prompt returns; `exit` (or EOF) leaves.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::model::{SearchQuery, Strategy};
use crate::orchestrator::SearchOrchestrator;
use crate::output;

pub async fn run(root: PathBuf, strategy: Strategy, extra_excludes: Vec<String>) -> Result<()> {
    let orchestrator = SearchOrchestrator::with_excludes(extra_excludes);
    let use_color = output::use_colors();

    println!("refgrep interactive search");
    println!("root: {}", root.display());
    println!("strategy: {strategy}");
    println!("Type a search term, or 'exit' to quit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if use_color {
            write!(stdout, "{} ", "search>".bold())?;
        } else {
            write!(stdout, "search> ")?;
        }
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let term = line.trim();
        if term.is_empty() {
            continue;
        }
        if term == "exit" {
            break;
        }

        let query = SearchQuery::new(term, &root, strategy);
        match orchestrator.run(&query).await {
            Ok(result) => output::print_result_text(&result),
            Err(err) => {
                if use_color {
                    println!("{} {}", "✗".red(), err);
                } else {
                    println!("error: {err}");
                }
            }
        }
    }

    Ok(())
}
