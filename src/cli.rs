// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use refgrep::model::Strategy;

/// refgrep - Multi-strategy code reference search
///
/// Answers "where does identifier/text X occur in this codebase?" by
/// combining symbol-aware, external-tool and in-process scanning backends
/// into one deduplicated result set.
#[derive(Parser, Debug)]
#[command(name = "refgrep")]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Quickstart:\n  refgrep find handleRequest src/\n  refgrep serve --port 3000\n  refgrep repl"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Search strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StrategyArg {
    /// Symbol-aware AST search
    Symbol,
    /// External pattern tool with fallback chain
    External,
    /// Pure in-process scanner
    Scan,
    /// Everything in fixed order, scanner only when nothing was found
    #[default]
    All,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Symbol => Strategy::Symbol,
            StrategyArg::External => Strategy::External,
            StrategyArg::Scan => Strategy::Scan,
            StrategyArg::All => Strategy::All,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP search service
    Serve {
        /// Port to start probing from (upward, bounded)
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding the static web page
        #[arg(long, default_value = "web")]
        web_root: PathBuf,
    },

    /// Run one search and print the result
    Find {
        /// The term to search for
        term: String,

        /// Root directory (defaults to the current directory)
        path: Option<String>,

        /// Which backend(s) to run
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },

    /// Interactive terminal search loop
    Repl {
        /// Root directory (defaults to the current directory)
        path: Option<String>,

        /// Which backend(s) to run
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}
