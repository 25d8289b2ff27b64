// SPDX-License-Identifier: MIT OR Apache-2.0

//! refgrep - Multi-strategy code reference search tool
//!
//! Runs symbol-aware, external-tool and in-process search backends behind
//! an HTTP service, a terminal loop and a one-shot CLI command.

mod cli;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, OutputFormat};
use refgrep::config::Config;
use refgrep::model::{SearchQuery, Strategy};
use refgrep::orchestrator::SearchOrchestrator;
use refgrep::{output, repl, server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("refgrep=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let format = cli.format;
    let compact = cli.compact;

    match cli.command {
        Commands::Serve { port, web_root } => {
            let start_port = config.merge_port(port);
            let orchestrator = SearchOrchestrator::with_excludes(config.exclude_patterns.clone());
            server::serve(orchestrator, start_port, web_root).await?;
        }
        Commands::Find {
            term,
            path,
            strategy,
        } => {
            let root = resolve_root(path.as_deref(), &config)?;
            let strategy = resolve_strategy(strategy, &config);
            let orchestrator = SearchOrchestrator::with_excludes(config.exclude_patterns.clone());
            let query = SearchQuery::new(term, &root, strategy);

            match orchestrator.run(&query).await {
                Ok(result) => match format {
                    Some(OutputFormat::Json) => output::print_json(&result, compact)?,
                    _ => output::print_result_text(&result),
                },
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Repl { path, strategy } => {
            let root = resolve_root(path.as_deref(), &config)?;
            let strategy = resolve_strategy(strategy, &config);
            repl::run(root, strategy, config.exclude_patterns.clone()).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "refgrep",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn resolve_root(path: Option<&str>, config: &Config) -> Result<std::path::PathBuf> {
    match path.or(config.root.as_deref()) {
        Some(p) => Ok(std::path::PathBuf::from(p)),
        None => Ok(std::env::current_dir()?),
    }
}

fn resolve_strategy(arg: Option<cli::StrategyArg>, config: &Config) -> Strategy {
    arg.map(Strategy::from)
        .or_else(|| config.strategy())
        .unwrap_or_default()
}
