// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search strategies: interchangeable backends producing match records.
//!
//! The orchestrator holds these behind one capability and never lets a single
//! backend failure abort a query.

pub mod external;
pub mod scanner;
pub mod symbol;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::model::MatchRecord;

/// Why a strategy (or one attempt inside a strategy) could not produce
/// results. Typed so fallback decisions are inspectable instead of buried in
/// catch-all error handling.
#[derive(Debug, Error)]
pub enum StrategyFailure {
    #[error("{tool} is not available on this system")]
    ToolUnavailable { tool: &'static str },

    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: i32,
        stderr: String,
    },

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One interchangeable search backend: `(term, root) -> match records`.
///
/// Within a runner's output, exact matches precede partial matches; inside
/// each class the order follows traversal/emission order.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Stable name used in logs and fallback reports.
    fn name(&self) -> &'static str;

    async fn run(&self, term: &str, root: &Path) -> Result<Vec<MatchRecord>, StrategyFailure>;
}
