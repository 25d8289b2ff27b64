// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the search engine.
//!
//! User input errors surface as 400 responses and are never retried; startup
//! failures are fatal; everything else is recovered near where it happens.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search term must not be empty")]
    EmptyTerm,

    #[error("directory does not exist: {0}")]
    DirectoryNotFound(String),

    #[error("no available port in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SearchError {
    /// True for errors caused by the caller's input, reported as 400.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SearchError::EmptyTerm | SearchError::DirectoryNotFound(_)
        )
    }
}
