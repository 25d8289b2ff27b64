// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for refgrep
//!
//! Loads configuration from .refgreprc.toml in the current directory or
//! ~/.config/refgrep/config.toml

use serde::Deserialize;
use std::path::PathBuf;

/// Configuration loaded from .refgreprc.toml or ~/.config/refgrep/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the server starts probing from
    pub port: Option<u16>,
    /// Default search root for serve/repl when none is given
    pub root: Option<String>,
    /// Default search strategy (symbol, external, scan, all)
    pub default_strategy: Option<String>,
    /// Extra directory/path fragments to exclude from every walk
    pub exclude_patterns: Vec<String>,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .refgreprc.toml in current directory
    /// 2. ~/.config/refgrep/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(&PathBuf::from(".refgreprc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("refgrep").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Parse the configured default strategy, if any.
    pub fn strategy(&self) -> Option<crate::model::Strategy> {
        let raw = self.default_strategy.as_deref()?;
        serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase())).ok()
    }

    /// Merge a CLI port with the configured one (CLI wins).
    pub fn merge_port(&self, cli_value: Option<u16>) -> u16 {
        cli_value
            .or(self.port)
            .unwrap_or(crate::bootstrap::DEFAULT_PORT)
    }
}
