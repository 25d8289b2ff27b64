// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service bootstrap: tool probing and available-port discovery.

use std::net::TcpListener;
use std::path::{Path, PathBuf};

use crate::errors::SearchError;

/// Port the server starts probing from when none is configured.
pub const DEFAULT_PORT: u16 = 3000;

/// How many ports above the starting one are probed before giving up.
pub const PORT_SCAN_SPAN: u16 = 1000;

/// Installation directories checked before falling back to PATH lookup.
const WELL_KNOWN_TOOL_DIRS: &[&str] = &[
    "/usr/local/bin",
    "/usr/bin",
    "/opt/homebrew/bin",
    "/home/linuxbrew/.linuxbrew/bin",
];

/// Locate an executable at the well-known install locations, then on PATH.
pub fn locate_tool(name: &str) -> Option<PathBuf> {
    for dir in WELL_KNOWN_TOOL_DIRS {
        let candidate = Path::new(dir).join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    which::which(name).ok()
}

/// Whether the fast external pattern-matching tool is installed. Only feeds
/// the startup log line; the external runner probes independently.
pub fn pattern_tool_available() -> bool {
    locate_tool("rg").is_some()
}

/// Find a free port by binding transient listeners upward from `start`.
///
/// The listener is released immediately; the caller binds the real server
/// socket afterwards and must handle the small race window itself.
pub fn find_available_port(start: u16) -> Result<u16, SearchError> {
    find_available_port_in(start, start.saturating_add(PORT_SCAN_SPAN))
}

fn find_available_port_in(start: u16, end: u16) -> Result<u16, SearchError> {
    for port in start..=end {
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                drop(listener);
                if port != start {
                    tracing::info!("port {start} busy, using {port}");
                }
                return Ok(port);
            }
            Err(_) => continue,
        }
    }
    Err(SearchError::NoAvailablePort { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_skips_a_taken_port() {
        // Hold a port open, then ask for one starting there.
        let held = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
        let taken = held.local_addr().expect("addr").port();

        let found = find_available_port(taken).expect("discover");
        assert!(found > taken);
        assert!(found <= taken.saturating_add(PORT_SCAN_SPAN));
    }

    #[test]
    fn discovered_port_is_bindable() {
        let port = find_available_port(DEFAULT_PORT).expect("discover");
        let listener = TcpListener::bind(("127.0.0.1", port));
        assert!(listener.is_ok(), "reported port must be bindable");
    }

    #[test]
    fn exhausted_range_reports_the_bounds() {
        let held = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
        let taken = held.local_addr().expect("addr").port();

        let err = find_available_port_in(taken, taken).expect_err("exhausted");
        match err {
            SearchError::NoAvailablePort { start, end } => {
                assert_eq!(start, taken);
                assert_eq!(end, taken);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
