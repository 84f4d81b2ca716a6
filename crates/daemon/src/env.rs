// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

pub const NODE_NAME: &str = "NODE_NAME";
pub const CONFIG: &str = "PODCAP_CONFIG";
pub const STATE_DIR: &str = "PODCAP_STATE_DIR";
pub const CAPTURE_DIR: &str = "PODCAP_CAPTURE_DIR";
pub const ANNOTATION: &str = "PODCAP_ANNOTATION";
pub const GRACE_MS: &str = "PODCAP_GRACE_MS";
pub const TOOL: &str = "PODCAP_TOOL";
pub const RESOLVER: &str = "PODCAP_RESOLVER";
pub const PROC_ROOT: &str = "PODCAP_PROC_ROOT";
pub const ON_SPEC_CHANGE: &str = "PODCAP_ON_SPEC_CHANGE";
pub const LOG_FILE: &str = "PODCAP_LOG_FILE";

const DEFAULT_CONFIG_PATH: &str = "/etc/podcap/config.toml";

/// Read a variable, treating empty values as unset.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Config file location: PODCAP_CONFIG > /etc/podcap/config.toml
pub fn config_path() -> PathBuf {
    var(CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Fallback state directory: XDG_STATE_HOME/podcap > ~/.local/state/podcap
pub fn default_state_dir(lookup: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = lookup("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("podcap"));
    }
    lookup("HOME").map(|home| PathBuf::from(home).join(".local/state/podcap"))
}
