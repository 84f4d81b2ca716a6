// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_duration_ms(name: &str) -> Option<Duration> {
    var(name)
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Resolve state directory: PODCAP_STATE_DIR > XDG_STATE_HOME/podcap > ~/.local/state/podcap
pub fn state_dir() -> Result<PathBuf, ClientError> {
    if let Some(dir) = var("PODCAP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("podcap"));
    }
    let home = var("HOME").ok_or(ClientError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/podcap"))
}

/// Agent socket: PODCAP_SOCKET > <state dir>/podcapd.sock
pub fn socket_path() -> Result<PathBuf, ClientError> {
    if let Some(path) = var("PODCAP_SOCKET") {
        return Ok(PathBuf::from(path));
    }
    Ok(state_dir()?.join("podcapd.sock"))
}

pub fn timeout_ipc_ms() -> Option<Duration> {
    parse_duration_ms("PODCAP_TIMEOUT_IPC_MS")
}
