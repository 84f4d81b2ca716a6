// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between the agent and its clients.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use podcap_core::{Workload, WorkloadId};
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{recv, send, ProtocolError, DEFAULT_TIMEOUT, MAX_FRAME_LEN, PROTOCOL_VERSION};

/// Request from a client to the agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// A workload was added or changed
    Apply { workload: Workload },

    /// A workload was removed
    Delete { id: WorkloadId },

    /// Full listing of workloads; anything known but not listed is removed
    Sync { workloads: Vec<Workload> },

    /// Agent status and running captures
    Status,

    /// Drain all captures and exit
    Shutdown,
}

/// Response from the agent to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Reply to Ping
    Pong,

    /// Reply to Hello
    Hello { version: String },

    Status {
        node: String,
        uptime_ms: u64,
        sessions: Vec<SessionStatus>,
    },

    /// Shutdown accepted; the agent exits once captures are drained
    ShuttingDown,

    Error { message: String },
}

/// One running capture, as reported by `Status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStatus {
    pub workload: WorkloadId,
    pub pid: u32,
    pub max_files: u32,
    pub instance: String,
    pub uptime_ms: u64,
    /// A stop is in progress
    #[serde(default)]
    pub terminating: bool,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
