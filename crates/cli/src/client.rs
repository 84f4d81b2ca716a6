// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent client for CLI commands

use std::path::PathBuf;
use std::time::Duration;

use podcap_core::{Workload, WorkloadId};
use podcap_daemon::protocol::{self, ProtocolError};
use podcap_daemon::{Request, Response, SessionStatus, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::net::UnixStream;

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    crate::env::timeout_ipc_ms().unwrap_or(DEFAULT_TIMEOUT)
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("podcapd is not running (no socket at {0})")]
    DaemonNotRunning(PathBuf),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from agent")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

/// Snapshot returned by [`DaemonClient::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStatus {
    pub node: String,
    pub uptime_ms: u64,
    pub sessions: Vec<SessionStatus>,
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Connect to the running agent. The agent is never started implicitly.
    pub fn connect() -> Result<Self, ClientError> {
        Self::at(crate::env::socket_path()?)
    }

    /// Client for an explicit socket path.
    pub fn at(socket_path: PathBuf) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path));
        }
        Ok(Self {
            socket_path,
            timeout: timeout_ipc(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        protocol::send(&mut writer, request, self.timeout).await?;
        Ok(protocol::recv(&mut reader, self.timeout).await?)
    }

    /// Helper for requests that expect Ok or Error responses
    async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Agent version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn apply(&self, workload: Workload) -> Result<(), ClientError> {
        self.send_simple(&Request::Apply { workload }).await
    }

    pub async fn delete(&self, id: WorkloadId) -> Result<(), ClientError> {
        self.send_simple(&Request::Delete { id }).await
    }

    pub async fn sync(&self, workloads: Vec<Workload>) -> Result<(), ClientError> {
        self.send_simple(&Request::Sync { workloads }).await
    }

    pub async fn status(&self) -> Result<AgentStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                node,
                uptime_ms,
                sessions,
            } => Ok(AgentStatus {
                node,
                uptime_ms,
                sessions,
            }),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Ask the agent to drain its captures and exit
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
