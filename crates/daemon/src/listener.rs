// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The listener accepts connections on a spawned task and answers each
//! request without blocking the engine loop. Workload events are forwarded
//! to the engine loop over a channel.

use std::sync::Arc;
use std::time::Instant;

use podcap_core::WorkloadEvent;
use podcap_engine::SessionRegistry;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, warn};

use crate::lifecycle::EngineInput;
use crate::protocol::{self, Request, Response, SessionStatus, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// State shared by every connection handler.
pub struct ListenCtx {
    pub inputs: mpsc::Sender<EngineInput>,
    pub registry: Arc<SessionRegistry>,
    pub node_name: String,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: ListenCtx) -> Self {
        Self {
            socket,
            ctx: Arc::new(ctx),
        }
    }

    /// Accept connections forever, one task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(protocol::ProtocolError::Closed) => {
                                    debug!("Client disconnected")
                                }
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request: Request = match protocol::recv(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(request) => request,
        Err(protocol::ProtocolError::Json(e)) => {
            warn!(error = %e, "rejected malformed request");
            let response = Response::Error {
                message: format!("invalid request: {}", e),
            };
            protocol::send(&mut writer, &response, DEFAULT_TIMEOUT).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    match &request {
        Request::Ping | Request::Status | Request::Hello { .. } => {
            debug!(request = ?request, "received request")
        }
        Request::Sync { workloads } => info!(workloads = workloads.len(), "received sync"),
        _ => info!(request = ?request, "received request"),
    }

    let response = handle_request(request, ctx).await;
    debug!("Sending response: {:?}", response);
    protocol::send(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

pub(crate) async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, agent = PROTOCOL_VERSION, "client version differs");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Apply { workload } => {
            forward(ctx, EngineInput::Event(WorkloadEvent::Applied { workload })).await
        }

        Request::Delete { id } => {
            forward(ctx, EngineInput::Event(WorkloadEvent::Deleted { id })).await
        }

        Request::Sync { workloads } => forward(ctx, EngineInput::Sync(workloads)).await,

        Request::Status => Response::Status {
            node: ctx.node_name.clone(),
            uptime_ms: ctx.start_time.elapsed().as_millis() as u64,
            sessions: ctx
                .registry
                .snapshot()
                .into_iter()
                .map(|s| SessionStatus {
                    workload: s.key,
                    pid: s.pid,
                    max_files: s.spec.max_files.get(),
                    instance: s.instance.short(8).to_string(),
                    uptime_ms: s.started_at.elapsed().as_millis() as u64,
                    terminating: s.terminated,
                })
                .collect(),
        },

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

async fn forward(ctx: &ListenCtx, input: EngineInput) -> Response {
    match ctx.inputs.send(input).await {
        Ok(()) => Response::Ok,
        Err(_) => Response::Error {
            message: "agent is shutting down".to_string(),
        },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
