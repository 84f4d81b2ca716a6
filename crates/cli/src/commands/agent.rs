// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `podcap ping|version|status|shutdown` - Agent queries and control

use anyhow::Result;
use podcap_core::WorkloadId;

use crate::client::{AgentStatus, ClientError, DaemonClient};
use crate::exit_error::ExitError;
use crate::output::{format_uptime, session_table, OutputFormat};

/// Exit code when the agent cannot be reached
pub const EXIT_NOT_RUNNING: i32 = 2;

/// Exit code when a queried workload has no capture
pub const EXIT_NOT_CAPTURING: i32 = 3;

pub async fn ping(format: OutputFormat) -> Result<()> {
    let reachable = match DaemonClient::connect() {
        Ok(client) => client.ping().await,
        Err(e) => Err(e),
    };
    match reachable {
        Ok(()) => {
            match format {
                OutputFormat::Text => println!("podcapd is running"),
                OutputFormat::Json => println!("{}", serde_json::json!({ "running": true })),
            }
            Ok(())
        }
        Err(ClientError::DaemonNotRunning(_)) | Err(ClientError::Io(_)) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "running": false }));
            }
            Err(ExitError::new(EXIT_NOT_RUNNING, "podcapd is not running").into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn version(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let agent = client.hello().await?;
    let cli = env!("CARGO_PKG_VERSION");
    match format {
        OutputFormat::Text => {
            println!("podcap {}", cli);
            println!("podcapd {}", agent);
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({ "cli": cli, "agent": agent });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}

pub async fn status(
    workload: Option<WorkloadId>,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    let mut status = client.status().await?;
    if let Some(id) = &workload {
        status.sessions.retain(|s| &s.workload == id);
    }

    match format {
        OutputFormat::Text => print!("{}", render_status(&status)),
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "node": status.node,
                "uptime_ms": status.uptime_ms,
                "sessions": status.sessions,
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }

    match workload {
        Some(id) if status.sessions.is_empty() => {
            let message = format!("no capture running for {id}");
            Err(ExitError::new(EXIT_NOT_CAPTURING, message).into())
        }
        _ => Ok(()),
    }
}

pub(crate) fn render_status(status: &AgentStatus) -> String {
    let mut out = format!(
        "node: {}  uptime: {}  captures: {}\n",
        status.node,
        format_uptime(status.uptime_ms),
        status.sessions.len()
    );
    if !status.sessions.is_empty() {
        out.push('\n');
        out.push_str(&session_table(&status.sessions));
    }
    out
}

pub async fn shutdown(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.shutdown().await?;
    match format {
        OutputFormat::Text => println!("podcapd is draining captures and shutting down"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "shutting_down": true })),
    }
    Ok(())
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
