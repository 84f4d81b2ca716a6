// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution and process-group signalling helpers

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Run a subprocess command with a timeout.
///
/// The child is killed if the timeout elapses (tokio `Child` drop), and the
/// expiry is reported as a descriptive error message.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}ms",
            description,
            timeout.as_millis()
        )),
    }
}

/// Signals the termination protocol sends to a capture's process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSignal {
    /// SIGTERM: the capture tool flushes and exits.
    Terminate,
    /// SIGKILL: immediate, may lose the in-progress rotation file.
    Kill,
}

impl GroupSignal {
    pub fn name(self) -> &'static str {
        match self {
            GroupSignal::Terminate => "SIGTERM",
            GroupSignal::Kill => "SIGKILL",
        }
    }

    fn flag(self) -> &'static str {
        match self {
            GroupSignal::Terminate => "-TERM",
            GroupSignal::Kill => "-KILL",
        }
    }
}

/// Send `signal` to every process in the group led by `pgid`.
///
/// Uses the system `kill` utility with a negative pid so the capture tool and
/// any helpers it forked are signalled together.
pub async fn signal_process_group(pgid: u32, signal: GroupSignal) -> Result<(), String> {
    // -0 and -1 address our own group and every process we may signal
    if pgid <= 1 {
        return Err(format!("refusing to signal process group {}", pgid));
    }

    let mut cmd = Command::new("kill");
    cmd.arg(signal.flag())
        .arg("--")
        .arg(format!("-{}", pgid))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = run_with_timeout(cmd, crate::env::signal_timeout(), "kill").await?;
    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "kill {} -{} failed: {}",
            signal.flag(),
            pgid,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
