// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful-then-forced stop of a capture process group.

use std::sync::Arc;
use std::time::Duration;

use podcap_adapters::{signal_process_group, GroupSignal};
use podcap_core::WorkloadId;
use serde::Serialize;

use crate::registry::{SessionRegistry, TerminationClaim};

/// How long a capture gets to flush and exit after SIGTERM.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// How a stop request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// No session was registered.
    NotRunning,
    /// Exited within the grace period after SIGTERM.
    Graceful,
    /// Needed SIGKILL.
    Forced,
    /// Another caller was already stopping it; returned once it exited.
    Joined,
}

impl StopOutcome {
    /// True when this call owned the stop and the process is gone.
    pub fn stopped_here(self) -> bool {
        matches!(self, StopOutcome::Graceful | StopOutcome::Forced)
    }
}

#[derive(Clone)]
pub struct TerminationProtocol {
    registry: Arc<SessionRegistry>,
    grace_period: Duration,
}

impl TerminationProtocol {
    pub fn new(registry: Arc<SessionRegistry>, grace_period: Duration) -> Self {
        Self {
            registry,
            grace_period,
        }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Stop the session for `key` and wait until its process is reaped.
    ///
    /// Safe to call repeatedly and concurrently: one caller owns the
    /// signalling, later callers wait for the same exit. When this returns
    /// the session is no longer registered.
    pub async fn stop(&self, key: &WorkloadId) -> StopOutcome {
        let session = match self.registry.begin_termination(key) {
            TerminationClaim::NotRunning => return StopOutcome::NotRunning,
            TerminationClaim::InProgress(session) => {
                session.exit_signal().wait().await;
                return StopOutcome::Joined;
            }
            TerminationClaim::Claimed(session) => session,
        };

        let exit = session.exit_signal();
        if let Err(e) = signal_process_group(session.pid, GroupSignal::Terminate).await {
            // Usually the group is already gone; the exit signal settles it
            tracing::debug!(workload = %key, pid = session.pid, error = %e, "SIGTERM failed");
        }

        if tokio::time::timeout(self.grace_period, exit.clone().wait())
            .await
            .is_ok()
        {
            // Helpers the leader forked can outlive it and ignore SIGTERM
            if signal_process_group(session.pid, GroupSignal::Kill).await.is_ok() {
                tracing::debug!(
                    workload = %key,
                    pid = session.pid,
                    "killed leftover group members"
                );
            }
            tracing::info!(
                workload = %key,
                pid = session.pid,
                uptime_ms = session.started_at.elapsed().as_millis() as u64,
                "capture stopped"
            );
            return StopOutcome::Graceful;
        }

        tracing::warn!(
            workload = %key,
            pid = session.pid,
            grace_ms = self.grace_period.as_millis() as u64,
            "capture ignored SIGTERM, sending SIGKILL"
        );
        if let Err(e) = signal_process_group(session.pid, GroupSignal::Kill).await {
            tracing::error!(workload = %key, pid = session.pid, error = %e, "SIGKILL failed");
        }
        exit.wait().await;
        tracing::info!(workload = %key, pid = session.pid, "capture killed");
        StopOutcome::Forced
    }
}

#[cfg(test)]
#[path = "termination_tests.rs"]
mod tests;
