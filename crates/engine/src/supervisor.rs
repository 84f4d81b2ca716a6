// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns capture processes and watches for their exit.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use podcap_adapters::{signal_process_group, CaptureLauncher, CaptureTarget, GroupSignal};
use podcap_core::{CaptureSpec, InstanceId, WorkloadId};
use tokio::process::Child;
use tokio::sync::watch;

use crate::artifacts::ArtifactPattern;
use crate::error::EngineError;
use crate::registry::{ExitSignal, Session, SessionRegistry};

/// Owns process creation and exit detection for capture sessions.
#[derive(Clone)]
pub struct SessionSupervisor<L> {
    registry: Arc<SessionRegistry>,
    launcher: L,
    capture_dir: PathBuf,
}

impl<L: CaptureLauncher> SessionSupervisor<L> {
    pub fn new(
        registry: Arc<SessionRegistry>,
        launcher: L,
        capture_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            launcher,
            capture_dir: capture_dir.into(),
        }
    }

    /// Spawn a capture for `key` and register it.
    ///
    /// The process becomes the leader of a new process group so termination
    /// can signal it together with anything it forks. On spawn failure
    /// nothing is registered.
    pub async fn start(
        &self,
        key: &WorkloadId,
        target: &CaptureTarget,
        spec: CaptureSpec,
    ) -> Result<Session, EngineError> {
        if self.registry.contains(key) {
            return Err(EngineError::AlreadyRunning(key.clone()));
        }

        let output = ArtifactPattern::for_workload(&self.capture_dir, key).base_path();
        let mut cmd = self.launcher.command(target, &spec, &output);
        cmd.process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(false);

        let spawned = cmd.spawn().and_then(|child| match child.id() {
            Some(pid) => Ok((child, pid)),
            None => Err(std::io::Error::other(
                "process exited before its pid was read",
            )),
        });
        let (mut child, pid) = match spawned {
            Ok(spawned) => spawned,
            Err(e) => {
                tracing::error!(
                    workload = %key,
                    max_files = spec.max_files.get(),
                    %target,
                    error = %e,
                    "capture spawn failed"
                );
                return Err(EngineError::SpawnFailure {
                    workload: key.clone(),
                    message: e.to_string(),
                });
            }
        };

        let (exit_tx, exit_rx) = watch::channel(false);
        let session = Session {
            key: key.clone(),
            spec,
            instance: InstanceId::generate(),
            pid,
            output,
            started_at: Instant::now(),
            terminated: false,
            exit: ExitSignal::new(exit_rx),
        };

        if let Err(occupied) = self.registry.insert(session.clone()) {
            // Lost a race with another start; this process must not outlive the call
            tracing::warn!(
                workload = %key,
                pid,
                existing = occupied.existing.short(8),
                "capture already registered, discarding duplicate process"
            );
            if let Err(e) = signal_process_group(pid, GroupSignal::Kill).await {
                tracing::debug!(workload = %key, pid, error = %e, "kill of duplicate failed");
                let _ = child.start_kill();
            }
            let _ = child.wait().await;
            return Err(EngineError::AlreadyRunning(key.clone()));
        }

        tokio::spawn(monitor(
            Arc::clone(&self.registry),
            key.clone(),
            session.instance.clone(),
            child,
            exit_tx,
        ));

        tracing::info!(
            workload = %key,
            pid,
            max_files = spec.max_files.get(),
            %target,
            output = %session.output.display(),
            instance = session.instance.short(8),
            "capture started"
        );
        Ok(session)
    }
}

/// Wait for the capture process to exit, deregister it, then notify.
///
/// Deregistration happens before the notification so that anyone woken by
/// the exit signal already observes the registry without this session.
async fn monitor(
    registry: Arc<SessionRegistry>,
    key: WorkloadId,
    instance: InstanceId,
    mut child: Child,
    exit_tx: watch::Sender<bool>,
) {
    let status = child.wait().await;
    let removed = registry.remove_instance(&key, &instance);

    match (&status, &removed) {
        (Ok(status), Some(session)) if !session.terminated => {
            tracing::warn!(
                workload = %key,
                pid = session.pid,
                %status,
                uptime_ms = session.started_at.elapsed().as_millis() as u64,
                "capture exited on its own"
            );
        }
        (Ok(status), _) => {
            tracing::debug!(
                workload = %key,
                instance = instance.short(8),
                %status,
                "capture exited"
            );
        }
        (Err(e), _) => {
            tracing::error!(
                workload = %key,
                instance = instance.short(8),
                error = %e,
                "failed to wait for capture"
            );
        }
    }

    let _ = exit_tx.send(true);
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
