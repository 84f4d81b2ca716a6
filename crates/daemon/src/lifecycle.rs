// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle: startup, event dispatch, drain and shutdown.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use podcap_adapters::{
    CaptureLauncher, HostNetworkResolver, ProcCgroupResolver, ResolverStrategy, TargetResolver,
    TcpdumpLauncher, TracedResolver,
};
use podcap_core::WorkloadEvent;
use podcap_engine::{DrainReport, Reconciler};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, ResolverKind};

/// Reconciler with the production adapters (resolver wrapped with tracing)
pub type DaemonReconciler = Reconciler<TracedResolver<ResolverStrategy>, TcpdumpLauncher>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: agent already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to create capture directory {0}: {1}")]
    CaptureDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, #[source] std::io::Error),

    #[error("Failed to open log file {0}")]
    LogFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Work forwarded from the listener to the engine loop.
#[derive(Debug)]
pub enum EngineInput {
    Event(WorkloadEvent),
    Sync(Vec<podcap_core::Workload>),
}

/// Running agent state.
pub struct Daemon {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub reconciler: Arc<DaemonReconciler>,
    pub start_time: Instant,
}

pub struct StartupResult {
    pub daemon: Daemon,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

/// Acquire the lock, prepare directories, build the engine and bind the socket.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Files belong to the running agent when the lock is held elsewhere
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Open without truncating so a running agent's pid survives a failed attempt
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    std::fs::create_dir_all(&config.capture_dir)
        .map_err(|e| LifecycleError::CaptureDir(config.capture_dir.clone(), e))?;

    let resolver = TracedResolver::new(match config.resolver {
        ResolverKind::Host => ResolverStrategy::Host(HostNetworkResolver),
        ResolverKind::ProcCgroup => {
            ResolverStrategy::ProcCgroup(ProcCgroupResolver::new(config.proc_root.clone()))
        }
    });
    let launcher = TcpdumpLauncher {
        tool: config.tool.clone(),
        nsenter: config.nsenter.clone(),
        interface: config.interface.clone(),
        rotate_size_mb: config.rotate_size_mb,
    };
    let reconciler = Arc::new(Reconciler::new(
        config.reconciler_config(),
        resolver,
        launcher,
    ));

    // Bind last, once everything else is in place
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        node = %config.node_name,
        capture_dir = %config.capture_dir.display(),
        resolver = ?config.resolver,
        grace_ms = config.grace_period.as_millis() as u64,
        "agent started"
    );

    Ok(StartupResult {
        daemon: Daemon {
            config: config.clone(),
            lock_file,
            reconciler,
            start_time: Instant::now(),
        },
        listener,
    })
}

/// Hand one listener input to the reconciler.
///
/// Desired state is recorded before this returns; reconciles run on their
/// own tasks.
pub fn dispatch<R, L>(
    reconciler: &Arc<Reconciler<R, L>>,
    input: EngineInput,
) -> Vec<JoinHandle<()>>
where
    R: TargetResolver,
    L: CaptureLauncher,
{
    match input {
        EngineInput::Event(event) => vec![reconciler.dispatch(&event)],
        EngineInput::Sync(workloads) => {
            let keys = reconciler.sync(workloads);
            info!(keys = keys.len(), "sync received");
            keys.into_iter()
                .map(|key| reconciler.spawn_reconcile(key))
                .collect()
        }
    }
}

impl Daemon {
    /// Drain every capture, then remove the socket and lock file.
    pub async fn shutdown(self) -> DrainReport {
        info!("Shutting down agent...");
        let report = self.reconciler.shutdown().await;

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!(
            stopped = report.stopped(),
            forced = report.forced,
            uptime_ms = self.start_time.elapsed().as_millis() as u64,
            "Agent shutdown complete"
        );
        report
    }
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
