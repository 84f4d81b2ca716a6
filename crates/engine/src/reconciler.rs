// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives capture sessions toward the desired state of each workload.
//!
//! Events are recorded into a desired-state table synchronously, then
//! reconciled per key under a per-key lock. A reconcile always reads the
//! newest recorded state for its key, so tasks that run out of order can
//! never apply an older snapshot last.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use podcap_adapters::{CaptureLauncher, TargetResolver};
use podcap_core::{
    extract_spec, CaptureSpec, Workload, WorkloadEvent, WorkloadId, DEFAULT_ANNOTATION_KEY,
};
use serde::{Deserialize, Serialize};
use tokio::task::{JoinHandle, JoinSet};

use crate::artifacts::{ArtifactCleaner, CleanupReport};
use crate::error::EngineError;
use crate::keyed::KeyedLocks;
use crate::registry::SessionRegistry;
use crate::supervisor::SessionSupervisor;
use crate::termination::{StopOutcome, TerminationProtocol, DEFAULT_GRACE_PERIOD};

/// What to do when a running capture's annotation changes value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecChangePolicy {
    /// Stop and clean the running capture, then start one with the new spec.
    #[default]
    Restart,
    /// Leave the running capture untouched.
    Keep,
}

impl std::str::FromStr for SpecChangePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restart" => Ok(SpecChangePolicy::Restart),
            "keep" => Ok(SpecChangePolicy::Keep),
            other => Err(format!(
                "unknown spec change policy '{}' (expected restart or keep)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Workloads scheduled elsewhere are treated as absent.
    pub node_name: String,
    pub annotation_key: String,
    pub capture_dir: PathBuf,
    pub grace_period: Duration,
    pub on_spec_change: SpecChangePolicy,
}

impl ReconcilerConfig {
    pub fn new(node_name: impl Into<String>, capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            node_name: node_name.into(),
            annotation_key: DEFAULT_ANNOTATION_KEY.to_string(),
            capture_dir: capture_dir.into(),
            grace_period: DEFAULT_GRACE_PERIOD,
            on_spec_change: SpecChangePolicy::default(),
        }
    }
}

/// What one reconcile did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    Noop,
    Started,
    Stopped,
    Restarted,
    /// Spec changed but the running capture was kept.
    Kept,
    /// The agent is shutting down.
    Skipped,
}

/// Totals from a shutdown drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub graceful: usize,
    pub forced: usize,
    pub cleanup: CleanupReport,
}

impl DrainReport {
    pub fn stopped(&self) -> usize {
        self.graceful + self.forced
    }
}

pub struct Reconciler<R, L> {
    config: ReconcilerConfig,
    resolver: R,
    registry: Arc<SessionRegistry>,
    supervisor: SessionSupervisor<L>,
    termination: TerminationProtocol,
    cleaner: ArtifactCleaner,
    desired: Mutex<HashMap<WorkloadId, Workload>>,
    locks: KeyedLocks,
    /// Held shared by every reconcile; the drain takes it exclusively to
    /// wait out reconciles that were already running.
    in_flight: tokio::sync::RwLock<()>,
    shutting_down: AtomicBool,
}

impl<R: TargetResolver, L: CaptureLauncher> Reconciler<R, L> {
    pub fn new(config: ReconcilerConfig, resolver: R, launcher: L) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        Self {
            supervisor: SessionSupervisor::new(
                Arc::clone(&registry),
                launcher,
                &config.capture_dir,
            ),
            termination: TerminationProtocol::new(Arc::clone(&registry), config.grace_period),
            cleaner: ArtifactCleaner::new(&config.capture_dir),
            registry,
            resolver,
            config,
            desired: Mutex::new(HashMap::new()),
            locks: KeyedLocks::new(),
            in_flight: tokio::sync::RwLock::new(()),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Record the desired state carried by `event` and return its key.
    ///
    /// Workloads scheduled on another node are recorded as absent.
    pub fn observe(&self, event: &WorkloadEvent) -> WorkloadId {
        let mut desired = self.desired.lock();
        match event {
            WorkloadEvent::Applied { workload }
                if workload.is_scheduled_on(&self.config.node_name) =>
            {
                desired.insert(workload.id.clone(), workload.clone());
            }
            _ => {
                desired.remove(event.id());
            }
        }
        event.id().clone()
    }

    /// Record a full listing of this node's workloads.
    ///
    /// Every key that is listed, remembered, or running is returned for
    /// reconciliation; those missing from the listing become absent.
    pub fn sync(&self, workloads: Vec<Workload>) -> Vec<WorkloadId> {
        let mut keys: BTreeSet<WorkloadId> =
            self.registry.snapshot().into_iter().map(|s| s.key).collect();
        let mut desired = self.desired.lock();
        keys.extend(desired.keys().cloned());
        desired.clear();
        for workload in workloads {
            keys.insert(workload.id.clone());
            if workload.is_scheduled_on(&self.config.node_name) {
                desired.insert(workload.id.clone(), workload);
            }
        }
        keys.into_iter().collect()
    }

    /// Observe `event` and reconcile its key inline.
    pub async fn handle(&self, event: &WorkloadEvent) -> Result<ReconcileAction, EngineError> {
        let key = self.observe(event);
        self.reconcile(&key).await
    }

    /// Observe `event` now and reconcile its key on a separate task.
    pub fn dispatch(self: &Arc<Self>, event: &WorkloadEvent) -> JoinHandle<()> {
        let key = self.observe(event);
        self.spawn_reconcile(key)
    }

    pub fn spawn_reconcile(self: &Arc<Self>, key: WorkloadId) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.reconcile(&key).await {
                Ok(action) => tracing::debug!(workload = %key, ?action, "reconciled"),
                Err(e) => tracing::debug!(workload = %key, error = %e, "reconcile failed"),
            }
        })
    }

    /// Bring the session for `key` in line with its latest desired state.
    pub async fn reconcile(&self, key: &WorkloadId) -> Result<ReconcileAction, EngineError> {
        if self.is_shutting_down() {
            return Ok(ReconcileAction::Skipped);
        }
        let _in_flight = self.in_flight.read().await;
        let _key_lock = self.locks.lock(key).await;
        if self.is_shutting_down() {
            return Ok(ReconcileAction::Skipped);
        }

        let workload = self.desired.lock().get(key).cloned();
        let wanted = workload.as_ref().and_then(|w| self.desired_spec(w));
        let current = self.registry.get(key);

        match (wanted, current) {
            (None, None) => Ok(ReconcileAction::Noop),
            (None, Some(_)) => {
                let (outcome, _) = self.stop_and_clean(key).await;
                Ok(match outcome {
                    StopOutcome::NotRunning => ReconcileAction::Noop,
                    _ => ReconcileAction::Stopped,
                })
            }
            (Some((workload, spec)), None) => {
                self.start(&workload, spec).await?;
                Ok(ReconcileAction::Started)
            }
            (Some((_, spec)), Some(session)) if session.spec == spec => {
                Ok(ReconcileAction::Noop)
            }
            (Some((workload, spec)), Some(session)) => match self.config.on_spec_change {
                SpecChangePolicy::Keep => {
                    tracing::info!(
                        workload = %key,
                        running = session.spec.max_files.get(),
                        wanted = spec.max_files.get(),
                        "capture spec changed, keeping running capture"
                    );
                    Ok(ReconcileAction::Kept)
                }
                SpecChangePolicy::Restart => {
                    tracing::info!(
                        workload = %key,
                        running = session.spec.max_files.get(),
                        wanted = spec.max_files.get(),
                        "capture spec changed, restarting"
                    );
                    self.stop_and_clean(key).await;
                    if self.is_shutting_down() {
                        return Ok(ReconcileAction::Stopped);
                    }
                    self.start(&workload, spec).await?;
                    Ok(ReconcileAction::Restarted)
                }
            },
        }
    }

    /// Stop every session and clean up after each, concurrently.
    ///
    /// Reconciles started afterwards are skipped; ones already running are
    /// waited for, and anything they started is drained as well.
    pub async fn shutdown(&self) -> DrainReport {
        self.shutting_down.store(true, Ordering::SeqCst);
        let started = Instant::now();
        let mut report = DrainReport::default();
        tracing::info!(sessions = self.registry.len(), "draining capture sessions");

        loop {
            let mut stops = JoinSet::new();
            for session in self.registry.snapshot() {
                let termination = self.termination.clone();
                let cleaner = self.cleaner.clone();
                stops.spawn(async move {
                    let outcome = termination.stop(&session.key).await;
                    let cleanup = if outcome.stopped_here() {
                        cleaner.clean(&session.key)
                    } else {
                        CleanupReport::default()
                    };
                    (outcome, cleanup)
                });
            }
            while let Some(joined) = stops.join_next().await {
                match joined {
                    Ok((outcome, cleanup)) => {
                        match outcome {
                            StopOutcome::Graceful => report.graceful += 1,
                            StopOutcome::Forced => report.forced += 1,
                            StopOutcome::NotRunning | StopOutcome::Joined => {}
                        }
                        report.cleanup += cleanup;
                    }
                    Err(e) => tracing::error!(error = %e, "drain task failed"),
                }
            }

            drop(self.in_flight.write().await);
            if self.registry.is_empty() {
                break;
            }
        }

        tracing::info!(
            graceful = report.graceful,
            forced = report.forced,
            removed = report.cleanup.removed,
            failed = report.cleanup.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "drain complete"
        );
        report
    }

    fn desired_spec(&self, workload: &Workload) -> Option<(Workload, CaptureSpec)> {
        match extract_spec(workload, &self.config.annotation_key) {
            Ok(spec) => spec.map(|spec| (workload.clone(), spec)),
            Err(e) => {
                tracing::warn!(
                    workload = %workload.id,
                    annotation = %self.config.annotation_key,
                    error = %e,
                    "invalid capture annotation"
                );
                None
            }
        }
    }

    async fn start(&self, workload: &Workload, spec: CaptureSpec) -> Result<(), EngineError> {
        let target = match self.resolver.resolve(workload).await {
            Ok(target) => target,
            Err(source) => {
                tracing::warn!(
                    workload = %workload.id,
                    resolver = self.resolver.name(),
                    error = %source,
                    "capture target resolution failed"
                );
                return Err(EngineError::TargetResolution {
                    workload: workload.id.clone(),
                    source,
                });
            }
        };
        self.supervisor.start(&workload.id, &target, spec).await?;
        Ok(())
    }

    async fn stop_and_clean(&self, key: &WorkloadId) -> (StopOutcome, CleanupReport) {
        let outcome = self.termination.stop(key).await;
        let cleanup = if outcome.stopped_here() {
            self.cleaner.clean(key)
        } else {
            CleanupReport::default()
        };
        (outcome, cleanup)
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
