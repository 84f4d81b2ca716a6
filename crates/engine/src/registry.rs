// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of live capture sessions.
//!
//! The registry is the single source of truth for what is running. Every
//! mutation happens under one `parking_lot::Mutex` that is held only for the
//! map operation itself: never across a spawn, a signal, or an `.await`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use parking_lot::Mutex;
use podcap_core::{CaptureSpec, InstanceId, WorkloadId};
use tokio::sync::watch;

/// Resolves once the session's process has been reaped.
#[derive(Debug, Clone)]
pub struct ExitSignal(watch::Receiver<bool>);

impl ExitSignal {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self(rx)
    }

    pub fn has_exited(&self) -> bool {
        *self.0.borrow()
    }

    /// Wait for the exit notification.
    ///
    /// A dropped sender also counts as exited: the monitor that owned the
    /// process is gone and nothing further will be reported.
    pub async fn wait(mut self) {
        let _ = self.0.wait_for(|exited| *exited).await;
    }
}

/// One tracked capture process.
#[derive(Debug, Clone)]
pub struct Session {
    pub key: WorkloadId,
    pub spec: CaptureSpec,
    pub instance: InstanceId,
    /// Pid of the capture process, which also leads its process group.
    pub pid: u32,
    /// Base output path; rotation files append a counter.
    pub output: PathBuf,
    pub started_at: Instant,
    /// Set once a stop has been claimed for this session.
    pub terminated: bool,
    pub(crate) exit: ExitSignal,
}

impl Session {
    pub fn exit_signal(&self) -> ExitSignal {
        self.exit.clone()
    }
}

/// `insert` found the key already occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupied {
    pub key: WorkloadId,
    pub existing: InstanceId,
}

/// Result of claiming the right to stop a session.
#[derive(Debug)]
pub enum TerminationClaim {
    /// Nothing registered under the key.
    NotRunning,
    /// The caller owns the stop sequence for this session.
    Claimed(Session),
    /// Another caller already began stopping it.
    InProgress(Session),
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<WorkloadId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &WorkloadId) -> Option<Session> {
        self.sessions.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &WorkloadId) -> bool {
        self.sessions.lock().contains_key(key)
    }

    /// Register a session. Fails without replacing if the key is occupied.
    pub fn insert(&self, session: Session) -> Result<(), Occupied> {
        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(&session.key) {
            return Err(Occupied {
                key: session.key.clone(),
                existing: existing.instance.clone(),
            });
        }
        sessions.insert(session.key.clone(), session);
        Ok(())
    }

    /// Remove whatever is registered under `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &WorkloadId) -> Option<Session> {
        self.sessions.lock().remove(key)
    }

    /// Remove the session under `key` only if it is `instance`.
    ///
    /// Exit notifications for a superseded process go through here, so they
    /// can never delete a newer session occupying the same key.
    pub fn remove_instance(&self, key: &WorkloadId, instance: &InstanceId) -> Option<Session> {
        let mut sessions = self.sessions.lock();
        match sessions.get(key) {
            Some(current) if current.instance == *instance => sessions.remove(key),
            _ => None,
        }
    }

    /// Flip the terminated marker for `key`, reporting who owns the stop.
    pub fn begin_termination(&self, key: &WorkloadId) -> TerminationClaim {
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(key) {
            None => TerminationClaim::NotRunning,
            Some(session) if session.terminated => TerminationClaim::InProgress(session.clone()),
            Some(session) => {
                session.terminated = true;
                TerminationClaim::Claimed(session.clone())
            }
        }
    }

    /// All sessions, sorted by key.
    pub fn snapshot(&self) -> Vec<Session> {
        let mut all: Vec<Session> = self.sessions.lock().values().cloned().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
