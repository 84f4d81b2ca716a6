// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Capture-session lifecycle engine
//!
//! - [`SessionRegistry`]: what is running, one session per workload
//! - [`SessionSupervisor`]: spawns captures and watches for their exit
//! - [`TerminationProtocol`]: SIGTERM, bounded wait, SIGKILL
//! - [`ArtifactCleaner`]: removes capture files once a session is gone
//! - [`Reconciler`]: drives all of the above from workload events

mod artifacts;
mod error;
mod keyed;
mod reconciler;
mod registry;
mod supervisor;
mod termination;

#[cfg(test)]
mod test_helpers;

pub use artifacts::{ArtifactCleaner, ArtifactPattern, CleanupReport};
pub use error::EngineError;
pub use reconciler::{
    DrainReport, ReconcileAction, Reconciler, ReconcilerConfig, SpecChangePolicy,
};
pub use registry::{ExitSignal, Occupied, Session, SessionRegistry, TerminationClaim};
pub use supervisor::SessionSupervisor;
pub use termination::{StopOutcome, TerminationProtocol, DEFAULT_GRACE_PERIOD};
