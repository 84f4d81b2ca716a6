// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture tool invocation

mod tcpdump;

pub use tcpdump::TcpdumpLauncher;

#[cfg(any(test, feature = "test-support"))]
mod script;
#[cfg(any(test, feature = "test-support"))]
pub use script::ScriptLauncher;

use crate::resolve::CaptureTarget;
use podcap_core::CaptureSpec;
use std::path::Path;
use tokio::process::Command;

/// Builds the command line for one capture process.
///
/// The returned command is spawned by the session supervisor, which adds
/// process-group placement and stdio wiring. Contract for the tool: keep at
/// most `spec.max_files` rotation files based at `output`, flush and exit on
/// SIGTERM.
pub trait CaptureLauncher: Clone + Send + Sync + 'static {
    fn command(&self, target: &CaptureTarget, spec: &CaptureSpec, output: &Path) -> Command;
}
