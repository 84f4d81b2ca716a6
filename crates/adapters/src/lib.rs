// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: target lookup, capture tool invocation, signals

mod env;
pub mod launcher;
pub mod resolve;
pub mod subprocess;
pub mod traced;

pub use launcher::{CaptureLauncher, TcpdumpLauncher};
pub use resolve::{
    CaptureTarget, HostNetworkResolver, ProcCgroupResolver, ResolveError, ResolverStrategy,
    TargetResolver,
};
pub use subprocess::{signal_process_group, GroupSignal};
pub use traced::TracedResolver;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use launcher::ScriptLauncher;
#[cfg(any(test, feature = "test-support"))]
pub use resolve::FakeTargetResolver;
