// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload → capture target resolution strategies

mod host;
mod proc_cgroup;

pub use host::HostNetworkResolver;
pub use proc_cgroup::{container_id, ProcCgroupResolver};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTargetResolver;

use async_trait::async_trait;
use podcap_core::{Workload, WorkloadId};
use thiserror::Error;

/// Where a capture process must run to see a workload's traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// The agent's own network namespace.
    HostNetwork,
    /// The network namespace of a process belonging to the workload.
    NetNamespace { pid: u32 },
}

impl std::fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureTarget::HostNetwork => write!(f, "host-network"),
            CaptureTarget::NetNamespace { pid } => write!(f, "netns(pid {})", pid),
        }
    }
}

/// Errors from target resolution.
///
/// All of these are retryable: the next event for the workload tries again.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no container id available for {0}")]
    NoContainer(WorkloadId),
    #[error("invalid container id format: {0}")]
    InvalidContainerId(String),
    #[error("failed to read {path}: {message}")]
    ProcUnreadable { path: String, message: String },
    #[error("could not find process for container {container} in {workload}")]
    NotFound {
        container: String,
        workload: WorkloadId,
    },
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

/// Locates the execution target for a workload's capture.
#[async_trait]
pub trait TargetResolver: Clone + Send + Sync + 'static {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    async fn resolve(&self, workload: &Workload) -> Result<CaptureTarget, ResolveError>;
}

/// Resolver chosen at deployment time from configuration.
#[derive(Debug, Clone)]
pub enum ResolverStrategy {
    Host(HostNetworkResolver),
    ProcCgroup(ProcCgroupResolver),
}

#[async_trait]
impl TargetResolver for ResolverStrategy {
    fn name(&self) -> &'static str {
        match self {
            ResolverStrategy::Host(r) => r.name(),
            ResolverStrategy::ProcCgroup(r) => r.name(),
        }
    }

    async fn resolve(&self, workload: &Workload) -> Result<CaptureTarget, ResolveError> {
        match self {
            ResolverStrategy::Host(r) => r.resolve(workload).await,
            ResolverStrategy::ProcCgroup(r) => r.resolve(workload).await,
        }
    }
}
