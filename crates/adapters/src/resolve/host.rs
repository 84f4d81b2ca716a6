// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-network resolver

use super::{CaptureTarget, ResolveError, TargetResolver};
use async_trait::async_trait;
use podcap_core::Workload;

/// Captures from the agent's own network namespace.
///
/// Suitable when the agent runs with host networking and the interface
/// filter (`any` by default) sees workload traffic.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostNetworkResolver;

impl HostNetworkResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TargetResolver for HostNetworkResolver {
    fn name(&self) -> &'static str {
        "host"
    }

    async fn resolve(&self, _workload: &Workload) -> Result<CaptureTarget, ResolveError> {
        Ok(CaptureTarget::HostNetwork)
    }
}
