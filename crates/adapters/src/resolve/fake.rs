// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake target resolver for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CaptureTarget, ResolveError, TargetResolver};
use async_trait::async_trait;
use parking_lot::Mutex;
use podcap_core::{Workload, WorkloadId};
use std::collections::HashMap;
use std::sync::Arc;

struct FakeResolverState {
    targets: HashMap<WorkloadId, CaptureTarget>,
    failing: HashMap<WorkloadId, String>,
    calls: Vec<WorkloadId>,
}

/// Resolver that answers from a table and records every lookup.
///
/// Unknown workloads resolve to host networking.
#[derive(Clone)]
pub struct FakeTargetResolver {
    inner: Arc<Mutex<FakeResolverState>>,
}

impl Default for FakeTargetResolver {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeResolverState {
                targets: HashMap::new(),
                failing: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeTargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make lookups for `id` fail until [`Self::recover`] is called.
    pub fn fail_for(&self, id: &WorkloadId, message: &str) {
        self.inner
            .lock()
            .failing
            .insert(id.clone(), message.to_string());
    }

    pub fn recover(&self, id: &WorkloadId) {
        self.inner.lock().failing.remove(id);
    }

    pub fn set_target(&self, id: &WorkloadId, target: CaptureTarget) {
        self.inner.lock().targets.insert(id.clone(), target);
    }

    /// Workloads looked up so far, in call order.
    pub fn calls(&self) -> Vec<WorkloadId> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl TargetResolver for FakeTargetResolver {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn resolve(&self, workload: &Workload) -> Result<CaptureTarget, ResolveError> {
        let mut inner = self.inner.lock();
        inner.calls.push(workload.id.clone());
        if let Some(message) = inner.failing.get(&workload.id) {
            return Err(ResolveError::Unavailable(message.clone()));
        }
        Ok(inner
            .targets
            .get(&workload.id)
            .copied()
            .unwrap_or(CaptureTarget::HostNetwork))
    }
}
