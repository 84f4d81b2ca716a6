// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::resolve::{CaptureTarget, ResolveError, TargetResolver};
use async_trait::async_trait;
use podcap_core::Workload;
use tracing::Instrument;

/// Wrapper that adds tracing to any TargetResolver
#[derive(Clone)]
pub struct TracedResolver<R> {
    inner: R,
}

impl<R> TracedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: TargetResolver> TargetResolver for TracedResolver<R> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn resolve(&self, workload: &Workload) -> Result<CaptureTarget, ResolveError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.resolve(workload).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(target) => tracing::debug!(%target, elapsed_ms, "resolved"),
                Err(e) => tracing::debug!(elapsed_ms, error = %e, "resolution failed"),
            }
            result
        }
        .instrument(tracing::info_span!(
            "resolver.resolve",
            strategy = self.inner.name(),
            workload = %workload.id
        ))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
