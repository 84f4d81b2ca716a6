// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workload async locks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use podcap_core::WorkloadId;
use tokio::sync::OwnedMutexGuard;

/// Hands out one async mutex per key so work on the same workload runs
/// one at a time while different workloads proceed in parallel.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    locks: Mutex<HashMap<WorkloadId, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self, key: &WorkloadId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop entries nobody holds or waits on
            locks.retain(|k, l| k == key || Arc::strong_count(l) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
#[path = "keyed_tests.rs"]
mod tests;
