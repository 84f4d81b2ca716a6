// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::capture::DEFAULT_ANNOTATION_KEY;
use crate::workload::{Workload, WorkloadId};

/// A workload with no annotations.
pub fn workload(namespace: &str, name: &str) -> Workload {
    Workload::new(WorkloadId::new(namespace, name))
}

/// A workload carrying the default capture annotation.
pub fn annotated(namespace: &str, name: &str, value: &str) -> Workload {
    let mut w = workload(namespace, name);
    w.annotations
        .insert(DEFAULT_ANNOTATION_KEY.to_string(), value.to_string());
    w
}
