// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! podcap-core: workload model and desired-state extraction for the podcap agent

pub mod capture;
pub mod event;
pub mod id;
pub mod namespace;
pub mod workload;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use capture::{extract_spec, CaptureSpec, SpecError, DEFAULT_ANNOTATION_KEY};
pub use event::WorkloadEvent;
pub use id::{InstanceId, ShortId};
pub use namespace::{scoped_name, split_scoped_name, Namespace};
pub use workload::{ParseWorkloadIdError, Workload, WorkloadId};
