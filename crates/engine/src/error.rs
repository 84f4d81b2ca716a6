// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the capture engine

use podcap_adapters::ResolveError;
use podcap_core::WorkloadId;
use thiserror::Error;

/// Failures while reconciling one workload.
///
/// None of these are fatal to the agent; the next event for the workload
/// retries naturally.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("capture already running for {0}")]
    AlreadyRunning(WorkloadId),
    #[error("failed to resolve capture target for {workload}: {source}")]
    TargetResolution {
        workload: WorkloadId,
        #[source]
        source: ResolveError,
    },
    #[error("failed to spawn capture for {workload}: {message}")]
    SpawnFailure {
        workload: WorkloadId,
        message: String,
    },
}
