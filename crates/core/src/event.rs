// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload change notifications.

use serde::{Deserialize, Serialize};

use crate::workload::{Workload, WorkloadId};

/// A workload was added/updated or removed.
///
/// Delivery is at-least-once; handlers must be idempotent under replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkloadEvent {
    Applied { workload: Workload },
    Deleted { id: WorkloadId },
}

impl WorkloadEvent {
    pub fn id(&self) -> &WorkloadId {
        match self {
            WorkloadEvent::Applied { workload } => &workload.id,
            WorkloadEvent::Deleted { id } => id,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
