// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace-entry resolver: finds a workload process through `/proc/<pid>/cgroup`

use std::path::{Path, PathBuf};

use super::{CaptureTarget, ResolveError, TargetResolver};
use async_trait::async_trait;
use podcap_core::{ShortId, Workload};

/// Finds the first host process whose cgroup mentions the workload's primary
/// container id, so the capture can enter that process's network namespace.
#[derive(Clone, Debug)]
pub struct ProcCgroupResolver {
    proc_root: PathBuf,
}

impl ProcCgroupResolver {
    /// `proc_root` is the host's procfs as mounted in the agent (e.g. `/host/proc`).
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }
}

/// Extract the bare container id from the workload's primary container.
///
/// Container ids arrive as `<runtime>://<id>`.
pub fn container_id(workload: &Workload) -> Result<String, ResolveError> {
    let raw = workload
        .container_ids
        .first()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ResolveError::NoContainer(workload.id.clone()))?;
    match raw.split_once("://") {
        Some((_, id)) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ResolveError::InvalidContainerId(raw.clone())),
    }
}

/// Scan numeric entries of `proc_root` in ascending pid order.
fn find_pid(proc_root: &Path, container_id: &str) -> Result<Option<u32>, ResolveError> {
    let entries = std::fs::read_dir(proc_root).map_err(|e| ResolveError::ProcUnreadable {
        path: proc_root.display().to_string(),
        message: e.to_string(),
    })?;

    let mut pids: Vec<u32> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().and_then(|n| n.parse::<u32>().ok()))
        .filter(|pid| *pid != 0)
        .collect();
    pids.sort_unstable();

    for pid in pids {
        let cgroup = proc_root.join(pid.to_string()).join("cgroup");
        // Processes come and go while scanning
        let Ok(content) = std::fs::read_to_string(&cgroup) else {
            continue;
        };
        if content.contains(container_id) {
            return Ok(Some(pid));
        }
    }
    Ok(None)
}

#[async_trait]
impl TargetResolver for ProcCgroupResolver {
    fn name(&self) -> &'static str {
        "proc-cgroup"
    }

    async fn resolve(&self, workload: &Workload) -> Result<CaptureTarget, ResolveError> {
        if workload.host_network {
            return Ok(CaptureTarget::HostNetwork);
        }

        let id = container_id(workload)?;
        let proc_root = self.proc_root.clone();
        let needle = id.clone();
        let found = tokio::task::spawn_blocking(move || find_pid(&proc_root, &needle))
            .await
            .map_err(|e| ResolveError::Unavailable(e.to_string()))??;

        match found {
            Some(pid) => Ok(CaptureTarget::NetNamespace { pid }),
            None => Err(ResolveError::NotFound {
                container: id.short(12).to_string(),
                workload: workload.id.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "proc_cgroup_tests.rs"]
mod tests;
