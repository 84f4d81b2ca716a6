// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload snapshots as delivered by the event source.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::namespace::{scoped_name, split_scoped_name, Namespace};

/// Stable identity of a workload: its namespace and name.
///
/// Used as the session registry key. Displays as `namespace/name`.
/// Parsed and deserialized ids are lowercase DNS-1123 names, so no two ids
/// share an artifact file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawWorkloadId")]
pub struct WorkloadId {
    pub namespace: Namespace,
    pub name: String,
}

impl WorkloadId {
    pub fn new(namespace: impl Into<Namespace>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&scoped_name(&self.namespace, &self.name))
    }
}

/// Error parsing a `namespace/name` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid workload id '{0}': expected <namespace>/<name> in lowercase DNS-1123 form")]
pub struct ParseWorkloadIdError(pub String);

const MAX_NAMESPACE_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

/// Lowercase alphanumerics, `-` and `.`, starting and ending alphanumeric.
fn is_dns_subdomain(s: &str, max_len: usize) -> bool {
    let edge = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    match (s.chars().next(), s.chars().last()) {
        (Some(first), Some(last)) if s.len() <= max_len && edge(first) && edge(last) => {
            s.chars().all(|c| edge(c) || c == '-' || c == '.')
        }
        _ => false,
    }
}

impl WorkloadId {
    fn checked(namespace: &str, name: &str) -> Result<Self, ParseWorkloadIdError> {
        let ns_ok = is_dns_subdomain(namespace, MAX_NAMESPACE_LEN) && !namespace.contains('.');
        if ns_ok && is_dns_subdomain(name, MAX_NAME_LEN) {
            Ok(Self::new(namespace, name))
        } else {
            Err(ParseWorkloadIdError(scoped_name(namespace, name)))
        }
    }
}

impl FromStr for WorkloadId {
    type Err = ParseWorkloadIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ns, name) = split_scoped_name(s);
        Self::checked(ns, name).map_err(|_| ParseWorkloadIdError(s.to_string()))
    }
}

#[derive(Deserialize)]
struct RawWorkloadId {
    namespace: String,
    name: String,
}

impl TryFrom<RawWorkloadId> for WorkloadId {
    type Error = ParseWorkloadIdError;

    fn try_from(raw: RawWorkloadId) -> Result<Self, Self::Error> {
        Self::checked(&raw.namespace, &raw.name)
    }
}

/// Snapshot of a workload scheduled on (or near) this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(flatten)]
    pub id: WorkloadId,
    /// Node the workload is scheduled on; `None` means "this node".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// Container ids in `runtime://id` form, first entry is the primary container.
    #[serde(default)]
    pub container_ids: Vec<String>,
    #[serde(default)]
    pub host_network: bool,
}

impl Workload {
    pub fn new(id: WorkloadId) -> Self {
        Self {
            id,
            node_name: None,
            annotations: HashMap::new(),
            container_ids: Vec::new(),
            host_network: false,
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn is_scheduled_on(&self, node: &str) -> bool {
        match self.node_name.as_deref() {
            Some(scheduled) => scheduled == node,
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "workload_tests.rs"]
mod tests;
