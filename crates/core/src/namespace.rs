// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload namespaces and `namespace/name` keys.

/// A workload namespace.
///
/// Wraps a `String` so namespace values cannot be confused with workload
/// names at the type level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::ops::Deref for Namespace {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Build a `namespace/name` key.
///
/// When namespace is empty, returns the bare name.
pub fn scoped_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}

/// Parse a `namespace/name` key into `(namespace, name)`.
///
/// Returns `("", key)` when no slash is present.
pub fn split_scoped_name(scoped: &str) -> (&str, &str) {
    match scoped.split_once('/') {
        Some((ns, name)) => (ns, name),
        None => ("", scoped),
    }
}

#[cfg(test)]
#[path = "namespace_tests.rs"]
mod tests;
