// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture output naming and cleanup.
//!
//! Output files are named from the workload identity:
//! `capture-<namespace>_<name>.pcap`, with rotation files appending a
//! counter (`.pcap0`, `.pcap1`, ...). Neither Kubernetes namespaces nor
//! workload names may contain `_`, so the names of two keys never overlap.

use std::path::{Path, PathBuf};

use podcap_core::WorkloadId;
use serde::Serialize;

/// The set of files one workload's capture can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    dir: PathBuf,
    stem: String,
}

impl ArtifactPattern {
    pub fn for_workload(dir: &Path, key: &WorkloadId) -> Self {
        Self {
            dir: dir.to_path_buf(),
            stem: format!("capture-{}_{}.pcap", key.namespace, key.name),
        }
    }

    /// Path handed to the capture tool.
    pub fn base_path(&self) -> PathBuf {
        self.dir.join(&self.stem)
    }

    /// Glob that over-approximates the pattern; see [`Self::matches`].
    pub fn glob(&self) -> String {
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let stem = glob::Pattern::escape(&self.stem);
        format!("{}/{}*", dir.trim_end_matches('/'), stem)
    }

    /// True for the base file and its numbered rotations only.
    pub fn matches(&self, file_name: &str) -> bool {
        match file_name.strip_prefix(self.stem.as_str()) {
            Some(suffix) => suffix.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }

    /// Existing files matching the pattern.
    pub fn existing_files(&self) -> Result<Vec<PathBuf>, glob::PatternError> {
        let mut files: Vec<PathBuf> = glob::glob(&self.glob())?
            .filter_map(|entry| entry.ok())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| self.matches(n))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Files deleted, including files that had already vanished.
    pub removed: usize,
    /// Files that could not be deleted.
    pub failed: usize,
}

impl CleanupReport {
    pub fn is_partial_failure(&self) -> bool {
        self.failed > 0
    }
}

impl std::ops::AddAssign for CleanupReport {
    fn add_assign(&mut self, other: Self) {
        self.removed += other.removed;
        self.failed += other.failed;
    }
}

/// Deletes a session's output files after its process has exited.
#[derive(Debug, Clone)]
pub struct ArtifactCleaner {
    capture_dir: PathBuf,
}

impl ArtifactCleaner {
    pub fn new(capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            capture_dir: capture_dir.into(),
        }
    }

    pub fn capture_dir(&self) -> &Path {
        &self.capture_dir
    }

    pub fn pattern(&self, key: &WorkloadId) -> ArtifactPattern {
        ArtifactPattern::for_workload(&self.capture_dir, key)
    }

    /// Delete every file matching the workload's pattern. Never fails as a
    /// whole; individual failures are counted and logged.
    pub fn clean(&self, key: &WorkloadId) -> CleanupReport {
        let pattern = self.pattern(key);
        let files = match pattern.existing_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(
                    workload = %key,
                    glob = %pattern.glob(),
                    error = %e,
                    "invalid cleanup pattern"
                );
                return CleanupReport::default();
            }
        };

        let mut report = CleanupReport::default();
        for file in &files {
            match std::fs::remove_file(file) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => report.removed += 1,
                Err(e) => {
                    tracing::error!(
                        workload = %key,
                        file = %file.display(),
                        error = %e,
                        "failed to delete capture file"
                    );
                    report.failed += 1;
                }
            }
        }

        if files.is_empty() {
            tracing::debug!(workload = %key, "no capture files to clean up");
        } else if report.is_partial_failure() {
            tracing::warn!(
                workload = %key,
                removed = report.removed,
                failed = report.failed,
                "capture cleanup partially failed"
            );
        } else {
            tracing::info!(
                workload = %key,
                removed = report.removed,
                "capture files cleaned up"
            );
        }
        report
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
