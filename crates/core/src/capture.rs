// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desired capture configuration and its extraction from workload annotations.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workload::Workload;

/// Annotation consulted when no other key is configured.
pub const DEFAULT_ANNOTATION_KEY: &str = "tcpdump.antrea.io";

/// Capture configuration derived from a workload's annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureSpec {
    /// Number of rotation files the capture tool keeps.
    pub max_files: NonZeroU32,
}

impl CaptureSpec {
    /// Returns `None` for a zero rotation count.
    pub fn new(max_files: u32) -> Option<Self> {
        NonZeroU32::new(max_files).map(|max_files| Self { max_files })
    }
}

/// The annotation is present but does not name a positive rotation count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("annotation value '{0}' is not an integer")]
    Malformed(String),
    #[error("annotation value '{0}' is not positive")]
    NotPositive(String),
}

/// Compute the desired capture spec for a workload.
///
/// A missing or empty annotation yields `Ok(None)`. Callers treat `Err` the
/// same as `Ok(None)`; the error only exists so it can be reported.
pub fn extract_spec(
    workload: &Workload,
    annotation_key: &str,
) -> Result<Option<CaptureSpec>, SpecError> {
    let value = match workload.annotation(annotation_key) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };

    let parsed: i64 = value
        .parse()
        .map_err(|_| SpecError::Malformed(value.to_string()))?;
    if parsed <= 0 {
        return Err(SpecError::NotPositive(value.to_string()));
    }
    let max_files =
        u32::try_from(parsed).map_err(|_| SpecError::Malformed(value.to_string()))?;

    Ok(CaptureSpec::new(max_files))
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
