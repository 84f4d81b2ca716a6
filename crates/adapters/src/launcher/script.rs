// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-script launcher standing in for the capture tool in tests
#![cfg_attr(coverage_nightly, coverage(off))]

use super::CaptureLauncher;
use crate::resolve::CaptureTarget;
use podcap_core::CaptureSpec;
use std::path::Path;
use tokio::process::Command;

/// Runs `sh -c <script>` with `$1` = output path and `$2` = rotation count.
#[derive(Debug, Clone)]
pub struct ScriptLauncher {
    script: String,
}

impl ScriptLauncher {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Writes the base file and one rotation file, exits on SIGTERM.
    pub fn well_behaved() -> Self {
        Self::new(r#"touch "$1" "${1}1"; exec sleep 60"#)
    }

    /// Writes its files, then ignores SIGTERM so only SIGKILL stops it.
    pub fn ignores_terminate() -> Self {
        Self::new(r#"trap '' TERM; touch "$1" "${1}1"; while :; do sleep 1; done"#)
    }

    /// Writes the base file and exits on its own after `millis`.
    pub fn exits_after(millis: u64) -> Self {
        Self::new(format!(
            r#"touch "$1"; sleep {}.{:03}"#,
            millis / 1000,
            millis % 1000
        ))
    }
}

impl CaptureLauncher for ScriptLauncher {
    fn command(&self, _target: &CaptureTarget, spec: &CaptureSpec, output: &Path) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.script)
            .arg("podcap-capture")
            .arg(output)
            .arg(spec.max_files.to_string());
        cmd
    }
}
