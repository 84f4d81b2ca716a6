// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tcpdump launcher

use super::CaptureLauncher;
use crate::resolve::CaptureTarget;
use podcap_core::CaptureSpec;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs `tcpdump` with size-based rotation, entering the target's network
/// namespace through `nsenter` when needed.
#[derive(Debug, Clone)]
pub struct TcpdumpLauncher {
    pub tool: PathBuf,
    pub nsenter: PathBuf,
    pub interface: String,
    /// Rotation file size in millions of bytes (`-C`).
    pub rotate_size_mb: u32,
}

impl Default for TcpdumpLauncher {
    fn default() -> Self {
        Self {
            tool: PathBuf::from("tcpdump"),
            nsenter: PathBuf::from("nsenter"),
            interface: "any".to_string(),
            rotate_size_mb: 1,
        }
    }
}

impl CaptureLauncher for TcpdumpLauncher {
    fn command(&self, target: &CaptureTarget, spec: &CaptureSpec, output: &Path) -> Command {
        let mut cmd = match target {
            CaptureTarget::HostNetwork => Command::new(&self.tool),
            CaptureTarget::NetNamespace { pid } => {
                let mut cmd = Command::new(&self.nsenter);
                cmd.arg("-t")
                    .arg(pid.to_string())
                    .arg("-n")
                    .arg("--")
                    .arg(&self.tool);
                cmd
            }
        };
        cmd.arg("-i")
            .arg(&self.interface)
            .arg("-U")
            .arg("-n")
            .arg("-C")
            .arg(self.rotate_size_mb.to_string())
            .arg("-W")
            .arg(spec.max_files.to_string())
            .arg("-w")
            .arg(output)
            .arg("-Z")
            .arg("root");
        cmd
    }
}

#[cfg(test)]
#[path = "tcpdump_tests.rs"]
mod tests;
