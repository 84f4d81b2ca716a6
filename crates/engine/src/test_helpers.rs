// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use podcap_core::{CaptureSpec, InstanceId, WorkloadId};
use tokio::sync::watch;

use crate::registry::{ExitSignal, Session};

pub fn key(name: &str) -> WorkloadId {
    WorkloadId::new("ns", name)
}

pub fn spec(n: u32) -> CaptureSpec {
    CaptureSpec::new(n).unwrap()
}

/// A registry entry with no process behind it.
///
/// The returned sender publishes its exit notification.
pub fn detached_session(name: &str) -> (Session, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(false);
    let session = Session {
        key: key(name),
        spec: spec(3),
        instance: InstanceId::generate(),
        pid: 0,
        output: PathBuf::from(format!("/captures/capture-ns_{}.pcap", name)),
        started_at: Instant::now(),
        terminated: false,
        exit: ExitSignal::new(rx),
    };
    (session, tx)
}

/// Poll until `path` exists; capture scripts create their files asynchronously.
pub async fn wait_for_file(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !path.exists() {
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {}",
            path.display()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Names of files in `dir`, sorted.
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// True while any process in group `pgid` can still be signalled.
pub fn group_alive(pgid: u32) -> bool {
    std::process::Command::new("kill")
        .arg("-0")
        .arg("--")
        .arg(format!("-{}", pgid))
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Poll until group `pgid` has no live members.
pub async fn wait_for_group_exit(pgid: u32) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while group_alive(pgid) {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    true
}
