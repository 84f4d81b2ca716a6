// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::process::ExitStatusExt;
use tokio::process::Command;

fn spawn_group(script: &str) -> tokio::process::Child {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script).process_group(0);
    cmd.spawn().unwrap()
}

#[tokio::test]
async fn run_with_timeout_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_io_error() {
    let cmd = Command::new("/nonexistent/binary");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "nonexistent")
        .await
        .unwrap_err();
    assert!(err.starts_with("nonexistent failed:"), "got: {}", err);
}

#[tokio::test]
async fn run_with_timeout_timeout_elapsed() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let err = run_with_timeout(cmd, Duration::from_millis(100), "test sleep")
        .await
        .unwrap_err();
    assert!(err.contains("timed out"), "got: {}", err);
    assert!(err.contains("test sleep"), "got: {}", err);
}

#[yare::parameterized(
    zero = { 0 },
    one  = { 1 },
)]
fn refuses_reserved_groups(pgid: u32) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt
        .block_on(signal_process_group(pgid, GroupSignal::Kill))
        .unwrap_err();
    assert!(err.contains("refusing"), "got: {}", err);
}

#[tokio::test]
async fn terminate_reaches_whole_group() {
    // The shell waits on a background child; both must die from one signal.
    let mut child = spawn_group("sleep 30 & wait");
    let pgid = child.id().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    signal_process_group(pgid, GroupSignal::Terminate)
        .await
        .unwrap();

    let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
        .await
        .unwrap()
        .unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn kill_overrides_ignored_terminate() {
    let mut child = spawn_group("trap '' TERM; while :; do sleep 1; done");
    let pgid = child.id().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    signal_process_group(pgid, GroupSignal::Terminate)
        .await
        .unwrap();
    let still_running = tokio::time::timeout(Duration::from_millis(300), child.wait()).await;
    assert!(still_running.is_err(), "TERM should have been ignored");

    signal_process_group(pgid, GroupSignal::Kill).await.unwrap();
    let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.signal(), Some(9));
}

#[tokio::test]
async fn signalling_a_vanished_group_is_an_error() {
    let mut child = spawn_group("exit 0");
    let pgid = child.id().unwrap();
    child.wait().await.unwrap();

    let result = signal_process_group(pgid, GroupSignal::Terminate).await;
    assert!(result.is_err());
}
