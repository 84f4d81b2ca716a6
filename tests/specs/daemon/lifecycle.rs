//! Agent lifecycle specs
//!
//! Start, status, lock contention and shutdown through the CLI.

use crate::prelude::*;

#[test]
fn agent_starts_and_answers_ping() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["ping"])
        .passes()
        .stdout_eq("podcapd is running\n");
    node.podcap()
        .args(&["status"])
        .passes()
        .stdout_has("node: node-a")
        .stdout_has("captures: 0");
}

#[test]
fn second_agent_refuses_to_start() {
    let mut node = Node::new();
    node.start();

    node.agent_cmd()
        .fails()
        .stderr_has("podcapd is already running");
    node.podcap().args(&["ping"]).passes();
}

#[test]
fn shutdown_removes_socket_and_pid_file() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["shutdown"])
        .passes()
        .stdout_has("shutting down");

    assert!(node.wait_exit(), "agent did not exit\n{}", node.agent_log());
    assert!(!node.socket_path().exists());
    assert!(!node.state_path().join("podcapd.pid").exists());
}

#[test]
fn version_reports_both_sides() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["version"])
        .passes()
        .stdout_eq("podcap 0.1.0\npodcapd 0.1.0\n");
}
