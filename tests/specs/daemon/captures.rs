//! Capture specs
//!
//! Workload events drive one capture process per annotated workload.

use crate::prelude::*;

const WEB_FILE: &str = "capture-default_web-0.pcap";

fn capturing(node: &Node, file: &str) -> bool {
    node.capture_files().iter().any(|f| f == file)
}

#[test]
fn annotated_workload_gets_a_capture() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["apply", "default/web-0", "--capture", "3"])
        .passes()
        .stdout_eq("Workload default/web-0 applied\n");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || capturing(&node, WEB_FILE)),
        "no capture file\n{}",
        node.agent_log()
    );
    node.podcap()
        .args(&["status", "default/web-0"])
        .passes()
        .stdout_has("captures: 1")
        .stdout_has("default/web-0");
}

#[test]
fn removing_the_annotation_stops_and_cleans() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["apply", "default/web-0", "--capture", "2"])
        .passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || capturing(&node, WEB_FILE)));

    node.podcap().args(&["apply", "default/web-0"]).passes();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || node.capture_files().is_empty()),
        "capture files left: {:?}",
        node.capture_files()
    );
    node.podcap()
        .args(&["status", "default/web-0"])
        .fails()
        .exit_code(3);
}

#[test]
fn delete_stops_the_capture() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["apply", "default/web-0", "-c", "1"])
        .passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || capturing(&node, WEB_FILE)));

    node.podcap().args(&["delete", "default/web-0"]).passes();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || node
        .capture_files()
        .is_empty()));
}

#[test]
fn workload_on_another_node_is_ignored() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["apply", "default/web-0", "-c", "1", "--node", "node-b"])
        .passes();
    // Give the agent a moment to act on the event
    std::thread::sleep(std::time::Duration::from_millis(200));

    assert!(node.capture_files().is_empty());
    node.podcap()
        .args(&["status"])
        .passes()
        .stdout_has("captures: 0");
}

#[test]
fn sync_replaces_the_known_set() {
    let mut node = Node::new();
    node.start();

    node.podcap()
        .args(&["apply", "default/web-0", "-c", "1"])
        .passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || capturing(&node, WEB_FILE)));

    let listing = node.state_path().join("listing.json");
    std::fs::write(
        &listing,
        r#"[{"namespace":"default","name":"db-0","annotations":{"tcpdump.antrea.io":"2"}}]"#,
    )
    .unwrap();
    node.podcap()
        .args(&["sync", listing.to_str().unwrap()])
        .passes()
        .stdout_eq("Synced 1 workload(s)\n");

    assert!(wait_for(SPEC_WAIT_MAX_MS, || node.capture_files()
        == ["capture-default_db-0.pcap"]));
}

#[test]
fn shutdown_drains_every_capture() {
    let mut node = Node::new();
    node.start();

    for name in ["default/a", "default/b", "default/c"] {
        node.podcap().args(&["apply", name, "-c", "1"]).passes();
    }
    assert!(wait_for(SPEC_WAIT_MAX_MS, || node.capture_files().len() == 3));

    node.podcap().args(&["shutdown"]).passes();

    assert!(node.wait_exit(), "agent did not exit\n{}", node.agent_log());
    assert!(node.capture_files().is_empty());
}
