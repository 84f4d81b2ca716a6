//! CLI error specs

use crate::prelude::*;

#[test]
fn ping_without_agent_exits_2() {
    let state = tempfile::tempdir().unwrap();
    cli()
        .env("PODCAP_STATE_DIR", state.path())
        .args(&["ping"])
        .fails()
        .exit_code(2)
        .stderr_has("podcapd is not running");
}

#[test]
fn status_without_agent_names_the_socket() {
    let state = tempfile::tempdir().unwrap();
    cli()
        .env("PODCAP_STATE_DIR", state.path())
        .args(&["status"])
        .fails()
        .exit_code(1)
        .stderr_has("podcapd.sock");
}

#[test]
fn workload_id_needs_namespace() {
    cli()
        .args(&["delete", "web-0"])
        .fails()
        .stderr_has("expected <namespace>/<name>");
}

#[test]
fn annotation_needs_key_value() {
    cli()
        .args(&["apply", "ns/p1", "-a", "broken"])
        .fails()
        .stderr_has("expected KEY=VALUE");
}
