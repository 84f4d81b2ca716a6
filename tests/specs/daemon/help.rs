//! Agent help and version specs
//!
//! Verify podcapd --help and --version work without configuration or
//! acquiring the lock.

use crate::prelude::*;

#[test]
fn podcapd_version_flags() {
    for flag in ["--version", "-v", "-V"] {
        agent().args(&[flag]).passes().stdout_eq("podcapd 0.1.0\n");
    }
}

#[test]
fn podcapd_help_shows_usage() {
    agent()
        .args(&["--help"])
        .passes()
        .stdout_has("USAGE:")
        .stdout_has("NODE_NAME")
        .stdout_has("--version");
}

#[test]
fn podcapd_rejects_unknown_arguments() {
    agent()
        .args(&["--bogus"])
        .fails()
        .stderr_has("unexpected argument '--bogus'");
}

#[test]
fn podcapd_requires_node_name() {
    let dir = tempfile::tempdir().unwrap();
    agent()
        .env("PODCAP_CONFIG", dir.path().join("absent.toml"))
        .env("PODCAP_STATE_DIR", dir.path())
        .fails()
        .stderr_has("node name is required");
}
