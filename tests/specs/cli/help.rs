//! CLI help and version specs

use crate::prelude::*;

#[test]
fn version_flags_print_version() {
    for flag in ["--version", "-v", "-V"] {
        cli().args(&[flag]).passes().stdout_eq("podcap 0.1.0\n");
    }
}

#[test]
fn no_subcommand_prints_help() {
    cli()
        .passes()
        .stdout_has("Usage: podcap")
        .stdout_has("apply")
        .stdout_has("status")
        .stdout_has("shutdown");
}

#[test]
fn apply_help_lists_workload_flags() {
    cli()
        .args(&["apply", "--help"])
        .passes()
        .stdout_has("--capture")
        .stdout_has("--container-id")
        .stdout_has("--host-network")
        .stdout_has("--node");
}
