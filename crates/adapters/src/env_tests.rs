// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
#[serial_test::serial]
fn signal_timeout_defaults_to_five_seconds() {
    std::env::remove_var("PODCAP_SIGNAL_TIMEOUT_MS");
    assert_eq!(signal_timeout(), Duration::from_secs(5));
}

#[test]
#[serial_test::serial]
fn signal_timeout_reads_override() {
    std::env::set_var("PODCAP_SIGNAL_TIMEOUT_MS", "250");
    assert_eq!(signal_timeout(), Duration::from_millis(250));
    std::env::remove_var("PODCAP_SIGNAL_TIMEOUT_MS");
}

#[test]
#[serial_test::serial]
fn signal_timeout_ignores_garbage() {
    std::env::set_var("PODCAP_SIGNAL_TIMEOUT_MS", "soon");
    assert_eq!(signal_timeout(), Duration::from_secs(5));
    std::env::remove_var("PODCAP_SIGNAL_TIMEOUT_MS");
}
