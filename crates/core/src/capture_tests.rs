// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::annotated;

#[yare::parameterized(
    one     = { "1",  1 },
    three   = { "3",  3 },
    large   = { "4096", 4096 },
)]
fn valid_annotation(value: &str, expected: u32) {
    let workload = annotated("ns", "p1", value);
    let spec = extract_spec(&workload, DEFAULT_ANNOTATION_KEY).unwrap();
    assert_eq!(spec, CaptureSpec::new(expected));
}

#[test]
fn missing_annotation_is_absent() {
    let workload = crate::test_support::workload("ns", "p1");
    assert_eq!(extract_spec(&workload, DEFAULT_ANNOTATION_KEY), Ok(None));
}

#[test]
fn empty_annotation_is_absent() {
    let workload = annotated("ns", "p1", "");
    assert_eq!(extract_spec(&workload, DEFAULT_ANNOTATION_KEY), Ok(None));
}

#[test]
fn other_annotation_key_is_ignored() {
    let workload = annotated("ns", "p1", "3");
    assert_eq!(extract_spec(&workload, "example.com/capture"), Ok(None));
}

#[yare::parameterized(
    word        = { "three" },
    float       = { "2.5" },
    padded      = { " 3" },
    overflow    = { "99999999999" },
    too_big_i64 = { "999999999999999999999" },
)]
fn malformed_annotation(value: &str) {
    let workload = annotated("ns", "p1", value);
    assert_eq!(
        extract_spec(&workload, DEFAULT_ANNOTATION_KEY),
        Err(SpecError::Malformed(value.to_string()))
    );
}

#[yare::parameterized(
    zero     = { "0" },
    negative = { "-2" },
)]
fn non_positive_annotation(value: &str) {
    let workload = annotated("ns", "p1", value);
    assert_eq!(
        extract_spec(&workload, DEFAULT_ANNOTATION_KEY),
        Err(SpecError::NotPositive(value.to_string()))
    );
}

#[test]
fn capture_spec_rejects_zero() {
    assert_eq!(CaptureSpec::new(0), None);
    assert_eq!(CaptureSpec::new(2).map(|s| s.max_files.get()), Some(2));
}
