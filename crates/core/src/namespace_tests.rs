use super::*;

#[test]
fn namespace_new_and_deref() {
    let ns = Namespace::new("kube-system");
    assert_eq!(&*ns, "kube-system");
    assert_eq!(ns.to_string(), "kube-system");
}

#[test]
fn namespace_serde_is_transparent() {
    let ns = Namespace::new("default");
    let json = serde_json::to_string(&ns).unwrap();
    assert_eq!(json, "\"default\"");
    let back: Namespace = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ns);
}

#[test]
fn namespace_deref_coercion_with_scoped_name() {
    let ns = Namespace::new("ns");
    assert_eq!(scoped_name(&ns, "p1"), "ns/p1");
}

#[yare::parameterized(
    with_namespace = { "ns", "p1", "ns/p1" },
    bare_name      = { "",   "p1", "p1" },
)]
fn scoped(ns: &str, name: &str, expected: &str) {
    assert_eq!(scoped_name(ns, name), expected);
}

#[yare::parameterized(
    with_namespace = { "ns/p1",     ("ns", "p1") },
    bare_name      = { "p1",        ("", "p1") },
    extra_slash    = { "ns/a/b",    ("ns", "a/b") },
)]
fn split(input: &str, expected: (&str, &str)) {
    assert_eq!(split_scoped_name(input), expected);
}
