#![allow(clippy::unwrap_used, clippy::expect_used)]

use ocf_rep::{decode_rep, encode_rep, DecodeLimits, RepPayload};

fn sample() -> RepPayload {
    let mut inner = RepPayload::new();
    inner.set_prop_string("unit", "C").unwrap();
    inner.set_prop_double("value", 21.5).unwrap();

    let mut p = RepPayload::new();
    p.set_uri("/a/thermo").unwrap();
    p.add_resource_type("oic.r.temperature").unwrap();
    p.set_prop_object("reading", &inner).unwrap();
    p.set_string_array("labels", &["kitchen", "north"], [2, 0, 0])
        .unwrap();
    p.set_object_array("history", &[inner.clone_node().unwrap()], [1, 0, 0])
        .unwrap();
    p
}

#[test]
fn clone_is_structurally_equal() {
    let p = sample();
    let c = p.clone_node().unwrap();
    assert_eq!(c, p);
    assert_eq!(c.get_string_array("labels"), p.get_string_array("labels"));
}

#[test]
fn mutating_the_clone_leaves_the_source_alone() {
    let p = sample();
    let mut c = p.clone_node().unwrap();

    let (mut labels, dims) = c.get_string_array("labels").unwrap();
    labels[0].push_str("-renamed");
    c.set_string_array("labels", labels.as_slice(), dims).unwrap();

    let (orig, _) = p.get_string_array("labels").unwrap();
    assert_eq!(orig, ["kitchen", "north"]);
    let (changed, _) = c.get_string_array("labels").unwrap();
    assert_eq!(changed, ["kitchen-renamed", "north"]);
    assert_ne!(c, p);
}

#[test]
fn clones_drop_independently() {
    let p = sample();
    let c = p.clone_chain().unwrap();
    drop(p);
    assert_eq!(
        c.get_prop_object("reading").unwrap().get_prop_string("unit"),
        Some("C")
    );
}

#[test]
fn node_and_chain_clones_differ_on_next() {
    let mut p = sample();
    p.append(sample());
    assert!(p.clone_node().unwrap().next().is_none());
    let c = p.clone_chain().unwrap();
    assert_eq!(c.chain().count(), 2);
    assert_eq!(c, p);
}

#[test]
fn decoded_trees_clone_too() {
    let bytes = encode_rep(&sample()).unwrap();
    let p = decode_rep(&bytes, DecodeLimits::default()).unwrap();
    assert_eq!(p.clone_chain().unwrap(), p);
}

#[test]
fn long_chains_and_deep_nesting_drop_without_recursion() {
    let mut head = RepPayload::new();
    for _ in 0..100_000 {
        let mut node = RepPayload::new();
        node.append(head);
        head = node;
    }
    assert_eq!(head.chain().count(), 100_001);
    drop(head);

    let mut deep = RepPayload::new();
    for _ in 0..100_000 {
        let mut outer = RepPayload::new();
        outer.set_prop_object_as_owner("o", deep).unwrap();
        deep = outer;
    }
    drop(deep);
}
