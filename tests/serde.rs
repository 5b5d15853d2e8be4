#![cfg(feature = "serde")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use ocf_rep::{decode_rep, DecodeLimits, RepPayload};
use serde_json::json;

#[test]
fn payload_serializes_like_its_wire_layout() {
    let mut inner = RepPayload::new();
    inner.set_prop_int("x", 1).unwrap();

    let mut p = RepPayload::new();
    p.set_uri("/a/led").unwrap();
    p.add_resource_type("core.light").unwrap();
    p.set_prop_bool("on", true).unwrap();
    p.set_null("none").unwrap();
    p.set_prop_object("o", &inner).unwrap();
    p.set_int_array("m", &[1, 2, 3, 4, 5, 6], [2, 3, 0]).unwrap();

    let v = serde_json::to_value(&p).unwrap();
    assert_eq!(
        v,
        json!({
            "href": "/a/led",
            "rt": ["core.light"],
            "on": true,
            "none": null,
            "o": {"x": 1},
            "m": [[1, 2, 3], [4, 5, 6]],
        })
    );
}

#[test]
fn chains_serialize_as_sequences() {
    // [{"a": 1}, {"b": "t"}]
    let bytes = [0x82, 0xa1, 0x61, b'a', 0x01, 0xa1, 0x61, b'b', 0x61, b't'];
    let p = decode_rep(&bytes, DecodeLimits::default()).unwrap();
    let text = serde_json::to_string(&p).unwrap();
    assert_eq!(text, r#"[{"a":1},{"b":"t"}]"#);
}

#[test]
fn three_dimensional_string_arrays_nest() {
    let mut p = RepPayload::new();
    p.set_string_array("s", &["a", "b", "c", "d"], [2, 1, 2])
        .unwrap();
    let v = serde_json::to_value(p.get_array("s").unwrap()).unwrap();
    assert_eq!(v, json!([[["a", "b"]], [["c", "d"]]]));
}

#[test]
fn values_the_wire_cannot_carry_fail_to_serialize() {
    let mut p = RepPayload::new();
    p.set_prop_int("rt", 5).unwrap();
    assert!(serde_json::to_value(&p).is_err());

    let mut inner = RepPayload::new();
    inner.set_uri("/child").unwrap();
    let mut q = RepPayload::new();
    q.set_prop_object("o", &inner).unwrap();
    assert!(serde_json::to_value(&q).is_err());
}
