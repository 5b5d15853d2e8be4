#![allow(clippy::unwrap_used, clippy::expect_used)]

use ocf_rep::{
    decode_rep, encode_rep, DecodeLimits, Encoder, ErrorCode, ErrorKind, PropType, PropValue,
    RepPayload,
};

fn decode(bytes: &[u8]) -> Result<RepPayload, ocf_rep::PayloadError> {
    decode_rep(bytes, DecodeLimits::for_bytes(bytes.len()))
}

fn led() -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.map(5, |m| {
        m.entry("href", |e| e.text("/a/led"))?;
        m.entry("rt", |e| e.array(1, |a| a.text("core.light")))?;
        m.entry("if", |e| e.array(1, |a| a.text("oic.if.baseline")))?;
        m.entry("power", |e| e.int(15))?;
        m.entry("on", |e| e.bool(true))
    })
    .unwrap();
    enc.into_vec()
}

#[test]
fn root_keys_fill_the_header() {
    let p = decode(&led()).unwrap();
    assert_eq!(p.uri(), Some("/a/led"));
    assert_eq!(p.types().as_slice(), ["core.light"]);
    assert_eq!(p.interfaces().as_slice(), ["oic.if.baseline"]);
    assert_eq!(p.get_prop_int("power"), Some(15));
    assert_eq!(p.get_prop_bool("on"), Some(true));
    for reserved in ["href", "rt", "if"] {
        assert!(p.find(reserved).is_none(), "{reserved} leaked into values");
    }
    assert_eq!(p.values().len(), 2);
}

#[test]
fn nested_arrays_fold_into_dimensions() {
    let mut enc = Encoder::new();
    enc.map(1, |m| {
        m.entry("m", |e| {
            e.array(2, |a| {
                a.item(|e| e.array(3, |r| (1..=3).try_for_each(|v| r.item(|e| e.int(v)))))?;
                a.item(|e| e.array(3, |r| (4..=6).try_for_each(|v| r.item(|e| e.int(v)))))
            })
        })
    })
    .unwrap();
    let p = decode(enc.as_bytes()).unwrap();
    let arr = p.get_array("m").unwrap();
    assert_eq!(arr.element_type(), PropType::Int);
    assert_eq!(arr.dimensions(), [2, 3, 0]);
    assert_eq!(arr.as_ints().unwrap(), [1, 2, 3, 4, 5, 6]);
}

#[test]
fn mixed_element_types_are_malformed() {
    // {"a": [1, "x"]}
    let bytes = [0xa1, 0x61, b'a', 0x82, 0x01, 0x61, b'x'];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Decode);
    assert_eq!(err.code, ErrorCode::MixedArray);
    assert!(err.is_malformed());
}

#[test]
fn mixed_types_in_a_later_row_are_malformed() {
    // {"a": [[1, 2], [3, 4.5]]}
    let bytes = [
        0xa1, 0x61, b'a', 0x82, 0x82, 0x01, 0x02, 0x82, 0x03, 0xfb, 0x40, 0x12, 0, 0, 0, 0, 0, 0,
    ];
    assert_eq!(decode(&bytes).unwrap_err().code, ErrorCode::MixedArray);
}

#[test]
fn empty_array_becomes_null() {
    // {"empty_array": []}
    let mut bytes = vec![0xa1, 0x6b];
    bytes.extend_from_slice(b"empty_array");
    bytes.push(0x80);
    let p = decode(&bytes).unwrap();
    assert!(p.is_null("empty_array"));
    assert!(p.get_array("empty_array").is_none());
}

#[test]
fn arrays_deeper_than_three_levels_are_rejected() {
    // {"a": [[[[1]]]]}
    let bytes = [0xa1, 0x61, b'a', 0x81, 0x81, 0x81, 0x81, 0x01];
    assert_eq!(decode(&bytes).unwrap_err().code, ErrorCode::ArrayDepthExceeded);
    // Three levels are fine.
    let bytes = [0xa1, 0x61, b'a', 0x81, 0x81, 0x81, 0x01];
    let p = decode(&bytes).unwrap();
    assert_eq!(p.get_array("a").unwrap().dimensions(), [1, 1, 1]);
}

#[test]
fn objects_nest_without_header_promotion() {
    // {"o": {"href": "/x", "v": 1}}
    let bytes = [
        0xa1, 0x61, b'o', 0xa2, 0x64, b'h', b'r', b'e', b'f', 0x62, b'/', b'x', 0x61, b'v', 0x01,
    ];
    let p = decode(&bytes).unwrap();
    let o = p.get_prop_object("o").unwrap();
    assert_eq!(o.uri(), None);
    assert_eq!(o.get_prop_string("href"), Some("/x"));
    assert_eq!(o.get_prop_int("v"), Some(1));
}

#[test]
fn floats_of_every_width_decode_as_double() {
    // {"h": 1.0 (f16), "s": 1.5 (f32)}
    let bytes = [
        0xa2, 0x61, b'h', 0xf9, 0x3c, 0x00, 0x61, b's', 0xfa, 0x3f, 0xc0, 0x00, 0x00,
    ];
    let p = decode(&bytes).unwrap();
    assert_eq!(p.find("h").unwrap().value(), &PropValue::Double(1.0));
    assert_eq!(p.get_prop_double("s"), Some(1.5));
}

#[test]
fn structural_errors() {
    let cases: &[(&[u8], ErrorCode)] = &[
        (&[], ErrorCode::UnexpectedEof),
        (&[0x01], ErrorCode::ExpectedMap),
        (&[0xa1, 0x61, b'a'], ErrorCode::UnexpectedEof),
        (&[0xa1, 0x01, 0x01], ErrorCode::MapKeyMustBeText),
        (&[0xbf, 0xff], ErrorCode::IndefiniteLengthForbidden),
        (&[0xa0, 0x00], ErrorCode::TrailingBytes),
    ];
    for (bytes, code) in cases {
        let err = decode_rep(bytes, DecodeLimits::default()).unwrap_err();
        assert_eq!(err.code, *code, "input {bytes:02x?}");
        assert_eq!(err.kind, ErrorKind::Decode);
    }
}

#[test]
fn encode_then_decode_preserves_the_tree() {
    let p = decode(&led()).unwrap();
    let bytes = encode_rep(&p).unwrap();
    assert_eq!(decode(&bytes).unwrap(), p);
}
