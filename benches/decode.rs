#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use ocf_rep::{decode_rep, encode_rep, DecodeLimits, RepPayload};

fn sample_small() -> Vec<u8> {
    vec![0xa1, 0x61, 0x61, 0x01] // {"a":1}
}

fn sample_medium() -> Vec<u8> {
    let mut p = RepPayload::new();
    p.set_uri("/a/sensor").unwrap();
    p.add_resource_type("oic.r.sensor").unwrap();
    p.add_interface("oic.if.baseline").unwrap();
    for i in 0..48_i64 {
        p.set_prop_int(&format!("k{i:03}"), i).unwrap();
    }
    let grid: Vec<f64> = (0..64).map(f64::from).collect();
    p.set_double_array("grid", &grid, [4, 4, 4]).unwrap();
    let labels: Vec<String> = (0..16).map(|i| format!("label-{i}")).collect();
    p.set_string_array("labels", labels.as_slice(), [16, 0, 0])
        .unwrap();
    encode_rep(&p).unwrap()
}

fn bench_decode(c: &mut Criterion) {
    let small = sample_small();
    let small_limits = DecodeLimits::for_bytes(small.len());

    c.bench_function("decode_rep_small", |b| {
        b.iter(|| {
            let p = decode_rep(black_box(&small), small_limits).unwrap();
            black_box(p);
        })
    });

    let medium = sample_medium();
    let medium_limits = DecodeLimits::for_bytes(medium.len());

    c.bench_function("decode_rep_medium", |b| {
        b.iter(|| {
            let p = decode_rep(black_box(&medium), medium_limits).unwrap();
            black_box(p);
        })
    });

    let decoded = decode_rep(&medium, medium_limits).unwrap();
    c.bench_function("encode_rep_medium", |b| {
        b.iter(|| {
            let bytes = encode_rep(black_box(&decoded)).unwrap();
            black_box(bytes);
        })
    });

    c.bench_function("clone_chain_medium", |b| {
        b.iter(|| {
            let c = black_box(&decoded).clone_chain().unwrap();
            black_box(c);
        })
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
