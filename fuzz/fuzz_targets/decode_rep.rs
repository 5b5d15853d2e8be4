#![no_main]

use libfuzzer_sys::fuzz_target;

use ocf_rep::{decode_rep, DecodeLimits};

fn fuzz_limits(input_len: usize) -> DecodeLimits {
    let max = input_len.min(1 << 20);
    DecodeLimits {
        max_input_bytes: max,
        max_depth: 64,
        max_array_len: 1 << 12,
        max_map_len: 1 << 12,
        max_bytes_len: max,
        max_text_len: max,
        max_array_elements: 1 << 16,
        max_array_bytes: 1 << 22,
    }
}

fuzz_target!(|data: &[u8]| {
    let _ = decode_rep(data, fuzz_limits(data.len()));
});
