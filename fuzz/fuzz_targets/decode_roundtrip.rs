#![no_main]

use libfuzzer_sys::fuzz_target;

use ocf_rep::{decode_rep, encode_rep, DecodeLimits};

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits::for_bytes(data.len().max(64));
    if let Ok(p) = decode_rep(data, limits) {
        let bytes = encode_rep(&p).expect("decoded payloads encode");
        // NaN breaks PartialEq, so clones are compared by their encoding.
        let clone = p.clone_chain().expect("clone");
        assert_eq!(encode_rep(&clone).expect("encode clone"), bytes);

        let again = decode_rep(&bytes, DecodeLimits::default()).expect("re-decode");
        assert_eq!(encode_rep(&again).expect("re-encode"), bytes);
    }
});
