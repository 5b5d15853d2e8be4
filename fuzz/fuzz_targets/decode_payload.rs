#![no_main]

use libfuzzer_sys::fuzz_target;

use ocf_rep::{decode_payload, encode_payload, PayloadType};

fuzz_target!(|data: &[u8]| {
    let Some((&tag, rest)) = data.split_first() else {
        return;
    };
    let Ok(kind) = PayloadType::try_from(tag % 8) else {
        return;
    };
    if let Ok(p) = decode_payload(kind, rest) {
        let _ = encode_payload(&p);
    }
});
