// Every byte a payload allocates must be released when it is dropped, including
// after a decode that fails half way through building a tree.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use ocf_rep::{decode_rep, encode_rep, DecodeLimits, RepPayload};

struct Counting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    let _ = LIVE.try_with(|c| c.set(c.get() + delta));
}

#[allow(clippy::cast_possible_wrap)]
unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let p = System.alloc(layout);
        if !p.is_null() {
            track(layout.size() as isize);
        }
        p
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        track(-(layout.size() as isize));
        System.dealloc(ptr, layout);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let p = System.realloc(ptr, layout, new_size);
        if !p.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        p
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn live() -> isize {
    LIVE.with(Cell::get)
}

fn net<F: FnMut()>(mut f: F) -> isize {
    // The first run may initialize lazily registered statics.
    f();
    let before = live();
    f();
    live() - before
}

fn build() -> RepPayload {
    let mut inner = RepPayload::new();
    inner.set_prop_string("s", "nested").unwrap();
    let mut p = RepPayload::new();
    p.set_uri("/a/b").unwrap();
    p.add_resource_type("x.y").unwrap();
    p.set_prop_int("i", 1).unwrap();
    p.set_prop_byte_string("b", &[1, 2, 3]).unwrap();
    p.set_prop_object("o", &inner).unwrap();
    p.set_string_array("s", &["a", "b", "c", "d"], [2, 2, 0])
        .unwrap();
    p.set_object_array("objs", &[inner], [1, 0, 0]).unwrap();
    p.append(RepPayload::new());
    p
}

#[test]
fn payload_lifecycles_release_everything() {
    assert_eq!(net(|| drop(build())), 0, "create + drop");

    let p = build();
    assert_eq!(net(|| drop(p.clone_chain().unwrap())), 0, "clone + drop");

    let bytes = encode_rep(&p).unwrap();
    assert_eq!(
        net(|| drop(decode_rep(&bytes, DecodeLimits::default()).unwrap())),
        0,
        "decode + drop"
    );

    // The cut lands in the second node, after the first is fully built.
    let cut = &bytes[..bytes.len() - 1];
    assert_eq!(
        net(|| {
            decode_rep(cut, DecodeLimits::default()).unwrap_err();
        }),
        0,
        "failed decode"
    );

    // {"a": [[1, 2], ["x"]]}
    let mixed = [0xa1, 0x61, b'a', 0x82, 0x82, 0x01, 0x02, 0x81, 0x61, b'x'];
    assert_eq!(
        net(|| {
            decode_rep(&mixed, DecodeLimits::default()).unwrap_err();
        }),
        0,
        "mixed array"
    );
}
