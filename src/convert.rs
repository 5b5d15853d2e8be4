//! Representation payload encoder, the inverse of [`decode_rep`](crate::decode_rep).

use alloc::vec::Vec;

use crate::limits::DEFAULT_MAX_DEPTH;
use crate::value::{active_depth, dim_stride, ArrayItems, Dimensions, PropValue, RepArray};
use crate::{keys, Encoder, ErrorCode, MapEncoder, PayloadError, RepPayload};

fn check_depth(enc: &Encoder, depth: usize) -> Result<(), PayloadError> {
    if depth > DEFAULT_MAX_DEPTH {
        return Err(PayloadError::new(ErrorCode::NestingTooDeep, enc.len()));
    }
    Ok(())
}

pub(crate) fn is_reserved_key(name: &str) -> bool {
    matches!(name, keys::HREF | keys::RESOURCE_TYPE | keys::INTERFACE)
}

pub(crate) fn has_header(p: &RepPayload) -> bool {
    p.uri().is_some() || !p.types().is_empty() || !p.interfaces().is_empty() || p.next().is_some()
}

fn write_root(enc: &mut Encoder, p: &RepPayload) -> Result<(), PayloadError> {
    if p.values().iter().any(|v| is_reserved_key(v.name())) {
        return Err(PayloadError::new(ErrorCode::ReservedKey, enc.len()));
    }
    let len = usize::from(p.uri().is_some())
        + usize::from(!p.types().is_empty())
        + usize::from(!p.interfaces().is_empty())
        + p.values().len();
    enc.map(len, |m| {
        if let Some(uri) = p.uri() {
            m.entry(keys::HREF, |e| e.text(uri))?;
        }
        if !p.types().is_empty() {
            m.entry(keys::RESOURCE_TYPE, |e| e.string_list(p.types()))?;
        }
        if !p.interfaces().is_empty() {
            m.entry(keys::INTERFACE, |e| e.string_list(p.interfaces()))?;
        }
        write_values(m, p, 1)
    })
}

fn write_values(
    m: &mut MapEncoder<'_>,
    p: &RepPayload,
    depth: usize,
) -> Result<(), PayloadError> {
    for v in p.values() {
        m.entry(v.name(), |e| write_value(e, v.value(), depth))?;
    }
    Ok(())
}

fn write_object(enc: &mut Encoder, p: &RepPayload, depth: usize) -> Result<(), PayloadError> {
    check_depth(enc, depth)?;
    if has_header(p) {
        return Err(PayloadError::new(ErrorCode::UnencodableObject, enc.len()));
    }
    enc.map(p.values().len(), |m| write_values(m, p, depth))
}

fn write_value(enc: &mut Encoder, value: &PropValue, depth: usize) -> Result<(), PayloadError> {
    match value {
        PropValue::Null => enc.null(),
        PropValue::Int(v) => enc.int(*v),
        PropValue::Double(v) => enc.double(*v),
        PropValue::Bool(v) => enc.bool(*v),
        PropValue::String(s) => enc.text(s),
        PropValue::ByteString(b) => enc.bytes(b),
        PropValue::Object(obj) => write_object(enc, obj, depth + 1),
        PropValue::Array(arr) => write_array(enc, arr, depth),
    }
}

fn write_array(enc: &mut Encoder, arr: &RepArray, depth: usize) -> Result<(), PayloadError> {
    let dims = arr.dimensions();
    match arr.items() {
        ArrayItems::Int(v) => write_level(enc, v, &dims, 0, 0, &mut |e, x| e.int(*x)),
        ArrayItems::Double(v) => write_level(enc, v, &dims, 0, 0, &mut |e, x| e.double(*x)),
        ArrayItems::Bool(v) => write_level(enc, v, &dims, 0, 0, &mut |e, x| e.bool(*x)),
        ArrayItems::String(v) => write_level(enc, v, &dims, 0, 0, &mut |e, x| e.text(x)),
        ArrayItems::ByteString(v) => write_level(enc, v, &dims, 0, 0, &mut |e, x| e.bytes(x)),
        ArrayItems::Object(v) => {
            write_level(enc, v, &dims, 0, 0, &mut |e, x| write_object(e, x, depth + 1))
        }
    }
}

/// Write axis `level` of a row-major buffer as one CBOR array.
fn write_level<T, F>(
    enc: &mut Encoder,
    items: &[T],
    dims: &Dimensions,
    level: usize,
    base: usize,
    write: &mut F,
) -> Result<(), PayloadError>
where
    F: FnMut(&mut Encoder, &T) -> Result<(), PayloadError>,
{
    let len = dims[level];
    let step = dim_stride(dims, level);
    let innermost = level + 1 >= active_depth(dims);
    enc.array(len, |a| {
        for i in 0..len {
            let at = base + i * step;
            if innermost {
                a.item(|e| {
                    let item = items
                        .get(at)
                        .ok_or_else(|| PayloadError::new(ErrorCode::ArrayLenMismatch, e.len()))?;
                    write(e, item)
                })?;
            } else {
                a.item(|e| write_level(e, items, dims, level + 1, at, &mut *write))?;
            }
        }
        Ok(())
    })
}

/// Append the CBOR form of `payload` to `enc`.
///
/// A single payload becomes a map; a chain becomes an array of maps. Root maps
/// carry `href`, `rt` and `if` (when set) ahead of the values, which keep their
/// insertion order. Nested objects are written as maps of their values only.
///
/// # Errors
///
/// Returns `NestingTooDeep` if objects nest deeper than the default decode depth,
/// `ReservedKey` if a root value is named `href`, `rt` or `if`, `UnencodableObject`
/// if a nested object has a uri, types, interfaces or a chain, or
/// `AllocationFailed` if the output buffer cannot grow. On error `enc` is left
/// as it was before the call.
pub fn encode_rep_into(enc: &mut Encoder, payload: &RepPayload) -> Result<(), PayloadError> {
    if payload.next().is_none() {
        return write_root(enc, payload);
    }
    let len = payload.chain().count();
    enc.array(len, |a| {
        payload
            .chain()
            .try_for_each(|node| a.item(|e| write_root(e, node)))
    })
}

/// Encode `payload` (and its chain) to CBOR.
///
/// # Errors
///
/// See [`encode_rep_into`].
pub fn encode_rep(payload: &RepPayload) -> Result<Vec<u8>, PayloadError> {
    let mut enc = Encoder::new();
    encode_rep_into(&mut enc, payload)?;
    Ok(enc.into_vec())
}

/// SHA-256 of the encoded payload, usable as an entity tag.
///
/// # Errors
///
/// See [`encode_rep_into`].
#[cfg(feature = "sha2")]
#[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
pub fn rep_digest(payload: &RepPayload) -> Result<[u8; 32], PayloadError> {
    use sha2::{Digest, Sha256};
    let bytes = encode_rep(payload)?;
    let mut h = Sha256::new();
    h.update(&bytes);
    let out = h.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(out.as_slice());
    Ok(digest)
}
