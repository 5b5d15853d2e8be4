//! Representation payload decoder.
//!
//! Maps are decoded by recursive descent, bounded by [`DecodeLimits::max_depth`].
//! Arrays take two passes over the same bytes: a forked cursor first infers the
//! element type and the bounding shape, then the main cursor fills a flat buffer
//! of exactly `calc_dim_total(dims)` zero-initialized slots.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use crate::alloc_util::{try_push, try_string_from_str, try_vec_default, try_vec_from_slice};
use crate::keys;
use crate::stream::{CborKind, CborStream};
use crate::strlist::StringList;
use crate::value::{
    active_depth, calc_dim_total, dim_stride, ArrayItems, Dimensions, PropType, PropValue,
    RepArray, MAX_REP_ARRAY_DEPTH,
};
use crate::{DecodeLimits, ErrorCode, PayloadError, RepPayload};

/// Inferred type and bounding box of one (sub-)array.
#[derive(Debug, Clone, Copy)]
struct Shape {
    dims: Dimensions,
    ty: PropType,
    /// Nesting levels below and including this array; `None` for `[]`.
    depth: Option<usize>,
}

const fn scalar_type(kind: CborKind) -> Option<PropType> {
    match kind {
        CborKind::Null => Some(PropType::Null),
        CborKind::Int => Some(PropType::Int),
        CborKind::Float => Some(PropType::Double),
        CborKind::Bool => Some(PropType::Bool),
        CborKind::Text => Some(PropType::String),
        CborKind::Bytes => Some(PropType::ByteString),
        CborKind::Map => Some(PropType::Object),
        CborKind::Array | CborKind::Tag | CborKind::Simple => None,
    }
}

fn merge_type(cur: PropType, next: PropType, off: usize) -> Result<PropType, PayloadError> {
    match (cur, next) {
        (_, PropType::Null) => Ok(cur),
        (PropType::Null, _) => Ok(next),
        (a, b) if a == b => Ok(a),
        _ => Err(PayloadError::new(ErrorCode::MixedArray, off)),
    }
}

/// First pass: infer `(dims, type)` of the array at the cursor, consuming it.
///
/// `level` is zero for the outermost array.
fn find_shape(s: &mut CborStream<'_>, level: usize) -> Result<Shape, PayloadError> {
    let off = s.position();
    if level >= MAX_REP_ARRAY_DEPTH {
        return Err(PayloadError::new(ErrorCode::ArrayDepthExceeded, off));
    }
    let len = s.read_array_len()?;
    let mut dims: Dimensions = [len, 0, 0];
    let mut ty = PropType::Null;
    let mut sub_depth: Option<usize> = None;
    let mut saw_array = false;
    let mut saw_scalar = false;

    for _ in 0..len {
        let elem_off = s.position();
        let kind = s.peek_kind()?;
        if kind == CborKind::Array {
            if saw_scalar {
                return Err(PayloadError::new(ErrorCode::MixedArray, elem_off));
            }
            saw_array = true;
            let sub = find_shape(s, level + 1)?;
            dims[1] = dims[1].max(sub.dims[0]);
            dims[2] = dims[2].max(sub.dims[1]);
            if let Some(d) = sub.depth {
                match sub_depth {
                    Some(prev) if prev != d => {
                        return Err(PayloadError::new(ErrorCode::MixedArray, elem_off));
                    }
                    _ => sub_depth = Some(d),
                }
            }
            ty = merge_type(ty, sub.ty, elem_off)?;
            continue;
        }

        let t = scalar_type(kind)
            .ok_or_else(|| PayloadError::new(ErrorCode::UnsupportedValue, elem_off))?;
        if t != PropType::Null {
            if saw_array {
                return Err(PayloadError::new(ErrorCode::MixedArray, elem_off));
            }
            saw_scalar = true;
        }
        ty = merge_type(ty, t, elem_off)?;
        s.skip_value()?;
    }

    let depth = if len == 0 {
        None
    } else {
        Some(1 + sub_depth.unwrap_or(usize::from(saw_array)))
    };
    Ok(Shape { dims, ty, depth })
}

/// Read `rt`/`if` style values: one text, or an array of texts, each split on whitespace.
pub(crate) fn read_tokens(
    s: &mut CborStream<'_>,
    list: &mut StringList,
) -> Result<(), PayloadError> {
    let off = s.position();
    match s.peek_kind()? {
        CborKind::Text => {
            let text = s.read_text()?;
            list.push_tokens(text, off)
        }
        CborKind::Array => {
            let len = s.read_array_len()?;
            for _ in 0..len {
                let off = s.position();
                let text = s.read_text()?;
                list.push_tokens(text, off)?;
            }
            Ok(())
        }
        _ => Err(PayloadError::new(ErrorCode::ExpectedText, off)),
    }
}

/// Read a text value into an owned string.
pub(crate) fn read_owned_text(s: &mut CborStream<'_>) -> Result<String, PayloadError> {
    let off = s.position();
    let text = s.read_text()?;
    try_string_from_str(text, off)
}

/// Reject input that exceeds the configured message size.
pub(crate) const fn check_input_len(
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<(), PayloadError> {
    if bytes.len() > limits.max_input_bytes {
        return Err(PayloadError::new(ErrorCode::MessageLenLimitExceeded, 0));
    }
    Ok(())
}

/// Reject bytes after the top-level item.
pub(crate) fn check_trailing(s: &CborStream<'_>) -> Result<(), PayloadError> {
    if s.is_at_end() {
        Ok(())
    } else {
        Err(PayloadError::new(ErrorCode::TrailingBytes, s.position()))
    }
}

type ReadElem<'a, T> = fn(&mut RepParser<'a>, usize) -> Result<T, PayloadError>;

/// Recursive-descent decoder for representation payloads.
pub(crate) struct RepParser<'a> {
    s: CborStream<'a>,
}

impl<'a> RepParser<'a> {
    pub(crate) const fn new(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            s: CborStream::new(data, 0, limits),
        }
    }

    /// Top-level item: a map, or an array of maps forming a `next` chain.
    pub(crate) fn parse_top(&mut self) -> Result<RepPayload, PayloadError> {
        let off = self.s.position();
        let payload = match self.s.peek_kind()? {
            CborKind::Map => self.parse_map(1, true)?,
            CborKind::Array => {
                let len = self.s.read_array_len()?;
                let mut nodes: Vec<RepPayload> = Vec::new();
                for _ in 0..len {
                    let node_off = self.s.position();
                    let node = self.parse_map(1, true)?;
                    try_push(&mut nodes, node, node_off)?;
                }
                RepPayload::from_batch(nodes)
            }
            _ => return Err(PayloadError::new(ErrorCode::ExpectedMap, off)),
        };
        check_trailing(&self.s)?;
        Ok(payload)
    }

    /// Decode one map. At the root, `href`, `rt` and `if` fill the payload header.
    fn parse_map(&mut self, depth: usize, root: bool) -> Result<RepPayload, PayloadError> {
        let off = self.s.position();
        if depth > self.s.limits().max_depth {
            return Err(PayloadError::new(ErrorCode::DepthLimitExceeded, off));
        }
        let len = self.s.read_map_len()?;
        let mut payload = RepPayload::new();
        for _ in 0..len {
            let key_off = self.s.position();
            let key = self.s.read_key()?;
            if root {
                match key {
                    keys::HREF => {
                        let uri = read_owned_text(&mut self.s)?;
                        payload.set_uri_as_owner(uri);
                        continue;
                    }
                    keys::RESOURCE_TYPE => {
                        read_tokens(&mut self.s, payload.types_mut())?;
                        continue;
                    }
                    keys::INTERFACE => {
                        read_tokens(&mut self.s, payload.interfaces_mut())?;
                        continue;
                    }
                    _ => {}
                }
            }
            let value = self.parse_value(depth)?;
            payload
                .find_and_set(key, value)
                .map_err(|e| PayloadError::new(e.code, key_off))?;
        }
        Ok(payload)
    }

    fn parse_value(&mut self, depth: usize) -> Result<PropValue, PayloadError> {
        let off = self.s.position();
        Ok(match self.s.peek_kind()? {
            CborKind::Null => {
                self.s.read_null()?;
                PropValue::Null
            }
            CborKind::Int => PropValue::Int(self.s.read_int()?),
            CborKind::Float => PropValue::Double(self.s.read_float()?),
            CborKind::Bool => PropValue::Bool(self.s.read_bool()?),
            CborKind::Text => PropValue::String(read_owned_text(&mut self.s)?),
            CborKind::Bytes => {
                let bytes = self.s.read_bytes()?;
                PropValue::ByteString(try_vec_from_slice(bytes, off)?)
            }
            CborKind::Map => PropValue::Object(Box::new(self.parse_map(depth + 1, false)?)),
            CborKind::Array => self
                .parse_array(depth)?
                .map_or(PropValue::Null, PropValue::Array),
            CborKind::Tag | CborKind::Simple => {
                return Err(PayloadError::new(ErrorCode::UnsupportedValue, off));
            }
        })
    }

    /// Decode the array at the cursor. Empty and all-null arrays yield `None`.
    fn parse_array(&mut self, depth: usize) -> Result<Option<RepArray>, PayloadError> {
        let off = self.s.position();
        let mut probe = self.s.fork_at(off);
        let shape = find_shape(&mut probe, 0)?;

        if shape.ty == PropType::Null {
            self.s.skip_value()?;
            return Ok(None);
        }
        let total = calc_dim_total(&shape.dims);
        if total > self.s.limits().max_array_elements {
            return Err(PayloadError::new(ErrorCode::ArrayElementsLimitExceeded, off));
        }

        let dims = &shape.dims;
        let items = match shape.ty {
            PropType::Int => ArrayItems::Int(self.fill(dims, total, depth, Self::read_int)?),
            PropType::Double => {
                ArrayItems::Double(self.fill(dims, total, depth, Self::read_double)?)
            }
            PropType::Bool => ArrayItems::Bool(self.fill(dims, total, depth, Self::read_bool)?),
            PropType::String => {
                ArrayItems::String(self.fill(dims, total, depth, Self::read_string)?)
            }
            PropType::ByteString => {
                ArrayItems::ByteString(self.fill(dims, total, depth, Self::read_byte_string)?)
            }
            PropType::Object => {
                ArrayItems::Object(self.fill(dims, total, depth, Self::read_object)?)
            }
            PropType::Null | PropType::Array => {
                return Err(PayloadError::new(ErrorCode::MixedArray, off));
            }
        };
        RepArray::new(items, shape.dims)
            .map(Some)
            .map_err(|e| PayloadError::new(e.code, off))
    }

    /// Second pass: allocate `total` zero slots and fill them from the main cursor.
    fn fill<T: Default>(
        &mut self,
        dims: &Dimensions,
        total: usize,
        depth: usize,
        read: ReadElem<'a, T>,
    ) -> Result<Vec<T>, PayloadError> {
        let off = self.s.position();
        let bytes = total.saturating_mul(mem::size_of::<T>());
        if bytes > self.s.limits().max_array_bytes {
            return Err(PayloadError::new(ErrorCode::ArrayElementsLimitExceeded, off));
        }
        let mut buf = try_vec_default(total, off)?;
        self.fill_level(&mut buf, dims, 0, 0, depth, read)?;
        Ok(buf)
    }

    fn fill_level<T>(
        &mut self,
        buf: &mut [T],
        dims: &Dimensions,
        level: usize,
        base: usize,
        depth: usize,
        read: ReadElem<'a, T>,
    ) -> Result<(), PayloadError> {
        let len = self.s.read_array_len()?;
        let step = dim_stride(dims, level);
        for i in 0..len {
            let off = self.s.position();
            let at = i
                .checked_mul(step)
                .and_then(|o| o.checked_add(base))
                .ok_or_else(|| PayloadError::new(ErrorCode::LengthOverflow, off))?;
            match self.s.peek_kind()? {
                CborKind::Null => self.s.read_null()?,
                CborKind::Array if level + 1 < active_depth(dims) => {
                    self.fill_level(buf, dims, level + 1, at, depth, read)?;
                }
                CborKind::Array => return Err(PayloadError::new(ErrorCode::MixedArray, off)),
                _ => {
                    let slot = buf
                        .get_mut(at)
                        .ok_or_else(|| PayloadError::new(ErrorCode::MixedArray, off))?;
                    *slot = read(self, depth)?;
                }
            }
        }
        Ok(())
    }

    fn read_int(&mut self, _depth: usize) -> Result<i64, PayloadError> {
        self.s.read_int()
    }

    fn read_double(&mut self, _depth: usize) -> Result<f64, PayloadError> {
        self.s.read_float()
    }

    fn read_bool(&mut self, _depth: usize) -> Result<bool, PayloadError> {
        self.s.read_bool()
    }

    fn read_string(&mut self, _depth: usize) -> Result<String, PayloadError> {
        read_owned_text(&mut self.s)
    }

    fn read_byte_string(&mut self, _depth: usize) -> Result<Vec<u8>, PayloadError> {
        let off = self.s.position();
        let bytes = self.s.read_bytes()?;
        try_vec_from_slice(bytes, off)
    }

    fn read_object(&mut self, depth: usize) -> Result<RepPayload, PayloadError> {
        self.parse_map(depth + 1, false)
    }
}

/// Decode a representation payload from CBOR.
///
/// A top-level map yields one payload; a top-level array of maps yields a chain
/// linked through [`RepPayload::next`], and an empty array yields an empty payload.
///
/// # Errors
///
/// Returns a `Decode` error for malformed input or exceeded limits, and
/// `AllocationFailed` if memory runs out. Nothing built before the failure survives.
pub fn decode_rep(bytes: &[u8], limits: DecodeLimits) -> Result<RepPayload, PayloadError> {
    check_input_len(bytes, &limits)?;
    RepParser::new(bytes, limits).parse_top().map_err(|err| {
        tracing::debug!(code = ?err.code, offset = err.offset, "representation decode failed");
        err
    })
}
