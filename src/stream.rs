//! Forward-only CBOR reader used by the payload decoders.
//!
//! Accepts any definite-length encoding a conforming OCF peer may produce:
//! non-shortest integer and length forms, and half/single/double floats.
//! Indefinite lengths are rejected.

use alloc::vec::Vec;

use crate::alloc_util::try_push;
use crate::utf8;
use crate::{DecodeLimits, ErrorCode, PayloadError};

/// The CBOR data model as seen by the payload decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CborKind {
    /// Major type 0/1.
    Int,
    /// Major type 2.
    Bytes,
    /// Major type 3.
    Text,
    /// Major type 4.
    Array,
    /// Major type 5.
    Map,
    /// Major type 6.
    Tag,
    /// Simple value true/false.
    Bool,
    /// Simple value null.
    Null,
    /// Half, single or double precision float.
    Float,
    /// Any other simple value (including `undefined`).
    Simple,
}

const F16_SUBNORMAL_UNIT: f64 = 1.0 / 16_777_216.0;

fn f16_to_f64(half: u16) -> f64 {
    let sign = u64::from(half >> 15) << 63;
    let exp = (half >> 10) & 0x1f;
    let mant = u64::from(half & 0x3ff);
    match exp {
        0 => {
            #[allow(clippy::cast_precision_loss)]
            let mag = (mant as f64) * F16_SUBNORMAL_UNIT;
            if sign == 0 {
                mag
            } else {
                -mag
            }
        }
        31 => f64::from_bits(sign | 0x7ff0_0000_0000_0000 | (mant << 42)),
        _ => {
            let exp64 = u64::from(exp) + 1023 - 15;
            f64::from_bits(sign | (exp64 << 52) | (mant << 42))
        }
    }
}

#[derive(Clone, Copy)]
pub struct CborStream<'a> {
    data: &'a [u8],
    pos: usize,
    limits: DecodeLimits,
}

impl<'a> CborStream<'a> {
    pub const fn new(data: &'a [u8], pos: usize, limits: DecodeLimits) -> Self {
        Self { data, pos, limits }
    }

    pub const fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub const fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// A second reader over the same bytes, positioned at `pos`.
    pub const fn fork_at(&self, pos: usize) -> Self {
        Self {
            data: self.data,
            pos,
            limits: self.limits,
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, PayloadError> {
        let off = self.pos;
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| PayloadError::new(ErrorCode::UnexpectedEof, off))?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], PayloadError> {
        let off = self.pos;
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| PayloadError::new(ErrorCode::LengthOverflow, off))?;
        if end > self.data.len() {
            return Err(PayloadError::new(ErrorCode::UnexpectedEof, off));
        }
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    pub fn read_be_u16(&mut self) -> Result<u16, PayloadError> {
        let s = self.read_exact(2)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }

    pub fn read_be_u32(&mut self) -> Result<u32, PayloadError> {
        let s = self.read_exact(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    pub fn read_be_u64(&mut self) -> Result<u64, PayloadError> {
        let s = self.read_exact(8)?;
        Ok(u64::from_be_bytes([
            s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7],
        ]))
    }

    fn read_header(&mut self) -> Result<(u8, u8, usize), PayloadError> {
        let off = self.pos;
        let ib = self.read_u8()?;
        Ok((ib >> 5, ib & 0x1f, off))
    }

    pub fn read_uint_arg(&mut self, ai: u8, off: usize) -> Result<u64, PayloadError> {
        match ai {
            0..=23 => Ok(u64::from(ai)),
            24 => Ok(u64::from(self.read_u8()?)),
            25 => Ok(u64::from(self.read_be_u16()?)),
            26 => Ok(u64::from(self.read_be_u32()?)),
            27 => self.read_be_u64(),
            31 => Err(PayloadError::new(ErrorCode::IndefiniteLengthForbidden, off)),
            _ => Err(PayloadError::new(ErrorCode::ReservedAdditionalInfo, off)),
        }
    }

    pub fn read_len_arg(&mut self, ai: u8, off: usize) -> Result<usize, PayloadError> {
        let len = self.read_uint_arg(ai, off)?;
        usize::try_from(len).map_err(|_| PayloadError::new(ErrorCode::LengthOverflow, off))
    }

    /// Classify the next item without consuming it.
    pub fn peek_kind(&self) -> Result<CborKind, PayloadError> {
        let off = self.pos;
        let ib = *self
            .data
            .get(off)
            .ok_or_else(|| PayloadError::new(ErrorCode::UnexpectedEof, off))?;
        Ok(match ib >> 5 {
            0 | 1 => CborKind::Int,
            2 => CborKind::Bytes,
            3 => CborKind::Text,
            4 => CborKind::Array,
            5 => CborKind::Map,
            6 => CborKind::Tag,
            _ => match ib & 0x1f {
                20 | 21 => CborKind::Bool,
                22 => CborKind::Null,
                25..=27 => CborKind::Float,
                _ => CborKind::Simple,
            },
        })
    }

    pub fn read_int(&mut self) -> Result<i64, PayloadError> {
        let (major, ai, off) = self.read_header()?;
        match major {
            0 => {
                let v = self.read_uint_arg(ai, off)?;
                i64::try_from(v).map_err(|_| PayloadError::new(ErrorCode::IntegerOutOfRange, off))
            }
            1 => {
                let n = self.read_uint_arg(ai, off)?;
                let n = i64::try_from(n)
                    .map_err(|_| PayloadError::new(ErrorCode::IntegerOutOfRange, off))?;
                Ok(-1 - n)
            }
            _ => Err(PayloadError::new(ErrorCode::ExpectedInteger, off)),
        }
    }

    /// Read a float of any width, widened to `f64`.
    pub fn read_float(&mut self) -> Result<f64, PayloadError> {
        let (major, ai, off) = self.read_header()?;
        if major != 7 {
            return Err(PayloadError::new(ErrorCode::UnsupportedValue, off));
        }
        match ai {
            25 => Ok(f16_to_f64(self.read_be_u16()?)),
            26 => Ok(f64::from(f32::from_bits(self.read_be_u32()?))),
            27 => Ok(f64::from_bits(self.read_be_u64()?)),
            _ => Err(PayloadError::new(ErrorCode::UnsupportedValue, off)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, PayloadError> {
        let (major, ai, off) = self.read_header()?;
        match (major, ai) {
            (7, 20) => Ok(false),
            (7, 21) => Ok(true),
            _ => Err(PayloadError::new(ErrorCode::UnsupportedValue, off)),
        }
    }

    pub fn read_null(&mut self) -> Result<(), PayloadError> {
        let (major, ai, off) = self.read_header()?;
        if major == 7 && ai == 22 {
            Ok(())
        } else {
            Err(PayloadError::new(ErrorCode::UnsupportedValue, off))
        }
    }

    pub fn read_text(&mut self) -> Result<&'a str, PayloadError> {
        let (major, ai, off) = self.read_header()?;
        if major != 3 {
            return Err(PayloadError::new(ErrorCode::ExpectedText, off));
        }
        let len = self.read_len_arg(ai, off)?;
        if len > self.limits.max_text_len {
            return Err(PayloadError::new(ErrorCode::TextLenLimitExceeded, off));
        }
        let bytes = self.read_exact(len)?;
        utf8::validate(bytes).map_err(|()| PayloadError::new(ErrorCode::Utf8Invalid, off))
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8], PayloadError> {
        let (major, ai, off) = self.read_header()?;
        if major != 2 {
            return Err(PayloadError::new(ErrorCode::UnsupportedValue, off));
        }
        let len = self.read_len_arg(ai, off)?;
        if len > self.limits.max_bytes_len {
            return Err(PayloadError::new(ErrorCode::BytesLenLimitExceeded, off));
        }
        self.read_exact(len)
    }

    /// Read an array header and return its element count.
    pub fn read_array_len(&mut self) -> Result<usize, PayloadError> {
        let (major, ai, off) = self.read_header()?;
        if major != 4 {
            return Err(PayloadError::new(ErrorCode::ExpectedArray, off));
        }
        let len = self.read_len_arg(ai, off)?;
        if len > self.limits.max_array_len {
            return Err(PayloadError::new(ErrorCode::ArrayLenLimitExceeded, off));
        }
        Ok(len)
    }

    /// Read a map header and return its pair count.
    pub fn read_map_len(&mut self) -> Result<usize, PayloadError> {
        let (major, ai, off) = self.read_header()?;
        if major != 5 {
            return Err(PayloadError::new(ErrorCode::ExpectedMap, off));
        }
        let len = self.read_len_arg(ai, off)?;
        if len > self.limits.max_map_len {
            return Err(PayloadError::new(ErrorCode::MapLenLimitExceeded, off));
        }
        Ok(len)
    }

    /// Read a map key, which must be a text string.
    pub fn read_key(&mut self) -> Result<&'a str, PayloadError> {
        let off = self.pos;
        if self.peek_kind()? != CborKind::Text {
            return Err(PayloadError::new(ErrorCode::MapKeyMustBeText, off));
        }
        self.read_text()
    }

    /// Skip one complete data item, including nested containers.
    ///
    /// Nesting is tracked on an explicit stack, so skipping deeply nested
    /// hostile input does not grow the call stack.
    pub fn skip_value(&mut self) -> Result<(), PayloadError> {
        let mut stack: Vec<usize> = Vec::new();
        try_push(&mut stack, 1, self.pos)?;

        while let Some(remaining) = stack.last_mut() {
            if *remaining == 0 {
                stack.pop();
                continue;
            }
            *remaining -= 1;

            let (major, ai, off) = self.read_header()?;
            match major {
                0 | 1 => {
                    let _ = self.read_uint_arg(ai, off)?;
                }
                2 | 3 => {
                    let len = self.read_len_arg(ai, off)?;
                    let _ = self.read_exact(len)?;
                }
                4 => {
                    let len = self.read_len_arg(ai, off)?;
                    if len > self.limits.max_array_len {
                        return Err(PayloadError::new(ErrorCode::ArrayLenLimitExceeded, off));
                    }
                    try_push(&mut stack, len, off)?;
                }
                5 => {
                    let len = self.read_len_arg(ai, off)?;
                    if len > self.limits.max_map_len {
                        return Err(PayloadError::new(ErrorCode::MapLenLimitExceeded, off));
                    }
                    let items = len
                        .checked_mul(2)
                        .ok_or_else(|| PayloadError::new(ErrorCode::LengthOverflow, off))?;
                    try_push(&mut stack, items, off)?;
                }
                6 => {
                    let _ = self.read_uint_arg(ai, off)?;
                    try_push(&mut stack, 1, off)?;
                }
                _ => match ai {
                    0..=23 => {}
                    24 => {
                        let _ = self.read_u8()?;
                    }
                    25 => {
                        let _ = self.read_be_u16()?;
                    }
                    26 => {
                        let _ = self.read_be_u32()?;
                    }
                    27 => {
                        let _ = self.read_be_u64()?;
                    }
                    31 => {
                        return Err(PayloadError::new(ErrorCode::IndefiniteLengthForbidden, off))
                    }
                    _ => return Err(PayloadError::new(ErrorCode::ReservedAdditionalInfo, off)),
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn stream(bytes: &[u8]) -> CborStream<'_> {
        CborStream::new(bytes, 0, DecodeLimits::for_bytes(bytes.len()))
    }

    #[test]
    fn reads_non_shortest_integers() {
        assert_eq!(stream(&[0x18, 0x05]).read_int().unwrap(), 5);
        assert_eq!(stream(&[0x39, 0x01, 0x00]).read_int().unwrap(), -257);
        let mut max = vec![0x1b];
        max.extend_from_slice(&u64::MAX.to_be_bytes());
        let err = stream(&max).read_int().unwrap_err();
        assert_eq!(err.code, ErrorCode::IntegerOutOfRange);
    }

    #[test]
    fn widens_half_and_single_floats() {
        assert_eq!(stream(&[0xf9, 0x3c, 0x00]).read_float().unwrap(), 1.0);
        assert_eq!(stream(&[0xf9, 0xc4, 0x00]).read_float().unwrap(), -4.0);
        assert_eq!(stream(&[0xf9, 0x00, 0x01]).read_float().unwrap(), F16_SUBNORMAL_UNIT);
        assert!(stream(&[0xf9, 0x7c, 0x00]).read_float().unwrap().is_infinite());
        assert!(stream(&[0xf9, 0x7e, 0x00]).read_float().unwrap().is_nan());
        assert_eq!(
            stream(&[0xfa, 0x3f, 0xc0, 0x00, 0x00]).read_float().unwrap(),
            1.5
        );
    }

    #[test]
    fn skip_value_walks_nested_containers() {
        // [{"a": [1, h'00']}, tag(1) 0] followed by a trailing 0x01
        let bytes = [
            0x82, 0xa1, 0x61, b'a', 0x82, 0x01, 0x41, 0x00, 0xc1, 0x00, 0x01,
        ];
        let mut s = stream(&bytes);
        s.skip_value().unwrap();
        assert_eq!(s.position(), 10);
    }

    #[test]
    fn rejects_indefinite_lengths() {
        let err = stream(&[0x9f, 0xff]).read_array_len().unwrap_err();
        assert_eq!(err.code, ErrorCode::IndefiniteLengthForbidden);
    }

    #[test]
    fn keys_must_be_text() {
        let err = stream(&[0x01]).read_key().unwrap_err();
        assert_eq!(err.code, ErrorCode::MapKeyMustBeText);
    }

    #[test]
    fn text_limit_enforced() {
        let bytes = [0x63, b'a', b'b', b'c'];
        let mut limits = DecodeLimits::for_bytes(bytes.len());
        limits.max_text_len = 2;
        let err = CborStream::new(&bytes, 0, limits).read_text().unwrap_err();
        assert_eq!(err.code, ErrorCode::TextLenLimitExceeded);
    }
}
