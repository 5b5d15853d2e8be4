use alloc::vec::Vec;

use crate::alloc_util::try_reserve;
use crate::{ErrorCode, PayloadError, StringList};

trait Sink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), PayloadError>;

    fn write_u8(&mut self, byte: u8) -> Result<(), PayloadError> {
        self.write(&[byte])
    }

    fn position(&self) -> usize;
}

struct VecSink {
    buf: Vec<u8>,
}

impl VecSink {
    const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::new();
        let _ = buf.try_reserve(capacity);
        Self { buf }
    }

    fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    fn reserve(&mut self, additional: usize) -> Result<(), PayloadError> {
        let available = self.buf.capacity().saturating_sub(self.buf.len());
        if additional <= available {
            return Ok(());
        }
        let offset = self.buf.len();
        try_reserve(&mut self.buf, additional, offset)
    }
}

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), PayloadError> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<(), PayloadError> {
        if self.buf.len() == self.buf.capacity() {
            self.reserve(1)?;
        }
        self.buf.push(byte);
        Ok(())
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

fn encode_int<S: Sink>(sink: &mut S, v: i64) -> Result<(), PayloadError> {
    match u64::try_from(v) {
        Ok(u) => encode_major_uint(sink, 0, u),
        // -1 - v for negative v never overflows and is non-negative.
        Err(_) => encode_major_uint(sink, 1, !(v as u64)),
    }
}

fn encode_bytes<S: Sink>(sink: &mut S, bytes: &[u8]) -> Result<(), PayloadError> {
    encode_major_len(sink, 2, bytes.len())?;
    sink.write(bytes)
}

fn encode_text<S: Sink>(sink: &mut S, s: &str) -> Result<(), PayloadError> {
    let b = s.as_bytes();
    encode_major_len(sink, 3, b.len())?;
    sink.write(b)
}

fn encode_float64<S: Sink>(sink: &mut S, v: f64) -> Result<(), PayloadError> {
    let mut buf = [0u8; 9];
    buf[0] = 0xfb;
    buf[1..9].copy_from_slice(&v.to_bits().to_be_bytes());
    sink.write(&buf)
}

fn encode_major_len<S: Sink>(sink: &mut S, major: u8, len: usize) -> Result<(), PayloadError> {
    let len_u64 = u64::try_from(len)
        .map_err(|_| PayloadError::new(ErrorCode::LengthOverflow, sink.position()))?;
    encode_major_uint(sink, major, len_u64)
}

fn encode_major_uint<S: Sink>(sink: &mut S, major: u8, value: u64) -> Result<(), PayloadError> {
    debug_assert!(major <= 7);
    if let Ok(v8) = u8::try_from(value) {
        if v8 < 24 {
            return sink.write_u8((major << 5) | v8);
        }
        sink.write_u8((major << 5) | 24)?;
        return sink.write_u8(v8);
    }
    if let Ok(v16) = u16::try_from(value) {
        sink.write_u8((major << 5) | 25)?;
        return sink.write(&v16.to_be_bytes());
    }
    if let Ok(v32) = u32::try_from(value) {
        sink.write_u8((major << 5) | 26)?;
        return sink.write(&v32.to_be_bytes());
    }
    sink.write_u8((major << 5) | 27)?;
    sink.write(&value.to_be_bytes())
}

/// Streaming encoder that writes CBOR directly into a `Vec<u8>`.
///
/// Integer and length headers use the shortest form. Doubles are always written as
/// float64 so that values survive a round trip bit-for-bit. Map keys are written in
/// the order the caller supplies them.
pub struct Encoder {
    sink: VecSink,
}

impl Encoder {
    /// Create a new encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sink: VecSink::new(),
        }
    }

    /// Create an encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sink: VecSink::with_capacity(capacity),
        }
    }

    /// Return the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sink.buf.len()
    }

    /// Returns `true` if no bytes have been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sink.buf.is_empty()
    }

    /// Consume and return the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.sink.into_vec()
    }

    /// Borrow the bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.sink.buf
    }

    /// Encode CBOR null.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn null(&mut self) -> Result<(), PayloadError> {
        self.sink.write_u8(0xf6)
    }

    /// Encode a CBOR boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn bool(&mut self, v: bool) -> Result<(), PayloadError> {
        self.sink.write_u8(if v { 0xf5 } else { 0xf4 })
    }

    /// Encode a signed 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn int(&mut self, v: i64) -> Result<(), PayloadError> {
        encode_int(&mut self.sink, v)
    }

    /// Encode a double as float64.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn double(&mut self, v: f64) -> Result<(), PayloadError> {
        encode_float64(&mut self.sink, v)
    }

    /// Encode a byte string.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn bytes(&mut self, b: &[u8]) -> Result<(), PayloadError> {
        encode_bytes(&mut self.sink, b)
    }

    /// Encode a text string.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn text(&mut self, s: &str) -> Result<(), PayloadError> {
        encode_text(&mut self.sink, s)
    }

    /// Encode a string list as an array of text strings.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn string_list(&mut self, list: &StringList) -> Result<(), PayloadError> {
        self.array(list.len(), |a| list.iter().try_for_each(|s| a.text(s)))
    }

    /// Encode a definite-length array and fill it via the provided builder.
    ///
    /// On error the buffer is truncated back to where the array started.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or if the builder emits a different number of items.
    pub fn array<F>(&mut self, len: usize, f: F) -> Result<(), PayloadError>
    where
        F: FnOnce(&mut ArrayEncoder<'_>) -> Result<(), PayloadError>,
    {
        let start = self.sink.buf.len();
        if let Err(err) = encode_major_len(&mut self.sink, 4, len) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        let mut a = ArrayEncoder {
            enc: self,
            remaining: len,
        };
        if let Err(err) = f(&mut a) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        if a.remaining != 0 {
            let err = PayloadError::new(ErrorCode::ArrayLenMismatch, self.sink.position());
            self.sink.buf.truncate(start);
            return Err(err);
        }
        Ok(())
    }

    /// Encode a definite-length map and fill it via the provided builder.
    ///
    /// On error the buffer is truncated back to where the map started.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or if the builder emits a different number of entries.
    pub fn map<F>(&mut self, len: usize, f: F) -> Result<(), PayloadError>
    where
        F: FnOnce(&mut MapEncoder<'_>) -> Result<(), PayloadError>,
    {
        let start = self.sink.buf.len();
        if let Err(err) = encode_major_len(&mut self.sink, 5, len) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        let mut m = MapEncoder {
            enc: self,
            remaining: len,
        };
        if let Err(err) = f(&mut m) {
            self.sink.buf.truncate(start);
            return Err(err);
        }
        if m.remaining != 0 {
            let err = PayloadError::new(ErrorCode::MapLenMismatch, self.sink.position());
            self.sink.buf.truncate(start);
            return Err(err);
        }
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for writing array elements.
pub struct ArrayEncoder<'a> {
    enc: &'a mut Encoder,
    remaining: usize,
}

impl ArrayEncoder<'_> {
    fn consume_one(&mut self) -> Result<(), PayloadError> {
        if self.remaining == 0 {
            return Err(PayloadError::new(
                ErrorCode::ArrayLenMismatch,
                self.enc.sink.position(),
            ));
        }
        self.remaining -= 1;
        Ok(())
    }

    /// Encode the next element with direct access to the encoder.
    ///
    /// The closure must write exactly one data item.
    ///
    /// # Errors
    ///
    /// Returns an error if the array length is exceeded or if encoding fails.
    pub fn item<F>(&mut self, f: F) -> Result<(), PayloadError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), PayloadError>,
    {
        self.consume_one()?;
        f(self.enc)
    }

    /// Encode a text string element.
    ///
    /// # Errors
    ///
    /// Returns an error if the array length is exceeded or if encoding fails.
    pub fn text(&mut self, s: &str) -> Result<(), PayloadError> {
        self.item(|e| e.text(s))
    }
}

/// Builder for writing map entries.
pub struct MapEncoder<'a> {
    enc: &'a mut Encoder,
    remaining: usize,
}

impl MapEncoder<'_> {
    /// Insert a map entry with a text key. The closure writes exactly one value.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared map length is exceeded or if encoding fails.
    pub fn entry<F>(&mut self, key: &str, f: F) -> Result<(), PayloadError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), PayloadError>,
    {
        if self.remaining == 0 {
            return Err(PayloadError::new(
                ErrorCode::MapLenMismatch,
                self.enc.sink.position(),
            ));
        }
        let entry_start = self.enc.sink.buf.len();
        let res = encode_text(&mut self.enc.sink, key).and_then(|()| f(self.enc));
        if let Err(err) = res {
            self.enc.sink.buf.truncate(entry_start);
            return Err(err);
        }
        self.remaining -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    fn encode_one(f: impl FnOnce(&mut Encoder) -> Result<(), PayloadError>) -> Vec<u8> {
        let mut enc = Encoder::new();
        f(&mut enc).unwrap();
        enc.into_vec()
    }

    #[test]
    fn int_boundaries() {
        assert_eq!(encode_one(|e| e.int(0)), vec![0x00]);
        assert_eq!(encode_one(|e| e.int(23)), vec![0x17]);
        assert_eq!(encode_one(|e| e.int(24)), vec![0x18, 0x18]);
        assert_eq!(encode_one(|e| e.int(256)), vec![0x19, 0x01, 0x00]);
        assert_eq!(encode_one(|e| e.int(-1)), vec![0x20]);
        assert_eq!(encode_one(|e| e.int(-25)), vec![0x38, 0x18]);

        let mut min = vec![0x3b];
        min.extend_from_slice(&(i64::MAX as u64).to_be_bytes());
        assert_eq!(encode_one(|e| e.int(i64::MIN)), min);
    }

    #[test]
    fn double_is_always_float64() {
        assert_eq!(
            encode_one(|e| e.double(1.5)),
            vec![0xfb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn map_len_mismatch_rolls_back() {
        let mut enc = Encoder::new();
        enc.null().unwrap();
        let err = enc.map(2, |m| m.entry("a", |e| e.int(1))).unwrap_err();
        assert_eq!(err.code, ErrorCode::MapLenMismatch);
        assert_eq!(enc.as_bytes(), &[0xf6]);
    }

    #[test]
    fn array_overflow_detected() {
        let mut enc = Encoder::new();
        let err = enc
            .array(1, |a| {
                a.text("x")?;
                a.text("y")
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ArrayLenMismatch);
        assert!(enc.is_empty());
    }

    #[test]
    fn string_list_is_text_array() {
        let list = StringList::from(vec![String::from("a"), String::from("bc")]);
        let bytes = encode_one(|e| e.string_list(&list));
        assert_eq!(bytes, vec![0x82, 0x61, b'a', 0x62, b'b', b'c']);
    }

    #[test]
    fn map_preserves_insertion_order() {
        let bytes = encode_one(|e| {
            e.map(2, |m| {
                m.entry("z", |e| e.bool(true))?;
                m.entry("a", Encoder::null)
            })
        });
        assert_eq!(bytes, vec![0xa2, 0x61, b'z', 0xf5, 0x61, b'a', 0xf6]);
    }
}
