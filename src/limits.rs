/// Default maximum map nesting depth.
///
/// Arrays are additionally bounded by [`MAX_REP_ARRAY_DEPTH`](crate::MAX_REP_ARRAY_DEPTH).
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum container length limit for arrays/maps.
///
/// This is a safety limit; adjust explicitly for your deployment.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 1 << 16;

/// Default maximum message size used by [`DecodeLimits::default`].
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1 << 20;

const ARRAY_BYTES_PER_INPUT_BYTE: usize = 32;

/// Decode-time resource limits.
///
/// Every limit is checked before the corresponding allocation is made, so a
/// hostile peer cannot make the decoder reserve more than these bounds allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum total input length in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth of maps (objects inside objects or arrays).
    pub max_depth: usize,
    /// Maximum length of a single CBOR array.
    pub max_array_len: usize,
    /// Maximum map length (pairs).
    pub max_map_len: usize,
    /// Maximum byte-string length.
    pub max_bytes_len: usize,
    /// Maximum text-string length in UTF-8 bytes.
    pub max_text_len: usize,
    /// Maximum element count of one decoded multi-dimensional array.
    ///
    /// Ragged arrays are padded to their bounding box, so this may exceed the
    /// number of elements present on the wire.
    pub max_array_elements: usize,
    /// Maximum in-memory size in bytes of one decoded array buffer.
    ///
    /// Checked before the buffer is allocated; wide element types such as
    /// nested objects reach it long before `max_array_elements`.
    pub max_array_bytes: usize,
}

impl DecodeLimits {
    /// Construct conservative limits derived from a maximum message size.
    ///
    /// The defaults are:
    /// - `max_input_bytes = max_message_bytes`
    /// - `max_bytes_len = max_text_len = max_message_bytes`
    /// - `max_array_elements = max_message_bytes`
    /// - `max_array_bytes = 32 * max_message_bytes`
    /// - `max_array_len` and `max_map_len` are capped by `DEFAULT_MAX_CONTAINER_LEN`
    #[must_use]
    pub fn for_bytes(max_message_bytes: usize) -> Self {
        let max_container_len = max_message_bytes.min(DEFAULT_MAX_CONTAINER_LEN);
        Self {
            max_input_bytes: max_message_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_len: max_container_len,
            max_map_len: max_container_len,
            max_bytes_len: max_message_bytes,
            max_text_len: max_message_bytes,
            max_array_elements: max_message_bytes,
            max_array_bytes: max_message_bytes.saturating_mul(ARRAY_BYTES_PER_INPUT_BYTE),
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::for_bytes(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_bytes_caps_container_len() {
        let l = DecodeLimits::for_bytes(1 << 20);
        assert_eq!(l.max_array_len, DEFAULT_MAX_CONTAINER_LEN);
        assert_eq!(l.max_map_len, DEFAULT_MAX_CONTAINER_LEN);
        assert_eq!(l.max_text_len, 1 << 20);

        let small = DecodeLimits::for_bytes(10);
        assert_eq!(small.max_array_len, 10);
        assert_eq!(small.max_depth, DEFAULT_MAX_DEPTH);
    }
}
