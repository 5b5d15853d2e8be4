use core::fmt;

/// The high-level class of an error.
///
/// - **InvalidParam**: a caller passed an argument the operation cannot accept.
/// - **Alloc**: an allocation failed or a size computation overflowed.
/// - **Decode**: the wire bytes are malformed or exceed the configured limits.
/// - **Encode**: the encoder was driven inconsistently (declared lengths not honored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid argument or unsupported payload kind.
    InvalidParam,
    /// Allocation failure.
    Alloc,
    /// Malformed wire data.
    Decode,
    /// Encoding failure.
    Encode,
}

/// A structured error code identifying the reason an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Property names must be non-empty.
    EmptyName,
    /// Array dimensions describe zero elements, or do not match the supplied buffer.
    InvalidDimensions,
    /// Byte-string copies require at least one byte.
    EmptyByteString,
    /// The payload kind tag is not recognized, or names no decodable payload.
    InvalidPayloadType,

    /// Memory allocation failed.
    AllocationFailed,
    /// Arithmetic overflow while computing a length/offset.
    LengthOverflow,

    /// Unexpected end-of-input while decoding.
    UnexpectedEof,
    /// Input contains trailing bytes after the top-level CBOR item.
    TrailingBytes,
    /// Input exceeds the configured message size.
    MessageLenLimitExceeded,
    /// Map nesting depth limit exceeded.
    DepthLimitExceeded,
    /// Array length exceeds limits.
    ArrayLenLimitExceeded,
    /// Map length exceeds limits.
    MapLenLimitExceeded,
    /// Byte string length exceeds limits.
    BytesLenLimitExceeded,
    /// Text string length exceeds limits.
    TextLenLimitExceeded,
    /// A multi-dimensional array would hold more elements than allowed.
    ArrayElementsLimitExceeded,
    /// Reserved additional-info value (28..30) was used.
    ReservedAdditionalInfo,
    /// Indefinite-length encoding was used.
    IndefiniteLengthForbidden,
    /// Expected a map at the current location.
    ExpectedMap,
    /// Expected an array at the current location.
    ExpectedArray,
    /// Expected a text string at the current location.
    ExpectedText,
    /// Expected an integer at the current location.
    ExpectedInteger,
    /// Map key was not a CBOR text string.
    MapKeyMustBeText,
    /// Integer does not fit the signed 64-bit range.
    IntegerOutOfRange,
    /// Invalid UTF-8 in a text string.
    Utf8Invalid,
    /// A CBOR item (tag, undefined, other simple value) has no property kind.
    UnsupportedValue,
    /// Array elements disagree in type or nesting.
    MixedArray,
    /// Arrays nest deeper than three levels.
    ArrayDepthExceeded,
    /// A key the payload kind requires is absent.
    MissingMandatoryKey,

    /// Array builder emitted a different number of items than declared.
    ArrayLenMismatch,
    /// Map builder emitted a different number of entries than declared.
    MapLenMismatch,
    /// Nested objects are deeper than the encoder will write.
    NestingTooDeep,
    /// A root value is named `href`, `rt` or `if`, which the root header owns.
    ReservedKey,
    /// A nested object carries a uri, resource types, interfaces or a chain,
    /// none of which a nested map can hold.
    UnencodableObject,
}

impl ErrorCode {
    /// The class this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::EmptyName
            | Self::InvalidDimensions
            | Self::EmptyByteString
            | Self::InvalidPayloadType => ErrorKind::InvalidParam,
            Self::AllocationFailed | Self::LengthOverflow => ErrorKind::Alloc,
            Self::ArrayLenMismatch
            | Self::MapLenMismatch
            | Self::NestingTooDeep
            | Self::ReservedKey
            | Self::UnencodableObject => ErrorKind::Encode,
            _ => ErrorKind::Decode,
        }
    }
}

/// A payload error with structured classification, a stable code, and a byte offset.
///
/// Offsets are meaningful for `Decode` errors and for encoder errors (position in the
/// output buffer). Builder errors carry offset `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadError {
    /// The error kind.
    pub kind: ErrorKind,
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset where the error was detected.
    pub offset: usize,
}

impl PayloadError {
    /// Construct an error for `code` at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self {
            kind: code.kind(),
            code,
            offset,
        }
    }

    /// Construct an invalid-argument error raised by the builder API.
    #[inline]
    #[must_use]
    pub const fn invalid(code: ErrorCode) -> Self {
        Self::new(code, 0)
    }

    /// Returns true iff this error reports malformed wire data.
    #[inline]
    #[must_use]
    pub const fn is_malformed(self) -> bool {
        matches!(self.kind, ErrorKind::Decode)
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.code {
            ErrorCode::EmptyName => "property name must not be empty",
            ErrorCode::InvalidDimensions => "invalid array dimensions",
            ErrorCode::EmptyByteString => "byte string must not be empty",
            ErrorCode::InvalidPayloadType => "invalid payload type",

            ErrorCode::AllocationFailed => "allocation failed",
            ErrorCode::LengthOverflow => "length overflow",

            ErrorCode::UnexpectedEof => "unexpected end of input",
            ErrorCode::TrailingBytes => "trailing bytes after payload",
            ErrorCode::MessageLenLimitExceeded => "message length exceeds decode limits",
            ErrorCode::DepthLimitExceeded => "nesting depth limit exceeded",
            ErrorCode::ArrayLenLimitExceeded => "array length exceeds decode limits",
            ErrorCode::MapLenLimitExceeded => "map length exceeds decode limits",
            ErrorCode::BytesLenLimitExceeded => "byte string length exceeds decode limits",
            ErrorCode::TextLenLimitExceeded => "text string length exceeds decode limits",
            ErrorCode::ArrayElementsLimitExceeded => "array element count exceeds decode limits",
            ErrorCode::ReservedAdditionalInfo => "reserved additional info value",
            ErrorCode::IndefiniteLengthForbidden => "indefinite length forbidden",
            ErrorCode::ExpectedMap => "expected map",
            ErrorCode::ExpectedArray => "expected array",
            ErrorCode::ExpectedText => "expected text string",
            ErrorCode::ExpectedInteger => "expected integer",
            ErrorCode::MapKeyMustBeText => "map keys must be text strings",
            ErrorCode::IntegerOutOfRange => "integer outside i64 range",
            ErrorCode::Utf8Invalid => "text must be valid UTF-8",
            ErrorCode::UnsupportedValue => "unsupported CBOR value",
            ErrorCode::MixedArray => "array elements disagree in type or nesting",
            ErrorCode::ArrayDepthExceeded => "array nesting exceeds three dimensions",
            ErrorCode::MissingMandatoryKey => "mandatory key missing",

            ErrorCode::ArrayLenMismatch => "array length mismatch",
            ErrorCode::MapLenMismatch => "map length mismatch",
            ErrorCode::NestingTooDeep => "object nesting too deep to encode",
            ErrorCode::ReservedKey => "root value uses a reserved key",
            ErrorCode::UnencodableObject => "nested object has a header or chain",
        };

        match self.kind {
            ErrorKind::InvalidParam => write!(f, "invalid argument: {msg}"),
            ErrorKind::Alloc => write!(f, "out of memory at {}: {msg}", self.offset),
            ErrorKind::Encode => write!(f, "cbor encode failed at {}: {msg}", self.offset),
            ErrorKind::Decode => write!(f, "payload decode failed at {}: {msg}", self.offset),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PayloadError {}
