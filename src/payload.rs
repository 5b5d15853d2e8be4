//! Payload-kind dispatch.
//!
//! A [`PayloadType`] tag travels alongside the bytes (for example derived from the
//! request uri and content format). [`decode_payload`] and [`encode_payload`] route
//! on it to the codec of each kind; dropping a [`Payload`] releases the matching tree.

use alloc::vec::Vec;

use crate::device::{decode_device, encode_device};
use crate::discovery::{decode_discovery, encode_discovery};
use crate::parse::check_input_len;
use crate::platform::{decode_platform, encode_platform};
use crate::presence::{decode_presence, encode_presence};
use crate::{
    decode_rep, encode_rep, DecodeLimits, DevicePayload, DiscoveryPayload, ErrorCode,
    PayloadError, PlatformPayload, PresencePayload, RepPayload, SecurityPayload,
};

/// Kind tag of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadType {
    /// Not a payload; rejected by every operation.
    Invalid = 0,
    /// Resource discovery response.
    Discovery = 1,
    /// Device information.
    Device = 2,
    /// Platform information.
    Platform = 3,
    /// Resource representation.
    Representation = 4,
    /// Opaque security data.
    Security = 5,
    /// Presence announcement.
    Presence = 6,
}

impl TryFrom<u8> for PayloadType {
    type Error = PayloadError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => Self::Invalid,
            1 => Self::Discovery,
            2 => Self::Device,
            3 => Self::Platform,
            4 => Self::Representation,
            5 => Self::Security,
            6 => Self::Presence,
            _ => {
                tracing::warn!(tag, "unknown payload type");
                return Err(PayloadError::invalid(ErrorCode::InvalidPayloadType));
            }
        })
    }
}

/// A decoded payload of any kind.
#[derive(Debug, PartialEq)]
pub enum Payload {
    /// Resource discovery response.
    Discovery(DiscoveryPayload),
    /// Device information.
    Device(DevicePayload),
    /// Platform information.
    Platform(PlatformPayload),
    /// Resource representation.
    Representation(RepPayload),
    /// Opaque security data.
    Security(SecurityPayload),
    /// Presence announcement.
    Presence(PresencePayload),
}

impl Payload {
    /// The kind tag of this payload.
    #[must_use]
    pub const fn payload_type(&self) -> PayloadType {
        match self {
            Self::Discovery(_) => PayloadType::Discovery,
            Self::Device(_) => PayloadType::Device,
            Self::Platform(_) => PayloadType::Platform,
            Self::Representation(_) => PayloadType::Representation,
            Self::Security(_) => PayloadType::Security,
            Self::Presence(_) => PayloadType::Presence,
        }
    }

    /// The representation, if this is one.
    #[must_use]
    pub const fn as_representation(&self) -> Option<&RepPayload> {
        match self {
            Self::Representation(p) => Some(p),
            _ => None,
        }
    }
}

macro_rules! payload_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(p: $ty) -> Self {
                    Self::$variant(p)
                }
            }
        )*
    };
}

payload_from! {
    Discovery => DiscoveryPayload,
    Device => DevicePayload,
    Platform => PlatformPayload,
    Representation => RepPayload,
    Security => SecurityPayload,
    Presence => PresencePayload,
}

/// Decode `bytes` as a payload of kind `kind` under [`DecodeLimits::default`].
///
/// # Errors
///
/// See [`decode_payload_with_limits`].
pub fn decode_payload(kind: PayloadType, bytes: &[u8]) -> Result<Payload, PayloadError> {
    decode_payload_with_limits(kind, bytes, DecodeLimits::default())
}

/// Decode `bytes` as a payload of kind `kind`.
///
/// Security payloads are not CBOR: the bytes are copied verbatim, and empty input
/// yields an empty security payload.
///
/// # Errors
///
/// Returns `InvalidPayloadType` for [`PayloadType::Invalid`], a `Decode` error for
/// malformed input, and `AllocationFailed` if memory runs out.
pub fn decode_payload_with_limits(
    kind: PayloadType,
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<Payload, PayloadError> {
    tracing::trace!(?kind, len = bytes.len(), "decoding payload");
    let result = match kind {
        PayloadType::Invalid => {
            tracing::warn!("refusing to decode an invalid payload type");
            return Err(PayloadError::invalid(ErrorCode::InvalidPayloadType));
        }
        PayloadType::Discovery => decode_discovery(bytes, limits).map(Payload::Discovery),
        PayloadType::Device => decode_device(bytes, limits).map(Payload::Device),
        PayloadType::Platform => decode_platform(bytes, limits).map(Payload::Platform),
        PayloadType::Representation => decode_rep(bytes, limits).map(Payload::Representation),
        PayloadType::Security => check_input_len(bytes, &limits)
            .and_then(|()| SecurityPayload::from_bytes(bytes))
            .map(Payload::Security),
        PayloadType::Presence => decode_presence(bytes, limits).map(Payload::Presence),
    };
    result.map_err(|err| {
        tracing::debug!(?kind, code = ?err.code, offset = err.offset, "payload decode failed");
        err
    })
}

/// Encode `payload` with the codec of its kind.
///
/// # Errors
///
/// Returns `AllocationFailed` if the output cannot grow, or `NestingTooDeep` for
/// representations nested deeper than the decoder accepts.
pub fn encode_payload(payload: &Payload) -> Result<Vec<u8>, PayloadError> {
    tracing::trace!(kind = ?payload.payload_type(), "encoding payload");
    match payload {
        Payload::Discovery(p) => encode_discovery(p),
        Payload::Device(p) => encode_device(p),
        Payload::Platform(p) => encode_platform(p),
        Payload::Representation(p) => encode_rep(p),
        Payload::Security(p) => crate::alloc_util::try_vec_from_slice(p.as_bytes(), 0),
        Payload::Presence(p) => encode_presence(p),
    }
}
