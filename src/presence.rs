use alloc::string::String;
use alloc::vec::Vec;

use crate::parse::{check_input_len, check_trailing, read_owned_text};
use crate::stream::CborStream;
use crate::{keys, DecodeLimits, Encoder, ErrorCode, PayloadError};

/// What caused a presence notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PresenceTrigger {
    /// A resource was created.
    #[default]
    Create,
    /// A resource changed.
    Change,
    /// A resource was deleted.
    Delete,
}

impl PresenceTrigger {
    /// Wire value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Create => 0,
            Self::Change => 1,
            Self::Delete => 2,
        }
    }

    const fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::Create),
            1 => Some(Self::Change),
            2 => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Presence announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresencePayload {
    /// Nonce, increasing with every announcement (`non`).
    pub sequence_number: u32,
    /// Seconds until the presence expires (`ttl`).
    pub max_age: u32,
    /// Cause of the announcement (`trg`).
    pub trigger: PresenceTrigger,
    /// Resource type filter (`rt`), if any.
    pub resource_type: Option<String>,
}

fn read_u32(s: &mut CborStream<'_>) -> Result<u32, PayloadError> {
    let off = s.position();
    let v = s.read_int()?;
    u32::try_from(v).map_err(|_| PayloadError::new(ErrorCode::IntegerOutOfRange, off))
}

pub(crate) fn decode_presence(
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<PresencePayload, PayloadError> {
    check_input_len(bytes, &limits)?;
    let mut s = CborStream::new(bytes, 0, limits);
    let mut out = PresencePayload::default();
    let len = s.read_map_len()?;
    for _ in 0..len {
        let key = s.read_key()?;
        match key {
            keys::NONCE => out.sequence_number = read_u32(&mut s)?,
            keys::TTL => out.max_age = read_u32(&mut s)?,
            keys::TRIGGER => {
                let off = s.position();
                let v = s.read_int()?;
                out.trigger = PresenceTrigger::from_i64(v)
                    .ok_or_else(|| PayloadError::new(ErrorCode::IntegerOutOfRange, off))?;
            }
            keys::RESOURCE_TYPE => out.resource_type = Some(read_owned_text(&mut s)?),
            _ => s.skip_value()?,
        }
    }
    check_trailing(&s)?;
    Ok(out)
}

pub(crate) fn encode_presence(p: &PresencePayload) -> Result<Vec<u8>, PayloadError> {
    let mut enc = Encoder::new();
    let len = 3 + usize::from(p.resource_type.is_some());
    enc.map(len, |m| {
        m.entry(keys::NONCE, |e| e.int(i64::from(p.sequence_number)))?;
        m.entry(keys::TTL, |e| e.int(i64::from(p.max_age)))?;
        m.entry(keys::TRIGGER, |e| e.int(p.trigger.as_i64()))?;
        if let Some(rt) = &p.resource_type {
            m.entry(keys::RESOURCE_TYPE, |e| e.text(rt))?;
        }
        Ok(())
    })?;
    Ok(enc.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_round_trips() {
        let p = PresencePayload {
            sequence_number: 42,
            max_age: 60,
            trigger: PresenceTrigger::Delete,
            resource_type: Some(String::from("oic.r.light")),
        };
        let bytes = encode_presence(&p).unwrap();
        assert_eq!(decode_presence(&bytes, DecodeLimits::default()).unwrap(), p);
    }

    #[test]
    fn unknown_trigger_rejected() {
        // {"trg": 7}
        let bytes = [0xa1, 0x63, b't', b'r', b'g', 0x07];
        let err = decode_presence(&bytes, DecodeLimits::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::IntegerOutOfRange);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn unknown_keys_skipped() {
        // {"x": [1, 2], "ttl": 5}
        let bytes = [0xa2, 0x61, b'x', 0x82, 0x01, 0x02, 0x63, b't', b't', b'l', 0x05];
        let p = decode_presence(&bytes, DecodeLimits::default()).unwrap();
        assert_eq!(p.max_age, 5);
        assert_eq!(p.trigger, PresenceTrigger::Create);
    }
}
