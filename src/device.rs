use alloc::string::String;
use alloc::vec::Vec;

use crate::alloc_util::try_string_from_str;
use crate::parse::{check_input_len, check_trailing, read_owned_text, read_tokens};
use crate::stream::CborStream;
use crate::{keys, DecodeLimits, Encoder, ErrorCode, PayloadError, StringList};

/// Device information (`/oic/d`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePayload {
    /// Device id (`di`).
    pub sid: Option<String>,
    /// Human-friendly device name (`n`).
    pub device_name: Option<String>,
    /// OCF core version (`icv`).
    pub spec_version: Option<String>,
    /// Data model versions (`dmv`), comma separated on the wire.
    pub data_model_versions: StringList,
    /// Resource types (`rt`).
    pub types: StringList,
    /// Interfaces (`if`).
    pub interfaces: StringList,
}

fn read_csv(s: &mut CborStream<'_>, list: &mut StringList) -> Result<(), PayloadError> {
    let off = s.position();
    let text = s.read_text()?;
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        list.push_owned(try_string_from_str(part, off)?)?;
    }
    Ok(())
}

fn join_csv(list: &StringList) -> Result<String, PayloadError> {
    let total = list
        .iter()
        .map(String::len)
        .sum::<usize>()
        .saturating_add(list.len().saturating_sub(1));
    let mut out = String::new();
    out.try_reserve_exact(total)
        .map_err(|_| PayloadError::new(ErrorCode::AllocationFailed, 0))?;
    for (i, v) in list.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(v);
    }
    Ok(out)
}

pub(crate) fn decode_device(
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<DevicePayload, PayloadError> {
    check_input_len(bytes, &limits)?;
    let mut s = CborStream::new(bytes, 0, limits);
    let mut out = DevicePayload::default();
    let len = s.read_map_len()?;
    for _ in 0..len {
        match s.read_key()? {
            keys::DEVICE_ID => out.sid = Some(read_owned_text(&mut s)?),
            keys::DEVICE_NAME => out.device_name = Some(read_owned_text(&mut s)?),
            keys::SPEC_VERSION => out.spec_version = Some(read_owned_text(&mut s)?),
            keys::DATA_MODEL_VERSION => read_csv(&mut s, &mut out.data_model_versions)?,
            keys::RESOURCE_TYPE => read_tokens(&mut s, &mut out.types)?,
            keys::INTERFACE => read_tokens(&mut s, &mut out.interfaces)?,
            _ => s.skip_value()?,
        }
    }
    check_trailing(&s)?;
    Ok(out)
}

pub(crate) fn encode_device(p: &DevicePayload) -> Result<Vec<u8>, PayloadError> {
    let dmv = if p.data_model_versions.is_empty() {
        None
    } else {
        Some(join_csv(&p.data_model_versions)?)
    };
    let len = usize::from(p.sid.is_some())
        + usize::from(p.device_name.is_some())
        + usize::from(p.spec_version.is_some())
        + usize::from(dmv.is_some())
        + usize::from(!p.types.is_empty())
        + usize::from(!p.interfaces.is_empty());
    let mut enc = Encoder::new();
    enc.map(len, |m| {
        if let Some(v) = &p.sid {
            m.entry(keys::DEVICE_ID, |e| e.text(v))?;
        }
        if let Some(v) = &p.device_name {
            m.entry(keys::DEVICE_NAME, |e| e.text(v))?;
        }
        if let Some(v) = &p.spec_version {
            m.entry(keys::SPEC_VERSION, |e| e.text(v))?;
        }
        if let Some(v) = &dmv {
            m.entry(keys::DATA_MODEL_VERSION, |e| e.text(v))?;
        }
        if !p.types.is_empty() {
            m.entry(keys::RESOURCE_TYPE, |e| e.string_list(&p.types))?;
        }
        if !p.interfaces.is_empty() {
            m.entry(keys::INTERFACE, |e| e.string_list(&p.interfaces))?;
        }
        Ok(())
    })?;
    Ok(enc.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_round_trips() {
        let mut p = DevicePayload {
            sid: Some(String::from("a1b2")),
            device_name: Some(String::from("Lamp")),
            spec_version: Some(String::from("ocf.2.0.0")),
            ..DevicePayload::default()
        };
        p.data_model_versions.push("ocf.res.1.0.0").unwrap();
        p.data_model_versions.push("ocf.sh.1.0.0").unwrap();
        p.types.push("oic.wk.d").unwrap();
        p.interfaces.push("oic.if.r").unwrap();
        let bytes = encode_device(&p).unwrap();
        assert_eq!(decode_device(&bytes, DecodeLimits::default()).unwrap(), p);
    }

    #[test]
    fn data_model_versions_are_trimmed() {
        // {"dmv": " a , ,b"}
        let bytes = [0xa1, 0x63, b'd', b'm', b'v', 0x67, b' ', b'a', b' ', b',', b' ', b',', b'b'];
        let p = decode_device(&bytes, DecodeLimits::default()).unwrap();
        assert_eq!(p.data_model_versions.as_slice(), ["a", "b"]);
    }

    #[test]
    fn device_must_be_a_map() {
        let err = decode_device(&[0x80], DecodeLimits::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExpectedMap);
    }
}
