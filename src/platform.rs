use alloc::string::String;
use alloc::vec::Vec;

use crate::parse::{check_input_len, check_trailing, read_owned_text, read_tokens};
use crate::stream::CborStream;
use crate::{keys, DecodeLimits, Encoder, ErrorCode, MapEncoder, PayloadError, StringList};

/// Platform properties (`/oic/p`). `platform_id` and `manufacturer_name` are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    /// `pi`
    pub platform_id: String,
    /// `mnmn`
    pub manufacturer_name: String,
    /// `mnml`
    pub manufacturer_url: Option<String>,
    /// `mnmo`
    pub model_number: Option<String>,
    /// `mndt`
    pub date_of_manufacture: Option<String>,
    /// `mnpv`
    pub platform_version: Option<String>,
    /// `mnos`
    pub operating_system_version: Option<String>,
    /// `mnhw`
    pub hardware_version: Option<String>,
    /// `mnfv`
    pub firmware_version: Option<String>,
    /// `mnsl`
    pub support_url: Option<String>,
    /// `st`
    pub system_time: Option<String>,
}

impl PlatformInfo {
    fn optional(&self) -> [(&'static str, Option<&String>); 9] {
        [
            (keys::MFG_URL, self.manufacturer_url.as_ref()),
            (keys::MODEL_NUM, self.model_number.as_ref()),
            (keys::MFG_DATE, self.date_of_manufacture.as_ref()),
            (keys::PLATFORM_VERSION, self.platform_version.as_ref()),
            (keys::OS_VERSION, self.operating_system_version.as_ref()),
            (keys::HARDWARE_VERSION, self.hardware_version.as_ref()),
            (keys::FIRMWARE_VERSION, self.firmware_version.as_ref()),
            (keys::SUPPORT_URL, self.support_url.as_ref()),
            (keys::SYSTEM_TIME, self.system_time.as_ref()),
        ]
    }

    fn optional_slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            keys::MFG_URL => &mut self.manufacturer_url,
            keys::MODEL_NUM => &mut self.model_number,
            keys::MFG_DATE => &mut self.date_of_manufacture,
            keys::PLATFORM_VERSION => &mut self.platform_version,
            keys::OS_VERSION => &mut self.operating_system_version,
            keys::HARDWARE_VERSION => &mut self.hardware_version,
            keys::FIRMWARE_VERSION => &mut self.firmware_version,
            keys::SUPPORT_URL => &mut self.support_url,
            keys::SYSTEM_TIME => &mut self.system_time,
            _ => return None,
        })
    }
}

/// Platform payload: info plus the resource header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformPayload {
    /// Resource uri (`href`).
    pub uri: Option<String>,
    /// Platform properties.
    pub info: PlatformInfo,
    /// Resource types (`rt`).
    pub types: StringList,
    /// Interfaces (`if`).
    pub interfaces: StringList,
}

pub(crate) fn decode_platform(
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<PlatformPayload, PayloadError> {
    check_input_len(bytes, &limits)?;
    let mut s = CborStream::new(bytes, 0, limits);
    let mut out = PlatformPayload::default();
    let mut platform_id = None;
    let mut manufacturer_name = None;
    let len = s.read_map_len()?;
    for _ in 0..len {
        let key = s.read_key()?;
        match key {
            keys::HREF => out.uri = Some(read_owned_text(&mut s)?),
            keys::PLATFORM_ID => platform_id = Some(read_owned_text(&mut s)?),
            keys::MFG_NAME => manufacturer_name = Some(read_owned_text(&mut s)?),
            keys::RESOURCE_TYPE => read_tokens(&mut s, &mut out.types)?,
            keys::INTERFACE => read_tokens(&mut s, &mut out.interfaces)?,
            _ => match out.info.optional_slot(key) {
                Some(slot) => *slot = Some(read_owned_text(&mut s)?),
                None => s.skip_value()?,
            },
        }
    }
    let (Some(pi), Some(mnmn)) = (platform_id, manufacturer_name) else {
        return Err(PayloadError::new(ErrorCode::MissingMandatoryKey, 0));
    };
    out.info.platform_id = pi;
    out.info.manufacturer_name = mnmn;
    check_trailing(&s)?;
    Ok(out)
}

fn write_info(m: &mut MapEncoder<'_>, info: &PlatformInfo) -> Result<(), PayloadError> {
    m.entry(keys::PLATFORM_ID, |e| e.text(&info.platform_id))?;
    m.entry(keys::MFG_NAME, |e| e.text(&info.manufacturer_name))?;
    for (key, value) in info.optional() {
        if let Some(v) = value {
            m.entry(key, |e| e.text(v))?;
        }
    }
    Ok(())
}

pub(crate) fn encode_platform(p: &PlatformPayload) -> Result<Vec<u8>, PayloadError> {
    let optional = p.info.optional().iter().filter(|(_, v)| v.is_some()).count();
    let len = 2
        + optional
        + usize::from(p.uri.is_some())
        + usize::from(!p.types.is_empty())
        + usize::from(!p.interfaces.is_empty());
    let mut enc = Encoder::new();
    enc.map(len, |m| {
        if let Some(uri) = &p.uri {
            m.entry(keys::HREF, |e| e.text(uri))?;
        }
        write_info(m, &p.info)?;
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
