//! Discovery payloads (`/oic/res`).
//!
//! On the wire a discovery response is an array with one map per device. Each
//! map lists the device's resources under `links`. Decoded devices are chained
//! through [`DiscoveryPayload::next`] in wire order.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::alloc_util::try_push;
use crate::parse::{check_input_len, check_trailing, read_owned_text, read_tokens};
use crate::stream::{CborKind, CborStream};
use crate::{keys, DecodeLimits, Encoder, ErrorCode, PayloadError, StringList};

/// Link policy (`p`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Discoverable / observable bits (`bm`).
    pub bitmap: u8,
    /// Reachable only over a secure transport (`sec`).
    pub secure: bool,
    /// Secure port (`port`), meaningful when `secure` is set.
    pub port: u16,
}

/// Policy bit: the resource is discoverable.
pub const POLICY_DISCOVERABLE: u8 = 1 << 0;
/// Policy bit: the resource is observable.
pub const POLICY_OBSERVABLE: u8 = 1 << 1;

/// One resource advertised by a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLink {
    /// Resource uri (`href`), mandatory.
    pub uri: String,
    /// Resource types (`rt`).
    pub types: StringList,
    /// Interfaces (`if`).
    pub interfaces: StringList,
    /// Access policy (`p`).
    pub policy: LinkPolicy,
}

/// Resources advertised by one device, optionally chained to further devices.
#[derive(Debug, Default, PartialEq)]
pub struct DiscoveryPayload {
    /// Device id (`di`).
    pub sid: Option<String>,
    /// Device name (`n`).
    pub name: Option<String>,
    /// Resource types of the discovery resource (`rt`).
    pub types: StringList,
    /// Interfaces of the discovery resource (`if`).
    pub interfaces: StringList,
    /// Advertised resources (`links`).
    pub resources: Vec<ResourceLink>,
    next: Option<Box<DiscoveryPayload>>,
}

impl DiscoveryPayload {
    /// An empty discovery payload.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sid: None,
            name: None,
            types: StringList::new(),
            interfaces: StringList::new(),
            resources: Vec::new(),
            next: None,
        }
    }

    /// The next device in the chain.
    #[must_use]
    pub fn next(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    /// Iterate over this device and every one chained after it.
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        core::iter::successors(Some(self), |p| p.next.as_deref())
    }

    /// Link `payload` at the tail of the chain.
    pub fn append(&mut self, payload: Self) {
        let mut nodes = Vec::new();
        let mut cur = self.next.take();
        while let Some(mut node) = cur {
            cur = node.next.take();
            nodes.push(*node);
        }
        nodes.push(payload);
        self.next = Self::link(nodes);
    }

    fn link(mut nodes: Vec<Self>) -> Option<Box<Self>> {
        let mut chain = None;
        while let Some(mut node) = nodes.pop() {
            node.next = chain;
            chain = Some(Box::new(node));
        }
        chain
    }
}

impl Drop for DiscoveryPayload {
    fn drop(&mut self) {
        let mut cur = self.next.take();
        while let Some(mut node) = cur {
            cur = node.next.take();
        }
    }
}

fn read_u8(s: &mut CborStream<'_>) -> Result<u8, PayloadError> {
    let off = s.position();
    let v = s.read_int()?;
    u8::try_from(v).map_err(|_| PayloadError::new(ErrorCode::IntegerOutOfRange, off))
}

fn read_u16(s: &mut CborStream<'_>) -> Result<u16, PayloadError> {
    let off = s.position();
    let v = s.read_int()?;
    u16::try_from(v).map_err(|_| PayloadError::new(ErrorCode::IntegerOutOfRange, off))
}

fn read_policy(s: &mut CborStream<'_>) -> Result<LinkPolicy, PayloadError> {
    let mut policy = LinkPolicy::default();
    let len = s.read_map_len()?;
    for _ in 0..len {
        match s.read_key()? {
            keys::BITMAP => policy.bitmap = read_u8(s)?,
            keys::SECURE => policy.secure = s.read_bool()?,
            keys::PORT => policy.port = read_u16(s)?,
            _ => s.skip_value()?,
        }
    }
    Ok(policy)
}

fn read_link(s: &mut CborStream<'_>) -> Result<ResourceLink, PayloadError> {
    let off = s.position();
    let mut uri = None;
    let mut link = ResourceLink::default();
    let len = s.read_map_len()?;
    for _ in 0..len {
        match s.read_key()? {
            keys::HREF => uri = Some(read_owned_text(s)?),
            keys::RESOURCE_TYPE => read_tokens(s, &mut link.types)?,
            keys::INTERFACE => read_tokens(s, &mut link.interfaces)?,
            keys::POLICY => link.policy = read_policy(s)?,
            _ => s.skip_value()?,
        }
    }
    link.uri = uri.ok_or_else(|| PayloadError::new(ErrorCode::MissingMandatoryKey, off))?;
    Ok(link)
}

fn read_device(s: &mut CborStream<'_>) -> Result<DiscoveryPayload, PayloadError> {
    let mut out = DiscoveryPayload::new();
    let len = s.read_map_len()?;
    for _ in 0..len {
        match s.read_key()? {
            keys::DEVICE_ID => out.sid = Some(read_owned_text(s)?),
            keys::DEVICE_NAME => out.name = Some(read_owned_text(s)?),
            keys::RESOURCE_TYPE => read_tokens(s, &mut out.types)?,
            keys::INTERFACE => read_tokens(s, &mut out.interfaces)?,
            keys::LINKS => {
                let n = s.read_array_len()?;
                for _ in 0..n {
                    let off = s.position();
                    let link = read_link(s)?;
                    try_push(&mut out.resources, link, off)?;
                }
            }
            _ => s.skip_value()?,
        }
    }
    Ok(out)
}

pub(crate) fn decode_discovery(
    bytes: &[u8],
    limits: DecodeLimits,
) -> Result<DiscoveryPayload, PayloadError> {
    check_input_len(bytes, &limits)?;
    let mut s = CborStream::new(bytes, 0, limits);
    let off = s.position();
    let out = match s.peek_kind()? {
        CborKind::Map => read_device(&mut s)?,
        CborKind::Array => {
            let len = s.read_array_len()?;
            let mut nodes = Vec::new();
            for _ in 0..len {
                let node_off = s.position();
                let node = read_device(&mut s)?;
                try_push(&mut nodes, node, node_off)?;
            }
            DiscoveryPayload::link(nodes).map_or_else(DiscoveryPayload::new, |head| *head)
        }
        _ => return Err(PayloadError::new(ErrorCode::ExpectedArray, off)),
    };
    check_trailing(&s)?;
    Ok(out)
}

fn write_link(enc: &mut Encoder, link: &ResourceLink) -> Result<(), PayloadError> {
    let len = 2 + usize::from(!link.types.is_empty()) + usize::from(!link.interfaces.is_empty());
    enc.map(len, |m| {
        m.entry(keys::HREF, |e| e.text(&link.uri))?;
        if !link.types.is_empty() {
            m.entry(keys::RESOURCE_TYPE, |e| e.string_list(&link.types))?;
        }
        if !link.interfaces.is_empty() {
            m.entry(keys::INTERFACE, |e| e.string_list(&link.interfaces))?;
        }
        let p = link.policy;
        m.entry(keys::POLICY, |e| {
            e.map(1 + 2 * usize::from(p.secure), |m| {
                m.entry(keys::BITMAP, |e| e.int(i64::from(p.bitmap)))?;
                if p.secure {
                    m.entry(keys::SECURE, |e| e.bool(true))?;
                    m.entry(keys::PORT, |e| e.int(i64::from(p.port)))?;
                }
                Ok(())
            })
        })
    })
}

fn write_device(enc: &mut Encoder, p: &DiscoveryPayload) -> Result<(), PayloadError> {
    let len = 1
        + usize::from(p.sid.is_some())
        + usize::from(p.name.is_some())
        + usize::from(!p.types.is_empty())
        + usize::from(!p.interfaces.is_empty());
    enc.map(len, |m| {
        if let Some(v) = &p.sid {
            m.entry(keys::DEVICE_ID, |e| e.text(v))?;
        }
        if let Some(v) = &p.name {
            m.entry(keys::DEVICE_NAME, |e| e.text(v))?;
        }
        if !p.types.is_empty() {
            m.entry(keys::RESOURCE_TYPE, |e| e.string_list(&p.types))?;
        }
        if !p.interfaces.is_empty() {
            m.entry(keys::INTERFACE, |e| e.string_list(&p.interfaces))?;
        }
        m.entry(keys::LINKS, |e| {
            e.array(p.resources.len(), |a| {
                p.resources
                    .iter()
                    .try_for_each(|link| a.item(|e| write_link(e, link)))
            })
        })
    })
}

pub(crate) fn encode_discovery(p: &DiscoveryPayload) -> Result<Vec<u8>, PayloadError> {
    let mut enc = Encoder::new();
    let len = p.chain().count();
    enc.array(len, |a| {
        p.chain()
            .try_for_each(|node| a.item(|e| write_device(e, node)))
    })?;
    Ok(enc.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(sid: &str) -> DiscoveryPayload {
        let mut d = DiscoveryPayload::new();
        d.sid = Some(String::from(sid));
        let mut link = ResourceLink {
            uri: String::from("/a/light"),
            policy: LinkPolicy {
                bitmap: POLICY_DISCOVERABLE | POLICY_OBSERVABLE,
                secure: true,
                port: 5684,
            },
            ..ResourceLink::default()
        };
        link.types.push("core.light").unwrap();
        link.interfaces.push("oic.if.baseline").unwrap();
        d.resources.push(link);
        d
    }

    #[test]
    fn discovery_chain_round_trips() {
        let mut p = device("d1");
        p.append(device("d2"));
        let bytes = encode_discovery(&p).unwrap();
        let back = decode_discovery(&bytes, DecodeLimits::default()).unwrap();
        assert_eq!(back, p);
        assert_eq!(back.chain().count(), 2);
        assert_eq!(back.next().unwrap().sid.as_deref(), Some("d2"));
    }

    #[test]
    fn link_href_is_mandatory() {
        // [{"links": [{"rt": "x"}]}]
        let bytes = [
            0x81, 0xa1, 0x65, b'l', b'i', b'n', b'k', b's', 0x81, 0xa1, 0x62, b'r', b't', 0x61,
            b'x',
        ];
        let err = decode_discovery(&bytes, DecodeLimits::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingMandatoryKey);
        assert_eq!(err.offset, 9);
    }

    #[test]
    fn insecure_policy_omits_port() {
        let mut d = DiscoveryPayload::new();
        d.resources.push(ResourceLink {
            uri: String::from("/x"),
            ..ResourceLink::default()
        });
        let bytes = encode_discovery(&d).unwrap();
        let back = decode_discovery(&bytes, DecodeLimits::default()).unwrap();
        assert_eq!(back.resources[0].policy, LinkPolicy::default());
    }
}
