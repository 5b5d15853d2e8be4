//! `Serialize` for the value model, mirroring the CBOR layout of [`encode_rep`](crate::encode_rep).
//!
//! A single payload serializes as a map (`href`, `rt`, `if`, then the values in
//! insertion order), a chain as a sequence of such maps. Nested objects are maps of
//! their values only; a nested header or chain is an error, as on the wire. Arrays
//! are nested sequences following the active dimensions.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::convert::{has_header, is_reserved_key};
use crate::value::{active_depth, dim_stride, ArrayItems, PropValue, RepArray, RepValue};
use crate::{keys, RepPayload, StringList};

impl Serialize for StringList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

struct Root<'a>(&'a RepPayload);

impl Serialize for Root<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let p = self.0;
        if let Some(v) = p.values().iter().find(|v| is_reserved_key(v.name())) {
            return Err(S::Error::custom(format_args!("reserved root key `{}`", v.name())));
        }
        let len = usize::from(p.uri().is_some())
            + usize::from(!p.types().is_empty())
            + usize::from(!p.interfaces().is_empty())
            + p.values().len();
        let mut m = serializer.serialize_map(Some(len))?;
        if let Some(uri) = p.uri() {
            m.serialize_entry(keys::HREF, uri)?;
        }
        if !p.types().is_empty() {
            m.serialize_entry(keys::RESOURCE_TYPE, p.types())?;
        }
        if !p.interfaces().is_empty() {
            m.serialize_entry(keys::INTERFACE, p.interfaces())?;
        }
        for v in p.values() {
            m.serialize_entry(v.name(), v.value())?;
        }
        m.end()
    }
}

struct Values<'a>(&'a RepPayload);

impl Serialize for Values<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if has_header(self.0) {
            return Err(S::Error::custom("nested object has a header or chain"));
        }
        let values = self.0.values();
        let mut m = serializer.serialize_map(Some(values.len()))?;
        for v in values {
            m.serialize_entry(v.name(), v.value())?;
        }
        m.end()
    }
}

impl Serialize for RepPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.next().is_none() {
            return Root(self).serialize(serializer);
        }
        serializer.collect_seq(self.chain().map(Root))
    }
}

impl Serialize for RepValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(1))?;
        m.serialize_entry(self.name(), self.value())?;
        m.end()
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::String(s) => serializer.serialize_str(s),
            Self::ByteString(b) => serializer.serialize_bytes(b),
            Self::Object(obj) => Values(obj).serialize(serializer),
            Self::Array(arr) => arr.serialize(serializer),
        }
    }
}

struct Level<'a> {
    arr: &'a RepArray,
    level: usize,
    base: usize,
}

struct Elem<'a> {
    arr: &'a RepArray,
    at: usize,
}

impl Serialize for Elem<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let missing = || S::Error::custom("array buffer shorter than its dimensions");
        let at = self.at;
        match self.arr.items() {
            ArrayItems::Int(v) => serializer.serialize_i64(*v.get(at).ok_or_else(missing)?),
            ArrayItems::Double(v) => serializer.serialize_f64(*v.get(at).ok_or_else(missing)?),
            ArrayItems::Bool(v) => serializer.serialize_bool(*v.get(at).ok_or_else(missing)?),
            ArrayItems::String(v) => serializer.serialize_str(v.get(at).ok_or_else(missing)?),
            ArrayItems::ByteString(v) => {
                serializer.serialize_bytes(v.get(at).ok_or_else(missing)?)
            }
            ArrayItems::Object(v) => Values(v.get(at).ok_or_else(missing)?).serialize(serializer),
        }
    }
}

impl Serialize for Level<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dims = self.arr.dimensions();
        let len = dims[self.level];
        let step = dim_stride(&dims, self.level);
        let innermost = self.level + 1 >= active_depth(&dims);
        let mut seq = serializer.serialize_seq(Some(len))?;
        for i in 0..len {
            let at = self.base + i * step;
            if innermost {
                seq.serialize_element(&Elem { arr: self.arr, at })?;
            } else {
                seq.serialize_element(&Level {
                    arr: self.arr,
                    level: self.level + 1,
                    base: at,
                })?;
            }
        }
        seq.end()
    }
}

impl Serialize for RepArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Level {
            arr: self,
            level: 0,
            base: 0,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_list_is_a_sequence() {
        let mut l = StringList::new();
        l.push("a").unwrap();
        assert_eq!(serde_json::to_string(&l).unwrap(), r#"["a"]"#);
    }
}
