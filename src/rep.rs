//! Representation payloads and the property builder API.
//!
//! All mutation goes through [`RepPayload::find_and_set`], which either appends a
//! new named value or replaces the contents of the existing one in place.
//!
//! Setters come in two flavors. `set_prop_*` borrows its input and stores a
//! fallibly-allocated copy; `set_prop_*_as_owner` takes its input by move. When an
//! owner setter fails, the moved-in value is dropped by the callee, so neither
//! flavor can leak.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::{iter, mem};

use crate::alloc_util::{try_push, try_reserve, try_string_from_str, try_vec_from_slice};
use crate::strlist::StringList;
use crate::value::{PropType, PropValue, RepValue};
use crate::{ErrorCode, PayloadError};

/// One resource representation: uri, resource types, interfaces and named values.
///
/// Several representations may be chained through `next` (a batch, such as the
/// children of a collection). The head owns the whole chain.
#[derive(Debug, Default)]
pub struct RepPayload {
    uri: Option<String>,
    types: StringList,
    interfaces: StringList,
    values: Vec<RepValue>,
    next: Option<Box<RepPayload>>,
}

impl RepPayload {
    /// An empty representation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            uri: None,
            types: StringList::new(),
            interfaces: StringList::new(),
            values: Vec::new(),
            next: None,
        }
    }

    /// The resource uri (`href`), if set.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Replace the uri with a copy of `uri`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy fails; the previous uri is kept.
    pub fn set_uri(&mut self, uri: &str) -> Result<(), PayloadError> {
        let owned = try_string_from_str(uri, 0)?;
        self.set_uri_as_owner(owned);
        Ok(())
    }

    /// Replace the uri, taking ownership.
    pub fn set_uri_as_owner(&mut self, uri: String) {
        self.uri = Some(uri);
    }

    /// Resource types (`rt`).
    #[must_use]
    pub const fn types(&self) -> &StringList {
        &self.types
    }

    /// Interfaces (`if`).
    #[must_use]
    pub const fn interfaces(&self) -> &StringList {
        &self.interfaces
    }

    /// Append a copy of `resource_type`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy fails.
    pub fn add_resource_type(&mut self, resource_type: &str) -> Result<(), PayloadError> {
        self.types.push(resource_type)
    }

    /// Append `resource_type`, taking ownership.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the list cannot grow.
    pub fn add_resource_type_as_owner(
        &mut self,
        resource_type: String,
    ) -> Result<(), PayloadError> {
        self.types.push_owned(resource_type)
    }

    /// Append a copy of `interface`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy fails.
    pub fn add_interface(&mut self, interface: &str) -> Result<(), PayloadError> {
        self.interfaces.push(interface)
    }

    /// Append `interface`, taking ownership.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the list cannot grow.
    pub fn add_interface_as_owner(&mut self, interface: String) -> Result<(), PayloadError> {
        self.interfaces.push_owned(interface)
    }

    pub(crate) fn types_mut(&mut self) -> &mut StringList {
        &mut self.types
    }

    pub(crate) fn interfaces_mut(&mut self) -> &mut StringList {
        &mut self.interfaces
    }

    /// Named values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[RepValue] {
        &self.values
    }

    /// The next representation in the chain.
    #[must_use]
    pub fn next(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    /// Iterate over this representation and every one chained after it.
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        iter::successors(Some(self), |p| p.next.as_deref())
    }

    /// Detach and return the rest of the chain.
    pub fn take_next(&mut self) -> Option<Self> {
        self.next.take().map(|b| *b)
    }

    /// Link `payload` (and its own chain) at the tail of this chain.
    pub fn append(&mut self, payload: Self) {
        let mut rest: Vec<Box<Self>> = Vec::new();
        let mut cur = self.next.take();
        while let Some(mut node) = cur {
            cur = node.next.take();
            rest.push(node);
        }
        let mut chain = Some(Box::new(payload));
        while let Some(mut node) = rest.pop() {
            node.next = chain;
            chain = Some(node);
        }
        self.next = chain;
    }

    /// Link `nodes` into one chain, in order. An empty batch yields an empty payload.
    pub(crate) fn from_batch(mut nodes: Vec<Self>) -> Self {
        let mut chain: Option<Box<Self>> = None;
        while let Some(mut node) = nodes.pop() {
            node.next = chain;
            chain = Some(Box::new(node));
        }
        chain.map_or_else(Self::new, |head| *head)
    }

    /// Find a value by exact, case-sensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RepValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Store `value` under `name`.
    ///
    /// If no value named `name` exists, a new one is appended at the tail. Otherwise the
    /// existing value's contents are dropped and replaced, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName` for an empty name and `AllocationFailed` if the name copy or
    /// list growth fails. On error the list is unchanged and `value` is dropped.
    pub fn find_and_set(
        &mut self,
        name: &str,
        value: PropValue,
    ) -> Result<&mut RepValue, PayloadError> {
        if name.is_empty() {
            return Err(PayloadError::invalid(ErrorCode::EmptyName));
        }
        if let Some(idx) = self.values.iter().position(|v| v.name == name) {
            let slot = &mut self.values[idx];
            slot.value = value;
            return Ok(slot);
        }
        let name = try_string_from_str(name, 0)?;
        try_reserve(&mut self.values, 1, 0)?;
        self.values.push(RepValue { name, value });
        let last = self.values.len() - 1;
        Ok(&mut self.values[last])
    }

    fn get_typed(&self, name: &str, ty: PropType) -> Option<&PropValue> {
        self.find(name)
            .map(RepValue::value)
            .filter(|v| v.prop_type() == ty)
    }

    /// Store a null under `name`.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_null(&mut self, name: &str) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::Null).map(|_| ())
    }

    /// Returns `true` iff `name` exists and holds null.
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        self.get_typed(name, PropType::Null).is_some()
    }

    /// Store an integer under `name`.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_prop_int(&mut self, name: &str, value: i64) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::Int(value)).map(|_| ())
    }

    /// Integer stored under `name`.
    #[must_use]
    pub fn get_prop_int(&self, name: &str) -> Option<i64> {
        match self.find(name)?.value() {
            PropValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Store a double under `name`.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_prop_double(&mut self, name: &str, value: f64) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::Double(value)).map(|_| ())
    }

    /// Double stored under `name`. A stored integer is converted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_prop_double(&self, name: &str) -> Option<f64> {
        match self.find(name)?.value() {
            PropValue::Double(v) => Some(*v),
            PropValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Store a boolean under `name`.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_prop_bool(&mut self, name: &str, value: bool) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::Bool(value)).map(|_| ())
    }

    /// Boolean stored under `name`.
    #[must_use]
    pub fn get_prop_bool(&self, name: &str) -> Option<bool> {
        match self.find(name)?.value() {
            PropValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Store a copy of `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy fails, otherwise see
    /// [`find_and_set`](Self::find_and_set).
    pub fn set_prop_string(&mut self, name: &str, value: &str) -> Result<(), PayloadError> {
        let owned = try_string_from_str(value, 0)?;
        self.set_prop_string_as_owner(name, owned)
    }

    /// Store `value` under `name`, taking ownership.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_prop_string_as_owner(
        &mut self,
        name: &str,
        value: String,
    ) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::String(value)).map(|_| ())
    }

    /// Text stored under `name`.
    #[must_use]
    pub fn get_prop_string(&self, name: &str) -> Option<&str> {
        match self.find(name)?.value() {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Store a copy of `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyByteString` if `value` is empty, `AllocationFailed` if the copy
    /// fails, otherwise see [`find_and_set`](Self::find_and_set).
    pub fn set_prop_byte_string(&mut self, name: &str, value: &[u8]) -> Result<(), PayloadError> {
        if value.is_empty() {
            return Err(PayloadError::invalid(ErrorCode::EmptyByteString));
        }
        let owned = try_vec_from_slice(value, 0)?;
        self.set_prop_byte_string_as_owner(name, owned)
    }

    /// Store `value` under `name`, taking ownership.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_prop_byte_string_as_owner(
        &mut self,
        name: &str,
        value: Vec<u8>,
    ) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::ByteString(value)).map(|_| ())
    }

    /// Bytes stored under `name`.
    #[must_use]
    pub fn get_prop_byte_string(&self, name: &str) -> Option<&[u8]> {
        match self.find(name)?.value() {
            PropValue::ByteString(b) => Some(b),
            _ => None,
        }
    }

    /// Store a deep copy of `value` (including its chain) under `name`.
    ///
    /// Only the values of a nested object can be encoded; a uri, resource types,
    /// interfaces or chain on it make [`encode_rep`](crate::encode_rep) fail with
    /// `UnencodableObject`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy fails, otherwise see
    /// [`find_and_set`](Self::find_and_set).
    pub fn set_prop_object(&mut self, name: &str, value: &Self) -> Result<(), PayloadError> {
        let owned = value.clone_chain()?;
        self.set_prop_object_as_owner(name, owned)
    }

    /// Store `value` under `name`, taking ownership.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_prop_object_as_owner(
        &mut self,
        name: &str,
        value: Self,
    ) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::Object(Box::new(value)))
            .map(|_| ())
    }

    /// Nested representation stored under `name`.
    #[must_use]
    pub fn get_prop_object(&self, name: &str) -> Option<&Self> {
        match self.find(name)?.value() {
            PropValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Copy this representation without its `next` chain.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any owned data cannot be copied. Partial copies
    /// are released and `self` is untouched.
    pub fn clone_node(&self) -> Result<Self, PayloadError> {
        let uri = match &self.uri {
            Some(u) => Some(try_string_from_str(u, 0)?),
            None => None,
        };
        let mut values = Vec::new();
        try_reserve(&mut values, self.values.len(), 0)?;
        for v in &self.values {
            values.push(v.try_clone()?);
        }
        Ok(Self {
            uri,
            types: self.types.try_clone()?,
            interfaces: self.interfaces.try_clone()?,
            values,
            next: None,
        })
    }

    /// Copy this representation and every one chained after it.
    ///
    /// The chain is walked iteratively.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any node cannot be copied; nothing is leaked.
    pub fn clone_chain(&self) -> Result<Self, PayloadError> {
        let mut head = self.clone_node()?;
        let mut rest: Vec<Self> = Vec::new();
        for node in self.chain().skip(1) {
            try_push(&mut rest, node.clone_node()?, 0)?;
        }
        let mut chain: Option<Box<Self>> = None;
        while let Some(mut node) = rest.pop() {
            node.next = chain;
            chain = Some(Box::new(node));
        }
        head.next = chain;
        Ok(head)
    }

    fn node_eq(&self, other: &Self) -> bool {
        self.uri == other.uri
            && self.types == other.types
            && self.interfaces == other.interfaces
            && self.values == other.values
    }

    fn detach_children(&mut self, pending: &mut Vec<Self>) {
        if let Some(next) = self.next.take() {
            pending.push(*next);
        }
        for v in &mut self.values {
            match &mut v.value {
                PropValue::Object(obj) => pending.push(mem::take(&mut **obj)),
                PropValue::Array(arr) => pending.append(&mut arr.take_objects()),
                _ => {}
            }
        }
    }
}

impl Drop for RepPayload {
    // Chains and nested objects are moved onto an explicit work list, so
    // destruction depth is constant regardless of input shape.
    fn drop(&mut self) {
        let mut pending: Vec<Self> = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut child) = pending.pop() {
            child.detach_children(&mut pending);
        }
    }
}

impl PartialEq for RepPayload {
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.chain();
        let mut b = other.chain();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x.node_eq(y) => {}
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn find_and_set_appends_then_replaces_in_place() {
        let mut p = RepPayload::new();
        p.set_prop_int("a", 1).unwrap();
        p.set_prop_int("b", 2).unwrap();
        p.set_prop_string("a", "text").unwrap();
        let names: Vec<&str> = p.values().iter().map(RepValue::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(p.get_prop_string("a"), Some("text"));
        assert_eq!(p.get_prop_int("a"), None);
    }

    #[test]
    fn empty_name_rejected() {
        let mut p = RepPayload::new();
        let err = p.set_prop_bool("", true).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyName);
        assert!(p.values().is_empty());
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut p = RepPayload::new();
        p.set_prop_int("Power", 1).unwrap();
        assert_eq!(p.get_prop_int("power"), None);
        assert!(p.find("Power").is_some());
    }

    #[test]
    fn double_getter_converts_int() {
        let mut p = RepPayload::new();
        p.set_prop_int("x", 5).unwrap();
        assert_eq!(p.get_prop_double("x"), Some(5.0));
        assert_eq!(p.get_prop_string("x"), None);
        assert_eq!(p.get_prop_bool("x"), None);
        assert!(!p.is_null("x"));
    }

    #[test]
    fn empty_byte_string_rejected() {
        let mut p = RepPayload::new();
        let err = p.set_prop_byte_string("b", &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyByteString);
        assert!(p.find("b").is_none());
        p.set_prop_byte_string_as_owner("b", vec![]).unwrap();
        assert_eq!(p.get_prop_byte_string("b"), Some(&[][..]));
    }

    #[test]
    fn append_links_at_tail() {
        let mut head = RepPayload::new();
        for uri in ["/a", "/b", "/c"] {
            let mut p = RepPayload::new();
            p.set_uri(uri).unwrap();
            head.append(p);
        }
        let uris: Vec<Option<&str>> = head.chain().map(RepPayload::uri).collect();
        assert_eq!(uris, [None, Some("/a"), Some("/b"), Some("/c")]);
    }

    #[test]
    fn clone_node_drops_chain_clone_chain_keeps_it() {
        let mut head = RepPayload::new();
        head.set_prop_int("n", 0).unwrap();
        let mut second = RepPayload::new();
        second.set_prop_int("n", 1).unwrap();
        head.append(second);

        let node = head.clone_node().unwrap();
        assert!(node.next().is_none());
        assert_eq!(node.get_prop_int("n"), Some(0));

        let chain = head.clone_chain().unwrap();
        assert_eq!(chain, head);
        assert_eq!(chain.chain().count(), 2);
    }

    #[test]
    fn long_chain_drops_without_recursion() {
        let mut head = RepPayload::new();
        let mut chain: Option<Box<RepPayload>> = None;
        for _ in 0..200_000 {
            let mut p = RepPayload::new();
            p.next = chain;
            chain = Some(Box::new(p));
        }
        head.next = chain;
        assert_eq!(head.chain().count(), 200_001);
        drop(head);
    }

    #[test]
    fn deep_object_nesting_drops_without_recursion() {
        let mut p = RepPayload::new();
        for _ in 0..100_000 {
            let mut outer = RepPayload::new();
            outer.set_prop_object_as_owner("child", p).unwrap();
            p = outer;
        }
        drop(p);
    }
}
