use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use crate::alloc_util::{try_map_slice, try_push, try_string_from_str};
use crate::PayloadError;

/// An ordered list of owned strings: resource types, interfaces, data model versions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringList(Vec<String>);

impl StringList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if `s` is one of the entries.
    #[must_use]
    pub fn contains(&self, s: &str) -> bool {
        self.0.iter().any(|e| e == s)
    }

    /// Append a copy of `s`.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy or the list growth fails.
    pub fn push(&mut self, s: &str) -> Result<(), PayloadError> {
        let owned = try_string_from_str(s, 0)?;
        self.push_owned(owned)
    }

    /// Append `s`, taking ownership.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the list cannot grow.
    pub fn push_owned(&mut self, s: String) -> Result<(), PayloadError> {
        try_push(&mut self.0, s, 0)
    }

    /// Split `s` on whitespace and append every non-empty token.
    ///
    /// Wire values such as `"oic.r.light oic.r.switch"` carry several types in one string.
    pub(crate) fn push_tokens(&mut self, s: &str, offset: usize) -> Result<(), PayloadError> {
        for token in s.split_ascii_whitespace() {
            let owned = try_string_from_str(token, offset)?;
            try_push(&mut self.0, owned, offset)?;
        }
        Ok(())
    }

    /// Deep copy with fallible allocation.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any entry cannot be copied.
    pub fn try_clone(&self) -> Result<Self, PayloadError> {
        Ok(Self(try_map_slice(&self.0, 0, |s| try_string_from_str(s, 0))?))
    }
}

impl<'a> IntoIterator for &'a StringList {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_trimmed_and_split() {
        let mut l = StringList::new();
        l.push_tokens("  oic.r.light   oic.r.switch ", 0).unwrap();
        l.push_tokens("", 0).unwrap();
        assert_eq!(l.as_slice(), ["oic.r.light", "oic.r.switch"]);
    }

    #[test]
    fn clone_is_independent() {
        let mut l = StringList::new();
        l.push("core.light").unwrap();
        let mut c = l.try_clone().unwrap();
        c.push("x").unwrap();
        assert_eq!(l.len(), 1);
        assert_eq!(c.len(), 2);
        assert!(c.contains("core.light"));
    }
}
