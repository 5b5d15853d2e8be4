use alloc::vec::Vec;

use crate::alloc_util::try_vec_from_slice;
use crate::PayloadError;

/// Opaque security payload. The bytes are carried verbatim and are not CBOR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityPayload {
    data: Vec<u8>,
}

impl SecurityPayload {
    /// An empty security payload.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Copy `bytes` into a new payload. Empty input allocates nothing.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the copy fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        Ok(Self {
            data: try_vec_from_slice(bytes, 0)?,
        })
    }

    /// The carried bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the payload, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of carried bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no bytes are carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for SecurityPayload {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_copied_verbatim() {
        let p = SecurityPayload::from_bytes(&[0xde, 0xad]).unwrap();
        assert_eq!(p.as_bytes(), [0xde, 0xad]);
        assert!(SecurityPayload::from_bytes(&[]).unwrap().is_empty());
    }
}
