//! # ocf-rep
//!
//! The OCF representation-payload data model and its CBOR codec.
//!
//! A [`RepPayload`] is a typed, recursive document describing one resource: an
//! optional uri, resource types, interfaces, and an ordered list of named values.
//! Values are null, integers, doubles, booleans, text, byte strings, nested
//! payloads, or homogeneous arrays of up to three dimensions ([`RepArray`]).
//!
//! ## Design principles
//!
//! - **Every allocation is fallible.**
//!   Builder setters, clones and the decoder reserve memory with `try_reserve` and
//!   report [`ErrorCode::AllocationFailed`] instead of aborting.
//! - **Copy or move, never both.**
//!   `set_prop_*` borrows and stores a copy; `set_prop_*_as_owner` takes its argument
//!   by move. Either way a failed call leaks nothing.
//! - **Destruction is iterative.**
//!   Dropping a payload walks chains and nested objects with an explicit work list,
//!   so hostile input cannot exhaust the stack on drop.
//! - **Decoding is bounded.**
//!   [`DecodeLimits`] caps input size, container lengths, map nesting and the padded
//!   element count of multi-dimensional arrays.
//!
//! ## Wire format
//!
//! - A representation is a CBOR map, or an array of maps for a batch.
//! - Root keys `href`, `rt` and `if` populate the uri, resource types and interfaces.
//!   `rt`/`if` entries may hold several whitespace-separated tokens.
//! - Integers decode as `i64`; half, single and double floats decode as `f64`.
//! - Arrays nest up to three levels, must be homogeneous, and decode into a flat
//!   row-major buffer. Ragged rows and null elements are filled with zero values;
//!   empty or all-null arrays decode as null.
//! - Indefinite lengths, tags and simple values other than `true`/`false`/`null`
//!   are rejected.
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`PayloadError`].
//! - `sha2` *(default)*: enables [`rep_digest`], a SHA-256 over the encoded payload.
//! - `serde`: implements `Serialize` for the value model.
//! - `simdutf8`: enables SIMD-accelerated UTF-8 validation of wire text.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible and requires `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

extern crate alloc;

mod alloc_util;
mod array;
mod convert;
mod device;
mod discovery;
mod encode;
mod error;
pub mod keys;
mod limits;
mod parse;
mod payload;
mod platform;
mod presence;
mod rep;
mod security;
#[cfg(feature = "serde")]
mod serde_impl;
mod stream;
mod strlist;
pub(crate) mod utf8;
mod value;

#[cfg(feature = "sha2")]
pub use crate::convert::rep_digest;
pub use crate::convert::{encode_rep, encode_rep_into};
pub use crate::device::DevicePayload;
pub use crate::discovery::{
    DiscoveryPayload, LinkPolicy, ResourceLink, POLICY_DISCOVERABLE, POLICY_OBSERVABLE,
};
pub use crate::encode::{ArrayEncoder, Encoder, MapEncoder};
pub use crate::error::{ErrorCode, ErrorKind, PayloadError};
pub use crate::limits::{
    DecodeLimits, DEFAULT_MAX_CONTAINER_LEN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_MESSAGE_BYTES,
};
pub use crate::parse::decode_rep;
pub use crate::payload::{
    decode_payload, decode_payload_with_limits, encode_payload, Payload, PayloadType,
};
pub use crate::platform::{PlatformInfo, PlatformPayload};
pub use crate::presence::{PresencePayload, PresenceTrigger};
pub use crate::rep::RepPayload;
pub use crate::security::SecurityPayload;
pub use crate::strlist::StringList;
pub use crate::value::{
    calc_dim_total, ArrayItems, Dimensions, PropType, PropValue, RepArray, RepValue,
    MAX_REP_ARRAY_DEPTH,
};
