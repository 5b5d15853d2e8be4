//! The representation value model.
//!
//! A [`RepPayload`](crate::RepPayload) carries an insertion-ordered list of named
//! [`RepValue`]s. Each value holds a [`PropValue`], a tagged union whose tag is
//! the [`PropType`]. Homogeneous arrays of up to three dimensions are stored as
//! a [`RepArray`]: a flat row-major buffer plus a `dimensions` shape vector.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use crate::alloc_util::{try_map_slice, try_string_from_str, try_vec_from_slice};
use crate::{ErrorCode, PayloadError, RepPayload};

/// Maximum number of array dimensions.
pub const MAX_REP_ARRAY_DEPTH: usize = 3;

/// Array shape. A zero entry ends the list of active axes.
pub type Dimensions = [usize; MAX_REP_ARRAY_DEPTH];

/// Number of elements described by `dims`.
///
/// Returns `0` if `dims[0] == 0`; otherwise the product of the leading non-zero
/// dimensions, stopping at the first zero. Saturates instead of overflowing.
#[must_use]
pub const fn calc_dim_total(dims: &Dimensions) -> usize {
    if dims[0] == 0 {
        return 0;
    }
    let mut total = 1usize;
    let mut i = 0;
    while i < MAX_REP_ARRAY_DEPTH && dims[i] != 0 {
        total = total.saturating_mul(dims[i]);
        i += 1;
    }
    total
}

/// Number of active axes in `dims`.
#[must_use]
pub(crate) fn active_depth(dims: &Dimensions) -> usize {
    dims.iter().take_while(|d| **d != 0).count()
}

/// Flat-buffer distance between consecutive elements at axis `level`.
///
/// The product of the active dimensions after `level`; `1` on the innermost axis.
#[must_use]
pub(crate) fn dim_stride(dims: &Dimensions, level: usize) -> usize {
    dims.iter()
        .skip(level + 1)
        .take_while(|d| **d != 0)
        .fold(1usize, |acc, d| acc.saturating_mul(*d))
}

/// The kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropType {
    /// No data.
    Null,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Double,
    /// Boolean.
    Bool,
    /// UTF-8 text.
    String,
    /// Raw bytes.
    ByteString,
    /// Nested representation.
    Object,
    /// Homogeneous array of up to three dimensions.
    Array,
}

/// The data held by a property.
#[derive(Debug, PartialEq)]
pub enum PropValue {
    /// No data.
    Null,
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 text.
    String(String),
    /// Raw bytes.
    ByteString(Vec<u8>),
    /// Nested representation, exclusively owned by this value.
    Object(Box<RepPayload>),
    /// Homogeneous multi-dimensional array.
    Array(RepArray),
}

impl PropValue {
    /// The kind tag of this value.
    #[must_use]
    pub const fn prop_type(&self) -> PropType {
        match self {
            Self::Null => PropType::Null,
            Self::Int(_) => PropType::Int,
            Self::Double(_) => PropType::Double,
            Self::Bool(_) => PropType::Bool,
            Self::String(_) => PropType::String,
            Self::ByteString(_) => PropType::ByteString,
            Self::Object(_) => PropType::Object,
            Self::Array(_) => PropType::Array,
        }
    }

    /// Deep copy with fallible allocation.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any owned buffer cannot be allocated. Everything
    /// copied so far is released; `self` is never modified.
    pub fn try_clone(&self) -> Result<Self, PayloadError> {
        Ok(match self {
            Self::Null => Self::Null,
            Self::Int(v) => Self::Int(*v),
            Self::Double(v) => Self::Double(*v),
            Self::Bool(v) => Self::Bool(*v),
            Self::String(s) => Self::String(try_string_from_str(s, 0)?),
            Self::ByteString(b) => Self::ByteString(try_vec_from_slice(b, 0)?),
            Self::Object(obj) => Self::Object(Box::new(obj.clone_chain()?)),
            Self::Array(arr) => Self::Array(arr.try_clone()?),
        })
    }
}

/// One named property of a representation.
#[derive(Debug, PartialEq)]
pub struct RepValue {
    pub(crate) name: String,
    pub(crate) value: PropValue,
}

impl RepValue {
    /// Property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property data.
    #[must_use]
    pub const fn value(&self) -> &PropValue {
        &self.value
    }

    /// The kind tag of the property data.
    #[must_use]
    pub const fn prop_type(&self) -> PropType {
        self.value.prop_type()
    }

    pub(crate) fn try_clone(&self) -> Result<Self, PayloadError> {
        Ok(Self {
            name: try_string_from_str(&self.name, 0)?,
            value: self.value.try_clone()?,
        })
    }
}

/// Flat element buffer of a [`RepArray`], one variant per element kind.
#[derive(Debug, PartialEq)]
pub enum ArrayItems {
    /// Integer elements.
    Int(Vec<i64>),
    /// Double elements.
    Double(Vec<f64>),
    /// Boolean elements.
    Bool(Vec<bool>),
    /// Text elements.
    String(Vec<String>),
    /// Byte-string elements.
    ByteString(Vec<Vec<u8>>),
    /// Nested representation elements.
    Object(Vec<RepPayload>),
}

impl ArrayItems {
    /// Number of elements in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::String(v) => v.len(),
            Self::ByteString(v) => v.len(),
            Self::Object(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element kind.
    #[must_use]
    pub const fn element_type(&self) -> PropType {
        match self {
            Self::Int(_) => PropType::Int,
            Self::Double(_) => PropType::Double,
            Self::Bool(_) => PropType::Bool,
            Self::String(_) => PropType::String,
            Self::ByteString(_) => PropType::ByteString,
            Self::Object(_) => PropType::Object,
        }
    }

    /// Deep copy with fallible allocation.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any buffer or element cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, PayloadError> {
        Ok(match self {
            Self::Int(v) => Self::Int(try_vec_from_slice(v, 0)?),
            Self::Double(v) => Self::Double(try_vec_from_slice(v, 0)?),
            Self::Bool(v) => Self::Bool(try_vec_from_slice(v, 0)?),
            Self::String(v) => Self::String(try_map_slice(v, 0, |s| try_string_from_str(s, 0))?),
            Self::ByteString(v) => {
                Self::ByteString(try_map_slice(v, 0, |b| try_vec_from_slice(b, 0))?)
            }
            Self::Object(v) => Self::Object(try_map_slice(v, 0, RepPayload::clone_chain)?),
        })
    }
}

/// A homogeneous array of one to three dimensions.
///
/// The buffer always holds exactly `calc_dim_total(dimensions)` elements in
/// row-major order (the outer dimension varies slowest).
#[derive(Debug, PartialEq)]
pub struct RepArray {
    dims: Dimensions,
    items: ArrayItems,
}

impl RepArray {
    /// Build an array from a flat buffer and its shape.
    ///
    /// Dimensions after the first zero are ignored and stored as zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if the shape describes zero elements or the buffer
    /// length differs from `calc_dim_total(dims)`.
    pub fn new(items: ArrayItems, dims: Dimensions) -> Result<Self, PayloadError> {
        let mut dims = dims;
        let depth = active_depth(&dims);
        for d in dims.iter_mut().skip(depth) {
            *d = 0;
        }
        let total = calc_dim_total(&dims);
        if total == 0 || items.len() != total {
            return Err(PayloadError::invalid(ErrorCode::InvalidDimensions));
        }
        Ok(Self { dims, items })
    }

    /// The shape vector.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// The element kind.
    #[must_use]
    pub const fn element_type(&self) -> PropType {
        self.items.element_type()
    }

    /// Number of elements, `calc_dim_total(dimensions)`.
    #[must_use]
    pub const fn len(&self) -> usize {
        calc_dim_total(&self.dims)
    }

    /// Always `false`: an array owns at least one element.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The flat element buffer.
    #[must_use]
    pub const fn items(&self) -> &ArrayItems {
        &self.items
    }

    /// Consume the array, returning its buffer.
    #[must_use]
    pub fn into_items(self) -> ArrayItems {
        self.items
    }

    /// Integer elements, if this is an integer array.
    #[must_use]
    pub fn as_ints(&self) -> Option<&[i64]> {
        match &self.items {
            ArrayItems::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Text elements, if this is a string array.
    #[must_use]
    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.items {
            ArrayItems::String(v) => Some(v),
            _ => None,
        }
    }

    /// Object elements, if this is an object array.
    #[must_use]
    pub fn as_objects(&self) -> Option<&[RepPayload]> {
        match &self.items {
            ArrayItems::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Deep copy with fallible allocation.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if any element cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, PayloadError> {
        Ok(Self {
            dims: self.dims,
            items: self.items.try_clone()?,
        })
    }

    /// Move object elements out so their destruction can be driven iteratively.
    ///
    /// Only called from `Drop`; afterwards the buffer length no longer matches the shape.
    pub(crate) fn take_objects(&mut self) -> Vec<RepPayload> {
        match &mut self.items {
            ArrayItems::Object(v) => mem::take(v),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn dim_total_follows_leading_nonzero_axes() {
        assert_eq!(calc_dim_total(&[0, 0, 0]), 0);
        assert_eq!(calc_dim_total(&[0, 3, 4]), 0);
        assert_eq!(calc_dim_total(&[5, 0, 0]), 5);
        assert_eq!(calc_dim_total(&[2, 3, 0]), 6);
        assert_eq!(calc_dim_total(&[2, 0, 7]), 2);
        assert_eq!(calc_dim_total(&[2, 3, 4]), 24);
        assert_eq!(calc_dim_total(&[usize::MAX, 2, 0]), usize::MAX);
    }

    #[test]
    fn stride_is_product_of_inner_axes() {
        assert_eq!(dim_stride(&[2, 3, 4], 0), 12);
        assert_eq!(dim_stride(&[2, 3, 4], 1), 4);
        assert_eq!(dim_stride(&[2, 3, 4], 2), 1);
        assert_eq!(dim_stride(&[2, 3, 0], 0), 3);
        assert_eq!(dim_stride(&[5, 0, 0], 0), 1);
    }

    #[test]
    fn array_rejects_mismatched_buffer() {
        let err = RepArray::new(ArrayItems::Int(vec![1, 2, 3]), [2, 2, 0]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDimensions);
        let err = RepArray::new(ArrayItems::Int(vec![]), [0, 0, 0]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDimensions);
    }

    #[test]
    fn array_clears_axes_after_first_zero() {
        let arr = RepArray::new(ArrayItems::Bool(vec![true, false]), [2, 0, 9]).unwrap();
        assert_eq!(arr.dimensions(), [2, 0, 0]);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.element_type(), PropType::Bool);
    }

    #[test]
    fn try_clone_is_deep() {
        let arr = RepArray::new(
            ArrayItems::String(vec![String::from("a"), String::from("b")]),
            [2, 0, 0],
        )
        .unwrap();
        let copy = arr.try_clone().unwrap();
        assert_eq!(arr, copy);
        let ArrayItems::String(orig) = arr.items() else {
            panic!("expected string array");
        };
        let ArrayItems::String(dup) = copy.items() else {
            panic!("expected string array");
        };
        assert_ne!(orig[0].as_ptr(), dup[0].as_ptr());
    }
}
