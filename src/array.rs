//! Array setters and getters on [`RepPayload`].
//!
//! Copying setters validate the shape before allocating anything, copy every element
//! fallibly, then hand the copy to the matching `*_as_owner` setter. Getters return a
//! fresh copy that the caller owns.

use alloc::string::String;
use alloc::vec::Vec;

use crate::alloc_util::{try_map_slice, try_string_from_str, try_vec_from_slice};
use crate::value::{calc_dim_total, ArrayItems, Dimensions, PropValue, RepArray};
use crate::{ErrorCode, PayloadError, RepPayload};

/// Validate a caller-supplied buffer against its shape.
fn checked_total(dims: &Dimensions, len: usize) -> Result<usize, PayloadError> {
    let total = calc_dim_total(dims);
    if total == 0 || total != len {
        return Err(PayloadError::invalid(ErrorCode::InvalidDimensions));
    }
    Ok(total)
}

impl RepPayload {
    /// Store an already-built array under `name`.
    ///
    /// # Errors
    ///
    /// See [`find_and_set`](Self::find_and_set).
    pub fn set_array_as_owner(&mut self, name: &str, array: RepArray) -> Result<(), PayloadError> {
        self.find_and_set(name, PropValue::Array(array)).map(|_| ())
    }

    fn set_items_as_owner(
        &mut self,
        name: &str,
        items: ArrayItems,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        let array = RepArray::new(items, dims)?;
        self.set_array_as_owner(name, array)
    }

    /// Borrow the array stored under `name`.
    #[must_use]
    pub fn get_array(&self, name: &str) -> Option<&RepArray> {
        match self.find(name)?.value() {
            PropValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Store an integer array, taking ownership of the flat buffer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `array.len()` is not `calc_dim_total(dims)` or is zero.
    pub fn set_int_array_as_owner(
        &mut self,
        name: &str,
        array: Vec<i64>,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        self.set_items_as_owner(name, ArrayItems::Int(array), dims)
    }

    /// Store a copy of an integer array.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a bad shape (nothing is allocated) and
    /// `AllocationFailed` if the copy fails.
    pub fn set_int_array(
        &mut self,
        name: &str,
        array: &[i64],
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        checked_total(&dims, array.len())?;
        let copy = try_vec_from_slice(array, 0)?;
        self.set_int_array_as_owner(name, copy, dims)
    }

    /// Copy of the integer array stored under `name`, with its shape.
    #[must_use]
    pub fn get_int_array(&self, name: &str) -> Option<(Vec<i64>, Dimensions)> {
        let arr = self.get_array(name)?;
        match arr.items() {
            ArrayItems::Int(v) => Some((try_vec_from_slice(v, 0).ok()?, arr.dimensions())),
            _ => None,
        }
    }

    /// Store a double array, taking ownership of the flat buffer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `array.len()` is not `calc_dim_total(dims)` or is zero.
    pub fn set_double_array_as_owner(
        &mut self,
        name: &str,
        array: Vec<f64>,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        self.set_items_as_owner(name, ArrayItems::Double(array), dims)
    }

    /// Store a copy of a double array.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a bad shape and `AllocationFailed` if the copy fails.
    pub fn set_double_array(
        &mut self,
        name: &str,
        array: &[f64],
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        checked_total(&dims, array.len())?;
        let copy = try_vec_from_slice(array, 0)?;
        self.set_double_array_as_owner(name, copy, dims)
    }

    /// Copy of the double array stored under `name`. Integer arrays are converted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_double_array(&self, name: &str) -> Option<(Vec<f64>, Dimensions)> {
        let arr = self.get_array(name)?;
        let copy = match arr.items() {
            ArrayItems::Double(v) => try_vec_from_slice(v, 0).ok()?,
            ArrayItems::Int(v) => try_map_slice(v, 0, |i| Ok(*i as f64)).ok()?,
            _ => return None,
        };
        Some((copy, arr.dimensions()))
    }

    /// Store a boolean array, taking ownership of the flat buffer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `array.len()` is not `calc_dim_total(dims)` or is zero.
    pub fn set_bool_array_as_owner(
        &mut self,
        name: &str,
        array: Vec<bool>,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        self.set_items_as_owner(name, ArrayItems::Bool(array), dims)
    }

    /// Store a copy of a boolean array.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a bad shape and `AllocationFailed` if the copy fails.
    pub fn set_bool_array(
        &mut self,
        name: &str,
        array: &[bool],
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        checked_total(&dims, array.len())?;
        let copy = try_vec_from_slice(array, 0)?;
        self.set_bool_array_as_owner(name, copy, dims)
    }

    /// Copy of the boolean array stored under `name`, with its shape.
    #[must_use]
    pub fn get_bool_array(&self, name: &str) -> Option<(Vec<bool>, Dimensions)> {
        let arr = self.get_array(name)?;
        match arr.items() {
            ArrayItems::Bool(v) => Some((try_vec_from_slice(v, 0).ok()?, arr.dimensions())),
            _ => None,
        }
    }

    /// Store a string array, taking ownership of the buffer and its strings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `array.len()` is not `calc_dim_total(dims)` or is zero.
    pub fn set_string_array_as_owner(
        &mut self,
        name: &str,
        array: Vec<String>,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        self.set_items_as_owner(name, ArrayItems::String(array), dims)
    }

    /// Store a copy of a string array; every string is duplicated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a bad shape and `AllocationFailed` if any copy
    /// fails, in which case the strings copied so far are released.
    pub fn set_string_array<S: AsRef<str>>(
        &mut self,
        name: &str,
        array: &[S],
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        checked_total(&dims, array.len())?;
        let copy = try_map_slice(array, 0, |s| try_string_from_str(s.as_ref(), 0))?;
        self.set_string_array_as_owner(name, copy, dims)
    }

    /// Copy of the string array stored under `name`, with its shape.
    #[must_use]
    pub fn get_string_array(&self, name: &str) -> Option<(Vec<String>, Dimensions)> {
        let arr = self.get_array(name)?;
        match arr.items() {
            ArrayItems::String(v) => {
                let copy = try_map_slice(v, 0, |s| try_string_from_str(s, 0)).ok()?;
                Some((copy, arr.dimensions()))
            }
            _ => None,
        }
    }

    /// Store a byte-string array, taking ownership of the buffer and its elements.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `array.len()` is not `calc_dim_total(dims)` or is zero.
    pub fn set_byte_string_array_as_owner(
        &mut self,
        name: &str,
        array: Vec<Vec<u8>>,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        self.set_items_as_owner(name, ArrayItems::ByteString(array), dims)
    }

    /// Store a copy of a byte-string array; every element is duplicated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a bad shape and `AllocationFailed` if any copy
    /// fails, in which case the elements copied so far are released.
    pub fn set_byte_string_array<B: AsRef<[u8]>>(
        &mut self,
        name: &str,
        array: &[B],
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        checked_total(&dims, array.len())?;
        let copy = try_map_slice(array, 0, |b| try_vec_from_slice(b.as_ref(), 0))?;
        self.set_byte_string_array_as_owner(name, copy, dims)
    }

    /// Copy of the byte-string array stored under `name`, with its shape.
    #[must_use]
    pub fn get_byte_string_array(&self, name: &str) -> Option<(Vec<Vec<u8>>, Dimensions)> {
        let arr = self.get_array(name)?;
        match arr.items() {
            ArrayItems::ByteString(v) => {
                let copy = try_map_slice(v, 0, |b| try_vec_from_slice(b, 0)).ok()?;
                Some((copy, arr.dimensions()))
            }
            _ => None,
        }
    }

    /// Store an object array, taking ownership of the buffer and its payloads.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if `array.len()` is not `calc_dim_total(dims)` or is zero.
    pub fn set_object_array_as_owner(
        &mut self,
        name: &str,
        array: Vec<Self>,
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        self.set_items_as_owner(name, ArrayItems::Object(array), dims)
    }

    /// Store a deep copy of an object array.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` for a bad shape and `AllocationFailed` if any clone
    /// fails, in which case the payloads cloned so far are released.
    pub fn set_object_array(
        &mut self,
        name: &str,
        array: &[Self],
        dims: Dimensions,
    ) -> Result<(), PayloadError> {
        checked_total(&dims, array.len())?;
        let copy = try_map_slice(array, 0, Self::clone_chain)?;
        self.set_object_array_as_owner(name, copy, dims)
    }

    /// Deep copy of the object array stored under `name`, with its shape.
    #[must_use]
    pub fn get_object_array(&self, name: &str) -> Option<(Vec<Self>, Dimensions)> {
        let arr = self.get_array(name)?;
        match arr.items() {
            ArrayItems::Object(v) => {
                let copy = try_map_slice(v, 0, Self::clone_chain).ok()?;
                Some((copy, arr.dimensions()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropType;
    use alloc::vec;

    #[test]
    fn zero_total_fails_without_storing() {
        let mut p = RepPayload::new();
        let err = p.set_int_array("a", &[], [0, 0, 0]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDimensions);
        assert!(p.find("a").is_none());
    }

    #[test]
    fn short_buffer_rejected() {
        let mut p = RepPayload::new();
        let err = p.set_int_array("a", &[1, 2, 3], [2, 2, 0]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDimensions);
    }

    #[test]
    fn int_array_round_trips_with_shape() {
        let mut p = RepPayload::new();
        p.set_int_array("m", &[1, 2, 3, 4, 5, 6], [2, 3, 0]).unwrap();
        let (v, dims) = p.get_int_array("m").unwrap();
        assert_eq!(v, [1, 2, 3, 4, 5, 6]);
        assert_eq!(dims, [2, 3, 0]);
        assert_eq!(p.find("m").unwrap().prop_type(), PropType::Array);
        assert_eq!(p.get_array("m").unwrap().element_type(), PropType::Int);
    }

    #[test]
    fn double_array_getter_accepts_ints() {
        let mut p = RepPayload::new();
        p.set_int_array("m", &[1, -2], [2, 0, 0]).unwrap();
        assert_eq!(p.get_double_array("m").unwrap().0, [1.0, -2.0]);
        assert!(p.get_bool_array("m").is_none());
        assert!(p.get_string_array("m").is_none());
    }

    #[test]
    fn string_array_copy_is_independent() {
        let mut p = RepPayload::new();
        p.set_string_array("s", &["a", "b", "c"], [3, 0, 0]).unwrap();
        let (mut copy, _) = p.get_string_array("s").unwrap();
        copy[0].push('!');
        assert_eq!(p.get_array("s").unwrap().as_strings().unwrap()[0], "a");
    }

    #[test]
    fn object_and_byte_arrays() {
        let mut child = RepPayload::new();
        child.set_prop_int("x", 1).unwrap();
        let mut p = RepPayload::new();
        p.set_object_array("o", &[child], [1, 0, 0]).unwrap();
        p.set_byte_string_array("b", &[vec![1u8], vec![2, 3]], [2, 0, 0])
            .unwrap();
        let (objs, _) = p.get_object_array("o").unwrap();
        assert_eq!(objs[0].get_prop_int("x"), Some(1));
        let (bytes, dims) = p.get_byte_string_array("b").unwrap();
        assert_eq!(bytes, [vec![1u8], vec![2, 3]]);
        assert_eq!(dims, [2, 0, 0]);
    }

    #[test]
    fn three_dimensional_bool_array() {
        let mut p = RepPayload::new();
        let flat = [true, false, true, false, true, false, true, false];
        p.set_bool_array("cube", &flat, [2, 2, 2]).unwrap();
        assert_eq!(p.get_array("cube").unwrap().len(), 8);
    }
}
