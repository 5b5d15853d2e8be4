use alloc::string::String;
use alloc::vec::Vec;
use core::alloc::Layout;

use crate::{ErrorCode, PayloadError};

#[inline]
fn check_reserve_len<T>(len: usize, additional: usize, offset: usize) -> Result<(), PayloadError> {
    let needed = len
        .checked_add(additional)
        .ok_or_else(|| PayloadError::new(ErrorCode::LengthOverflow, offset))?;
    Layout::array::<T>(needed).map_err(|_| PayloadError::new(ErrorCode::LengthOverflow, offset))?;
    Ok(())
}

#[inline]
pub fn try_reserve_exact<T>(
    v: &mut Vec<T>,
    additional: usize,
    offset: usize,
) -> Result<(), PayloadError> {
    let needed = v
        .len()
        .checked_add(additional)
        .ok_or_else(|| PayloadError::new(ErrorCode::LengthOverflow, offset))?;
    if needed <= v.capacity() {
        return Ok(());
    }
    check_reserve_len::<T>(v.len(), additional, offset)?;
    v.try_reserve_exact(additional)
        .map_err(|_| PayloadError::new(ErrorCode::AllocationFailed, offset))
}

#[inline]
pub fn try_reserve<T>(
    v: &mut Vec<T>,
    additional: usize,
    offset: usize,
) -> Result<(), PayloadError> {
    let needed = v
        .len()
        .checked_add(additional)
        .ok_or_else(|| PayloadError::new(ErrorCode::LengthOverflow, offset))?;
    if needed <= v.capacity() {
        return Ok(());
    }
    check_reserve_len::<T>(v.len(), additional, offset)?;
    v.try_reserve(additional)
        .map_err(|_| PayloadError::new(ErrorCode::AllocationFailed, offset))
}

#[inline]
pub fn try_push<T>(v: &mut Vec<T>, item: T, offset: usize) -> Result<(), PayloadError> {
    try_reserve(v, 1, offset)?;
    v.push(item);
    Ok(())
}

#[inline]
pub fn try_string_from_str(s: &str, offset: usize) -> Result<String, PayloadError> {
    let mut out = String::new();
    out.try_reserve_exact(s.len())
        .map_err(|_| PayloadError::new(ErrorCode::AllocationFailed, offset))?;
    out.push_str(s);
    Ok(out)
}

#[inline]
pub fn try_vec_from_slice<T: Clone>(items: &[T], offset: usize) -> Result<Vec<T>, PayloadError> {
    let mut v = Vec::new();
    try_reserve_exact(&mut v, items.len(), offset)?;
    v.extend_from_slice(items);
    Ok(v)
}

#[inline]
pub fn try_vec_with_capacity<T>(cap: usize, offset: usize) -> Result<Vec<T>, PayloadError> {
    let mut v: Vec<T> = Vec::new();
    try_reserve_exact(&mut v, cap, offset)?;
    Ok(v)
}

/// A vector of `n` default values, reserved fallibly.
#[inline]
pub fn try_vec_default<T: Default>(n: usize, offset: usize) -> Result<Vec<T>, PayloadError> {
    let mut v = try_vec_with_capacity(n, offset)?;
    v.resize_with(n, T::default);
    Ok(v)
}

/// Fallible element-wise copy, for element types that own heap data.
#[inline]
pub fn try_map_slice<T, U>(
    items: &[T],
    offset: usize,
    mut f: impl FnMut(&T) -> Result<U, PayloadError>,
) -> Result<Vec<U>, PayloadError> {
    let mut v = try_vec_with_capacity(items.len(), offset)?;
    for item in items {
        v.push(f(item)?);
    }
    Ok(v)
}
