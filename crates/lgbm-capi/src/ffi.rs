//! Raw pointer helpers for the exported functions.
//!
//! Every helper checks for null before forming a reference. Lengths come from
//! the caller and are trusted once non-negative.

use std::ffi::{c_char, c_int, c_void, CStr};

use lgbm_bridge::{BoosterHandle, DatasetHandle};
use lgbm_engine::{DType, FloatData, IndexData, NativeElement, PredictType};

use crate::error::ApiError;

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Borrow a NUL-terminated UTF-8 string.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, what: &'static str) -> ApiResult<&'a str> {
    if ptr.is_null() {
        return Err(ApiError::NullPointer(what));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| ApiError::InvalidUtf8(what))
}

/// Like [`c_str`], but null reads as the empty string (parameter strings).
pub(crate) unsafe fn c_str_or_empty<'a>(ptr: *const c_char, what: &'static str) -> ApiResult<&'a str> {
    if ptr.is_null() {
        return Ok("");
    }
    unsafe { c_str(ptr, what) }
}

pub(crate) fn length(len: i64, what: &'static str) -> ApiResult<usize> {
    usize::try_from(len).map_err(|_| ApiError::NegativeLength { what, len })
}

/// Borrow `len` elements of `T` from an untyped pointer.
///
/// Goes through bytes so misaligned input is reported instead of read.
pub(crate) unsafe fn typed_slice<'a, T: NativeElement>(
    ptr: *const c_void,
    len: usize,
    what: &'static str,
) -> ApiResult<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(ApiError::NullPointer(what));
    }
    let byte_len = len
        .checked_mul(T::DTYPE.size())
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or(ApiError::TooLarge { what, len })?;
    let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, byte_len) };
    bytemuck::try_cast_slice(bytes).map_err(|e| ApiError::Misaligned {
        what,
        reason: format!("{e:?}"),
    })
}

pub(crate) unsafe fn slice<'a, T: NativeElement>(
    ptr: *const T,
    len: usize,
    what: &'static str,
) -> ApiResult<&'a [T]> {
    unsafe { typed_slice(ptr as *const c_void, len, what) }
}

/// Floating-point buffer tagged with a `C_API_DTYPE_*` value.
pub(crate) unsafe fn float_data<'a>(
    ptr: *const c_void,
    dtype: c_int,
    len: usize,
    what: &'static str,
) -> ApiResult<FloatData<'a>> {
    match DType::from_raw(dtype) {
        Some(DType::Float32) => Ok(FloatData::F32(unsafe { typed_slice(ptr, len, what)? })),
        Some(DType::Float64) => Ok(FloatData::F64(unsafe { typed_slice(ptr, len, what)? })),
        _ => Err(ApiError::UnknownDType { what, tag: dtype }),
    }
}

/// Integer offset buffer tagged with a `C_API_DTYPE_*` value.
pub(crate) unsafe fn index_data<'a>(
    ptr: *const c_void,
    dtype: c_int,
    len: usize,
    what: &'static str,
) -> ApiResult<IndexData<'a>> {
    match DType::from_raw(dtype) {
        Some(DType::Int32) => Ok(IndexData::I32(unsafe { typed_slice(ptr, len, what)? })),
        Some(DType::Int64) => Ok(IndexData::I64(unsafe { typed_slice(ptr, len, what)? })),
        _ => Err(ApiError::UnknownDType { what, tag: dtype }),
    }
}

pub(crate) unsafe fn out_ref<'a, T>(ptr: *mut T, what: &'static str) -> ApiResult<&'a mut T> {
    unsafe { ptr.as_mut() }.ok_or(ApiError::NullPointer(what))
}

/// Copy `values` into a caller buffer of `capacity` elements. Nothing is
/// written when the buffer is too small.
pub(crate) unsafe fn copy_to_caller<T: Copy>(
    values: &[T],
    ptr: *mut T,
    capacity: i64,
    what: &'static str,
) -> ApiResult<()> {
    if (capacity as i128) < values.len() as i128 {
        return Err(ApiError::Capacity {
            what,
            needed: values.len(),
            capacity,
        });
    }
    if values.is_empty() {
        return Ok(());
    }
    if ptr.is_null() {
        return Err(ApiError::NullPointer(what));
    }
    unsafe { std::slice::from_raw_parts_mut(ptr, values.len()) }.copy_from_slice(values);
    Ok(())
}

/// Element count product for a dense matrix.
pub(crate) fn area(nrow: usize, ncol: usize, what: &'static str) -> ApiResult<usize> {
    nrow.checked_mul(ncol).ok_or(ApiError::TooLarge { what, len: nrow })
}

/// A length reported back through an `i64` out-parameter.
pub(crate) fn out_len(len: usize, what: &'static str) -> ApiResult<i64> {
    i64::try_from(len).map_err(|_| ApiError::TooLarge { what, len })
}

pub(crate) fn predict_type(raw: c_int) -> ApiResult<PredictType> {
    PredictType::from_raw(raw).ok_or(ApiError::UnknownPredictType(raw))
}

pub(crate) fn dataset(raw: u64, what: &'static str) -> ApiResult<DatasetHandle> {
    DatasetHandle::from_raw(raw).ok_or(ApiError::InvalidHandle { what, raw })
}

/// `0` means "no reference dataset".
pub(crate) fn reference(raw: u64) -> ApiResult<Option<DatasetHandle>> {
    if raw == 0 {
        return Ok(None);
    }
    dataset(raw, "reference").map(Some)
}

pub(crate) fn booster(raw: u64, what: &'static str) -> ApiResult<BoosterHandle> {
    BoosterHandle::from_raw(raw).ok_or(ApiError::InvalidHandle { what, raw })
}
