//! Dataset entry points.

use std::ffi::{c_char, c_int, c_void};

use tracing::debug;

use lgbm_bridge::{CscMatrix, CsrMatrix, DenseMatrix, Field, FieldData, FieldSlice, Layout};
use lgbm_engine::DType;

use crate::error::ApiError;
use crate::ffi::{self, c_str, c_str_or_empty, length, out_ref, typed_slice};
use crate::run;

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetCreateFromFile(
    filename: *const c_char,
    parameters: *const c_char,
    reference: u64,
    out: *mut u64,
) -> c_int {
    run("LGBMB_DatasetCreateFromFile", |bridge| {
        let filename = unsafe { c_str(filename, "filename")? };
        let parameters = unsafe { c_str_or_empty(parameters, "parameters")? };
        let out = unsafe { out_ref(out, "out")? };
        let handle = bridge.dataset_from_file(filename, parameters, ffi::reference(reference)?)?;
        *out = handle.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetCreateFromMat(
    data: *const c_void,
    data_type: c_int,
    nrow: i32,
    ncol: i32,
    is_row_major: c_int,
    parameters: *const c_char,
    reference: u64,
    out: *mut u64,
) -> c_int {
    run("LGBMB_DatasetCreateFromMat", |bridge| {
        let nrow = length(nrow as i64, "nrow")?;
        let ncol = length(ncol as i64, "ncol")?;
        let values = unsafe { ffi::float_data(data, data_type, ffi::area(nrow, ncol, "data")?, "data")? };
        let layout = if is_row_major != 0 {
            Layout::RowMajor
        } else {
            Layout::ColMajor
        };
        let matrix = DenseMatrix::new(values, nrow, ncol, layout)?;
        let parameters = unsafe { c_str_or_empty(parameters, "parameters")? };
        let out = unsafe { out_ref(out, "out")? };
        let handle = bridge.dataset_from_mat(&matrix, parameters, ffi::reference(reference)?)?;
        *out = handle.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetCreateFromCSR(
    indptr: *const c_void,
    indptr_type: c_int,
    indices: *const i32,
    data: *const c_void,
    data_type: c_int,
    nindptr: i64,
    nelem: i64,
    num_col: i64,
    parameters: *const c_char,
    reference: u64,
    out: *mut u64,
) -> c_int {
    run("LGBMB_DatasetCreateFromCSR", |bridge| {
        let nindptr = length(nindptr, "nindptr")?;
        let nelem = length(nelem, "nelem")?;
        let indptr = unsafe { ffi::index_data(indptr, indptr_type, nindptr, "indptr")? };
        let indices = unsafe { ffi::slice(indices, nelem, "indices")? };
        let values = unsafe { ffi::float_data(data, data_type, nelem, "data")? };
        let matrix = CsrMatrix::new(indptr, indices, values, length(num_col, "num_col")?)?;
        let parameters = unsafe { c_str_or_empty(parameters, "parameters")? };
        let out = unsafe { out_ref(out, "out")? };
        let handle = bridge.dataset_from_csr(&matrix, parameters, ffi::reference(reference)?)?;
        *out = handle.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetCreateFromCSC(
    col_ptr: *const c_void,
    col_ptr_type: c_int,
    indices: *const i32,
    data: *const c_void,
    data_type: c_int,
    ncol_ptr: i64,
    nelem: i64,
    num_row: i64,
    parameters: *const c_char,
    reference: u64,
    out: *mut u64,
) -> c_int {
    run("LGBMB_DatasetCreateFromCSC", |bridge| {
        let ncol_ptr = length(ncol_ptr, "ncol_ptr")?;
        let nelem = length(nelem, "nelem")?;
        let col_ptr = unsafe { ffi::index_data(col_ptr, col_ptr_type, ncol_ptr, "col_ptr")? };
        let indices = unsafe { ffi::slice(indices, nelem, "indices")? };
        let values = unsafe { ffi::float_data(data, data_type, nelem, "data")? };
        let matrix = CscMatrix::new(col_ptr, indices, values, length(num_row, "num_row")?)?;
        let parameters = unsafe { c_str_or_empty(parameters, "parameters")? };
        let out = unsafe { out_ref(out, "out")? };
        let handle = bridge.dataset_from_csc(&matrix, parameters, ffi::reference(reference)?)?;
        *out = handle.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetGetSubset(
    handle: u64,
    used_row_indices: *const i32,
    num_used_row_indices: i32,
    parameters: *const c_char,
    out: *mut u64,
) -> c_int {
    run("LGBMB_DatasetGetSubset", |bridge| {
        let source = ffi::dataset(handle, "dataset")?;
        let len = length(num_used_row_indices as i64, "num_used_row_indices")?;
        let rows = unsafe { ffi::slice(used_row_indices, len, "used_row_indices")? };
        let parameters = unsafe { c_str_or_empty(parameters, "parameters")? };
        let out = unsafe { out_ref(out, "out")? };
        *out = bridge.dataset_subset(source, rows, parameters)?.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetFree(handle: u64) -> c_int {
    run("LGBMB_DatasetFree", |bridge| {
        bridge.dataset_free(ffi::dataset(handle, "dataset")?)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetSaveBinary(handle: u64, filename: *const c_char) -> c_int {
    run("LGBMB_DatasetSaveBinary", |bridge| {
        let filename = unsafe { c_str(filename, "filename")? };
        bridge.dataset_save_binary(ffi::dataset(handle, "dataset")?, filename)?;
        Ok(())
    })
}

/// Set `label`/`weight` (float32) or `group`/`group_id` (int32).
#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetSetField(
    handle: u64,
    field_name: *const c_char,
    field_data: *const c_void,
    num_element: i64,
    dtype: c_int,
) -> c_int {
    run("LGBMB_DatasetSetField", |bridge| {
        let field: Field = unsafe { c_str(field_name, "field_name")? }.parse()?;
        let len = length(num_element, "num_element")?;
        let data = unsafe {
            match DType::from_raw(dtype) {
                Some(DType::Float32) => FieldSlice::Float32(typed_slice(field_data, len, "field_data")?),
                Some(DType::Float64) => FieldSlice::Float64(typed_slice(field_data, len, "field_data")?),
                Some(DType::Int32) => FieldSlice::Int32(typed_slice(field_data, len, "field_data")?),
                Some(DType::Int64) => FieldSlice::Int64(typed_slice(field_data, len, "field_data")?),
                None => {
                    return Err(ApiError::UnknownDType {
                        what: "field_data",
                        tag: dtype,
                    })
                }
            }
        };
        bridge.dataset_set_field(ffi::dataset(handle, "dataset")?, field, data)?;
        Ok(())
    })
}

/// Copy a field into `out_buf` (room for `capacity` elements).
///
/// With a null `out_buf` only `out_len` and `out_type` are filled, so the
/// caller can size its buffer first.
#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetGetField(
    handle: u64,
    field_name: *const c_char,
    out_len: *mut i64,
    out_buf: *mut c_void,
    capacity: i64,
    out_type: *mut c_int,
) -> c_int {
    run("LGBMB_DatasetGetField", |bridge| {
        let field: Field = unsafe { c_str(field_name, "field_name")? }.parse()?;
        let out_len = unsafe { out_ref(out_len, "out_len")? };
        let out_type = unsafe { out_ref(out_type, "out_type")? };
        let data = bridge.dataset_get_field(ffi::dataset(handle, "dataset")?, field)?;
        debug!(%field, len = data.len(), "LGBMB_DatasetGetField");

        if !out_buf.is_null() {
            unsafe {
                match &data {
                    FieldData::Float32(v) => ffi::copy_to_caller(v, out_buf as *mut f32, capacity, "out_buf")?,
                    FieldData::Float64(v) => ffi::copy_to_caller(v, out_buf as *mut f64, capacity, "out_buf")?,
                    FieldData::Int32(v) => ffi::copy_to_caller(v, out_buf as *mut i32, capacity, "out_buf")?,
                    FieldData::Int64(v) => ffi::copy_to_caller(v, out_buf as *mut i64, capacity, "out_buf")?,
                }
            }
        }
        *out_len = data.len() as i64;
        *out_type = data.dtype().as_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetGetNumData(handle: u64, out: *mut i64) -> c_int {
    run("LGBMB_DatasetGetNumData", |bridge| {
        let out = unsafe { out_ref(out, "out")? };
        *out = bridge.dataset_num_data(ffi::dataset(handle, "dataset")?)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_DatasetGetNumFeature(handle: u64, out: *mut i64) -> c_int {
    run("LGBMB_DatasetGetNumFeature", |bridge| {
        let out = unsafe { out_ref(out, "out")? };
        *out = bridge.dataset_num_feature(ffi::dataset(handle, "dataset")?)?;
        Ok(())
    })
}
