//! Evaluation and prediction entry points.
//!
//! Output arrays are caller-allocated. Each call takes the buffer's capacity
//! in elements and fails without writing when it is too small;
//! `LGBMB_BoosterCalcNumPredict` gives the size a prediction needs.

use std::ffi::{c_char, c_int, c_void};

use lgbm_bridge::{CsrMatrix, DenseMatrix, Layout};
use lgbm_engine::native::EVAL_NAME_CAPACITY;

use crate::error::ApiError;
use crate::ffi::{self, c_str, copy_to_caller, length, out_ref};
use crate::run;

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterGetEvalCounts(handle: u64, out_len: *mut i64) -> c_int {
    run("LGBMB_BoosterGetEvalCounts", |bridge| {
        let out = unsafe { out_ref(out_len, "out_len")? };
        *out = bridge.booster_eval_counts(ffi::booster(handle, "booster")?)? as i64;
        Ok(())
    })
}

/// Copy metric names into `out_strs`, an array of `capacity` buffers of
/// `EVAL_NAME_CAPACITY` (256) bytes each. Longer names are truncated.
#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterGetEvalNames(
    handle: u64,
    out_len: *mut i64,
    out_strs: *mut *mut c_char,
    capacity: i64,
) -> c_int {
    run("LGBMB_BoosterGetEvalNames", |bridge| {
        let out_len = unsafe { out_ref(out_len, "out_len")? };
        let names = bridge.booster_eval_names(ffi::booster(handle, "booster")?)?;
        if (capacity as i128) < names.len() as i128 {
            return Err(ApiError::Capacity {
                what: "out_strs",
                needed: names.len(),
                capacity,
            });
        }
        if !names.is_empty() && out_strs.is_null() {
            return Err(ApiError::NullPointer("out_strs"));
        }

        for (i, name) in names.iter().enumerate() {
            let dest = unsafe { *out_strs.add(i) };
            if dest.is_null() {
                return Err(ApiError::NullPointer("out_strs entry"));
            }
            let bytes = name.as_bytes();
            let n = bytes.len().min(EVAL_NAME_CAPACITY - 1);
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), dest as *mut u8, n);
                *dest.add(n) = 0;
            }
        }
        *out_len = names.len() as i64;
        Ok(())
    })
}

/// `data_idx` 0 is the training data, 1.. the validation sets in the order added.
#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterGetEval(
    handle: u64,
    data_idx: c_int,
    out_len: *mut i64,
    out_results: *mut f32,
    capacity: i64,
) -> c_int {
    run("LGBMB_BoosterGetEval", |bridge| {
        let out_len = unsafe { out_ref(out_len, "out_len")? };
        let scores = bridge.booster_eval(ffi::booster(handle, "booster")?, data_idx)?;
        unsafe { copy_to_caller(&scores, out_results, capacity, "out_results")? };
        *out_len = scores.len() as i64;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterGetPredict(
    handle: u64,
    data_idx: c_int,
    out_len: *mut i64,
    out_result: *mut f32,
    capacity: i64,
) -> c_int {
    run("LGBMB_BoosterGetPredict", |bridge| {
        let out_len = unsafe { out_ref(out_len, "out_len")? };
        let scores = bridge.booster_get_predict(ffi::booster(handle, "booster")?, data_idx)?;
        unsafe { copy_to_caller(&scores, out_result, capacity, "out_result")? };
        *out_len = scores.len() as i64;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterCalcNumPredict(
    handle: u64,
    num_row: i64,
    predict_type: c_int,
    num_iteration: i64,
    out_len: *mut i64,
) -> c_int {
    run("LGBMB_BoosterCalcNumPredict", |bridge| {
        let out_len = unsafe { out_ref(out_len, "out_len")? };
        let len = bridge.booster_calc_num_predict(
            ffi::booster(handle, "booster")?,
            length(num_row, "num_row")?,
            ffi::predict_type(predict_type)?,
            num_iteration,
        )?;
        *out_len = ffi::out_len(len, "out_len")?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterPredictForFile(
    handle: u64,
    data_filename: *const c_char,
    data_has_header: c_int,
    predict_type: c_int,
    num_iteration: i64,
    result_filename: *const c_char,
) -> c_int {
    run("LGBMB_BoosterPredictForFile", |bridge| {
        let data_filename = unsafe { c_str(data_filename, "data_filename")? };
        let result_filename = unsafe { c_str(result_filename, "result_filename")? };
        bridge.booster_predict_for_file(
            ffi::booster(handle, "booster")?,
            data_filename,
            data_has_header != 0,
            ffi::predict_type(predict_type)?,
            num_iteration,
            result_filename,
        )?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterPredictForCSR(
    handle: u64,
    indptr: *const c_void,
    indptr_type: c_int,
    indices: *const i32,
    data: *const c_void,
    data_type: c_int,
    nindptr: i64,
    nelem: i64,
    num_col: i64,
    predict_type: c_int,
    num_iteration: i64,
    out_len: *mut i64,
    out_result: *mut f32,
    capacity: i64,
) -> c_int {
    run("LGBMB_BoosterPredictForCSR", |bridge| {
        let nindptr = length(nindptr, "nindptr")?;
        let nelem = length(nelem, "nelem")?;
        let indptr = unsafe { ffi::index_data(indptr, indptr_type, nindptr, "indptr")? };
        let indices = unsafe { ffi::slice(indices, nelem, "indices")? };
        let values = unsafe { ffi::float_data(data, data_type, nelem, "data")? };
        let matrix = CsrMatrix::new(indptr, indices, values, length(num_col, "num_col")?)?;
        let out_len = unsafe { out_ref(out_len, "out_len")? };

        let scores = bridge.booster_predict_for_csr(
            ffi::booster(handle, "booster")?,
            &matrix,
            ffi::predict_type(predict_type)?,
            num_iteration,
        )?;
        unsafe { copy_to_caller(&scores, out_result, capacity, "out_result")? };
        *out_len = scores.len() as i64;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterPredictForMat(
    handle: u64,
    data: *const c_void,
    data_type: c_int,
    nrow: i32,
    ncol: i32,
    is_row_major: c_int,
    predict_type: c_int,
    num_iteration: i64,
    out_len: *mut i64,
    out_result: *mut f32,
    capacity: i64,
) -> c_int {
    run("LGBMB_BoosterPredictForMat", |bridge| {
        let nrow = length(nrow as i64, "nrow")?;
        let ncol = length(ncol as i64, "ncol")?;
        let values = unsafe { ffi::float_data(data, data_type, ffi::area(nrow, ncol, "data")?, "data")? };
        let layout = if is_row_major != 0 {
            Layout::RowMajor
        } else {
            Layout::ColMajor
        };
        let matrix = DenseMatrix::new(values, nrow, ncol, layout)?;
        let out_len = unsafe { out_ref(out_len, "out_len")? };

        let scores = bridge.booster_predict_for_mat(
            ffi::booster(handle, "booster")?,
            &matrix,
            ffi::predict_type(predict_type)?,
            num_iteration,
        )?;
        unsafe { copy_to_caller(&scores, out_result, capacity, "out_result")? };
        *out_len = scores.len() as i64;
        Ok(())
    })
}
