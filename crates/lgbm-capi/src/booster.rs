//! Booster entry points.

use std::ffi::{c_char, c_int};

use crate::ffi::{self, c_str, c_str_or_empty, length, out_ref};
use crate::run;

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterCreate(
    train_data: u64,
    parameters: *const c_char,
    out: *mut u64,
) -> c_int {
    run("LGBMB_BoosterCreate", |bridge| {
        let train = ffi::dataset(train_data, "train_data")?;
        let parameters = unsafe { c_str_or_empty(parameters, "parameters")? };
        let out = unsafe { out_ref(out, "out")? };
        *out = bridge.booster_create(train, parameters)?.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterCreateFromModelfile(
    filename: *const c_char,
    out_num_iterations: *mut i64,
    out: *mut u64,
) -> c_int {
    run("LGBMB_BoosterCreateFromModelfile", |bridge| {
        let filename = unsafe { c_str(filename, "filename")? };
        let out_num_iterations = unsafe { out_ref(out_num_iterations, "out_num_iterations")? };
        let out = unsafe { out_ref(out, "out")? };
        let loaded = bridge.booster_from_model_file(filename)?;
        *out_num_iterations = loaded.num_iterations;
        *out = loaded.handle.to_raw();
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterFree(handle: u64) -> c_int {
    run("LGBMB_BoosterFree", |bridge| {
        bridge.booster_free(ffi::booster(handle, "booster")?)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterMerge(handle: u64, other_handle: u64) -> c_int {
    run("LGBMB_BoosterMerge", |bridge| {
        bridge.booster_merge(
            ffi::booster(handle, "booster")?,
            ffi::booster(other_handle, "other booster")?,
        )?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterAddValidData(handle: u64, valid_data: u64) -> c_int {
    run("LGBMB_BoosterAddValidData", |bridge| {
        bridge.booster_add_valid(
            ffi::booster(handle, "booster")?,
            ffi::dataset(valid_data, "valid_data")?,
        )?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterResetTrainingData(handle: u64, train_data: u64) -> c_int {
    run("LGBMB_BoosterResetTrainingData", |bridge| {
        bridge.booster_reset_training_data(
            ffi::booster(handle, "booster")?,
            ffi::dataset(train_data, "train_data")?,
        )?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterResetParameter(handle: u64, parameters: *const c_char) -> c_int {
    run("LGBMB_BoosterResetParameter", |bridge| {
        let parameters = unsafe { c_str(parameters, "parameters")? };
        bridge.booster_reset_parameter(ffi::booster(handle, "booster")?, parameters)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterGetNumClasses(handle: u64, out_len: *mut i64) -> c_int {
    run("LGBMB_BoosterGetNumClasses", |bridge| {
        let out = unsafe { out_ref(out_len, "out_len")? };
        *out = bridge.booster_num_classes(ffi::booster(handle, "booster")?)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterUpdateOneIter(handle: u64, is_finished: *mut c_int) -> c_int {
    run("LGBMB_BoosterUpdateOneIter", |bridge| {
        let is_finished = unsafe { out_ref(is_finished, "is_finished")? };
        *is_finished = bridge.booster_update_one_iter(ffi::booster(handle, "booster")?)? as c_int;
        Ok(())
    })
}

/// `grad` and `hess` each hold `len` values (`num_class * num_train_rows`).
#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterUpdateOneIterCustom(
    handle: u64,
    grad: *const f32,
    hess: *const f32,
    len: i64,
    is_finished: *mut c_int,
) -> c_int {
    run("LGBMB_BoosterUpdateOneIterCustom", |bridge| {
        let len = length(len, "len")?;
        let grad = unsafe { ffi::slice(grad, len, "grad")? };
        let hess = unsafe { ffi::slice(hess, len, "hess")? };
        let is_finished = unsafe { out_ref(is_finished, "is_finished")? };
        *is_finished =
            bridge.booster_update_one_iter_custom(ffi::booster(handle, "booster")?, grad, hess)? as c_int;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterRollbackOneIter(handle: u64) -> c_int {
    run("LGBMB_BoosterRollbackOneIter", |bridge| {
        bridge.booster_rollback_one_iter(ffi::booster(handle, "booster")?)?;
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterGetCurrentIteration(handle: u64, out_iteration: *mut i64) -> c_int {
    run("LGBMB_BoosterGetCurrentIteration", |bridge| {
        let out = unsafe { out_ref(out_iteration, "out_iteration")? };
        *out = bridge.booster_current_iteration(ffi::booster(handle, "booster")?)?;
        Ok(())
    })
}

/// `num_iteration <= 0` saves every iteration.
#[no_mangle]
pub unsafe extern "C" fn LGBMB_BoosterSaveModel(
    handle: u64,
    num_iteration: c_int,
    filename: *const c_char,
) -> c_int {
    run("LGBMB_BoosterSaveModel", |bridge| {
        let filename = unsafe { c_str(filename, "filename")? };
        bridge.booster_save_model(ffi::booster(handle, "booster")?, num_iteration, filename)?;
        Ok(())
    })
}
