//! Dynamic loading of the real engine library.
//!
//! Uses `libloading` to load `lib_lightgbm.so` (Linux), `lib_lightgbm.dylib`
//! (macOS) or `lib_lightgbm.dll` (Windows) and implements [`Engine`] over the
//! raw C entry points.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::ptr;
use std::sync::Arc;

use libloading::{Library, Symbol};
use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::matrix::{CscMatrix, CsrMatrix, DenseMatrix};
use crate::types::{DType, FieldData, FieldSlice, NativeElement, PredictType, RawHandle};

/// Engine-side opaque object (`DatesetHandle` / `BoosterHandle`).
type Handle = *mut c_void;

/// Bytes reserved per metric name for `LGBM_BoosterGetEvalNames`, which
/// copies into caller-allocated buffers without a length argument.
pub const EVAL_NAME_CAPACITY: usize = 256;

const SUCCESS: c_int = 0;

type FnGetLastError = unsafe extern "C" fn() -> *const c_char;

// Dataset
type FnDatasetCreateFromFile = unsafe extern "C" fn(
    filename: *const c_char,
    parameters: *const c_char,
    reference: *const Handle,
    out: *mut Handle,
) -> c_int;
type FnDatasetCreateFromCsr = unsafe extern "C" fn(
    indptr: *const c_void,
    indptr_type: c_int,
    indices: *const i32,
    data: *const c_void,
    data_type: c_int,
    nindptr: i64,
    nelem: i64,
    num_col: i64,
    parameters: *const c_char,
    reference: *const Handle,
    out: *mut Handle,
) -> c_int;
type FnDatasetCreateFromCsc = unsafe extern "C" fn(
    col_ptr: *const c_void,
    col_ptr_type: c_int,
    indices: *const i32,
    data: *const c_void,
    data_type: c_int,
    ncol_ptr: i64,
    nelem: i64,
    num_row: i64,
    parameters: *const c_char,
    reference: *const Handle,
    out: *mut Handle,
) -> c_int;
type FnDatasetCreateFromMat = unsafe extern "C" fn(
    data: *const c_void,
    data_type: c_int,
    nrow: i32,
    ncol: i32,
    is_row_major: c_int,
    parameters: *const c_char,
    reference: *const Handle,
    out: *mut Handle,
) -> c_int;
type FnDatasetGetSubset = unsafe extern "C" fn(
    handle: *const Handle,
    used_row_indices: *const i32,
    num_used_row_indices: i32,
    parameters: *const c_char,
    out: *mut Handle,
) -> c_int;
type FnDatasetFree = unsafe extern "C" fn(handle: Handle) -> c_int;
type FnDatasetSaveBinary = unsafe extern "C" fn(handle: Handle, filename: *const c_char) -> c_int;
type FnDatasetSetField = unsafe extern "C" fn(
    handle: Handle,
    field_name: *const c_char,
    field_data: *const c_void,
    num_element: i64,
    dtype: c_int,
) -> c_int;
type FnDatasetGetField = unsafe extern "C" fn(
    handle: Handle,
    field_name: *const c_char,
    out_len: *mut i64,
    out_ptr: *mut *const c_void,
    out_type: *mut c_int,
) -> c_int;
type FnDatasetGetCount = unsafe extern "C" fn(handle: Handle, out: *mut i64) -> c_int;

// Booster
type FnBoosterCreate =
    unsafe extern "C" fn(train_data: Handle, parameters: *const c_char, out: *mut Handle) -> c_int;
type FnBoosterCreateFromModelfile = unsafe extern "C" fn(
    filename: *const c_char,
    out_num_iterations: *mut i64,
    out: *mut Handle,
) -> c_int;
type FnBoosterFree = unsafe extern "C" fn(handle: Handle) -> c_int;
type FnBoosterPair = unsafe extern "C" fn(handle: Handle, other: Handle) -> c_int;
type FnBoosterResetParameter =
    unsafe extern "C" fn(handle: Handle, parameters: *const c_char) -> c_int;
type FnBoosterGetCount = unsafe extern "C" fn(handle: Handle, out: *mut i64) -> c_int;
type FnBoosterUpdateOneIter = unsafe extern "C" fn(handle: Handle, is_finished: *mut c_int) -> c_int;
type FnBoosterUpdateOneIterCustom = unsafe extern "C" fn(
    handle: Handle,
    grad: *const f32,
    hess: *const f32,
    is_finished: *mut c_int,
) -> c_int;
type FnBoosterRollbackOneIter = unsafe extern "C" fn(handle: Handle) -> c_int;
type FnBoosterGetEvalNames =
    unsafe extern "C" fn(handle: Handle, out_len: *mut i64, out_strs: *mut *mut c_char) -> c_int;
type FnBoosterGetScores = unsafe extern "C" fn(
    handle: Handle,
    data_idx: c_int,
    out_len: *mut i64,
    out_results: *mut f32,
) -> c_int;
type FnBoosterPredictForFile = unsafe extern "C" fn(
    handle: Handle,
    data_filename: *const c_char,
    data_has_header: c_int,
    predict_type: c_int,
    num_iteration: i64,
    result_filename: *const c_char,
) -> c_int;
type FnBoosterPredictForCsr = unsafe extern "C" fn(
    handle: Handle,
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
) -> c_int;
type FnBoosterPredictForMat = unsafe extern "C" fn(
    handle: Handle,
    data: *const c_void,
    data_type: c_int,
    nrow: i32,
    ncol: i32,
    is_row_major: c_int,
    predict_type: c_int,
    num_iteration: i64,
    out_len: *mut i64,
    out_result: *mut f32,
) -> c_int;
type FnBoosterSaveModel =
    unsafe extern "C" fn(handle: Handle, num_iteration: c_int, filename: *const c_char) -> c_int;

/// Dynamically loaded engine library with function pointers.
pub struct NativeEngine {
    _lib: Library,
    path: String,
    get_last_error: FnGetLastError,
    // Dataset
    dataset_create_from_file: FnDatasetCreateFromFile,
    dataset_create_from_csr: FnDatasetCreateFromCsr,
    dataset_create_from_csc: Option<FnDatasetCreateFromCsc>,
    dataset_create_from_mat: FnDatasetCreateFromMat,
    dataset_get_subset: Option<FnDatasetGetSubset>,
    dataset_free: FnDatasetFree,
    dataset_save_binary: FnDatasetSaveBinary,
    dataset_set_field: FnDatasetSetField,
    dataset_get_field: FnDatasetGetField,
    dataset_get_num_data: FnDatasetGetCount,
    dataset_get_num_feature: FnDatasetGetCount,
    // Booster
    booster_create: FnBoosterCreate,
    booster_create_from_modelfile: FnBoosterCreateFromModelfile,
    booster_free: FnBoosterFree,
    booster_merge: Option<FnBoosterPair>,
    booster_add_valid_data: FnBoosterPair,
    booster_reset_training_data: Option<FnBoosterPair>,
    booster_reset_parameter: FnBoosterResetParameter,
    booster_get_num_classes: FnBoosterGetCount,
    booster_update_one_iter: FnBoosterUpdateOneIter,
    booster_update_one_iter_custom: FnBoosterUpdateOneIterCustom,
    booster_rollback_one_iter: FnBoosterRollbackOneIter,
    booster_get_current_iteration: FnBoosterGetCount,
    // Evaluation & prediction
    booster_get_eval_counts: FnBoosterGetCount,
    booster_get_eval_names: FnBoosterGetEvalNames,
    booster_get_eval: FnBoosterGetScores,
    booster_get_predict: FnBoosterGetScores,
    booster_predict_for_file: Option<FnBoosterPredictForFile>,
    booster_predict_for_csr: FnBoosterPredictForCsr,
    booster_predict_for_mat: FnBoosterPredictForMat,
    booster_save_model: FnBoosterSaveModel,
}

// SAFETY: the library handle and function pointers are valid from any thread.
// Per-object thread-safety is the engine's own contract.
unsafe impl Send for NativeEngine {}
unsafe impl Sync for NativeEngine {}

impl NativeEngine {
    /// Load the engine library and resolve all entry points.
    /// `path` = None searches the platform's usual library names.
    pub fn load(path: Option<&str>) -> EngineResult<Arc<Self>> {
        let (lib, path) = Self::load_library(path)?;

        unsafe {
            let engine = Self {
                get_last_error: Self::load_fn(&lib, "LGBM_GetLastError")?,
                dataset_create_from_file: Self::load_fn(&lib, "LGBM_DatasetCreateFromFile")?,
                dataset_create_from_csr: Self::load_fn(&lib, "LGBM_DatasetCreateFromCSR")?,
                dataset_create_from_csc: Self::load_fn_opt(&lib, "LGBM_DatasetCreateFromCSC"),
                dataset_create_from_mat: Self::load_fn(&lib, "LGBM_DatasetCreateFromMat")?,
                dataset_get_subset: Self::load_fn_opt(&lib, "LGBM_DatasetGetSubset"),
                dataset_free: Self::load_fn(&lib, "LGBM_DatasetFree")?,
                dataset_save_binary: Self::load_fn(&lib, "LGBM_DatasetSaveBinary")?,
                dataset_set_field: Self::load_fn(&lib, "LGBM_DatasetSetField")?,
                dataset_get_field: Self::load_fn(&lib, "LGBM_DatasetGetField")?,
                dataset_get_num_data: Self::load_fn(&lib, "LGBM_DatasetGetNumData")?,
                dataset_get_num_feature: Self::load_fn(&lib, "LGBM_DatasetGetNumFeature")?,
                booster_create: Self::load_fn(&lib, "LGBM_BoosterCreate")?,
                booster_create_from_modelfile: Self::load_fn(&lib, "LGBM_BoosterCreateFromModelfile")?,
                booster_free: Self::load_fn(&lib, "LGBM_BoosterFree")?,
                booster_merge: Self::load_fn_opt(&lib, "LGBM_BoosterMerge"),
                booster_add_valid_data: Self::load_fn(&lib, "LGBM_BoosterAddValidData")?,
                booster_reset_training_data: Self::load_fn_opt(&lib, "LGBM_BoosterResetTrainingData"),
                booster_reset_parameter: Self::load_fn(&lib, "LGBM_BoosterResetParameter")?,
                booster_get_num_classes: Self::load_fn(&lib, "LGBM_BoosterGetNumClasses")?,
                booster_update_one_iter: Self::load_fn(&lib, "LGBM_BoosterUpdateOneIter")?,
                booster_update_one_iter_custom: Self::load_fn(&lib, "LGBM_BoosterUpdateOneIterCustom")?,
                booster_rollback_one_iter: Self::load_fn(&lib, "LGBM_BoosterRollbackOneIter")?,
                booster_get_current_iteration: Self::load_fn(&lib, "LGBM_BoosterGetCurrentIteration")?,
                booster_get_eval_counts: Self::load_fn(&lib, "LGBM_BoosterGetEvalCounts")?,
                booster_get_eval_names: Self::load_fn(&lib, "LGBM_BoosterGetEvalNames")?,
                booster_get_eval: Self::load_fn(&lib, "LGBM_BoosterGetEval")?,
                booster_get_predict: Self::load_fn(&lib, "LGBM_BoosterGetPredict")?,
                booster_predict_for_file: Self::load_fn_opt(&lib, "LGBM_BoosterPredictForFile"),
                booster_predict_for_csr: Self::load_fn(&lib, "LGBM_BoosterPredictForCSR")?,
                booster_predict_for_mat: Self::load_fn(&lib, "LGBM_BoosterPredictForMat")?,
                booster_save_model: Self::load_fn(&lib, "LGBM_BoosterSaveModel")?,
                _lib: lib,
                path,
            };

            info!("engine library loaded from {}", engine.path);
            Ok(Arc::new(engine))
        }
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn load_library(path: Option<&str>) -> EngineResult<(Library, String)> {
        if let Some(path) = path {
            return match unsafe { Library::new(path) } {
                Ok(lib) => Ok((lib, path.to_string())),
                Err(e) => Err(EngineError::LibraryLoad(format!("{}: {}", path, e))),
            };
        }

        let mut last_err = String::new();
        for name in lgbm_common::platform::engine_library_names() {
            match unsafe { Library::new(name) } {
                Ok(lib) => return Ok((lib, name.to_string())),
                Err(e) => {
                    last_err = format!("{}: {}", name, e);
                    debug!("failed to load {}: {}", name, e);
                }
            }
        }

        Err(EngineError::LibraryLoad(last_err))
    }

    unsafe fn load_fn<F: Copy>(lib: &Library, name: &str) -> EngineResult<F> {
        let sym: Symbol<F> = unsafe { lib.get(name.as_bytes()) }
            .map_err(|_| EngineError::MissingSymbol(name.to_string()))?;
        Ok(*sym)
    }

    unsafe fn load_fn_opt<F: Copy>(lib: &Library, name: &str) -> Option<F> {
        unsafe { lib.get(name.as_bytes()) }.ok().map(|s: Symbol<F>| *s)
    }

    /// The engine's last-error text for the calling thread.
    ///
    /// The pointer refers to engine-owned thread-local storage. It is copied
    /// here and never freed.
    fn last_error(&self) -> String {
        let msg = unsafe { (self.get_last_error)() };
        if msg.is_null() {
            return "unknown error".to_string();
        }
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }

    fn check(&self, op: &'static str, status: c_int) -> EngineResult<()> {
        if status == SUCCESS {
            Ok(())
        } else {
            Err(EngineError::native(op, self.last_error()))
        }
    }

    fn created(&self, op: &'static str, status: c_int, out: Handle) -> EngineResult<RawHandle> {
        self.check(op, status)?;
        RawHandle::from_ptr(out).ok_or_else(|| EngineError::native(op, "engine returned a null handle"))
    }

    fn filled(&self, op: &'static str, status: c_int, out_len: i64, capacity: usize) -> EngineResult<i64> {
        self.check(op, status)?;
        if out_len < 0 || out_len as usize > capacity {
            return Err(EngineError::OutputOverflow {
                op,
                reported: out_len,
                capacity,
            });
        }
        Ok(out_len)
    }

    fn count(&self, op: &'static str, f: FnDatasetGetCount, handle: RawHandle) -> EngineResult<i64> {
        let mut out: i64 = 0;
        let status = unsafe { f(handle.as_ptr(), &mut out) };
        self.check(op, status)?;
        Ok(out)
    }
}

fn missing(name: &str) -> EngineError {
    EngineError::MissingSymbol(name.to_string())
}

/// Copy `len` elements of `T` out of engine memory.
///
/// # Safety
/// `ptr` must be valid for reads of `len * size_of::<T>()` bytes.
unsafe fn copy_out<T: NativeElement>(
    op: &'static str,
    ptr: *const c_void,
    len: usize,
) -> EngineResult<Vec<T>> {
    if ptr.is_null() || len == 0 {
        return Ok(Vec::new());
    }
    let byte_len = len
        .checked_mul(T::DTYPE.size())
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| EngineError::native(op, format!("reported length {len} is too large")))?;
    let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, byte_len) };
    Ok(match bytemuck::try_cast_slice::<u8, T>(bytes) {
        Ok(values) => values.to_vec(),
        Err(_) => bytes
            .chunks_exact(T::DTYPE.size())
            .map(bytemuck::pod_read_unaligned)
            .collect(),
    })
}

impl Engine for NativeEngine {
    fn describe(&self) -> String {
        self.path.clone()
    }

    fn dataset_create_from_file(
        &self,
        filename: &CStr,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let reference = reference.map(RawHandle::as_ptr);
        let mut out: Handle = ptr::null_mut();
        let status = unsafe {
            (self.dataset_create_from_file)(
                filename.as_ptr(),
                parameters.as_ptr(),
                reference.as_ref().map_or(ptr::null(), |r| r as *const Handle),
                &mut out,
            )
        };
        self.created("LGBM_DatasetCreateFromFile", status, out)
    }

    fn dataset_create_from_mat(
        &self,
        matrix: &DenseMatrix<'_>,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let reference = reference.map(RawHandle::as_ptr);
        let mut out: Handle = ptr::null_mut();
        let status = unsafe {
            (self.dataset_create_from_mat)(
                matrix.data().as_ptr(),
                matrix.data().dtype().as_raw(),
                matrix.nrow(),
                matrix.ncol(),
                matrix.layout().is_row_major() as c_int,
                parameters.as_ptr(),
                reference.as_ref().map_or(ptr::null(), |r| r as *const Handle),
                &mut out,
            )
        };
        self.created("LGBM_DatasetCreateFromMat", status, out)
    }

    fn dataset_create_from_csr(
        &self,
        matrix: &CsrMatrix<'_>,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let reference = reference.map(RawHandle::as_ptr);
        let mut out: Handle = ptr::null_mut();
        let status = unsafe {
            (self.dataset_create_from_csr)(
                matrix.indptr().as_ptr(),
                matrix.indptr().dtype().as_raw(),
                matrix.indices().as_ptr(),
                matrix.data().as_ptr(),
                matrix.data().dtype().as_raw(),
                matrix.nindptr(),
                matrix.nelem(),
                matrix.num_col(),
                parameters.as_ptr(),
                reference.as_ref().map_or(ptr::null(), |r| r as *const Handle),
                &mut out,
            )
        };
        self.created("LGBM_DatasetCreateFromCSR", status, out)
    }

    fn dataset_create_from_csc(
        &self,
        matrix: &CscMatrix<'_>,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let f = self
            .dataset_create_from_csc
            .ok_or_else(|| missing("LGBM_DatasetCreateFromCSC"))?;
        let reference = reference.map(RawHandle::as_ptr);
        let mut out: Handle = ptr::null_mut();
        let status = unsafe {
            f(
                matrix.col_ptr().as_ptr(),
                matrix.col_ptr().dtype().as_raw(),
                matrix.indices().as_ptr(),
                matrix.data().as_ptr(),
                matrix.data().dtype().as_raw(),
                matrix.ncol_ptr(),
                matrix.nelem(),
                matrix.num_row(),
                parameters.as_ptr(),
                reference.as_ref().map_or(ptr::null(), |r| r as *const Handle),
                &mut out,
            )
        };
        self.created("LGBM_DatasetCreateFromCSC", status, out)
    }

    fn dataset_get_subset(
        &self,
        handle: RawHandle,
        used_row_indices: &[i32],
        parameters: &CStr,
    ) -> EngineResult<RawHandle> {
        let f = self
            .dataset_get_subset
            .ok_or_else(|| missing("LGBM_DatasetGetSubset"))?;
        let num_used = i32::try_from(used_row_indices.len()).map_err(|_| {
            EngineError::native("LGBM_DatasetGetSubset", "too many row indices for a 32-bit count")
        })?;
        let source = handle.as_ptr();
        let mut out: Handle = ptr::null_mut();
        let status = unsafe {
            f(
                &source,
                used_row_indices.as_ptr(),
                num_used,
                parameters.as_ptr(),
                &mut out,
            )
        };
        self.created("LGBM_DatasetGetSubset", status, out)
    }

    fn dataset_free(&self, handle: RawHandle) -> EngineResult<()> {
        let status = unsafe { (self.dataset_free)(handle.as_ptr()) };
        self.check("LGBM_DatasetFree", status)
    }

    fn dataset_save_binary(&self, handle: RawHandle, filename: &CStr) -> EngineResult<()> {
        let status = unsafe { (self.dataset_save_binary)(handle.as_ptr(), filename.as_ptr()) };
        self.check("LGBM_DatasetSaveBinary", status)
    }

    fn dataset_set_field(
        &self,
        handle: RawHandle,
        field_name: &CStr,
        data: FieldSlice<'_>,
    ) -> EngineResult<()> {
        let status = unsafe {
            (self.dataset_set_field)(
                handle.as_ptr(),
                field_name.as_ptr(),
                data.as_ptr(),
                data.len() as i64,
                data.dtype().as_raw(),
            )
        };
        self.check("LGBM_DatasetSetField", status)
    }

    fn dataset_get_field(&self, handle: RawHandle, field_name: &CStr) -> EngineResult<FieldData> {
        const OP: &str = "LGBM_DatasetGetField";
        let mut out_len: i64 = 0;
        let mut out_ptr: *const c_void = ptr::null();
        let mut out_type: c_int = -1;
        let status = unsafe {
            (self.dataset_get_field)(
                handle.as_ptr(),
                field_name.as_ptr(),
                &mut out_len,
                &mut out_ptr,
                &mut out_type,
            )
        };
        self.check(OP, status)?;

        // out_ptr points into the dataset; copy before returning.
        let len = usize::try_from(out_len).unwrap_or(0);
        let dtype = DType::from_raw(out_type).ok_or(EngineError::UnknownDType {
            op: OP,
            tag: out_type,
        })?;
        let data = unsafe {
            match dtype {
                DType::Float32 => FieldData::Float32(copy_out(OP, out_ptr, len)?),
                DType::Float64 => FieldData::Float64(copy_out(OP, out_ptr, len)?),
                DType::Int32 => FieldData::Int32(copy_out(OP, out_ptr, len)?),
                DType::Int64 => FieldData::Int64(copy_out(OP, out_ptr, len)?),
            }
        };
        Ok(data)
    }

    fn dataset_num_data(&self, handle: RawHandle) -> EngineResult<i64> {
        self.count("LGBM_DatasetGetNumData", self.dataset_get_num_data, handle)
    }

    fn dataset_num_feature(&self, handle: RawHandle) -> EngineResult<i64> {
        self.count("LGBM_DatasetGetNumFeature", self.dataset_get_num_feature, handle)
    }

    fn booster_create(&self, train_data: RawHandle, parameters: &CStr) -> EngineResult<RawHandle> {
        let mut out: Handle = ptr::null_mut();
        let status =
            unsafe { (self.booster_create)(train_data.as_ptr(), parameters.as_ptr(), &mut out) };
        self.created("LGBM_BoosterCreate", status, out)
    }

    fn booster_create_from_model_file(&self, filename: &CStr) -> EngineResult<(RawHandle, i64)> {
        let mut out: Handle = ptr::null_mut();
        let mut num_iterations: i64 = 0;
        let status = unsafe {
            (self.booster_create_from_modelfile)(filename.as_ptr(), &mut num_iterations, &mut out)
        };
        let handle = self.created("LGBM_BoosterCreateFromModelfile", status, out)?;
        Ok((handle, num_iterations))
    }

    fn booster_free(&self, handle: RawHandle) -> EngineResult<()> {
        let status = unsafe { (self.booster_free)(handle.as_ptr()) };
        self.check("LGBM_BoosterFree", status)
    }

    fn booster_merge(&self, handle: RawHandle, other: RawHandle) -> EngineResult<()> {
        let f = self.booster_merge.ok_or_else(|| missing("LGBM_BoosterMerge"))?;
        let status = unsafe { f(handle.as_ptr(), other.as_ptr()) };
        self.check("LGBM_BoosterMerge", status)
    }

    fn booster_add_valid_data(&self, handle: RawHandle, valid_data: RawHandle) -> EngineResult<()> {
        let status = unsafe { (self.booster_add_valid_data)(handle.as_ptr(), valid_data.as_ptr()) };
        self.check("LGBM_BoosterAddValidData", status)
    }

    fn booster_reset_training_data(
        &self,
        handle: RawHandle,
        train_data: RawHandle,
    ) -> EngineResult<()> {
        let f = self
            .booster_reset_training_data
            .ok_or_else(|| missing("LGBM_BoosterResetTrainingData"))?;
        let status = unsafe { f(handle.as_ptr(), train_data.as_ptr()) };
        self.check("LGBM_BoosterResetTrainingData", status)
    }

    fn booster_reset_parameter(&self, handle: RawHandle, parameters: &CStr) -> EngineResult<()> {
        let status = unsafe { (self.booster_reset_parameter)(handle.as_ptr(), parameters.as_ptr()) };
        self.check("LGBM_BoosterResetParameter", status)
    }

    fn booster_num_classes(&self, handle: RawHandle) -> EngineResult<i64> {
        self.count("LGBM_BoosterGetNumClasses", self.booster_get_num_classes, handle)
    }

    fn booster_update_one_iter(&self, handle: RawHandle) -> EngineResult<bool> {
        let mut is_finished: c_int = 0;
        let status = unsafe { (self.booster_update_one_iter)(handle.as_ptr(), &mut is_finished) };
        self.check("LGBM_BoosterUpdateOneIter", status)?;
        Ok(is_finished != 0)
    }

    fn booster_update_one_iter_custom(
        &self,
        handle: RawHandle,
        grad: &[f32],
        hess: &[f32],
    ) -> EngineResult<bool> {
        let mut is_finished: c_int = 0;
        let status = unsafe {
            (self.booster_update_one_iter_custom)(
                handle.as_ptr(),
                grad.as_ptr(),
                hess.as_ptr(),
                &mut is_finished,
            )
        };
        self.check("LGBM_BoosterUpdateOneIterCustom", status)?;
        Ok(is_finished != 0)
    }

    fn booster_rollback_one_iter(&self, handle: RawHandle) -> EngineResult<()> {
        let status = unsafe { (self.booster_rollback_one_iter)(handle.as_ptr()) };
        self.check("LGBM_BoosterRollbackOneIter", status)
    }

    fn booster_current_iteration(&self, handle: RawHandle) -> EngineResult<i64> {
        self.count(
            "LGBM_BoosterGetCurrentIteration",
            self.booster_get_current_iteration,
            handle,
        )
    }

    fn booster_eval_counts(&self, handle: RawHandle) -> EngineResult<i64> {
        self.count("LGBM_BoosterGetEvalCounts", self.booster_get_eval_counts, handle)
    }

    fn booster_eval_names(&self, handle: RawHandle, count: usize) -> EngineResult<Vec<String>> {
        const OP: &str = "LGBM_BoosterGetEvalNames";
        let mut buffers: Vec<Vec<u8>> = (0..count).map(|_| vec![0u8; EVAL_NAME_CAPACITY]).collect();
        let mut pointers: Vec<*mut c_char> = buffers
            .iter_mut()
            .map(|b| b.as_mut_ptr() as *mut c_char)
            .collect();
        let mut out_len: i64 = 0;
        let status = unsafe {
            (self.booster_get_eval_names)(handle.as_ptr(), &mut out_len, pointers.as_mut_ptr())
        };
        let produced = self.filled(OP, status, out_len, count)? as usize;

        Ok(buffers
            .iter()
            .take(produced)
            .map(|b| {
                let end = b.iter().position(|&c| c == 0).unwrap_or(b.len());
                String::from_utf8_lossy(&b[..end]).into_owned()
            })
            .collect())
    }

    fn booster_eval(&self, handle: RawHandle, data_idx: i32, out: &mut [f32]) -> EngineResult<i64> {
        let mut out_len: i64 = 0;
        let status = unsafe {
            (self.booster_get_eval)(handle.as_ptr(), data_idx, &mut out_len, out.as_mut_ptr())
        };
        self.filled("LGBM_BoosterGetEval", status, out_len, out.len())
    }

    fn booster_get_predict(
        &self,
        handle: RawHandle,
        data_idx: i32,
        out: &mut [f32],
    ) -> EngineResult<i64> {
        let mut out_len: i64 = 0;
        let status = unsafe {
            (self.booster_get_predict)(handle.as_ptr(), data_idx, &mut out_len, out.as_mut_ptr())
        };
        self.filled("LGBM_BoosterGetPredict", status, out_len, out.len())
    }

    fn booster_predict_for_file(
        &self,
        handle: RawHandle,
        data_filename: &CStr,
        has_header: bool,
        predict_type: PredictType,
        num_iteration: i64,
        result_filename: &CStr,
    ) -> EngineResult<()> {
        let f = self
            .booster_predict_for_file
            .ok_or_else(|| missing("LGBM_BoosterPredictForFile"))?;
        let status = unsafe {
            f(
                handle.as_ptr(),
                data_filename.as_ptr(),
                has_header as c_int,
                predict_type.as_raw(),
                num_iteration,
                result_filename.as_ptr(),
            )
        };
        self.check("LGBM_BoosterPredictForFile", status)
    }

    fn booster_predict_for_csr(
        &self,
        handle: RawHandle,
        matrix: &CsrMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
        out: &mut [f32],
    ) -> EngineResult<i64> {
        let mut out_len: i64 = 0;
        let status = unsafe {
            (self.booster_predict_for_csr)(
                handle.as_ptr(),
                matrix.indptr().as_ptr(),
                matrix.indptr().dtype().as_raw(),
                matrix.indices().as_ptr(),
                matrix.data().as_ptr(),
                matrix.data().dtype().as_raw(),
                matrix.nindptr(),
                matrix.nelem(),
                matrix.num_col(),
                predict_type.as_raw(),
                num_iteration,
                &mut out_len,
                out.as_mut_ptr(),
            )
        };
        self.filled("LGBM_BoosterPredictForCSR", status, out_len, out.len())
    }

    fn booster_predict_for_mat(
        &self,
        handle: RawHandle,
        matrix: &DenseMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
        out: &mut [f32],
    ) -> EngineResult<i64> {
        let mut out_len: i64 = 0;
        let status = unsafe {
            (self.booster_predict_for_mat)(
                handle.as_ptr(),
                matrix.data().as_ptr(),
                matrix.data().dtype().as_raw(),
                matrix.nrow(),
                matrix.ncol(),
                matrix.layout().is_row_major() as c_int,
                predict_type.as_raw(),
                num_iteration,
                &mut out_len,
                out.as_mut_ptr(),
            )
        };
        self.filled("LGBM_BoosterPredictForMat", status, out_len, out.len())
    }

    fn booster_save_model(
        &self,
        handle: RawHandle,
        num_iteration: i32,
        filename: &CStr,
    ) -> EngineResult<()> {
        let status =
            unsafe { (self.booster_save_model)(handle.as_ptr(), num_iteration, filename.as_ptr()) };
        self.check("LGBM_BoosterSaveModel", status)
    }
}
