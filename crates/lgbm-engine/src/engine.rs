use std::ffi::CStr;

use crate::error::EngineResult;
use crate::matrix::{CscMatrix, CsrMatrix, DenseMatrix};
use crate::types::{FieldData, FieldSlice, PredictType, RawHandle};

/// One method per engine entry point.
///
/// Implementations forward the call, and on a failure status return
/// [`EngineError::Native`](crate::EngineError::Native) carrying the engine's
/// last-error text. Output slices are caller-sized; an implementation must not
/// write beyond `out.len()` and returns the number of values the engine produced.
///
/// Handles passed in must have come from the same engine and must not have
/// been freed; the bridge's registry enforces that before calling.
pub trait Engine: Send + Sync {
    /// Short description for logs (library path, or "fake").
    fn describe(&self) -> String;

    // ── Dataset ─────────────────────────────────────────────────────

    fn dataset_create_from_file(
        &self,
        filename: &CStr,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle>;

    fn dataset_create_from_mat(
        &self,
        matrix: &DenseMatrix<'_>,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle>;

    fn dataset_create_from_csr(
        &self,
        matrix: &CsrMatrix<'_>,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle>;

    fn dataset_create_from_csc(
        &self,
        matrix: &CscMatrix<'_>,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle>;

    fn dataset_get_subset(
        &self,
        handle: RawHandle,
        used_row_indices: &[i32],
        parameters: &CStr,
    ) -> EngineResult<RawHandle>;

    fn dataset_free(&self, handle: RawHandle) -> EngineResult<()>;

    fn dataset_save_binary(&self, handle: RawHandle, filename: &CStr) -> EngineResult<()>;

    fn dataset_set_field(
        &self,
        handle: RawHandle,
        field_name: &CStr,
        data: FieldSlice<'_>,
    ) -> EngineResult<()>;

    /// Copies the field out of engine memory.
    fn dataset_get_field(&self, handle: RawHandle, field_name: &CStr) -> EngineResult<FieldData>;

    fn dataset_num_data(&self, handle: RawHandle) -> EngineResult<i64>;

    fn dataset_num_feature(&self, handle: RawHandle) -> EngineResult<i64>;

    // ── Booster ─────────────────────────────────────────────────────

    fn booster_create(&self, train_data: RawHandle, parameters: &CStr) -> EngineResult<RawHandle>;

    /// Returns the booster and the number of iterations stored in the model.
    fn booster_create_from_model_file(&self, filename: &CStr) -> EngineResult<(RawHandle, i64)>;

    fn booster_free(&self, handle: RawHandle) -> EngineResult<()>;

    fn booster_merge(&self, handle: RawHandle, other: RawHandle) -> EngineResult<()>;

    fn booster_add_valid_data(&self, handle: RawHandle, valid_data: RawHandle) -> EngineResult<()>;

    fn booster_reset_training_data(
        &self,
        handle: RawHandle,
        train_data: RawHandle,
    ) -> EngineResult<()>;

    fn booster_reset_parameter(&self, handle: RawHandle, parameters: &CStr) -> EngineResult<()>;

    fn booster_num_classes(&self, handle: RawHandle) -> EngineResult<i64>;

    /// Returns `true` when the engine reports training cannot continue.
    fn booster_update_one_iter(&self, handle: RawHandle) -> EngineResult<bool>;

    fn booster_update_one_iter_custom(
        &self,
        handle: RawHandle,
        grad: &[f32],
        hess: &[f32],
    ) -> EngineResult<bool>;

    fn booster_rollback_one_iter(&self, handle: RawHandle) -> EngineResult<()>;

    fn booster_current_iteration(&self, handle: RawHandle) -> EngineResult<i64>;

    // ── Evaluation & prediction ─────────────────────────────────────

    fn booster_eval_counts(&self, handle: RawHandle) -> EngineResult<i64>;

    /// `count` is the value from [`booster_eval_counts`](Self::booster_eval_counts).
    fn booster_eval_names(&self, handle: RawHandle, count: usize) -> EngineResult<Vec<String>>;

    fn booster_eval(&self, handle: RawHandle, data_idx: i32, out: &mut [f32]) -> EngineResult<i64>;

    fn booster_get_predict(
        &self,
        handle: RawHandle,
        data_idx: i32,
        out: &mut [f32],
    ) -> EngineResult<i64>;

    fn booster_predict_for_file(
        &self,
        handle: RawHandle,
        data_filename: &CStr,
        has_header: bool,
        predict_type: PredictType,
        num_iteration: i64,
        result_filename: &CStr,
    ) -> EngineResult<()>;

    fn booster_predict_for_csr(
        &self,
        handle: RawHandle,
        matrix: &CsrMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
        out: &mut [f32],
    ) -> EngineResult<i64>;

    fn booster_predict_for_mat(
        &self,
        handle: RawHandle,
        matrix: &DenseMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
        out: &mut [f32],
    ) -> EngineResult<i64>;

    fn booster_save_model(
        &self,
        handle: RawHandle,
        num_iteration: i32,
        filename: &CStr,
    ) -> EngineResult<()>;
}
