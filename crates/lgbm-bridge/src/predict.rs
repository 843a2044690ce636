use tracing::debug;

use lgbm_engine::{CsrMatrix, DenseMatrix, PredictType};

use crate::bridge::{c_string, Bridge};
use crate::error::{BridgeError, BridgeResult};
use crate::handles::BoosterHandle;

/// Product of `factors` (negatives count as 0). Fails with `SizeOverflow`
/// unless the product fits both `i64` and `usize`.
pub(crate) fn checked_len(what: &'static str, factors: &[i64]) -> BridgeResult<usize> {
    factors
        .iter()
        .try_fold(1i64, |acc, &f| acc.checked_mul(f.max(0)))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| BridgeError::SizeOverflow {
            what,
            factors: factors
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(" x "),
        })
}

impl Bridge {
    /// Number of metrics evaluated per partition.
    pub fn booster_eval_counts(&self, handle: BoosterHandle) -> BridgeResult<usize> {
        let raw = self.booster_raw(handle)?;
        Ok(self.engine.booster_eval_counts(raw)?.max(0) as usize)
    }

    pub fn booster_eval_names(&self, handle: BoosterHandle) -> BridgeResult<Vec<String>> {
        let raw = self.booster_raw(handle)?;
        let count = self.engine.booster_eval_counts(raw)?.max(0) as usize;
        Ok(self.engine.booster_eval_names(raw, count)?)
    }

    /// Current metric values on partition `data_idx`, in [`booster_eval_names`](Self::booster_eval_names) order.
    pub fn booster_eval(&self, handle: BoosterHandle, data_idx: i32) -> BridgeResult<Vec<f32>> {
        debug!(%handle, data_idx, "booster_eval");
        let raw = self.booster_raw(handle)?;
        self.partition_rows(handle, data_idx)?;
        let count = self.engine.booster_eval_counts(raw)?.max(0) as usize;
        let mut out = vec![0.0f32; count];
        let written = self.engine.booster_eval(raw, data_idx, &mut out)?;
        out.truncate(written as usize);
        Ok(out)
    }

    /// Raw scores the booster holds for partition `data_idx`.
    pub fn booster_get_predict(&self, handle: BoosterHandle, data_idx: i32) -> BridgeResult<Vec<f32>> {
        debug!(%handle, data_idx, "booster_get_predict");
        let raw = self.booster_raw(handle)?;
        let rows = self.partition_rows(handle, data_idx)?;
        let len = checked_len("prediction", &[self.engine.booster_num_classes(raw)?, rows])?;
        let mut out = vec![0.0f32; len];
        let written = self.engine.booster_get_predict(raw, data_idx, &mut out)?;
        out.truncate(written as usize);
        Ok(out)
    }

    /// Output length of a prediction over `num_rows` rows.
    ///
    /// `num_class * num_rows`, multiplied by the number of iterations used
    /// in leaf-index mode. `num_iteration <= 0` uses every iteration.
    pub fn booster_calc_num_predict(
        &self,
        handle: BoosterHandle,
        num_rows: usize,
        predict_type: PredictType,
        num_iteration: i64,
    ) -> BridgeResult<usize> {
        let raw = self.booster_raw(handle)?;
        let num_class = self.engine.booster_num_classes(raw)?;
        let num_rows = i64::try_from(num_rows).map_err(|_| BridgeError::SizeOverflow {
            what: "prediction",
            factors: format!("{num_class} x {num_rows}"),
        })?;
        if predict_type != PredictType::LeafIndex {
            return checked_len("prediction", &[num_class, num_rows]);
        }
        let current = self.engine.booster_current_iteration(raw)?;
        let used = if num_iteration <= 0 {
            current
        } else {
            num_iteration.min(current)
        };
        checked_len("prediction", &[num_class, num_rows, used])
    }

    pub fn booster_predict_for_mat(
        &self,
        handle: BoosterHandle,
        matrix: &DenseMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
    ) -> BridgeResult<Vec<f32>> {
        debug!(%handle, nrow = matrix.nrow(), ?predict_type, num_iteration, "booster_predict_for_mat");
        let raw = self.booster_raw(handle)?;
        let len = self.booster_calc_num_predict(handle, matrix.rows(), predict_type, num_iteration)?;
        let mut out = vec![0.0f32; len];
        let written =
            self.engine
                .booster_predict_for_mat(raw, matrix, predict_type, num_iteration, &mut out)?;
        out.truncate(written as usize);
        Ok(out)
    }

    pub fn booster_predict_for_csr(
        &self,
        handle: BoosterHandle,
        matrix: &CsrMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
    ) -> BridgeResult<Vec<f32>> {
        debug!(%handle, rows = matrix.rows(), ?predict_type, num_iteration, "booster_predict_for_csr");
        let raw = self.booster_raw(handle)?;
        let len = self.booster_calc_num_predict(handle, matrix.rows(), predict_type, num_iteration)?;
        let mut out = vec![0.0f32; len];
        let written =
            self.engine
                .booster_predict_for_csr(raw, matrix, predict_type, num_iteration, &mut out)?;
        out.truncate(written as usize);
        Ok(out)
    }

    /// Predict every row of `data_path` and write the scores to `result_path`.
    pub fn booster_predict_for_file(
        &self,
        handle: BoosterHandle,
        data_path: &str,
        has_header: bool,
        predict_type: PredictType,
        num_iteration: i64,
        result_path: &str,
    ) -> BridgeResult<()> {
        debug!(%handle, data_path, result_path, ?predict_type, "booster_predict_for_file");
        let raw = self.booster_raw(handle)?;
        let data_filename = c_string("data path", data_path)?;
        let result_filename = c_string("result path", result_path)?;
        Ok(self.engine.booster_predict_for_file(
            raw,
            &data_filename,
            has_header,
            predict_type,
            num_iteration,
            &result_filename,
        )?)
    }
}
