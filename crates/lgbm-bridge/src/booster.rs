use tracing::{debug, info};

use crate::bridge::{c_string, BoosterEntry, Bridge};
use crate::error::{BridgeError, BridgeResult};
use crate::handles::{BoosterHandle, DatasetHandle, LoadedBooster};
use crate::predict::checked_len;

impl Bridge {
    /// Create a booster training on `train`.
    pub fn booster_create(&self, train: DatasetHandle, params: &str) -> BridgeResult<BoosterHandle> {
        debug!(%train, params, "booster_create");
        let train_raw = self.dataset_raw(train)?;
        let train_rows = self.dataset_rows(train)?;
        let parameters = self.booster_params(params)?;
        let raw = self.engine.booster_create(train_raw, &parameters)?;

        if let Err(e) = self.attach(train) {
            let _ = self.engine.booster_free(raw);
            return Err(e);
        }
        let handle = BoosterHandle(self.boosters.insert(BoosterEntry {
            raw,
            train: Some((train, train_rows)),
            valid: Vec::new(),
        }));
        debug!(%handle, "booster registered");
        Ok(handle)
    }

    /// Restore a booster from a saved model.
    pub fn booster_from_model_file(&self, path: &str) -> BridgeResult<LoadedBooster> {
        debug!(path, "booster_from_model_file");
        let filename = c_string("path", path)?;
        let (raw, num_iterations) = self.engine.booster_create_from_model_file(&filename)?;
        let handle = BoosterHandle(self.boosters.insert(BoosterEntry {
            raw,
            train: None,
            valid: Vec::new(),
        }));
        info!(%handle, num_iterations, "model loaded from {}", path);
        Ok(LoadedBooster {
            handle,
            num_iterations,
        })
    }

    pub fn booster_free(&self, handle: BoosterHandle) -> BridgeResult<()> {
        debug!(%handle, "booster_free");
        let raw = self.booster_raw(handle)?;
        self.engine.booster_free(raw)?;
        let entry = self.boosters.remove(handle.0)?;
        for dataset in entry.attached_datasets() {
            self.detach(dataset);
        }
        Ok(())
    }

    /// Append the trees of `other` to `handle`. `other` stays valid.
    pub fn booster_merge(&self, handle: BoosterHandle, other: BoosterHandle) -> BridgeResult<()> {
        debug!(%handle, %other, "booster_merge");
        let raw = self.booster_raw(handle)?;
        let other_raw = self.booster_raw(other)?;
        Ok(self.engine.booster_merge(raw, other_raw)?)
    }

    /// Register a validation dataset. Partition indices follow registration order starting at 1.
    pub fn booster_add_valid(&self, handle: BoosterHandle, dataset: DatasetHandle) -> BridgeResult<()> {
        debug!(%handle, %dataset, "booster_add_valid");
        let raw = self.booster_raw(handle)?;
        let dataset_raw = self.dataset_raw(dataset)?;
        let rows = self.dataset_rows(dataset)?;
        self.engine.booster_add_valid_data(raw, dataset_raw)?;

        self.attach(dataset)?;
        if let Err(e) = self.boosters.with_mut(handle.0, |b| b.valid.push((dataset, rows))) {
            self.detach(dataset);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn booster_reset_training_data(
        &self,
        handle: BoosterHandle,
        train: DatasetHandle,
    ) -> BridgeResult<()> {
        debug!(%handle, %train, "booster_reset_training_data");
        let raw = self.booster_raw(handle)?;
        let train_raw = self.dataset_raw(train)?;
        let rows = self.dataset_rows(train)?;
        self.engine.booster_reset_training_data(raw, train_raw)?;

        self.attach(train)?;
        let previous = self
            .boosters
            .with_mut(handle.0, |b| b.train.replace((train, rows)));
        match previous {
            Ok(Some((old, _))) => self.detach(old),
            Ok(None) => {}
            Err(e) => {
                self.detach(train);
                return Err(e.into());
            }
        }
        Ok(())
    }

    pub fn booster_reset_parameter(&self, handle: BoosterHandle, params: &str) -> BridgeResult<()> {
        debug!(%handle, params, "booster_reset_parameter");
        let raw = self.booster_raw(handle)?;
        let parameters = c_string("parameters", params)?;
        Ok(self.engine.booster_reset_parameter(raw, &parameters)?)
    }

    pub fn booster_num_classes(&self, handle: BoosterHandle) -> BridgeResult<i64> {
        let raw = self.booster_raw(handle)?;
        Ok(self.engine.booster_num_classes(raw)?)
    }

    /// One boosting round with the configured objective. Returns `is_finished`.
    pub fn booster_update_one_iter(&self, handle: BoosterHandle) -> BridgeResult<bool> {
        debug!(%handle, "booster_update_one_iter");
        let raw = self.booster_raw(handle)?;
        self.train_rows(handle)?;
        Ok(self.engine.booster_update_one_iter(raw)?)
    }

    /// One boosting round with caller-computed gradients.
    ///
    /// `grad` and `hess` each need `num_class * num_train_rows` values,
    /// class-major.
    pub fn booster_update_one_iter_custom(
        &self,
        handle: BoosterHandle,
        grad: &[f32],
        hess: &[f32],
    ) -> BridgeResult<bool> {
        debug!(%handle, len = grad.len(), "booster_update_one_iter_custom");
        let raw = self.booster_raw(handle)?;
        let rows = self.train_rows(handle)?;
        let expected = checked_len("gradient", &[self.engine.booster_num_classes(raw)?, rows])?;
        for (what, values) in [("grad", grad), ("hess", hess)] {
            if values.len() != expected {
                return Err(BridgeError::BufferSize {
                    what,
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(self.engine.booster_update_one_iter_custom(raw, grad, hess)?)
    }

    pub fn booster_rollback_one_iter(&self, handle: BoosterHandle) -> BridgeResult<()> {
        debug!(%handle, "booster_rollback_one_iter");
        let raw = self.booster_raw(handle)?;
        Ok(self.engine.booster_rollback_one_iter(raw)?)
    }

    pub fn booster_current_iteration(&self, handle: BoosterHandle) -> BridgeResult<i64> {
        let raw = self.booster_raw(handle)?;
        Ok(self.engine.booster_current_iteration(raw)?)
    }

    /// Save the model. `num_iteration <= 0` saves every iteration.
    pub fn booster_save_model(
        &self,
        handle: BoosterHandle,
        num_iteration: i32,
        path: &str,
    ) -> BridgeResult<()> {
        debug!(%handle, num_iteration, path, "booster_save_model");
        let raw = self.booster_raw(handle)?;
        let filename = c_string("path", path)?;
        Ok(self.engine.booster_save_model(raw, num_iteration, &filename)?)
    }

    fn train_rows(&self, handle: BoosterHandle) -> BridgeResult<i64> {
        self.boosters
            .with(handle.0, |b| b.train.map(|(_, rows)| rows))?
            .ok_or(BridgeError::NoTrainingData(handle))
    }

    /// Rows in partition `data_idx`: 0 is the training set, 1.. the validation sets.
    pub(crate) fn partition_rows(&self, handle: BoosterHandle, data_idx: i32) -> BridgeResult<i64> {
        let (train, valid) = self.boosters.with(handle.0, |b| {
            (b.train.map(|(_, rows)| rows), b.valid.iter().map(|(_, rows)| *rows).collect::<Vec<_>>())
        })?;
        match data_idx {
            0 => train.ok_or(BridgeError::NoTrainingData(handle)),
            i if i > 0 && (i as usize) <= valid.len() => Ok(valid[i as usize - 1]),
            _ => Err(BridgeError::PartitionOutOfRange {
                data_idx,
                partitions: valid.len() + 1,
            }),
        }
    }
}
