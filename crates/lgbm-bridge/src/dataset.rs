use tracing::debug;

use lgbm_engine::{CscMatrix, CsrMatrix, DenseMatrix, FieldData, FieldSlice, RawHandle};

use crate::bridge::{c_string, Bridge, DatasetEntry};
use crate::error::{BridgeError, BridgeResult};
use crate::handles::{DatasetHandle, Field};

impl Bridge {
    /// Load a dataset from a text or binary file.
    ///
    /// With a `reference`, bin boundaries are taken from that dataset (the
    /// usual setup for validation data).
    pub fn dataset_from_file(
        &self,
        path: &str,
        params: &str,
        reference: Option<DatasetHandle>,
    ) -> BridgeResult<DatasetHandle> {
        debug!(path, params, ?reference, "dataset_from_file");
        let filename = c_string("path", path)?;
        let parameters = self.dataset_params(params)?;
        let reference = self.reference_raw(reference)?;
        let raw = self
            .engine
            .dataset_create_from_file(&filename, &parameters, reference)?;
        self.register_dataset(raw)
    }

    pub fn dataset_from_mat(
        &self,
        matrix: &DenseMatrix<'_>,
        params: &str,
        reference: Option<DatasetHandle>,
    ) -> BridgeResult<DatasetHandle> {
        debug!(
            nrow = matrix.nrow(),
            ncol = matrix.ncol(),
            dtype = %matrix.data().dtype(),
            "dataset_from_mat"
        );
        let parameters = self.dataset_params(params)?;
        let reference = self.reference_raw(reference)?;
        let raw = self
            .engine
            .dataset_create_from_mat(matrix, &parameters, reference)?;
        self.register_dataset(raw)
    }

    pub fn dataset_from_csr(
        &self,
        matrix: &CsrMatrix<'_>,
        params: &str,
        reference: Option<DatasetHandle>,
    ) -> BridgeResult<DatasetHandle> {
        debug!(
            rows = matrix.rows(),
            nelem = matrix.nelem(),
            num_col = matrix.num_col(),
            "dataset_from_csr"
        );
        let parameters = self.dataset_params(params)?;
        let reference = self.reference_raw(reference)?;
        let raw = self
            .engine
            .dataset_create_from_csr(matrix, &parameters, reference)?;
        self.register_dataset(raw)
    }

    pub fn dataset_from_csc(
        &self,
        matrix: &CscMatrix<'_>,
        params: &str,
        reference: Option<DatasetHandle>,
    ) -> BridgeResult<DatasetHandle> {
        debug!(
            cols = matrix.cols(),
            nelem = matrix.nelem(),
            num_row = matrix.num_row(),
            "dataset_from_csc"
        );
        let parameters = self.dataset_params(params)?;
        let reference = self.reference_raw(reference)?;
        let raw = self
            .engine
            .dataset_create_from_csc(matrix, &parameters, reference)?;
        self.register_dataset(raw)
    }

    /// New dataset holding the given rows of `handle`.
    pub fn dataset_subset(
        &self,
        handle: DatasetHandle,
        used_row_indices: &[i32],
        params: &str,
    ) -> BridgeResult<DatasetHandle> {
        debug!(%handle, rows = used_row_indices.len(), "dataset_subset");
        let source = self.dataset_raw(handle)?;
        let parameters = self.dataset_params(params)?;
        let raw = self
            .engine
            .dataset_get_subset(source, used_row_indices, &parameters)?;
        self.register_dataset(raw)
    }

    pub fn dataset_save_binary(&self, handle: DatasetHandle, path: &str) -> BridgeResult<()> {
        debug!(%handle, path, "dataset_save_binary");
        let raw = self.dataset_raw(handle)?;
        let filename = c_string("path", path)?;
        Ok(self.engine.dataset_save_binary(raw, &filename)?)
    }

    /// Set a metadata field. The element type must match [`Field::dtype`].
    pub fn dataset_set_field(
        &self,
        handle: DatasetHandle,
        field: Field,
        data: FieldSlice<'_>,
    ) -> BridgeResult<()> {
        debug!(%handle, %field, len = data.len(), dtype = %data.dtype(), "dataset_set_field");
        if data.dtype() != field.dtype() {
            return Err(BridgeError::FieldType {
                field,
                expected: field.dtype(),
                actual: data.dtype(),
            });
        }
        let raw = self.dataset_raw(handle)?;
        Ok(self.engine.dataset_set_field(raw, field.c_name(), data)?)
    }

    /// Copy a metadata field out of the dataset.
    pub fn dataset_get_field(&self, handle: DatasetHandle, field: Field) -> BridgeResult<FieldData> {
        debug!(%handle, %field, "dataset_get_field");
        let raw = self.dataset_raw(handle)?;
        Ok(self.engine.dataset_get_field(raw, field.c_name())?)
    }

    pub fn dataset_num_data(&self, handle: DatasetHandle) -> BridgeResult<i64> {
        let raw = self.dataset_raw(handle)?;
        Ok(self.engine.dataset_num_data(raw)?)
    }

    pub fn dataset_num_feature(&self, handle: DatasetHandle) -> BridgeResult<i64> {
        let raw = self.dataset_raw(handle)?;
        Ok(self.engine.dataset_num_feature(raw)?)
    }

    /// Free a dataset. Fails while any live booster still uses it.
    pub fn dataset_free(&self, handle: DatasetHandle) -> BridgeResult<()> {
        debug!(%handle, "dataset_free");
        let attached = self.datasets.with(handle.0, |d| d.attached)?;
        if attached > 0 {
            return Err(BridgeError::DatasetInUse {
                dataset: handle,
                boosters: attached,
            });
        }
        let entry = self.datasets.remove(handle.0)?;
        Ok(self.engine.dataset_free(entry.raw)?)
    }

    fn reference_raw(&self, reference: Option<DatasetHandle>) -> BridgeResult<Option<RawHandle>> {
        reference.map(|r| self.dataset_raw(r)).transpose()
    }

    fn register_dataset(&self, raw: RawHandle) -> BridgeResult<DatasetHandle> {
        let num_data = match self.engine.dataset_num_data(raw) {
            Ok(n) => n,
            Err(e) => {
                let _ = self.engine.dataset_free(raw);
                return Err(e.into());
            }
        };
        let handle = DatasetHandle(self.datasets.insert(DatasetEntry {
            raw,
            num_data,
            attached: 0,
        }));
        debug!(%handle, num_data, "dataset registered");
        Ok(handle)
    }

    pub(crate) fn dataset_rows(&self, handle: DatasetHandle) -> BridgeResult<i64> {
        Ok(self.datasets.with(handle.0, |d| d.num_data)?)
    }
}
