//! In-process stand-in for the native engine.
//!
//! `FakeEngine` keeps just enough state to behave like the real library at the
//! boundary: row and feature counts, metadata fields, iteration counters,
//! metric names and a tiny text model format. Scores are deterministic
//! functions of the iteration count, not the result of any training.

use std::collections::HashMap;
use std::ffi::CStr;
use std::fmt::Write as _;

use parking_lot::Mutex;
use tracing::debug;

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::matrix::{CscMatrix, CsrMatrix, DenseMatrix};
use crate::types::{DType, FieldData, FieldSlice, PredictType, RawHandle};

struct FakeDataset {
    num_data: i64,
    num_feature: i64,
    fields: HashMap<&'static str, FieldData>,
}

impl FakeDataset {
    fn new(num_data: i64, num_feature: i64) -> Self {
        let mut fields = HashMap::new();
        fields.insert("label", FieldData::Float32(vec![0.0; num_data as usize]));
        Self {
            num_data,
            num_feature,
            fields,
        }
    }
}

struct FakeBooster {
    num_class: i64,
    iterations: i64,
    metrics: Vec<String>,
    train_rows: Option<i64>,
    valid_rows: Vec<i64>,
}

#[derive(Default)]
struct State {
    next_id: usize,
    datasets: HashMap<usize, FakeDataset>,
    boosters: HashMap<usize, FakeBooster>,
    reject_booster_free: bool,
}

impl State {
    fn next_handle(&mut self) -> RawHandle {
        self.next_id += 1;
        // Ids start at 1, so the address is never null.
        RawHandle::from_addr(self.next_id).unwrap_or_else(|| unreachable!())
    }

    fn dataset(&self, op: &'static str, handle: RawHandle) -> EngineResult<&FakeDataset> {
        self.datasets
            .get(&handle.addr())
            .ok_or_else(|| EngineError::native(op, format!("unknown dataset {:#x}", handle.addr())))
    }

    fn dataset_mut(&mut self, op: &'static str, handle: RawHandle) -> EngineResult<&mut FakeDataset> {
        self.datasets
            .get_mut(&handle.addr())
            .ok_or_else(|| EngineError::native(op, format!("unknown dataset {:#x}", handle.addr())))
    }

    fn booster(&self, op: &'static str, handle: RawHandle) -> EngineResult<&FakeBooster> {
        self.boosters
            .get(&handle.addr())
            .ok_or_else(|| EngineError::native(op, format!("unknown booster {:#x}", handle.addr())))
    }

    fn booster_mut(&mut self, op: &'static str, handle: RawHandle) -> EngineResult<&mut FakeBooster> {
        self.boosters
            .get_mut(&handle.addr())
            .ok_or_else(|| EngineError::native(op, format!("unknown booster {:#x}", handle.addr())))
    }

    fn add_dataset(
        &mut self,
        op: &'static str,
        dataset: FakeDataset,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        if let Some(reference) = reference {
            let expected = self.dataset(op, reference)?.num_feature;
            if expected != dataset.num_feature {
                return Err(EngineError::native(
                    op,
                    format!(
                        "number of features ({}) does not match the reference dataset ({})",
                        dataset.num_feature, expected
                    ),
                ));
            }
        }
        let handle = self.next_handle();
        self.datasets.insert(handle.addr(), dataset);
        Ok(handle)
    }

    fn add_booster(&mut self, booster: FakeBooster) -> RawHandle {
        let handle = self.next_handle();
        self.boosters.insert(handle.addr(), booster);
        handle
    }
}

/// Deterministic engine that never touches a shared library.
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<State>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Datasets created and not yet freed.
    pub fn live_datasets(&self) -> usize {
        self.state.lock().datasets.len()
    }

    /// Boosters created and not yet freed.
    pub fn live_boosters(&self) -> usize {
        self.state.lock().boosters.len()
    }

    /// Make `LGBM_BoosterFree` fail (leaving the booster alive) until reset.
    pub fn reject_booster_free(&self, reject: bool) {
        self.state.lock().reject_booster_free = reject;
    }
}

fn parse_params(parameters: &CStr) -> HashMap<String, String> {
    parameters
        .to_string_lossy()
        .split_whitespace()
        .filter_map(|kv| kv.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn num_class_of(op: &'static str, params: &HashMap<String, String>) -> EngineResult<i64> {
    match params.get("num_class") {
        None => Ok(1),
        Some(v) => match v.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(EngineError::native(op, format!("num_class should be a positive integer, got {v}"))),
        },
    }
}

fn metrics_of(params: &HashMap<String, String>) -> Vec<String> {
    match params.get("metric").map(String::as_str) {
        None => vec!["l2".to_string()],
        Some("" | "None" | "none") => Vec::new(),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

fn path_of(filename: &CStr) -> String {
    filename.to_string_lossy().into_owned()
}

/// Data rows of a delimited text file, header skipped when asked.
fn read_rows(op: &'static str, path: &str, has_header: bool) -> EngineResult<Vec<Vec<f64>>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| EngineError::native(op, format!("could not open data file {path}: {e}")))?;
    let mut rows = Vec::new();
    for (lineno, line) in content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .skip(has_header as usize)
    {
        let row = line
            .split(|c: char| c == ',' || c == '\t' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                EngineError::native(op, format!("{path}:{}: unparsable value: {e}", lineno + 1))
            })?;
        rows.push(row);
    }
    Ok(rows)
}

fn used_iterations(iterations: i64, num_iteration: i64) -> i64 {
    if num_iteration <= 0 {
        iterations
    } else {
        num_iteration.min(iterations)
    }
}

/// Deterministic scores: raw score grows by 0.1 per iteration.
fn fill_scores(
    out: &mut [f32],
    num_class: i64,
    used: i64,
    predict_type: PredictType,
) {
    let raw = used as f32 * 0.1;
    for (i, value) in out.iter_mut().enumerate() {
        *value = match predict_type {
            PredictType::RawScore => raw,
            PredictType::Normal if num_class == 1 => 1.0 / (1.0 + (-raw).exp()),
            PredictType::Normal => 1.0 / num_class as f32,
            PredictType::LeafIndex => (i as i64 % used.max(1)) as f32,
        };
    }
}

fn ensure_capacity(op: &'static str, needed: i64, out: &[f32]) -> EngineResult<()> {
    if needed as usize > out.len() {
        return Err(EngineError::OutputOverflow {
            op,
            reported: needed,
            capacity: out.len(),
        });
    }
    Ok(())
}

fn predict_len(booster: &FakeBooster, rows: i64, predict_type: PredictType, num_iteration: i64) -> i64 {
    let base = booster.num_class * rows;
    match predict_type {
        PredictType::LeafIndex => base * used_iterations(booster.iterations, num_iteration),
        _ => base,
    }
}

fn expected_dtype(op: &'static str, field_name: &str) -> EngineResult<(&'static str, DType)> {
    match field_name {
        "label" => Ok(("label", DType::Float32)),
        "weight" => Ok(("weight", DType::Float32)),
        "group" => Ok(("group", DType::Int32)),
        "group_id" => Ok(("group_id", DType::Int32)),
        other => Err(EngineError::native(op, format!("Field not found: {other}"))),
    }
}

impl Engine for FakeEngine {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    fn dataset_create_from_file(
        &self,
        filename: &CStr,
        parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        const OP: &str = "LGBM_DatasetCreateFromFile";
        let params = parse_params(parameters);
        let has_header = params.get("header").is_some_and(|v| v == "true");
        let rows = read_rows(OP, &path_of(filename), has_header)?;
        let num_feature = rows.first().map_or(0, |r| r.len().saturating_sub(1)) as i64;
        if let Some(bad) = rows.iter().position(|r| r.len() as i64 != num_feature + 1) {
            return Err(EngineError::native(
                OP,
                format!("row {} has a different number of columns", bad + 1),
            ));
        }

        let mut dataset = FakeDataset::new(rows.len() as i64, num_feature);
        let labels = rows.iter().map(|r| r[0] as f32).collect();
        dataset.fields.insert("label", FieldData::Float32(labels));

        let mut state = self.state.lock();
        let handle = state.add_dataset(OP, dataset, reference)?;
        debug!(rows = rows.len(), num_feature, "fake dataset loaded from file");
        Ok(handle)
    }

    fn dataset_create_from_mat(
        &self,
        matrix: &DenseMatrix<'_>,
        _parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let dataset = FakeDataset::new(matrix.nrow() as i64, matrix.ncol() as i64);
        self.state
            .lock()
            .add_dataset("LGBM_DatasetCreateFromMat", dataset, reference)
    }

    fn dataset_create_from_csr(
        &self,
        matrix: &CsrMatrix<'_>,
        _parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let dataset = FakeDataset::new(matrix.rows() as i64, matrix.num_col());
        self.state
            .lock()
            .add_dataset("LGBM_DatasetCreateFromCSR", dataset, reference)
    }

    fn dataset_create_from_csc(
        &self,
        matrix: &CscMatrix<'_>,
        _parameters: &CStr,
        reference: Option<RawHandle>,
    ) -> EngineResult<RawHandle> {
        let dataset = FakeDataset::new(matrix.num_row(), matrix.cols() as i64);
        self.state
            .lock()
            .add_dataset("LGBM_DatasetCreateFromCSC", dataset, reference)
    }

    fn dataset_get_subset(
        &self,
        handle: RawHandle,
        used_row_indices: &[i32],
        _parameters: &CStr,
    ) -> EngineResult<RawHandle> {
        const OP: &str = "LGBM_DatasetGetSubset";
        let mut state = self.state.lock();
        let source = state.dataset(OP, handle)?;
        if let Some(&bad) = used_row_indices
            .iter()
            .find(|&&i| i < 0 || i as i64 >= source.num_data)
        {
            return Err(EngineError::native(
                OP,
                format!("row index {bad} is out of range for {} rows", source.num_data),
            ));
        }

        let mut subset = FakeDataset::new(used_row_indices.len() as i64, source.num_feature);
        if let Some(labels) = source.fields.get("label").and_then(FieldData::as_f32) {
            let picked = used_row_indices.iter().map(|&i| labels[i as usize]).collect();
            subset.fields.insert("label", FieldData::Float32(picked));
        }
        let handle = state.next_handle();
        state.datasets.insert(handle.addr(), subset);
        Ok(handle)
    }

    fn dataset_free(&self, handle: RawHandle) -> EngineResult<()> {
        self.state
            .lock()
            .datasets
            .remove(&handle.addr())
            .map(|_| ())
            .ok_or_else(|| EngineError::native("LGBM_DatasetFree", "unknown dataset"))
    }

    fn dataset_save_binary(&self, handle: RawHandle, filename: &CStr) -> EngineResult<()> {
        const OP: &str = "LGBM_DatasetSaveBinary";
        let state = self.state.lock();
        let dataset = state.dataset(OP, handle)?;
        let body = format!(
            "fake-dataset\nnum_data={}\nnum_feature={}\n",
            dataset.num_data, dataset.num_feature
        );
        std::fs::write(path_of(filename), body)
            .map_err(|e| EngineError::native(OP, format!("cannot write binary file: {e}")))
    }

    fn dataset_set_field(
        &self,
        handle: RawHandle,
        field_name: &CStr,
        data: FieldSlice<'_>,
    ) -> EngineResult<()> {
        const OP: &str = "LGBM_DatasetSetField";
        let mut state = self.state.lock();
        let dataset = state.dataset_mut(OP, handle)?;
        let (name, dtype) = expected_dtype(OP, &field_name.to_string_lossy())?;
        if data.dtype() != dtype {
            return Err(EngineError::native(
                OP,
                format!("type of {name} should be {dtype}, got {}", data.dtype()),
            ));
        }
        if dtype == DType::Float32 && data.len() as i64 != dataset.num_data {
            return Err(EngineError::native(
                OP,
                format!(
                    "length of {name} ({}) is not the same as #data ({})",
                    data.len(),
                    dataset.num_data
                ),
            ));
        }
        dataset.fields.insert(name, data.to_field_data());
        Ok(())
    }

    fn dataset_get_field(&self, handle: RawHandle, field_name: &CStr) -> EngineResult<FieldData> {
        const OP: &str = "LGBM_DatasetGetField";
        let state = self.state.lock();
        let dataset = state.dataset(OP, handle)?;
        let (name, dtype) = expected_dtype(OP, &field_name.to_string_lossy())?;
        Ok(dataset
            .fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| FieldData::empty(dtype)))
    }

    fn dataset_num_data(&self, handle: RawHandle) -> EngineResult<i64> {
        Ok(self.state.lock().dataset("LGBM_DatasetGetNumData", handle)?.num_data)
    }

    fn dataset_num_feature(&self, handle: RawHandle) -> EngineResult<i64> {
        Ok(self
            .state
            .lock()
            .dataset("LGBM_DatasetGetNumFeature", handle)?
            .num_feature)
    }

    fn booster_create(&self, train_data: RawHandle, parameters: &CStr) -> EngineResult<RawHandle> {
        const OP: &str = "LGBM_BoosterCreate";
        let params = parse_params(parameters);
        let mut state = self.state.lock();
        let train_rows = state.dataset(OP, train_data)?.num_data;
        let booster = FakeBooster {
            num_class: num_class_of(OP, &params)?,
            iterations: 0,
            metrics: metrics_of(&params),
            train_rows: Some(train_rows),
            valid_rows: Vec::new(),
        };
        Ok(state.add_booster(booster))
    }

    fn booster_create_from_model_file(&self, filename: &CStr) -> EngineResult<(RawHandle, i64)> {
        const OP: &str = "LGBM_BoosterCreateFromModelfile";
        let path = path_of(filename);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| EngineError::native(OP, format!("could not open model file {path}: {e}")))?;

        let mut num_class = None;
        let mut trees = 0i64;
        for line in content.lines() {
            if let Some(v) = line.strip_prefix("num_class=") {
                num_class = v.trim().parse::<i64>().ok().filter(|&n| n >= 1);
            } else if line.starts_with("Tree=") {
                trees += 1;
            }
        }
        let num_class = num_class
            .ok_or_else(|| EngineError::native(OP, format!("{path} is not a model file")))?;

        let iterations = trees / num_class;
        let booster = FakeBooster {
            num_class,
            iterations,
            metrics: Vec::new(),
            train_rows: None,
            valid_rows: Vec::new(),
        };
        let handle = self.state.lock().add_booster(booster);
        Ok((handle, iterations))
    }

    fn booster_free(&self, handle: RawHandle) -> EngineResult<()> {
        let mut state = self.state.lock();
        if state.reject_booster_free {
            return Err(EngineError::native("LGBM_BoosterFree", "booster is busy"));
        }
        state
            .boosters
            .remove(&handle.addr())
            .map(|_| ())
            .ok_or_else(|| EngineError::native("LGBM_BoosterFree", "unknown booster"))
    }

    fn booster_merge(&self, handle: RawHandle, other: RawHandle) -> EngineResult<()> {
        const OP: &str = "LGBM_BoosterMerge";
        let mut state = self.state.lock();
        let (other_class, other_iterations) = {
            let other = state.booster(OP, other)?;
            (other.num_class, other.iterations)
        };
        let booster = state.booster_mut(OP, handle)?;
        if booster.num_class != other_class {
            return Err(EngineError::native(
                OP,
                "cannot merge boosters with different num_class",
            ));
        }
        booster.iterations += other_iterations;
        Ok(())
    }

    fn booster_add_valid_data(&self, handle: RawHandle, valid_data: RawHandle) -> EngineResult<()> {
        const OP: &str = "LGBM_BoosterAddValidData";
        let mut state = self.state.lock();
        let rows = state.dataset(OP, valid_data)?.num_data;
        state.booster_mut(OP, handle)?.valid_rows.push(rows);
        Ok(())
    }

    fn booster_reset_training_data(
        &self,
        handle: RawHandle,
        train_data: RawHandle,
    ) -> EngineResult<()> {
        const OP: &str = "LGBM_BoosterResetTrainingData";
        let mut state = self.state.lock();
        let rows = state.dataset(OP, train_data)?.num_data;
        state.booster_mut(OP, handle)?.train_rows = Some(rows);
        Ok(())
    }

    fn booster_reset_parameter(&self, handle: RawHandle, parameters: &CStr) -> EngineResult<()> {
        const OP: &str = "LGBM_BoosterResetParameter";
        let params = parse_params(parameters);
        let mut state = self.state.lock();
        let booster = state.booster_mut(OP, handle)?;
        if params.contains_key("num_class") && num_class_of(OP, &params)? != booster.num_class {
            return Err(EngineError::native(OP, "cannot change num_class during training"));
        }
        if params.contains_key("metric") {
            booster.metrics = metrics_of(&params);
        }
        Ok(())
    }

    fn booster_num_classes(&self, handle: RawHandle) -> EngineResult<i64> {
        Ok(self.state.lock().booster("LGBM_BoosterGetNumClasses", handle)?.num_class)
    }

    fn booster_update_one_iter(&self, handle: RawHandle) -> EngineResult<bool> {
        const OP: &str = "LGBM_BoosterUpdateOneIter";
        let mut state = self.state.lock();
        let booster = state.booster_mut(OP, handle)?;
        if booster.train_rows.is_none() {
            return Err(EngineError::native(OP, "cannot train without training data"));
        }
        booster.iterations += 1;
        Ok(false)
    }

    fn booster_update_one_iter_custom(
        &self,
        handle: RawHandle,
        grad: &[f32],
        hess: &[f32],
    ) -> EngineResult<bool> {
        const OP: &str = "LGBM_BoosterUpdateOneIterCustom";
        let mut state = self.state.lock();
        let booster = state.booster_mut(OP, handle)?;
        let rows = booster
            .train_rows
            .ok_or_else(|| EngineError::native(OP, "cannot train without training data"))?;
        let expected = (booster.num_class * rows) as usize;
        if grad.len() != expected || hess.len() != expected {
            return Err(EngineError::native(
                OP,
                format!("gradient and hessian need {expected} values"),
            ));
        }
        booster.iterations += 1;
        Ok(false)
    }

    fn booster_rollback_one_iter(&self, handle: RawHandle) -> EngineResult<()> {
        let mut state = self.state.lock();
        let booster = state.booster_mut("LGBM_BoosterRollbackOneIter", handle)?;
        booster.iterations = (booster.iterations - 1).max(0);
        Ok(())
    }

    fn booster_current_iteration(&self, handle: RawHandle) -> EngineResult<i64> {
        Ok(self
            .state
            .lock()
            .booster("LGBM_BoosterGetCurrentIteration", handle)?
            .iterations)
    }

    fn booster_eval_counts(&self, handle: RawHandle) -> EngineResult<i64> {
        Ok(self
            .state
            .lock()
            .booster("LGBM_BoosterGetEvalCounts", handle)?
            .metrics
            .len() as i64)
    }

    fn booster_eval_names(&self, handle: RawHandle, count: usize) -> EngineResult<Vec<String>> {
        let state = self.state.lock();
        let booster = state.booster("LGBM_BoosterGetEvalNames", handle)?;
        Ok(booster.metrics.iter().take(count).cloned().collect())
    }

    fn booster_eval(&self, handle: RawHandle, data_idx: i32, out: &mut [f32]) -> EngineResult<i64> {
        const OP: &str = "LGBM_BoosterGetEval";
        let state = self.state.lock();
        let booster = state.booster(OP, handle)?;
        partition_rows(OP, booster, data_idx)?;
        let needed = booster.metrics.len() as i64;
        ensure_capacity(OP, needed, out)?;
        let value = 1.0 / (1.0 + booster.iterations as f32);
        out[..needed as usize].fill(value);
        Ok(needed)
    }

    fn booster_get_predict(
        &self,
        handle: RawHandle,
        data_idx: i32,
        out: &mut [f32],
    ) -> EngineResult<i64> {
        const OP: &str = "LGBM_BoosterGetPredict";
        let state = self.state.lock();
        let booster = state.booster(OP, handle)?;
        let rows = partition_rows(OP, booster, data_idx)?;
        let needed = booster.num_class * rows;
        ensure_capacity(OP, needed, out)?;
        fill_scores(
            &mut out[..needed as usize],
            booster.num_class,
            booster.iterations,
            PredictType::RawScore,
        );
        Ok(needed)
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
        const OP: &str = "LGBM_BoosterPredictForFile";
        let rows = read_rows(OP, &path_of(data_filename), has_header)?;
        let state = self.state.lock();
        let booster = state.booster(OP, handle)?;
        let per_row = predict_len(booster, 1, predict_type, num_iteration) as usize;
        let mut scores = vec![0.0f32; per_row];
        fill_scores(
            &mut scores,
            booster.num_class,
            used_iterations(booster.iterations, num_iteration),
            predict_type,
        );

        let mut body = String::new();
        for _ in &rows {
            let line: Vec<String> = scores.iter().map(|s| s.to_string()).collect();
            let _ = writeln!(body, "{}", line.join("\t"));
        }
        std::fs::write(path_of(result_filename), body)
            .map_err(|e| EngineError::native(OP, format!("cannot write result file: {e}")))
    }

    fn booster_predict_for_csr(
        &self,
        handle: RawHandle,
        matrix: &CsrMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
        out: &mut [f32],
    ) -> EngineResult<i64> {
        const OP: &str = "LGBM_BoosterPredictForCSR";
        let state = self.state.lock();
        let booster = state.booster(OP, handle)?;
        predict_into(OP, booster, matrix.rows() as i64, predict_type, num_iteration, out)
    }

    fn booster_predict_for_mat(
        &self,
        handle: RawHandle,
        matrix: &DenseMatrix<'_>,
        predict_type: PredictType,
        num_iteration: i64,
        out: &mut [f32],
    ) -> EngineResult<i64> {
        const OP: &str = "LGBM_BoosterPredictForMat";
        let state = self.state.lock();
        let booster = state.booster(OP, handle)?;
        predict_into(OP, booster, matrix.nrow() as i64, predict_type, num_iteration, out)
    }

    fn booster_save_model(
        &self,
        handle: RawHandle,
        num_iteration: i32,
        filename: &CStr,
    ) -> EngineResult<()> {
        const OP: &str = "LGBM_BoosterSaveModel";
        let state = self.state.lock();
        let booster = state.booster(OP, handle)?;
        let used = used_iterations(booster.iterations, num_iteration as i64);

        let mut body = format!("fake-model\nnum_class={}\n", booster.num_class);
        for tree in 0..used * booster.num_class {
            let _ = writeln!(body, "Tree={tree}");
        }
        std::fs::write(path_of(filename), body)
            .map_err(|e| EngineError::native(OP, format!("cannot write model file: {e}")))
    }
}

fn partition_rows(op: &'static str, booster: &FakeBooster, data_idx: i32) -> EngineResult<i64> {
    let rows = match data_idx {
        0 => booster.train_rows,
        i if i > 0 => booster.valid_rows.get(i as usize - 1).copied(),
        _ => None,
    };
    rows.ok_or_else(|| {
        EngineError::native(
            op,
            format!(
                "data_idx should be smaller than {}",
                booster.valid_rows.len() + booster.train_rows.is_some() as usize
            ),
        )
    })
}

fn predict_into(
    op: &'static str,
    booster: &FakeBooster,
    rows: i64,
    predict_type: PredictType,
    num_iteration: i64,
    out: &mut [f32],
) -> EngineResult<i64> {
    let needed = predict_len(booster, rows, predict_type, num_iteration);
    ensure_capacity(op, needed, out)?;
    fill_scores(
        &mut out[..needed as usize],
        booster.num_class,
        used_iterations(booster.iterations, num_iteration),
        predict_type,
    );
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> std::ffi::CString {
        std::ffi::CString::new(s).expect("no NUL")
    }

    #[test]
    fn text_file_with_header_loads_label_column_separately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("train.csv");
        std::fs::write(&path, "y,a,b\n1,0.5,0.25\n0,1.5,2.0\n").expect("write");

        let engine = FakeEngine::new();
        let data = engine
            .dataset_create_from_file(&c(&path.to_string_lossy()), &c("header=true"), None)
            .expect("load");
        assert_eq!(engine.dataset_num_data(data).expect("rows"), 2);
        assert_eq!(engine.dataset_num_feature(data).expect("features"), 2);
    }

    #[test]
    fn saved_model_keeps_iteration_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model = c(&dir.path().join("model.txt").to_string_lossy());

        let engine = FakeEngine::new();
        let values = [0.0f64; 6];
        let matrix = DenseMatrix::row_major(&values[..], 3, 2).expect("3x2");
        let data = engine.dataset_create_from_mat(&matrix, &c(""), None).expect("dataset");
        let booster = engine
            .booster_create(data, &c("num_class=3"))
            .expect("booster");
        for _ in 0..4 {
            engine.booster_update_one_iter(booster).expect("update");
        }
        engine.booster_save_model(booster, 0, &model).expect("save");
        let (_, iterations) = engine.booster_create_from_model_file(&model).expect("load");
        assert_eq!(iterations, 4);

        engine.booster_save_model(booster, 2, &model).expect("save truncated");
        let (_, iterations) = engine.booster_create_from_model_file(&model).expect("load");
        assert_eq!(iterations, 2);
        assert_eq!(engine.live_boosters(), 3);
    }

    #[test]
    fn short_output_buffer_is_an_overflow() {
        let engine = FakeEngine::new();
        let values = [0.0f32; 4];
        let matrix = DenseMatrix::row_major(&values[..], 2, 2).expect("2x2");
        let data = engine.dataset_create_from_mat(&matrix, &c(""), None).expect("dataset");
        let booster = engine.booster_create(data, &c("")).expect("booster");

        let mut out = [0.0f32; 1];
        match engine.booster_predict_for_mat(booster, &matrix, PredictType::Normal, 0, &mut out) {
            Err(EngineError::OutputOverflow { .. }) => {}
            other => panic!("expected OutputOverflow, got {:?}", other),
        }
    }
}
