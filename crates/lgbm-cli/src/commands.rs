//! Subcommand bodies, written against a [`Bridge`] so they run on any engine.

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use lgbm_bridge::{Bridge, PredictType};

#[derive(Debug, Serialize)]
pub struct DatasetReport {
    pub path: String,
    pub num_data: i64,
    pub num_feature: i64,
}

#[derive(Debug, Serialize)]
pub struct MetricValue {
    /// "training" or "valid_N"
    pub partition: String,
    pub metric: String,
    pub value: f32,
}

#[derive(Debug, Serialize)]
pub struct TrainReport {
    pub iterations: i64,
    pub finished_early: bool,
    pub model: String,
    pub metrics: Vec<MetricValue>,
}

pub fn inspect(
    bridge: &Bridge,
    data: &str,
    reference: Option<&str>,
    params: &str,
) -> anyhow::Result<DatasetReport> {
    let reference = reference
        .map(|path| bridge.dataset_from_file(path, params, None))
        .transpose()
        .context("loading reference dataset")?;
    let dataset = bridge
        .dataset_from_file(data, params, reference)
        .with_context(|| format!("loading {}", data))?;

    let report = DatasetReport {
        path: data.to_string(),
        num_data: bridge.dataset_num_data(dataset)?,
        num_feature: bridge.dataset_num_feature(dataset)?,
    };

    bridge.dataset_free(dataset)?;
    if let Some(reference) = reference {
        bridge.dataset_free(reference)?;
    }
    Ok(report)
}

fn partition_name(data_idx: usize) -> String {
    if data_idx == 0 {
        "training".to_string()
    } else {
        format!("valid_{}", data_idx)
    }
}

/// Train for up to `rounds` rounds, logging every metric each round, then save the model.
pub fn train(
    bridge: &Bridge,
    data: &str,
    valid: &[String],
    rounds: usize,
    params: &str,
    output: &str,
) -> anyhow::Result<TrainReport> {
    let train = bridge
        .dataset_from_file(data, params, None)
        .with_context(|| format!("loading training data {}", data))?;
    let mut valid_sets = Vec::with_capacity(valid.len());
    for path in valid {
        let dataset = bridge
            .dataset_from_file(path, params, Some(train))
            .with_context(|| format!("loading validation data {}", path))?;
        valid_sets.push(dataset);
    }

    let booster = bridge.booster_create(train, params)?;
    for dataset in &valid_sets {
        bridge.booster_add_valid(booster, *dataset)?;
    }
    let names = bridge.booster_eval_names(booster)?;

    let mut finished_early = false;
    let mut metrics = Vec::new();
    for _ in 0..rounds {
        if bridge.booster_update_one_iter(booster)? {
            finished_early = true;
            info!("no further splits possible, stopping");
            break;
        }
        let iteration = bridge.booster_current_iteration(booster)?;

        metrics.clear();
        for data_idx in 0..=valid_sets.len() {
            let scores = bridge.booster_eval(booster, data_idx as i32)?;
            for (name, value) in names.iter().zip(scores) {
                info!("[{}] {} {}: {}", iteration, partition_name(data_idx), name, value);
                metrics.push(MetricValue {
                    partition: partition_name(data_idx),
                    metric: name.clone(),
                    value,
                });
            }
        }
    }

    let iterations = bridge.booster_current_iteration(booster)?;
    bridge
        .booster_save_model(booster, 0, output)
        .with_context(|| format!("saving model to {}", output))?;
    info!("saved {} iterations to {}", iterations, output);

    bridge.booster_free(booster)?;
    for dataset in valid_sets {
        bridge.dataset_free(dataset)?;
    }
    bridge.dataset_free(train)?;

    Ok(TrainReport {
        iterations,
        finished_early,
        model: output.to_string(),
        metrics,
    })
}

/// Score a data file with a saved model. Returns the model's iteration count.
pub fn predict(
    bridge: &Bridge,
    model: &str,
    data: &str,
    output: &str,
    predict_type: PredictType,
    num_iteration: i64,
    has_header: bool,
) -> anyhow::Result<i64> {
    let loaded = bridge
        .booster_from_model_file(model)
        .with_context(|| format!("loading model {}", model))?;
    bridge.booster_predict_for_file(
        loaded.handle,
        data,
        has_header,
        predict_type,
        num_iteration,
        output,
    )?;
    info!("wrote predictions for {} to {}", data, output);
    bridge.booster_free(loaded.handle)?;
    Ok(loaded.num_iterations)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lgbm_bridge::BridgeConfig;
    use lgbm_engine::fake::FakeEngine;

    use super::*;

    fn write_csv(dir: &tempfile::TempDir, name: &str, rows: &[&str]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, rows.join("\n")).expect("write csv");
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn train_then_predict() {
        let engine = Arc::new(FakeEngine::new());
        let bridge = Bridge::new(engine.clone(), BridgeConfig::default());
        let dir = tempfile::tempdir().expect("tempdir");
        let train_csv = write_csv(&dir, "train.csv", &["1,0.1,0.2", "0,0.3,0.4", "1,0.5,0.6"]);
        let valid_csv = write_csv(&dir, "valid.csv", &["0,0.2,0.1", "1,0.4,0.3"]);
        let model = dir.path().join("model.txt").to_string_lossy().into_owned();

        let report = train(&bridge, &train_csv, &[valid_csv.clone()], 4, "metric=l2,l1", &model)
            .expect("train");
        assert_eq!(report.iterations, 4);
        assert!(!report.finished_early);
        assert_eq!(report.metrics.len(), 4);
        assert_eq!(report.metrics[2].partition, "valid_1");
        assert_eq!(engine.live_datasets(), 0);
        assert_eq!(engine.live_boosters(), 0);

        let output = dir.path().join("pred.txt").to_string_lossy().into_owned();
        let iterations = predict(&bridge, &model, &valid_csv, &output, PredictType::Normal, 0, false)
            .expect("predict");
        assert_eq!(iterations, 4);
        let lines = std::fs::read_to_string(&output).expect("read predictions");
        assert_eq!(lines.lines().count(), 2);
    }

    #[test]
    fn inspect_reports_shape() {
        let bridge = Bridge::new(Arc::new(FakeEngine::new()), BridgeConfig::default());
        let dir = tempfile::tempdir().expect("tempdir");
        let data = write_csv(&dir, "data.tsv", &["0\t1\t2\t3", "1\t4\t5\t6"]);

        let report = inspect(&bridge, &data, None, "").expect("inspect");
        assert_eq!((report.num_data, report.num_feature), (2, 3));
        assert!(inspect(&bridge, &data, Some(&data), "").is_ok());
    }
}
