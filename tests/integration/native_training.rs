//! Integration test: training against the real engine library
//!
//! Loads lib_lightgbm (from LGBM_BRIDGE_LIB or the platform's usual names)
//! and runs a small train / save / reload / predict cycle through the Bridge.
//! Every test skips when the library cannot be loaded.
//!
//! Run with: cargo test -p lgbm-integration --test native_training -- --nocapture

use lgbm_bridge::*;
use lgbm_engine::NativeEngine;

fn load_bridge() -> Option<Bridge> {
    let config = BridgeConfig::default();
    match NativeEngine::load(config.library_path().as_deref()) {
        Ok(engine) => {
            println!("Engine library loaded from {}", engine.path());
            Some(Bridge::new(engine, config))
        }
        Err(e) => {
            println!("Engine library not available (skipping): {}", e);
            None
        }
    }
}

/// 40 rows, 3 features, label = 1 when the first feature is large.
fn toy_data() -> (Vec<f64>, Vec<f32>) {
    let mut values = Vec::with_capacity(40 * 3);
    let mut labels = Vec::with_capacity(40);
    for row in 0..40 {
        let x = row as f64 / 40.0;
        values.extend_from_slice(&[x, (row % 7) as f64, 1.0 - x]);
        labels.push(if x > 0.5 { 1.0 } else { 0.0 });
    }
    (values, labels)
}

#[test]
fn test_native_library_loads() {
    let Some(bridge) = load_bridge() else {
        return;
    };
    println!("Engine: {}", bridge.engine().describe());
}

#[test]
fn test_native_dense_one_update() {
    let Some(bridge) = load_bridge() else {
        return;
    };

    let values = vec![0.0f32, 1.0, 2.0, 1.0, 0.0, 3.0, 2.0, 2.0, 1.0, 3.0, 1.0, 0.0];
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let train = bridge
        .dataset_from_mat(&matrix, "min_data_in_bin=1 min_data_in_leaf=1", None)
        .expect("dataset");
    assert_eq!(bridge.dataset_num_data(train).expect("num_data"), 4);
    assert_eq!(bridge.dataset_num_feature(train).expect("num_feature"), 3);

    let labels = [0.0f32; 4];
    bridge
        .dataset_set_field(train, Field::Label, FieldSlice::from(&labels[..]))
        .expect("labels");
    match bridge.dataset_get_field(train, Field::Label).expect("labels") {
        FieldData::Float32(got) => assert_eq!(got, labels),
        other => panic!("expected Float32 labels, got {:?}", other),
    }

    let booster = bridge
        .booster_create(train, "objective=regression min_data_in_leaf=1 verbose=-1")
        .expect("booster");
    bridge.booster_update_one_iter(booster).expect("update");
    assert_eq!(bridge.booster_current_iteration(booster).expect("iteration"), 1);
}

#[test]
fn test_native_train_save_reload_predict() {
    let Some(bridge) = load_bridge() else {
        return;
    };

    let (values, labels) = toy_data();
    let matrix = DenseMatrix::row_major(&values, 40, 3).expect("40x3 matrix");
    let train = bridge
        .dataset_from_mat(&matrix, "min_data_in_bin=1", None)
        .expect("dataset");
    bridge
        .dataset_set_field(train, Field::Label, FieldSlice::from(&labels[..]))
        .expect("labels");

    let booster = bridge
        .booster_create(
            train,
            "objective=binary metric=binary_logloss min_data_in_leaf=2 verbose=-1",
        )
        .expect("booster");
    for _ in 0..5 {
        bridge.booster_update_one_iter(booster).expect("update");
    }
    let names = bridge.booster_eval_names(booster).expect("names");
    let scores = bridge.booster_eval(booster, 0).expect("eval");
    println!("Training metrics: {:?} = {:?}", names, scores);
    assert_eq!(names.len(), scores.len());

    let dir = tempfile::tempdir().expect("tempdir");
    let model = dir.path().join("model.txt");
    bridge
        .booster_save_model(booster, -1, &model.to_string_lossy())
        .expect("save model");

    let loaded = bridge
        .booster_from_model_file(&model.to_string_lossy())
        .expect("reload");
    assert_eq!(loaded.num_iterations, 5);

    let normal = bridge
        .booster_predict_for_mat(loaded.handle, &matrix, PredictType::Normal, 0)
        .expect("predict");
    assert_eq!(normal.len(), 40);
    let expected_leaf = bridge
        .booster_calc_num_predict(loaded.handle, 40, PredictType::LeafIndex, 3)
        .expect("calc");
    let leaves = bridge
        .booster_predict_for_mat(loaded.handle, &matrix, PredictType::LeafIndex, 3)
        .expect("leaf predict");
    assert_eq!(leaves.len(), expected_leaf);
}

#[test]
fn test_native_failure_carries_engine_message() {
    let Some(bridge) = load_bridge() else {
        return;
    };

    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing_model.txt");
    let err = bridge
        .booster_from_model_file(&missing.to_string_lossy())
        .expect_err("no model file");
    println!("Engine error: {}", err);
    assert!(matches!(err, BridgeError::Engine(_)));
    assert!(!err.to_string().is_empty());
}
