//! Integration test: evaluation and prediction through the Bridge
//!
//! Run with: cargo test -p lgbm-bridge --test predict_test -- --nocapture

use std::sync::Arc;

use lgbm_bridge::*;
use lgbm_engine::fake::FakeEngine;

fn make_bridge() -> Bridge {
    Bridge::new(Arc::new(FakeEngine::new()), BridgeConfig::default())
}

/// Booster with `num_class` classes trained for `rounds` rounds on a 4x3 matrix.
fn trained_booster(bridge: &Bridge, num_class: i64, rounds: usize) -> (BoosterHandle, DatasetHandle) {
    let values = vec![0.25f32; 12];
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let train = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");
    let booster = bridge
        .booster_create(train, &format!("num_class={num_class} metric=l2,l1"))
        .expect("booster");
    for _ in 0..rounds {
        bridge.booster_update_one_iter(booster).expect("update");
    }
    (booster, train)
}

#[test]
fn test_calc_num_predict_modes() {
    let bridge = make_bridge();
    let (booster, _) = trained_booster(&bridge, 3, 4);

    let normal = bridge
        .booster_calc_num_predict(booster, 10, PredictType::Normal, 0)
        .expect("normal");
    let raw = bridge
        .booster_calc_num_predict(booster, 10, PredictType::RawScore, 2)
        .expect("raw");
    assert_eq!(normal, 30);
    assert_eq!(raw, 30);

    let leaf_all = bridge
        .booster_calc_num_predict(booster, 10, PredictType::LeafIndex, -1)
        .expect("leaf");
    let leaf_two = bridge
        .booster_calc_num_predict(booster, 10, PredictType::LeafIndex, 2)
        .expect("leaf");
    let leaf_clamped = bridge
        .booster_calc_num_predict(booster, 10, PredictType::LeafIndex, 99)
        .expect("leaf");
    assert_eq!(leaf_all, 3 * 10 * 4);
    assert_eq!(leaf_two, 3 * 10 * 2);
    assert_eq!(leaf_clamped, 3 * 10 * 4);
}

#[test]
fn test_calc_num_predict_rejects_overflowing_sizes() {
    let bridge = make_bridge();
    let (booster, _) = trained_booster(&bridge, 3, 4);

    for (rows, predict_type) in [
        ((i64::MAX / 2) as usize, PredictType::Normal),
        (usize::MAX, PredictType::RawScore),
        ((i64::MAX / 8) as usize, PredictType::LeafIndex),
    ] {
        match bridge.booster_calc_num_predict(booster, rows, predict_type, 0) {
            Err(BridgeError::SizeOverflow { what, .. }) => assert_eq!(what, "prediction"),
            other => panic!("expected SizeOverflow for {} rows, got {:?}", rows, other),
        }
    }
}

#[test]
fn test_predict_for_mat_lengths() {
    let bridge = make_bridge();
    let (booster, _) = trained_booster(&bridge, 1, 3);
    let rows: Vec<f64> = (0..15).map(|v| v as f64).collect();
    let matrix = DenseMatrix::new(&rows, 5, 3, Layout::ColMajor).expect("5x3 matrix");

    let normal = bridge
        .booster_predict_for_mat(booster, &matrix, PredictType::Normal, 0)
        .expect("normal predict");
    assert_eq!(normal.len(), 5);
    assert!(normal.iter().all(|p| (0.0..=1.0).contains(p)));

    let leaves = bridge
        .booster_predict_for_mat(booster, &matrix, PredictType::LeafIndex, 2)
        .expect("leaf predict");
    assert_eq!(leaves.len(), 5 * 2);
}

#[test]
fn test_predict_for_csr() {
    let bridge = make_bridge();
    let (booster, _) = trained_booster(&bridge, 2, 1);
    let indptr = vec![0i32, 1, 3];
    let indices = [0, 1, 2];
    let values = vec![1.0f32, 2.0, 3.0];
    let matrix = CsrMatrix::new(&indptr, &indices, &values, 3).expect("csr");

    let raw = bridge
        .booster_predict_for_csr(booster, &matrix, PredictType::RawScore, 0)
        .expect("raw predict");
    assert_eq!(raw.len(), 2 * 2);
}

#[test]
fn test_eval_names_and_values() {
    let bridge = make_bridge();
    let (booster, train) = trained_booster(&bridge, 1, 2);

    let names = bridge.booster_eval_names(booster).expect("names");
    assert_eq!(names, vec!["l2".to_string(), "l1".to_string()]);
    assert_eq!(bridge.booster_eval_counts(booster).expect("counts"), 2);

    let values = vec![0.5f32; 6];
    let matrix = DenseMatrix::row_major(&values, 2, 3).expect("2x3 matrix");
    let valid = bridge
        .dataset_from_mat(&matrix, "", Some(train))
        .expect("valid dataset");
    bridge.booster_add_valid(booster, valid).expect("add valid");

    for data_idx in 0..2 {
        let scores = bridge.booster_eval(booster, data_idx).expect("eval");
        println!("data_idx {}: {:?}", data_idx, scores);
        assert_eq!(scores.len(), names.len());
    }

    match bridge.booster_eval(booster, 2) {
        Err(BridgeError::PartitionOutOfRange {
            data_idx: 2,
            partitions: 2,
        }) => {}
        other => panic!("expected PartitionOutOfRange, got {:?}", other),
    }
    assert!(bridge.booster_eval(booster, -1).is_err());
}

#[test]
fn test_get_predict_sizes_by_partition() {
    let bridge = make_bridge();
    let (booster, train) = trained_booster(&bridge, 3, 1);
    let values = vec![0.5f32; 6];
    let matrix = DenseMatrix::row_major(&values, 2, 3).expect("2x3 matrix");
    let valid = bridge
        .dataset_from_mat(&matrix, "", Some(train))
        .expect("valid dataset");
    bridge.booster_add_valid(booster, valid).expect("add valid");

    assert_eq!(bridge.booster_get_predict(booster, 0).expect("train").len(), 3 * 4);
    assert_eq!(bridge.booster_get_predict(booster, 1).expect("valid").len(), 3 * 2);
}

#[test]
fn test_predict_for_file_writes_one_line_per_row() {
    let bridge = make_bridge();
    let (booster, _) = trained_booster(&bridge, 1, 2);
    let dir = tempfile::tempdir().expect("tempdir");

    let data = dir.path().join("test.csv");
    std::fs::write(&data, "label,a,b,c\n0,1,2,3\n1,4,5,6\n0,7,8,9\n").expect("write data");
    let result = dir.path().join("result.txt");

    bridge
        .booster_predict_for_file(
            booster,
            &data.to_string_lossy(),
            true,
            PredictType::Normal,
            0,
            &result.to_string_lossy(),
        )
        .expect("predict for file");

    let written = std::fs::read_to_string(&result).expect("read result");
    assert_eq!(written.lines().count(), 3);
}
