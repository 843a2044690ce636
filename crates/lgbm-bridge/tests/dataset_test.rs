//! Integration test: dataset operations through the Bridge
//!
//! Runs against the in-process FakeEngine, so no engine library is needed.
//!
//! Run with: cargo test -p lgbm-bridge --test dataset_test -- --nocapture

use std::io::Write;
use std::sync::Arc;

use lgbm_bridge::*;
use lgbm_core::CoreError;
use lgbm_engine::fake::FakeEngine;

fn make_bridge() -> Bridge {
    Bridge::new(Arc::new(FakeEngine::new()), BridgeConfig::default())
}

fn dense_4x3() -> Vec<f32> {
    (0..12).map(|v| v as f32).collect()
}

#[test]
fn test_dense_dataset_shape() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");

    let dataset = bridge
        .dataset_from_mat(&matrix, "max_bin=15", None)
        .expect("dataset from dense matrix");
    println!("Dataset created: {}", dataset);

    assert_eq!(bridge.dataset_num_data(dataset).expect("num_data"), 4);
    assert_eq!(bridge.dataset_num_feature(dataset).expect("num_feature"), 3);
}

#[test]
fn test_csr_pointer_count_gives_rows() {
    let bridge = make_bridge();
    let indptr = vec![0i64, 2, 2, 3, 5];
    let indices = [0, 2, 1, 0, 1];
    let values = vec![1.0f64, 2.0, 3.0, 4.0, 5.0];
    let matrix = CsrMatrix::new(&indptr, &indices, &values, 3).expect("valid csr");

    let dataset = bridge
        .dataset_from_csr(&matrix, "", None)
        .expect("dataset from csr");
    assert_eq!(bridge.dataset_num_data(dataset).expect("num_data"), 4);
    assert_eq!(bridge.dataset_num_feature(dataset).expect("num_feature"), 3);
}

#[test]
fn test_csc_dataset() {
    let bridge = make_bridge();
    let col_ptr = vec![0i32, 1, 3];
    let indices = [4, 0, 2];
    let values = vec![1.0f32, 1.5, 2.0];
    let matrix = CscMatrix::new(&col_ptr, &indices, &values, 5).expect("valid csc");

    let dataset = bridge
        .dataset_from_csc(&matrix, "", None)
        .expect("dataset from csc");
    assert_eq!(bridge.dataset_num_data(dataset).expect("num_data"), 5);
    assert_eq!(bridge.dataset_num_feature(dataset).expect("num_feature"), 2);
}

#[test]
fn test_malformed_csr_is_rejected_with_message() {
    let indptr = vec![0i32, 2, 1, 3];
    let indices = [0, 1, 2];
    let values = vec![1.0f32; 3];

    let err: BridgeError = CsrMatrix::new(&indptr, &indices, &values, 3)
        .expect_err("indptr goes backwards")
        .into();
    let message = err.to_string();
    println!("Rejected: {}", message);
    assert!(matches!(err, BridgeError::InvalidMatrix(_)));
    assert!(message.contains("indptr"));
    assert!(message.contains("not non-decreasing"));
}

#[test]
fn test_label_round_trip() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let labels = [1.0f32, 0.0, 1.0, 1.0];
    bridge
        .dataset_set_field(dataset, Field::Label, FieldSlice::from(&labels[..]))
        .expect("set label");

    match bridge.dataset_get_field(dataset, Field::Label).expect("get label") {
        FieldData::Float32(got) => assert_eq!(got, labels),
        other => panic!("expected Float32 labels, got {:?}", other),
    }
}

#[test]
fn test_group_round_trip() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let groups = [1i32, 3];
    bridge
        .dataset_set_field(dataset, "group".parse().expect("known field"), FieldSlice::from(&groups[..]))
        .expect("set group");
    let got = bridge.dataset_get_field(dataset, Field::Group).expect("get group");
    assert_eq!(got.as_i32(), Some(&groups[..]));
}

#[test]
fn test_unset_weight_is_empty() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let weight = bridge.dataset_get_field(dataset, Field::Weight).expect("get weight");
    assert_eq!(weight.dtype(), DType::Float32);
    assert!(weight.is_empty());
}

#[test]
fn test_field_type_mismatch_fails_before_engine() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let wrong = [1i32, 0, 1, 1];
    match bridge.dataset_set_field(dataset, Field::Label, FieldSlice::from(&wrong[..])) {
        Err(BridgeError::FieldType {
            field: Field::Label,
            expected: DType::Float32,
            actual: DType::Int32,
        }) => {}
        other => panic!("expected FieldType error, got {:?}", other),
    }
}

#[test]
fn test_float_group_is_rejected() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let sizes = [2.0f32, 2.0];
    match bridge.dataset_set_field(dataset, Field::Group, FieldSlice::from(&sizes[..])) {
        Err(BridgeError::FieldType {
            field: Field::Group,
            expected: DType::Int32,
            actual: DType::Float32,
        }) => {}
        other => panic!("expected FieldType error, got {:?}", other),
    }
    match bridge.dataset_get_field(dataset, Field::Group).expect("group") {
        FieldData::Int32(got) => assert!(got.is_empty()),
        other => panic!("expected empty Int32 group, got {:?}", other),
    }
}

#[test]
fn test_engine_rejection_is_surfaced() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let short = [1.0f32, 0.0];
    let err = bridge
        .dataset_set_field(dataset, Field::Weight, FieldSlice::from(&short[..]))
        .expect_err("weight length must equal num_data");
    println!("Engine said: {}", err);
    assert!(matches!(err, BridgeError::Engine(_)));
    assert!(err.to_string().contains("LGBM_DatasetSetField"));
}

#[test]
fn test_unknown_field_name() {
    match "init_score".parse::<Field>() {
        Err(BridgeError::UnknownField(name)) => assert_eq!(name, "init_score"),
        other => panic!("expected UnknownField, got {:?}", other),
    }
}

#[test]
fn test_stale_dataset_handle_after_free() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    bridge.dataset_free(dataset).expect("free");
    match bridge.dataset_num_data(dataset) {
        Err(BridgeError::Core(CoreError::StaleHandle { kind: "dataset", .. })) => {}
        other => panic!("expected StaleHandle, got {:?}", other),
    }
    assert!(bridge.dataset_free(dataset).is_err());

    // The recycled slot hands out a different handle.
    let again = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");
    assert_ne!(again, dataset);
    assert_eq!(again.handle().index(), dataset.handle().index());
}

#[test]
fn test_dataset_from_file_with_reference() {
    let bridge = make_bridge();
    let dir = tempfile::tempdir().expect("tempdir");

    let train_path = dir.path().join("train.csv");
    let mut train = std::fs::File::create(&train_path).expect("create train file");
    writeln!(train, "1,0.5,1.5,2.5").expect("write");
    writeln!(train, "0,0.1,1.1,2.1").expect("write");
    writeln!(train, "1,0.7,1.7,2.7").expect("write");
    drop(train);

    let valid_path = dir.path().join("valid.tsv");
    std::fs::write(&valid_path, "0\t1\t2\t3\n1\t4\t5\t6\n").expect("write valid file");

    let train = bridge
        .dataset_from_file(&train_path.to_string_lossy(), "", None)
        .expect("train dataset");
    assert_eq!(bridge.dataset_num_data(train).expect("num_data"), 3);
    assert_eq!(bridge.dataset_num_feature(train).expect("num_feature"), 3);
    let labels = bridge.dataset_get_field(train, Field::Label).expect("labels");
    assert_eq!(labels.as_f32(), Some(&[1.0f32, 0.0, 1.0][..]));

    let valid = bridge
        .dataset_from_file(&valid_path.to_string_lossy(), "", Some(train))
        .expect("valid dataset aligned to train");
    assert_eq!(bridge.dataset_num_data(valid).expect("num_data"), 2);
}

#[test]
fn test_missing_file_reports_engine_error() {
    let bridge = make_bridge();
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.csv");

    let err = bridge
        .dataset_from_file(&missing.to_string_lossy(), "", None)
        .expect_err("missing file");
    assert!(matches!(err, BridgeError::Engine(_)));
    assert_eq!(bridge.live_datasets(), 0);
}

#[test]
fn test_interior_nul_in_path() {
    let bridge = make_bridge();
    match bridge.dataset_from_file("bad\0path", "", None) {
        Err(BridgeError::InvalidString { what: "path" }) => {}
        other => panic!("expected InvalidString, got {:?}", other),
    }
}

#[test]
fn test_subset_keeps_selected_labels() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");
    let labels = [0.0f32, 1.0, 2.0, 3.0];
    bridge
        .dataset_set_field(dataset, Field::Label, FieldSlice::from(&labels[..]))
        .expect("set label");

    let subset = bridge.dataset_subset(dataset, &[3, 1], "").expect("subset");
    assert_eq!(bridge.dataset_num_data(subset).expect("num_data"), 2);
    assert_eq!(bridge.dataset_num_feature(subset).expect("num_feature"), 3);
    let got = bridge.dataset_get_field(subset, Field::Label).expect("labels");
    assert_eq!(got.as_f32(), Some(&[3.0f32, 1.0][..]));

    assert!(bridge.dataset_subset(dataset, &[4], "").is_err());
}

#[test]
fn test_save_binary_writes_file() {
    let bridge = make_bridge();
    let values = dense_4x3();
    let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
    let dataset = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("train.bin");
    bridge
        .dataset_save_binary(dataset, &path.to_string_lossy())
        .expect("save binary");
    assert!(path.exists());
}

#[test]
fn test_drop_frees_engine_objects() {
    let engine = Arc::new(FakeEngine::new());
    {
        let bridge = Bridge::new(engine.clone(), BridgeConfig::default());
        let values = dense_4x3();
        let matrix = DenseMatrix::row_major(&values, 4, 3).expect("4x3 matrix");
        let train = bridge.dataset_from_mat(&matrix, "", None).expect("dataset");
        bridge.dataset_from_mat(&matrix, "", Some(train)).expect("dataset");
        bridge.booster_create(train, "").expect("booster");
        assert_eq!(engine.live_datasets(), 2);
        assert_eq!(engine.live_boosters(), 1);
    }
    assert_eq!(engine.live_datasets(), 0);
    assert_eq!(engine.live_boosters(), 0);
}
