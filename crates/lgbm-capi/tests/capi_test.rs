//! Integration test: exported C functions
//!
//! Calls the `LGBMB_*` entry points the way a managed host would, with a
//! FakeEngine-backed bridge installed in place of the native library.
//!
//! Run with: cargo test -p lgbm-capi --test capi_test -- --nocapture

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;
use std::sync::{Arc, Once};

use lgbm_bridge::{Bridge, BridgeConfig};
use lgbm_capi::booster::*;
use lgbm_capi::dataset::*;
use lgbm_capi::predict::*;
use lgbm_capi::{LGBMB_GetLastError, FAILURE, SUCCESS};
use lgbm_engine::fake::FakeEngine;

fn setup() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let bridge = Bridge::new(Arc::new(FakeEngine::new()), BridgeConfig::default());
        if lgbm_capi::install_bridge(bridge).is_err() {
            panic!("bridge already initialized");
        }
    });
}

fn last_error() -> String {
    unsafe { CStr::from_ptr(LGBMB_GetLastError()) }
        .to_string_lossy()
        .into_owned()
}

fn dense_dataset(nrow: i32, ncol: i32) -> u64 {
    let values: Vec<f32> = (0..nrow * ncol).map(|v| v as f32).collect();
    let params = CString::new("max_bin=15").expect("params");
    let mut handle = 0u64;
    let status = unsafe {
        LGBMB_DatasetCreateFromMat(
            values.as_ptr() as *const c_void,
            0,
            nrow,
            ncol,
            1,
            params.as_ptr(),
            0,
            &mut handle,
        )
    };
    assert_eq!(status, SUCCESS, "create failed: {}", last_error());
    assert_ne!(handle, 0);
    handle
}

fn set_labels(dataset: u64, labels: &[f32]) {
    let name = CString::new("label").expect("name");
    let status = unsafe {
        LGBMB_DatasetSetField(
            dataset,
            name.as_ptr(),
            labels.as_ptr() as *const c_void,
            labels.len() as i64,
            0,
        )
    };
    assert_eq!(status, SUCCESS, "set label failed: {}", last_error());
}

fn create_booster(train: u64, params: &str) -> u64 {
    let params = CString::new(params).expect("params");
    let mut booster = 0u64;
    let status = unsafe { LGBMB_BoosterCreate(train, params.as_ptr(), &mut booster) };
    assert_eq!(status, SUCCESS, "booster create failed: {}", last_error());
    booster
}

fn current_iteration(booster: u64) -> i64 {
    let mut iteration = -1i64;
    let status = unsafe { LGBMB_BoosterGetCurrentIteration(booster, &mut iteration) };
    assert_eq!(status, SUCCESS);
    iteration
}

#[test]
fn test_last_error_starts_fine() {
    let initial = std::thread::spawn(last_error).join().expect("thread");
    assert_eq!(initial, "Everything is fine");
}

#[test]
fn test_dense_training_scenario() {
    setup();
    let train = dense_dataset(4, 3);

    let mut num_data = 0i64;
    let mut num_feature = 0i64;
    unsafe {
        assert_eq!(LGBMB_DatasetGetNumData(train, &mut num_data), SUCCESS);
        assert_eq!(LGBMB_DatasetGetNumFeature(train, &mut num_feature), SUCCESS);
    }
    assert_eq!((num_data, num_feature), (4, 3));

    set_labels(train, &[0.0; 4]);
    let booster = create_booster(train, "objective=regression min_data_in_leaf=1");

    let mut is_finished: c_int = -1;
    let status = unsafe { LGBMB_BoosterUpdateOneIter(booster, &mut is_finished) };
    assert_eq!(status, SUCCESS, "update failed: {}", last_error());
    assert_eq!(is_finished, 0);
    assert_eq!(current_iteration(booster), 1);

    unsafe {
        assert_eq!(LGBMB_BoosterFree(booster), SUCCESS);
        assert_eq!(LGBMB_DatasetFree(train), SUCCESS);
    }
}

#[test]
fn test_malformed_csr_sets_last_error() {
    setup();
    let indptr = [0i32, 2, 1, 3];
    let indices = [0i32, 1, 2];
    let values = [1.0f64, 2.0, 3.0];
    let mut handle = 0u64;

    let status = unsafe {
        LGBMB_DatasetCreateFromCSR(
            indptr.as_ptr() as *const c_void,
            2,
            indices.as_ptr(),
            values.as_ptr() as *const c_void,
            1,
            indptr.len() as i64,
            values.len() as i64,
            3,
            ptr::null(),
            0,
            &mut handle,
        )
    };
    let message = last_error();
    println!("Malformed CSR: {}", message);
    assert_eq!(status, FAILURE);
    assert_eq!(handle, 0);
    assert!(!message.is_empty());
    assert!(message.contains("not non-decreasing"));
}

#[test]
fn test_csr_rows_from_pointer_count() {
    setup();
    let indptr = [0i64, 1, 1, 2];
    let indices = [1i32, 0];
    let values = [0.5f32, 1.5];
    let mut handle = 0u64;

    let status = unsafe {
        LGBMB_DatasetCreateFromCSR(
            indptr.as_ptr() as *const c_void,
            3,
            indices.as_ptr(),
            values.as_ptr() as *const c_void,
            0,
            indptr.len() as i64,
            values.len() as i64,
            2,
            ptr::null(),
            0,
            &mut handle,
        )
    };
    assert_eq!(status, SUCCESS, "{}", last_error());
    let mut num_data = 0i64;
    unsafe { LGBMB_DatasetGetNumData(handle, &mut num_data) };
    assert_eq!(num_data, 3);
}

#[test]
fn test_unknown_dtype_tag_fails() {
    setup();
    let values = [0.0f32; 4];
    let mut handle = 0u64;
    let status = unsafe {
        LGBMB_DatasetCreateFromMat(
            values.as_ptr() as *const c_void,
            7,
            2,
            2,
            1,
            ptr::null(),
            0,
            &mut handle,
        )
    };
    assert_eq!(status, FAILURE);
    assert!(last_error().contains("element type tag 7"));
}

#[test]
fn test_field_round_trip_with_query_mode() {
    setup();
    let dataset = dense_dataset(4, 2);
    let labels = [1.0f32, 0.0, 1.0, 0.0];
    set_labels(dataset, &labels);

    let name = CString::new("label").expect("name");
    let mut len = 0i64;
    let mut dtype: c_int = -1;
    let status = unsafe {
        LGBMB_DatasetGetField(dataset, name.as_ptr(), &mut len, ptr::null_mut(), 0, &mut dtype)
    };
    assert_eq!(status, SUCCESS);
    assert_eq!((len, dtype), (4, 0));

    let mut buf = vec![0.0f32; len as usize];
    let status = unsafe {
        LGBMB_DatasetGetField(
            dataset,
            name.as_ptr(),
            &mut len,
            buf.as_mut_ptr() as *mut c_void,
            buf.len() as i64,
            &mut dtype,
        )
    };
    assert_eq!(status, SUCCESS);
    assert_eq!(buf, labels);

    let mut small = [9.0f32; 2];
    let status = unsafe {
        LGBMB_DatasetGetField(
            dataset,
            name.as_ptr(),
            &mut len,
            small.as_mut_ptr() as *mut c_void,
            small.len() as i64,
            &mut dtype,
        )
    };
    assert_eq!(status, FAILURE);
    assert_eq!(small, [9.0, 9.0]);
}

#[test]
fn test_field_type_mismatch_fails() {
    setup();
    let dataset = dense_dataset(2, 2);
    let name = CString::new("label").expect("name");
    let labels = [1i32, 0];
    let status = unsafe {
        LGBMB_DatasetSetField(dataset, name.as_ptr(), labels.as_ptr() as *const c_void, 2, 2)
    };
    assert_eq!(status, FAILURE);
    assert!(last_error().contains("label"));

    let unknown = CString::new("init_score").expect("name");
    let values = [0.0f32; 2];
    let status = unsafe {
        LGBMB_DatasetSetField(dataset, unknown.as_ptr(), values.as_ptr() as *const c_void, 2, 0)
    };
    assert_eq!(status, FAILURE);
    assert!(last_error().contains("init_score"));
}

#[test]
fn test_float_group_fails() {
    setup();
    let dataset = dense_dataset(4, 2);
    let name = CString::new("group").expect("name");
    let sizes = [2.0f32, 2.0];
    let status = unsafe {
        LGBMB_DatasetSetField(dataset, name.as_ptr(), sizes.as_ptr() as *const c_void, 2, 0)
    };
    assert_eq!(status, FAILURE);
    let message = last_error();
    println!("float group: {}", message);
    assert!(message.contains("group"));
}

#[test]
fn test_huge_field_length_fails_without_panicking() {
    setup();
    let dataset = dense_dataset(2, 2);
    let name = CString::new("label").expect("name");
    let labels = [0.0f32; 2];
    let status = unsafe {
        LGBMB_DatasetSetField(
            dataset,
            name.as_ptr(),
            labels.as_ptr() as *const c_void,
            i64::MAX,
            0,
        )
    };
    assert_eq!(status, FAILURE);
    assert!(last_error().contains("exceed the addressable size"));
}

#[test]
fn test_calc_num_predict_overflow_fails() {
    setup();
    let train = dense_dataset(4, 2);
    let booster = create_booster(train, "num_class=4");

    let mut out_len = -1i64;
    let status = unsafe { LGBMB_BoosterCalcNumPredict(booster, i64::MAX / 2, 0, 0, &mut out_len) };
    assert_eq!(status, FAILURE);
    assert_eq!(out_len, -1);
    assert!(last_error().contains("overflows"));

    let status = unsafe { LGBMB_BoosterCalcNumPredict(booster, 5, 0, 0, &mut out_len) };
    assert_eq!(status, SUCCESS);
    assert_eq!(out_len, 20);
}

#[test]
fn test_last_error_is_per_thread() {
    setup();
    let status = unsafe { LGBMB_DatasetFree(0) };
    assert_eq!(status, FAILURE);
    let here = last_error();
    assert!(here.contains("not a valid handle"));

    let there = std::thread::spawn(|| {
        let before = last_error();
        let name = CString::new("label").expect("name");
        let status = unsafe {
            LGBMB_DatasetGetField(
                0,
                name.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                0,
                ptr::null_mut(),
            )
        };
        assert_eq!(status, FAILURE);
        (before, last_error())
    })
    .join()
    .expect("thread");

    assert_eq!(there.0, "Everything is fine");
    assert!(there.1.contains("out_len must not be null"));
    assert_eq!(last_error(), here);
}

#[test]
fn test_stale_handle_after_free() {
    setup();
    let dataset = dense_dataset(2, 2);
    unsafe {
        assert_eq!(LGBMB_DatasetFree(dataset), SUCCESS);
        let mut num_data = 0i64;
        assert_eq!(LGBMB_DatasetGetNumData(dataset, &mut num_data), FAILURE);
    }
    assert!(last_error().contains("was released"));
}

#[test]
fn test_model_file_and_prediction() {
    setup();
    let train = dense_dataset(4, 3);
    let booster = create_booster(train, "objective=multiclass num_class=2 metric=multi_logloss");
    let mut is_finished: c_int = 0;
    for _ in 0..3 {
        assert_eq!(unsafe { LGBMB_BoosterUpdateOneIter(booster, &mut is_finished) }, SUCCESS);
    }
    assert_eq!(unsafe { LGBMB_BoosterRollbackOneIter(booster) }, SUCCESS);
    assert_eq!(current_iteration(booster), 2);

    let dir = tempfile::tempdir().expect("tempdir");
    let model = CString::new(dir.path().join("model.txt").to_string_lossy().into_owned()).expect("path");
    assert_eq!(unsafe { LGBMB_BoosterSaveModel(booster, -1, model.as_ptr()) }, SUCCESS);

    let mut loaded = 0u64;
    let mut num_iterations = 0i64;
    let status = unsafe {
        LGBMB_BoosterCreateFromModelfile(model.as_ptr(), &mut num_iterations, &mut loaded)
    };
    assert_eq!(status, SUCCESS, "{}", last_error());
    assert_eq!(num_iterations, 2);

    let rows = [0.5f64; 6];
    let mut needed = 0i64;
    unsafe {
        assert_eq!(LGBMB_BoosterCalcNumPredict(loaded, 2, 2, 0, &mut needed), SUCCESS);
    }
    assert_eq!(needed, 2 * 2 * 2);

    let mut out = vec![0.0f32; needed as usize];
    let mut out_len = 0i64;
    let status = unsafe {
        LGBMB_BoosterPredictForMat(
            loaded,
            rows.as_ptr() as *const c_void,
            1,
            2,
            3,
            1,
            2,
            0,
            &mut out_len,
            out.as_mut_ptr(),
            out.len() as i64,
        )
    };
    assert_eq!(status, SUCCESS, "{}", last_error());
    assert_eq!(out_len, needed);

    // Normal mode needs only num_class * rows, but one slot is too few.
    let mut tiny = [0.0f32; 1];
    let status = unsafe {
        LGBMB_BoosterPredictForMat(
            loaded,
            rows.as_ptr() as *const c_void,
            1,
            2,
            3,
            1,
            0,
            0,
            &mut out_len,
            tiny.as_mut_ptr(),
            1,
        )
    };
    assert_eq!(status, FAILURE);
    assert!(last_error().contains("4 are needed"));
}

#[test]
fn test_eval_names_into_fixed_buffers() {
    setup();
    let train = dense_dataset(4, 3);
    let booster = create_booster(train, "metric=l2,auc");

    let mut count = 0i64;
    unsafe { assert_eq!(LGBMB_BoosterGetEvalCounts(booster, &mut count), SUCCESS) };
    assert_eq!(count, 2);

    let mut buffers = vec![vec![0u8; 256]; count as usize];
    let mut pointers: Vec<*mut c_char> = buffers.iter_mut().map(|b| b.as_mut_ptr() as *mut c_char).collect();
    let mut out_len = 0i64;
    let status = unsafe {
        LGBMB_BoosterGetEvalNames(booster, &mut out_len, pointers.as_mut_ptr(), count)
    };
    assert_eq!(status, SUCCESS, "{}", last_error());
    assert_eq!(out_len, 2);
    let names: Vec<String> = pointers
        .iter()
        .map(|&p| unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["l2", "auc"]);

    let mut scores = [0.0f32; 2];
    let status = unsafe {
        LGBMB_BoosterGetEval(booster, 0, &mut out_len, scores.as_mut_ptr(), scores.len() as i64)
    };
    assert_eq!(status, SUCCESS);
    assert_eq!(out_len, 2);

    let status = unsafe {
        LGBMB_BoosterGetEval(booster, 3, &mut out_len, scores.as_mut_ptr(), scores.len() as i64)
    };
    assert_eq!(status, FAILURE);
    assert!(last_error().contains("data_idx 3"));
}
