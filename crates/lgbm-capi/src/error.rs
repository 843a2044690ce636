use std::ffi::c_int;

use lgbm_bridge::BridgeError;

/// Failures detected at the C boundary, before or after the bridge call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} must not be null")]
    NullPointer(&'static str),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("{what}: unknown or unsupported element type tag {tag}")]
    UnknownDType { what: &'static str, tag: c_int },

    #[error("unknown predict type {0} (expected 0, 1 or 2)")]
    UnknownPredictType(c_int),

    #[error("{what}: negative length {len}")]
    NegativeLength { what: &'static str, len: i64 },

    #[error("{what}: {len} elements exceed the addressable size")]
    TooLarge { what: &'static str, len: usize },

    #[error("internal panic: {0}")]
    Panic(String),

    #[error("{what} is not suitably aligned: {reason}")]
    Misaligned { what: &'static str, reason: String },

    #[error("{what} handle {raw:#x} is not a valid handle")]
    InvalidHandle { what: &'static str, raw: u64 },

    #[error("{what} holds {capacity} values but {needed} are needed")]
    Capacity {
        what: &'static str,
        needed: usize,
        capacity: i64,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl From<lgbm_engine::MatrixError> for ApiError {
    fn from(e: lgbm_engine::MatrixError) -> Self {
        ApiError::Bridge(e.into())
    }
}
