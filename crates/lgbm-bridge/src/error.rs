use lgbm_core::CoreError;
use lgbm_engine::{DType, EngineError, MatrixError};

use crate::handles::{BoosterHandle, DatasetHandle, Field};

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid matrix: {0}")]
    InvalidMatrix(#[from] MatrixError),

    #[error("{what} contains an interior NUL byte")]
    InvalidString { what: &'static str },

    #[error("unknown dataset field '{0}' (expected label, weight, group or group_id)")]
    UnknownField(String),

    #[error("field {field} takes {expected} values, got {actual}")]
    FieldType {
        field: Field,
        expected: DType,
        actual: DType,
    },

    #[error("{what} holds {actual} values, expected {expected}")]
    BufferSize {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what} size overflows: {factors}")]
    SizeOverflow { what: &'static str, factors: String },

    #[error("data_idx {data_idx} is out of range for {partitions} data partition(s)")]
    PartitionOutOfRange { data_idx: i32, partitions: usize },

    #[error("{0} has no training data")]
    NoTrainingData(BoosterHandle),

    #[error("{dataset} is still attached to {boosters} booster(s)")]
    DatasetInUse { dataset: DatasetHandle, boosters: u32 },
}
