//! Safe Rust API over the gradient-boosting engine.
//!
//! A [`Bridge`] owns an [`Engine`](lgbm_engine::Engine) and hands out typed,
//! generation-checked handles for the datasets and boosters it creates.
//! Every call returns a [`BridgeResult`]; there is no global error state.

mod booster;
mod bridge;
mod dataset;
pub mod error;
pub mod handles;
mod predict;

pub use bridge::Bridge;
pub use error::{BridgeError, BridgeResult};
pub use handles::{BoosterHandle, DatasetHandle, Field, LoadedBooster};

pub use lgbm_core::{BridgeConfig, Parameters};
pub use lgbm_engine::{
    CscMatrix, CsrMatrix, DType, DenseMatrix, FieldData, FieldSlice, FloatData, IndexData, Layout,
    PredictType,
};
