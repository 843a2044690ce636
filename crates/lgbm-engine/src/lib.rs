//! The native engine seam.
//!
//! [`Engine`] mirrors the engine's C interface one method per entry point,
//! but with typed buffers instead of `void*` + dtype pairs and with the
//! engine's last-error message folded into each call's `Result`.
//! [`NativeEngine`] resolves the real entry points from the shared library at
//! runtime; [`fake::FakeEngine`] (feature `fake`) stands in for it in tests.

pub mod engine;
pub mod error;
pub mod matrix;
pub mod native;
pub mod types;

#[cfg(feature = "fake")]
pub mod fake;

pub use engine::Engine;
pub use error::{EngineError, EngineResult, MatrixError};
pub use matrix::{CscMatrix, CsrMatrix, DenseMatrix, Layout};
pub use native::NativeEngine;
pub use types::{
    DType, FieldData, FieldSlice, FloatData, IndexData, NativeElement, PredictType, RawHandle,
};
