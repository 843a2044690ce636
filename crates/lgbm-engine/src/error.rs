pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load engine library: {0}")]
    LibraryLoad(String),

    #[error("engine library is missing entry point {0}")]
    MissingSymbol(String),

    /// The engine returned a failure status; `message` is its last-error text,
    /// captured immediately after the failing call.
    #[error("{op} failed: {message}")]
    Native { op: &'static str, message: String },

    #[error("{op} reported {reported} values but the output buffer holds {capacity}")]
    OutputOverflow {
        op: &'static str,
        reported: i64,
        capacity: usize,
    },

    #[error("{op} returned unknown element type tag {tag}")]
    UnknownDType { op: &'static str, tag: i32 },
}

impl EngineError {
    pub fn native(op: &'static str, message: impl Into<String>) -> Self {
        EngineError::Native {
            op,
            message: message.into(),
        }
    }
}

/// Structural problems in a caller-supplied matrix, caught before any engine call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("dense matrix of {nrow}x{ncol} needs {expected} values, got {actual}")]
    ShapeMismatch {
        nrow: usize,
        ncol: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{what} of {value} exceeds the engine's 32-bit limit")]
    DimensionTooLarge { what: &'static str, value: usize },

    #[error("{name} must hold at least one offset")]
    EmptyPointer { name: &'static str },

    #[error("{name} must start at 0, starts at {first}")]
    PointerStart { name: &'static str, first: i64 },

    #[error("{name} is not non-decreasing at position {position}: {previous} > {next}")]
    NotMonotone {
        name: &'static str,
        position: usize,
        previous: i64,
        next: i64,
    },

    #[error("{name} ends at {last} but {nelem} values were supplied")]
    PointerEnd {
        name: &'static str,
        last: i64,
        nelem: usize,
    },

    #[error("{indices} indices supplied for {values} values")]
    LengthMismatch { indices: usize, values: usize },

    #[error("{axis} index {index} at position {position} is out of range (limit {bound})")]
    IndexOutOfRange {
        axis: &'static str,
        position: usize,
        index: i32,
        bound: usize,
    },
}
