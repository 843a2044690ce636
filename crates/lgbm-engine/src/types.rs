use std::ffi::{c_int, c_void};
use std::fmt;
use std::ptr::NonNull;

/// Element type tag understood by the engine (`C_API_DTYPE_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Float32,
    Float64,
    Int32,
    Int64,
}

impl DType {
    pub const fn as_raw(self) -> c_int {
        match self {
            DType::Float32 => 0,
            DType::Float64 => 1,
            DType::Int32 => 2,
            DType::Int64 => 3,
        }
    }

    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(DType::Float32),
            1 => Some(DType::Float64),
            2 => Some(DType::Int32),
            3 => Some(DType::Int64),
            _ => None,
        }
    }

    pub const fn size(self) -> usize {
        match self {
            DType::Float32 | DType::Int32 => 4,
            DType::Float64 | DType::Int64 => 8,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
        })
    }
}

/// Plain numeric element the engine can read or write through a typed pointer.
pub trait NativeElement: bytemuck::Pod {
    const DTYPE: DType;
}

impl NativeElement for f32 {
    const DTYPE: DType = DType::Float32;
}
impl NativeElement for f64 {
    const DTYPE: DType = DType::Float64;
}
impl NativeElement for i32 {
    const DTYPE: DType = DType::Int32;
}
impl NativeElement for i64 {
    const DTYPE: DType = DType::Int64;
}

/// Prediction output selector (`C_API_PREDICT_*`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PredictType {
    /// Post-transform output (probabilities for classification)
    #[default]
    Normal,
    RawScore,
    /// Index of the leaf reached in every tree
    LeafIndex,
}

impl PredictType {
    pub const fn as_raw(self) -> c_int {
        match self {
            PredictType::Normal => 0,
            PredictType::RawScore => 1,
            PredictType::LeafIndex => 2,
        }
    }

    pub const fn from_raw(raw: c_int) -> Option<Self> {
        match raw {
            0 => Some(PredictType::Normal),
            1 => Some(PredictType::RawScore),
            2 => Some(PredictType::LeafIndex),
            _ => None,
        }
    }
}

/// Engine-owned object address (`DatasetHandle` / `BoosterHandle` in C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonNull<c_void>);

// SAFETY: the address is only ever passed back to the engine, never dereferenced
// on this side. Thread-safety of the object itself is the engine's contract.
unsafe impl Send for RawHandle {}
unsafe impl Sync for RawHandle {}

impl RawHandle {
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Wrap a plain address. Used by engines that hand out tokens rather than pointers.
    pub fn from_addr(addr: usize) -> Option<Self> {
        Self::from_ptr(addr as *mut c_void)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

/// Floating-point matrix values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloatData<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl FloatData<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            FloatData::F32(_) => DType::Float32,
            FloatData::F64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FloatData::F32(v) => v.len(),
            FloatData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ptr(&self) -> *const c_void {
        match self {
            FloatData::F32(v) => v.as_ptr() as *const c_void,
            FloatData::F64(v) => v.as_ptr() as *const c_void,
        }
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        match self {
            FloatData::F32(v) => v.get(i).map(|x| *x as f64),
            FloatData::F64(v) => v.get(i).copied(),
        }
    }
}

impl<'a> From<&'a [f32]> for FloatData<'a> {
    fn from(v: &'a [f32]) -> Self {
        FloatData::F32(v)
    }
}

impl<'a> From<&'a [f64]> for FloatData<'a> {
    fn from(v: &'a [f64]) -> Self {
        FloatData::F64(v)
    }
}

impl<'a> From<&'a Vec<f32>> for FloatData<'a> {
    fn from(v: &'a Vec<f32>) -> Self {
        FloatData::F32(v)
    }
}

impl<'a> From<&'a Vec<f64>> for FloatData<'a> {
    fn from(v: &'a Vec<f64>) -> Self {
        FloatData::F64(v)
    }
}

/// Integer offset arrays (CSR `indptr`, CSC `col_ptr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexData<'a> {
    I32(&'a [i32]),
    I64(&'a [i64]),
}

impl IndexData<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            IndexData::I32(_) => DType::Int32,
            IndexData::I64(_) => DType::Int64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexData::I32(v) => v.len(),
            IndexData::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ptr(&self) -> *const c_void {
        match self {
            IndexData::I32(v) => v.as_ptr() as *const c_void,
            IndexData::I64(v) => v.as_ptr() as *const c_void,
        }
    }

    pub fn get(&self, i: usize) -> Option<i64> {
        match self {
            IndexData::I32(v) => v.get(i).map(|x| *x as i64),
            IndexData::I64(v) => v.get(i).copied(),
        }
    }
}

impl<'a> From<&'a [i32]> for IndexData<'a> {
    fn from(v: &'a [i32]) -> Self {
        IndexData::I32(v)
    }
}

impl<'a> From<&'a [i64]> for IndexData<'a> {
    fn from(v: &'a [i64]) -> Self {
        IndexData::I64(v)
    }
}

impl<'a> From<&'a Vec<i32>> for IndexData<'a> {
    fn from(v: &'a Vec<i32>) -> Self {
        IndexData::I32(v)
    }
}

impl<'a> From<&'a Vec<i64>> for IndexData<'a> {
    fn from(v: &'a Vec<i64>) -> Self {
        IndexData::I64(v)
    }
}

/// Borrowed dataset field values, tagged with their element type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSlice<'a> {
    Float32(&'a [f32]),
    Float64(&'a [f64]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
}

impl FieldSlice<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            FieldSlice::Float32(_) => DType::Float32,
            FieldSlice::Float64(_) => DType::Float64,
            FieldSlice::Int32(_) => DType::Int32,
            FieldSlice::Int64(_) => DType::Int64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldSlice::Float32(v) => v.len(),
            FieldSlice::Float64(v) => v.len(),
            FieldSlice::Int32(v) => v.len(),
            FieldSlice::Int64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ptr(&self) -> *const c_void {
        match self {
            FieldSlice::Float32(v) => v.as_ptr() as *const c_void,
            FieldSlice::Float64(v) => v.as_ptr() as *const c_void,
            FieldSlice::Int32(v) => v.as_ptr() as *const c_void,
            FieldSlice::Int64(v) => v.as_ptr() as *const c_void,
        }
    }

    pub fn to_field_data(&self) -> FieldData {
        match self {
            FieldSlice::Float32(v) => FieldData::Float32(v.to_vec()),
            FieldSlice::Float64(v) => FieldData::Float64(v.to_vec()),
            FieldSlice::Int32(v) => FieldData::Int32(v.to_vec()),
            FieldSlice::Int64(v) => FieldData::Int64(v.to_vec()),
        }
    }
}

impl<'a> From<&'a [f32]> for FieldSlice<'a> {
    fn from(v: &'a [f32]) -> Self {
        FieldSlice::Float32(v)
    }
}

impl<'a> From<&'a [i32]> for FieldSlice<'a> {
    fn from(v: &'a [i32]) -> Self {
        FieldSlice::Int32(v)
    }
}

/// Dataset field values copied out of the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

impl FieldData {
    pub fn empty(dtype: DType) -> Self {
        match dtype {
            DType::Float32 => FieldData::Float32(Vec::new()),
            DType::Float64 => FieldData::Float64(Vec::new()),
            DType::Int32 => FieldData::Int32(Vec::new()),
            DType::Int64 => FieldData::Int64(Vec::new()),
        }
    }

    pub fn dtype(&self) -> DType {
        self.as_slice().dtype()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> FieldSlice<'_> {
        match self {
            FieldData::Float32(v) => FieldSlice::Float32(v),
            FieldData::Float64(v) => FieldSlice::Float64(v),
            FieldData::Int32(v) => FieldSlice::Int32(v),
            FieldData::Int64(v) => FieldSlice::Int64(v),
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            FieldData::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            FieldData::Int32(v) => Some(v),
            _ => None,
        }
    }
}
