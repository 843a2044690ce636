//! Validated matrix views handed to the engine.
//!
//! The engine trusts shape arguments blindly and reads past the end of a
//! buffer that is shorter than advertised. Every view here is checked once at
//! construction, so an engine call never sees inconsistent lengths.

use crate::error::MatrixError;
use crate::types::{FloatData, IndexData};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    RowMajor,
    ColMajor,
}

impl Layout {
    pub fn is_row_major(self) -> bool {
        self == Layout::RowMajor
    }
}

/// Dense `nrow x ncol` matrix.
#[derive(Debug, Clone, Copy)]
pub struct DenseMatrix<'a> {
    data: FloatData<'a>,
    nrow: i32,
    ncol: i32,
    layout: Layout,
}

impl<'a> DenseMatrix<'a> {
    pub fn new(
        data: impl Into<FloatData<'a>>,
        nrow: usize,
        ncol: usize,
        layout: Layout,
    ) -> Result<Self, MatrixError> {
        let data = data.into();
        let expected = nrow.checked_mul(ncol).ok_or(MatrixError::DimensionTooLarge {
            what: "nrow * ncol",
            value: usize::MAX,
        })?;
        if data.len() != expected {
            return Err(MatrixError::ShapeMismatch {
                nrow,
                ncol,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            nrow: to_i32("nrow", nrow)?,
            ncol: to_i32("ncol", ncol)?,
            layout,
        })
    }

    pub fn row_major(
        data: impl Into<FloatData<'a>>,
        nrow: usize,
        ncol: usize,
    ) -> Result<Self, MatrixError> {
        Self::new(data, nrow, ncol, Layout::RowMajor)
    }

    pub fn data(&self) -> FloatData<'a> {
        self.data
    }

    pub fn nrow(&self) -> i32 {
        self.nrow
    }

    pub fn ncol(&self) -> i32 {
        self.ncol
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn rows(&self) -> usize {
        self.nrow as usize
    }
}

/// Compressed sparse row matrix.
#[derive(Debug, Clone, Copy)]
pub struct CsrMatrix<'a> {
    indptr: IndexData<'a>,
    indices: &'a [i32],
    data: FloatData<'a>,
    num_col: i64,
}

impl<'a> CsrMatrix<'a> {
    /// `indptr` has one entry per row plus a trailing end offset.
    pub fn new(
        indptr: impl Into<IndexData<'a>>,
        indices: &'a [i32],
        data: impl Into<FloatData<'a>>,
        num_col: usize,
    ) -> Result<Self, MatrixError> {
        let indptr = indptr.into();
        let data = data.into();
        validate_compressed("indptr", "column", indptr, indices, data.len(), num_col)?;
        Ok(Self {
            indptr,
            indices,
            data,
            num_col: num_col as i64,
        })
    }

    pub fn indptr(&self) -> IndexData<'a> {
        self.indptr
    }

    pub fn indices(&self) -> &'a [i32] {
        self.indices
    }

    pub fn data(&self) -> FloatData<'a> {
        self.data
    }

    pub fn nindptr(&self) -> i64 {
        self.indptr.len() as i64
    }

    pub fn nelem(&self) -> i64 {
        self.data.len() as i64
    }

    pub fn num_col(&self) -> i64 {
        self.num_col
    }

    pub fn rows(&self) -> usize {
        self.indptr.len() - 1
    }
}

/// Compressed sparse column matrix.
#[derive(Debug, Clone, Copy)]
pub struct CscMatrix<'a> {
    col_ptr: IndexData<'a>,
    indices: &'a [i32],
    data: FloatData<'a>,
    num_row: i64,
}

impl<'a> CscMatrix<'a> {
    /// `col_ptr` has one entry per column plus a trailing end offset.
    pub fn new(
        col_ptr: impl Into<IndexData<'a>>,
        indices: &'a [i32],
        data: impl Into<FloatData<'a>>,
        num_row: usize,
    ) -> Result<Self, MatrixError> {
        let col_ptr = col_ptr.into();
        let data = data.into();
        validate_compressed("col_ptr", "row", col_ptr, indices, data.len(), num_row)?;
        Ok(Self {
            col_ptr,
            indices,
            data,
            num_row: num_row as i64,
        })
    }

    pub fn col_ptr(&self) -> IndexData<'a> {
        self.col_ptr
    }

    pub fn indices(&self) -> &'a [i32] {
        self.indices
    }

    pub fn data(&self) -> FloatData<'a> {
        self.data
    }

    pub fn ncol_ptr(&self) -> i64 {
        self.col_ptr.len() as i64
    }

    pub fn nelem(&self) -> i64 {
        self.data.len() as i64
    }

    pub fn num_row(&self) -> i64 {
        self.num_row
    }

    pub fn cols(&self) -> usize {
        self.col_ptr.len() - 1
    }
}

fn to_i32(what: &'static str, value: usize) -> Result<i32, MatrixError> {
    i32::try_from(value).map_err(|_| MatrixError::DimensionTooLarge { what, value })
}

fn validate_compressed(
    name: &'static str,
    axis: &'static str,
    offsets: IndexData<'_>,
    indices: &[i32],
    nelem: usize,
    bound: usize,
) -> Result<(), MatrixError> {
    if offsets.is_empty() {
        return Err(MatrixError::EmptyPointer { name });
    }
    if indices.len() != nelem {
        return Err(MatrixError::LengthMismatch {
            indices: indices.len(),
            values: nelem,
        });
    }

    let first = offsets.get(0).unwrap_or_default();
    if first != 0 {
        return Err(MatrixError::PointerStart { name, first });
    }

    let mut previous = first;
    for position in 1..offsets.len() {
        let next = offsets.get(position).unwrap_or_default();
        if next < previous {
            return Err(MatrixError::NotMonotone {
                name,
                position,
                previous,
                next,
            });
        }
        previous = next;
    }
    if previous != nelem as i64 {
        return Err(MatrixError::PointerEnd {
            name,
            last: previous,
            nelem,
        });
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &i)| i < 0 || i as usize >= bound)
    {
        return Err(MatrixError::IndexOutOfRange {
            axis,
            position,
            index,
            bound,
        });
    }
    Ok(())
}
