use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Square scalar field over an N×N periodic lattice, stored row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    n: usize,
    data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field side length must be positive")]
    EmptyField,
    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{len} values do not form a square field")]
    NotSquare { len: usize },
}

impl Field {
    pub fn zeros(n: usize) -> Self {
        Self::constant(n, 0.0)
    }

    pub fn constant(n: usize, value: f64) -> Self {
        Self {
            n,
            data: vec![value; n * n],
        }
    }

    /// Build a field from nested rows. Every row must be as long as the row count.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, FieldError> {
        let n = rows.len();
        if n == 0 {
            return Err(FieldError::EmptyField);
        }
        let mut data = Vec::with_capacity(n * n);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(FieldError::RaggedRows {
                    row,
                    expected: n,
                    actual: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self { n, data })
    }

    /// Build a field from a flat row-major buffer whose length is a perfect square.
    pub fn from_vec(data: Vec<f64>) -> Result<Self, FieldError> {
        let len = data.len();
        if len == 0 {
            return Err(FieldError::EmptyField);
        }
        let n = (len as f64).sqrt().round() as usize;
        if n * n != len {
            return Err(FieldError::NotSquare { len });
        }
        Ok(Self { n, data })
    }

    /// Build a field by evaluating `f(row, col)` at every cell.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.n
    }

    /// (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.n + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    pub fn try_get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.n && col < self.n).then(|| self.get(row, col))
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// First (row, col) holding a NaN or infinite value, scanning row-major.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|idx| (idx / self.n, idx % self.n))
    }
}

/// Lookup tables for periodic neighbours along one axis of length N.
#[derive(Clone, Debug)]
pub(crate) struct Wrap {
    pub prev: Vec<usize>,
    pub next: Vec<usize>,
}

impl Wrap {
    pub fn new(n: usize) -> Self {
        Self {
            prev: (0..n).map(|i| (i + n - 1) % n).collect(),
            next: (0..n).map(|i| (i + 1) % n).collect(),
        }
    }
}
