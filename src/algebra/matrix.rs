//! Dense matrices over an exact coefficient ring
//!
//! Row-major storage, shape-checked operations. These matrices are tiny
//! (block constructions of a handful of dimensions), so clarity wins
//! over cache tricks throughout.

use std::fmt;
use std::ops::Index;

use crate::{Result, SequenceError};

use super::ring::{Field, Ring};

/// A dense `rows × cols` matrix over the ring `R`.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix<R> {
    rows: usize,
    cols: usize,
    data: Vec<R>,
}

impl<R: Ring> Matrix<R> {
    /// Build a matrix from its rows. All rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<R>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(SequenceError::ShapeMismatch(
                "matrix rows have unequal lengths".into(),
            ));
        }
        Ok(Self {
            rows: height,
            cols: width,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// The `rows × cols` zero matrix.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![R::zero(); rows * cols],
        }
    }

    /// The `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.data[i * n + i] = R::one();
        }
        m
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The `i`-th row as a slice.
    pub fn row(&self, i: usize) -> &[R] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// All rows, cloned into owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<R>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    fn entry_mut(&mut self, i: usize, j: usize) -> &mut R {
        &mut self.data[i * self.cols + j]
    }

    fn shape_check(&self, other: &Self, what: &str) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(SequenceError::ShapeMismatch(format!(
                "{what} of {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }

    /// Entrywise sum.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.shape_check(other, "sum")?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a.clone() + b.clone())
                .collect(),
        })
    }

    /// Entrywise negation.
    pub fn neg(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|a| -a.clone()).collect(),
        }
    }

    /// Scalar multiple.
    pub fn scaled(&self, c: &R) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|a| c.clone() * a.clone()).collect(),
        }
    }

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(SequenceError::ShapeMismatch(format!(
                "product of {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Self::zero(self.rows, other.cols);
        for i in 0..self.rows {
            for l in 0..self.cols {
                let a = &self.data[i * self.cols + l];
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    let b = &other.data[l * other.cols + j];
                    let cur = out.entry_mut(i, j);
                    *cur = cur.clone() + a.clone() * b.clone();
                }
            }
        }
        Ok(out)
    }

    /// Row vector times matrix: `v · self`.
    pub fn row_times(&self, v: &[R]) -> Result<Vec<R>> {
        if v.len() != self.rows {
            return Err(SequenceError::ShapeMismatch(format!(
                "row vector of length {} times {}x{}",
                v.len(),
                self.rows,
                self.cols
            )));
        }
        let mut out = vec![R::zero(); self.cols];
        for (i, a) in v.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, slot) in out.iter_mut().enumerate() {
                *slot = slot.clone() + a.clone() * self.data[i * self.cols + j].clone();
            }
        }
        Ok(out)
    }

    /// Matrix times column vector: `self · v`.
    pub fn times_col(&self, v: &[R]) -> Result<Vec<R>> {
        if v.len() != self.cols {
            return Err(SequenceError::ShapeMismatch(format!(
                "{}x{} times column vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        Ok((0..self.rows).map(|i| dot(self.row(i), v)).collect())
    }

    /// Stack `bottom` below `self` (column counts must agree).
    pub fn stack(&self, bottom: &Self) -> Result<Self> {
        if self.cols != bottom.cols {
            return Err(SequenceError::ShapeMismatch(format!(
                "stacking {}x{} on {}x{}",
                self.rows, self.cols, bottom.rows, bottom.cols
            )));
        }
        let mut data = self.data.clone();
        data.extend_from_slice(&bottom.data);
        Ok(Self {
            rows: self.rows + bottom.rows,
            cols: self.cols,
            data,
        })
    }

    /// Put `right` to the right of `self` (row counts must agree).
    pub fn augment(&self, right: &Self) -> Result<Self> {
        if self.rows != right.rows {
            return Err(SequenceError::ShapeMismatch(format!(
                "augmenting {}x{} with {}x{}",
                self.rows, self.cols, right.rows, right.cols
            )));
        }
        let mut data = Vec::with_capacity(self.data.len() + right.data.len());
        for i in 0..self.rows {
            data.extend_from_slice(self.row(i));
            data.extend_from_slice(right.row(i));
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols + right.cols,
            data,
        })
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zero(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j].clone();
            }
        }
        out
    }
}

impl<F: Field> Matrix<F> {
    /// Exact inverse via Gauss-Jordan elimination.
    ///
    /// Returns [`SequenceError::Singular`] when no inverse exists.
    pub fn inverse(&self) -> Result<Self> {
        if !self.is_square() {
            return Err(SequenceError::ShapeMismatch(format!(
                "inverse of non-square {}x{}",
                self.rows, self.cols
            )));
        }
        let n = self.rows;
        let mut a = self.clone();
        let mut inv = Self::identity(n);

        for col in 0..n {
            let pivot = (col..n)
                .find(|&r| !a.data[r * n + col].is_zero())
                .ok_or(SequenceError::Singular)?;
            if pivot != col {
                for j in 0..n {
                    a.data.swap(pivot * n + j, col * n + j);
                    inv.data.swap(pivot * n + j, col * n + j);
                }
            }
            let p = a.data[col * n + col].clone();
            for j in 0..n {
                let v = a.data[col * n + j].clone() / p.clone();
                a.data[col * n + j] = v;
                let w = inv.data[col * n + j].clone() / p.clone();
                inv.data[col * n + j] = w;
            }
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a.data[r * n + col].clone();
                if factor.is_zero() {
                    continue;
                }
                for j in 0..n {
                    let s = a.data[col * n + j].clone();
                    a.data[r * n + j] = a.data[r * n + j].clone() - factor.clone() * s;
                    let t = inv.data[col * n + j].clone();
                    inv.data[r * n + j] = inv.data[r * n + j].clone() - factor.clone() * t;
                }
            }
        }
        Ok(inv)
    }
}

impl<R> Index<(usize, usize)> for Matrix<R> {
    type Output = R;

    fn index(&self, (i, j): (usize, usize)) -> &R {
        &self.data[i * self.cols + j]
    }
}

impl<R: Ring> fmt::Debug for Matrix<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}x{} [", self.rows, self.cols)?;
        for i in 0..self.rows {
            write!(f, "  [")?;
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[i * self.cols + j])?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Dot product of two equally long coefficient slices.
pub(crate) fn dot<R: Ring>(a: &[R], b: &[R]) -> R {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(R::zero(), |acc, (x, y)| acc + x.clone() * y.clone())
}

/// Scalar multiple of a coefficient slice.
pub(crate) fn scale_vector<R: Ring>(c: &R, v: &[R]) -> Vec<R> {
    v.iter().map(|x| c.clone() * x.clone()).collect()
}
