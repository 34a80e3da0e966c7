//! Dimension reduction for linear representations
//!
//! Over a field, a representation can be cut down to the smallest
//! equivalent dimension by two passes: restrict to the row space
//! reachable from `left` under the digit matrices, then (on the
//! transposed representation) to the column space reaching `right`.

use num_traits::Zero;

use crate::algebra::{dot, Field, Matrix};
use crate::Result;

use super::{row_action, RegularSequence};

impl<F: Field> RegularSequence<F> {
    /// An equivalent representation of minimal dimension.
    ///
    /// Terms are unchanged; only the internal dimension shrinks. The
    /// zero sequence reduces to a one-dimensional zero representation
    /// (dimensions stay positive).
    pub fn minimized(&self) -> Result<Self> {
        let forward = self.forward_reduced()?;
        let backward = forward.transposed().forward_reduced()?;
        Ok(backward.transposed())
    }

    /// The representation with all digit matrices transposed and the
    /// boundary vectors swapped. Evaluates digit words in reversed
    /// order; applying it twice restores the original.
    pub fn transposed(&self) -> Self {
        let mu = self.mu().iter().map(Matrix::transpose).collect();
        Self::from_parts_unchecked(self.k(), mu, self.right().to_vec(), self.left().to_vec())
    }

    /// Restrict to the span of `{left · mu(w) : w any digit word}`.
    fn forward_reduced(&self) -> Result<Self> {
        let basis = row_space_closure(self.left(), self.mu());
        if basis.is_empty() {
            // left is the zero vector, so every term is zero
            let mu = vec![Matrix::zero(1, 1); self.k() as usize];
            return Ok(Self::from_parts_unchecked(
                self.k(),
                mu,
                vec![F::zero()],
                vec![F::zero()],
            ));
        }

        let mut mu = Vec::with_capacity(self.k() as usize);
        for m in self.mu() {
            let rows = basis
                .iter()
                .map(|v| match coordinates_in(&basis, &row_action(v, m)) {
                    Some(coords) => coords,
                    None => unreachable!("row space is closed under the digit matrices"),
                })
                .collect();
            mu.push(Matrix::from_rows(rows)?);
        }

        let left = match coordinates_in(&basis, self.left()) {
            Some(coords) => coords,
            None => unreachable!("left vector spans the first basis row"),
        };
        let right = basis.iter().map(|v| dot(v, self.right())).collect();
        Ok(Self::from_parts_unchecked(self.k(), mu, left, right))
    }
}

/// Basis of the smallest mu-invariant row space containing `seed`.
///
/// Worklist closure: multiply every basis vector by every digit matrix
/// and keep what is linearly independent. Bounded by the ambient
/// dimension, so at most `dim` vectors survive.
fn row_space_closure<F: Field>(seed: &[F], mu: &[Matrix<F>]) -> Vec<Vec<F>> {
    let mut basis: Vec<Vec<F>> = Vec::new();
    if !seed.iter().all(Zero::is_zero) {
        basis.push(seed.to_vec());
    }
    let mut next = 0;
    while next < basis.len() {
        let v = basis[next].clone();
        for m in mu {
            let w = row_action(&v, m);
            if coordinates_in(&basis, &w).is_none() {
                basis.push(w);
            }
        }
        next += 1;
    }
    basis
}

/// Solve `Σ x_i · rows[i] = v` exactly.
///
/// Returns `None` when `v` lies outside the span. `rows` must be
/// linearly independent, which the closure above maintains.
fn coordinates_in<F: Field>(rows: &[Vec<F>], v: &[F]) -> Option<Vec<F>> {
    let b = rows.len();
    let dim = v.len();
    if b == 0 {
        return v.iter().all(Zero::is_zero).then(Vec::new);
    }

    // Augmented system over the transposed basis: dim equations, b
    // unknowns, right-hand side v.
    let mut aug: Vec<Vec<F>> = (0..dim)
        .map(|i| {
            rows.iter()
                .map(|r| r[i].clone())
                .chain([v[i].clone()])
                .collect()
        })
        .collect();

    let mut pivot_cols = Vec::with_capacity(b);
    let mut prow = 0;
    for col in 0..b {
        let Some(r) = (prow..dim).find(|&r| !aug[r][col].is_zero()) else {
            continue;
        };
        aug.swap(prow, r);
        let p = aug[prow][col].clone();
        for j in col..=b {
            aug[prow][j] = aug[prow][j].clone() / p.clone();
        }
        for r2 in 0..dim {
            if r2 == prow || aug[r2][col].is_zero() {
                continue;
            }
            let factor = aug[r2][col].clone();
            for j in col..=b {
                let s = aug[prow][j].clone();
                aug[r2][j] = aug[r2][j].clone() - factor.clone() * s;
            }
        }
        pivot_cols.push(col);
        prow += 1;
    }
    debug_assert_eq!(pivot_cols.len(), b, "basis rows must be independent");

    // Inconsistent leftover means v is outside the span.
    for row in aug.iter().skip(prow) {
        if !row[b].is_zero() {
            return None;
        }
    }

    let mut x = vec![F::zero(); b];
    for (i, &col) in pivot_cols.iter().enumerate() {
        x[col] = aug[i][b].clone();
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SequenceSpace;
    use num_rational::Ratio;

    type Q = Ratio<i64>;

    fn q(n: i64) -> Q {
        Ratio::from_integer(n)
    }

    fn qm(rows: Vec<Vec<i64>>) -> Matrix<Q> {
        Matrix::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(q).collect())
                .collect(),
        )
        .unwrap()
    }

    fn naturals() -> RegularSequence<Q> {
        SequenceSpace::new(2)
            .unwrap()
            .sequence(
                vec![qm(vec![vec![2, 0], vec![2, 1]]), qm(vec![vec![0, 1], vec![-2, 3]])],
                vec![q(1), q(0)],
                vec![q(0), q(1)],
            )
            .unwrap()
    }

    #[test]
    fn test_coordinates_in_span() {
        let rows = vec![vec![q(1), q(0), q(1)], vec![q(0), q(2), q(0)]];
        assert_eq!(
            coordinates_in(&rows, &[q(2), q(3), q(2)]),
            Some(vec![q(2), Ratio::new(3, 2)])
        );
        assert_eq!(coordinates_in(&rows, &[q(0), q(0), q(1)]), None);
    }

    #[test]
    fn test_minimize_shrinks_shifted_sequence() {
        // f(n - 1) built by the kernel closure has dimension 4; the
        // minimal representation has dimension 3.
        let shifted = naturals().subsequence(1, -1).unwrap();
        assert_eq!(shifted.dim(), 4);
        let small = shifted.minimized().unwrap();
        assert_eq!(small.dim(), 3);
        for n in 0..40 {
            assert_eq!(small.term(n), shifted.term(n));
        }
    }

    #[test]
    fn test_minimize_is_idempotent_in_dimension() {
        let s = naturals().partial_sums(false).unwrap();
        let once = s.minimized().unwrap();
        let twice = once.minimized().unwrap();
        assert_eq!(once.dim(), twice.dim());
        for n in 0..32 {
            assert_eq!(once.term(n), s.term(n));
            assert_eq!(twice.term(n), s.term(n));
        }
    }

    #[test]
    fn test_minimize_zero_sequence() {
        let zero = SequenceSpace::<Q>::new(2)
            .unwrap()
            .one_hadamard()
            .scaled(&q(0));
        let reduced = zero.minimized().unwrap();
        assert_eq!(reduced.dim(), 1);
        assert!(reduced.terms().take(8).all(|t| t == q(0)));
    }

    #[test]
    fn test_transposed_involution() {
        let c = naturals();
        assert_eq!(c.transposed().transposed(), c);
    }
}
