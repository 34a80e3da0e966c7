//! Linear representations of k-regular sequences
//!
//! A [`RegularSequence`] is the value
//! `f(n) = left · mu[d_0] · … · mu[d_{l-1}] · right` where
//! `d_0, …, d_{l-1}` is the least-significant-first base-k digit word
//! of n. The empty word (n = 0) evaluates to `left · right`.
//!
//! Representations are immutable once constructed; every transform
//! allocates a new one. Term evaluation is memoized per index behind a
//! mutex, so sharing a representation across read-only consumers is
//! safe.

mod minimize;

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Mutex;

use tracing::warn;

use crate::algebra::{dot, Matrix, Ring};
use crate::digits::to_digits;
use crate::{Result, SequenceError};

/// How many leading terms [`fmt::Display`] previews.
const PREVIEW_TERMS: u64 = 10;

/// A k-regular sequence given by a linear representation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegularSequence<R> {
    k: u32,
    dim: usize,
    mu: Vec<Matrix<R>>,
    left: Vec<R>,
    right: Vec<R>,
    /// Term cache; never part of the value identity.
    #[cfg_attr(feature = "serde", serde(skip))]
    memo: Mutex<HashMap<u64, R>>,
}

impl<R: Ring> RegularSequence<R> {
    /// Build a representation, checking all shapes.
    ///
    /// `mu` must contain exactly `k` square matrices of one common
    /// positive dimension `d`, and `left`/`right` must have length `d`.
    ///
    /// The healthiness condition `mu[0] · right = right` (leading zero
    /// digits act trivially on the terminal vector) is checked but only
    /// logged when violated, never rejected.
    pub fn new(k: u32, mu: Vec<Matrix<R>>, left: Vec<R>, right: Vec<R>) -> Result<Self> {
        if k < 2 {
            return Err(SequenceError::InvalidBase(k));
        }
        if mu.len() != k as usize {
            return Err(SequenceError::ShapeMismatch(format!(
                "expected {} matrices, got {}",
                k,
                mu.len()
            )));
        }
        let dim = mu[0].rows();
        if dim == 0 {
            return Err(SequenceError::ShapeMismatch(
                "representation dimension must be positive".into(),
            ));
        }
        if mu.iter().any(|m| !m.is_square() || m.rows() != dim) {
            return Err(SequenceError::ShapeMismatch(format!(
                "matrices must all be square of dimension {dim}"
            )));
        }
        if left.len() != dim || right.len() != dim {
            return Err(SequenceError::ShapeMismatch(format!(
                "left/right vectors of lengths {}/{} for dimension {dim}",
                left.len(),
                right.len()
            )));
        }

        let seq = Self::from_parts_unchecked(k, mu, left, right);
        if !seq.zero_digit_consistent() {
            warn!(k, dim, "mu[0] * right != right");
        }
        Ok(seq)
    }

    /// Internal constructor for transform results whose shapes hold by
    /// construction. Derived representations skip the consistency
    /// warning; only user-facing construction logs it.
    pub(crate) fn from_parts_unchecked(
        k: u32,
        mu: Vec<Matrix<R>>,
        left: Vec<R>,
        right: Vec<R>,
    ) -> Self {
        debug_assert!(k >= 2);
        debug_assert_eq!(mu.len(), k as usize);
        debug_assert!(mu.iter().all(|m| m.is_square() && m.rows() == left.len()));
        debug_assert_eq!(left.len(), right.len());
        let dim = left.len();
        Self {
            k,
            dim,
            mu,
            left,
            right,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// The digit base.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// The internal dimension of the representation.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The digit matrices, indexed by digit value.
    pub fn mu(&self) -> &[Matrix<R>] {
        &self.mu
    }

    /// The left row vector.
    pub fn left(&self) -> &[R] {
        &self.left
    }

    /// The right column vector.
    pub fn right(&self) -> &[R] {
        &self.right
    }

    /// Whether `mu[0] · right = right` holds.
    ///
    /// Digit words of multiples of k carry leading zero digits, which
    /// this condition makes invisible to evaluation. Constructions do
    /// not enforce it; callers that rely on it must check.
    pub fn zero_digit_consistent(&self) -> bool {
        col_action(&self.mu[0], &self.right) == self.right
    }

    /// The matrix product `mu[w_0] · mu[w_1] · …` along a digit word.
    ///
    /// The empty word yields the identity.
    pub fn mu_of_word(&self, word: &[u32]) -> Matrix<R> {
        let mut product = Matrix::identity(self.dim);
        for &d in word {
            // shapes are fixed by the constructor, so this cannot fail
            product = match product.mul(&self.mu[d as usize]) {
                Ok(m) => m,
                Err(_) => unreachable!("digit matrices are square of equal dimension"),
            };
        }
        product
    }

    /// The `n`-th term of the sequence. Memoized per index.
    pub fn term(&self, n: u64) -> R {
        if let Ok(memo) = self.memo.lock() {
            if let Some(value) = memo.get(&n) {
                return value.clone();
            }
        }
        let value = dot(&self.left_state(n), &self.right);
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(n, value.clone());
        }
        value
    }

    /// The row vector `left · mu(word(n))`, the evaluation with the
    /// final multiplication by `right` left out.
    pub fn left_state(&self, n: u64) -> Vec<R> {
        let mut state = self.left.clone();
        for &d in &to_digits(n, self.k) {
            state = row_action(&state, &self.mu[d as usize]);
        }
        state
    }

    /// The column vector `mu(word(n)) · right`, the evaluation with the
    /// initial multiplication by `left` left out.
    pub fn right_state(&self, n: u64) -> Vec<R> {
        let mut state = self.right.clone();
        for &d in to_digits(n, self.k).iter().rev() {
            state = col_action(&self.mu[d as usize], &state);
        }
        state
    }

    /// A restartable, lazily evaluated iterator over all terms,
    /// starting at n = 0. Each call yields a fresh iterator.
    pub fn terms(&self) -> Terms<'_, R> {
        Terms { seq: self, n: 0 }
    }

    /// Pointwise sum with another sequence over the same base, realized
    /// by the direct sum of the two representations.
    pub fn sum(&self, other: &Self) -> Result<Self> {
        if self.k != other.k {
            return Err(SequenceError::BaseMismatch(self.k, other.k));
        }
        let d1 = self.dim;
        let d2 = other.dim;
        let mut mu = Vec::with_capacity(self.k as usize);
        for (a, b) in self.mu.iter().zip(&other.mu) {
            let top = a.augment(&Matrix::zero(d1, d2))?;
            let bottom = Matrix::zero(d2, d1).augment(b)?;
            mu.push(top.stack(&bottom)?);
        }
        let mut left = self.left.clone();
        left.extend_from_slice(&other.left);
        let mut right = self.right.clone();
        right.extend_from_slice(&other.right);
        Ok(Self::from_parts_unchecked(self.k, mu, left, right))
    }

    /// The scalar multiple `c · f`, realized on the left vector.
    pub fn scaled(&self, c: &R) -> Self {
        Self::from_parts_unchecked(
            self.k,
            self.mu.clone(),
            crate::algebra::scale_vector(c, &self.left),
            self.right.clone(),
        )
    }
}

impl<R: Ring> Clone for RegularSequence<R> {
    fn clone(&self) -> Self {
        // Clones start with a fresh memo; cached terms are an
        // optimization, not part of the value.
        Self::from_parts_unchecked(
            self.k,
            self.mu.clone(),
            self.left.clone(),
            self.right.clone(),
        )
    }
}

impl<R: Ring> fmt::Debug for RegularSequence<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegularSequence")
            .field("k", &self.k)
            .field("dim", &self.dim)
            .field("mu", &self.mu)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish_non_exhaustive()
    }
}

impl<R: Ring> PartialEq for RegularSequence<R> {
    fn eq(&self, other: &Self) -> bool {
        self.k == other.k
            && self.mu == other.mu
            && self.left == other.left
            && self.right == other.right
    }
}

impl<R: Ring> fmt::Display for RegularSequence<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-regular sequence ", self.k)?;
        for n in 0..PREVIEW_TERMS {
            write!(f, "{}, ", self.term(n))?;
        }
        write!(f, "...")
    }
}

/// Infinite iterator over the terms of a sequence. See
/// [`RegularSequence::terms`].
pub struct Terms<'a, R> {
    seq: &'a RegularSequence<R>,
    n: u64,
}

impl<R: Ring> fmt::Debug for Terms<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terms").field("n", &self.n).finish_non_exhaustive()
    }
}

impl<R: Ring> Iterator for Terms<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let value = self.seq.term(self.n);
        self.n += 1;
        Some(value)
    }
}

/// The space of k-regular sequences over a fixed coefficient domain.
///
/// Sequences constructed through one space share `(k, R)` and are
/// therefore comparable and combinable with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSpace<R> {
    k: u32,
    coefficients: PhantomData<R>,
}

impl<R: Ring> SequenceSpace<R> {
    /// Create the space of k-regular sequences over `R`. Requires
    /// `k >= 2`.
    pub fn new(k: u32) -> Result<Self> {
        if k < 2 {
            return Err(SequenceError::InvalidBase(k));
        }
        Ok(Self {
            k,
            coefficients: PhantomData,
        })
    }

    /// The digit base of this space.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Construct a sequence from its representation parts. See
    /// [`RegularSequence::new`].
    pub fn sequence(
        &self,
        mu: Vec<Matrix<R>>,
        left: Vec<R>,
        right: Vec<R>,
    ) -> Result<RegularSequence<R>> {
        RegularSequence::new(self.k, mu, left, right)
    }

    /// The constant all-ones sequence, the Hadamard unit of this space.
    pub fn one_hadamard(&self) -> RegularSequence<R> {
        let mu = vec![Matrix::identity(1); self.k as usize];
        RegularSequence::from_parts_unchecked(self.k, mu, vec![R::one()], vec![R::one()])
    }
}

/// `v · m` for a row vector of matching length.
pub(crate) fn row_action<R: Ring>(v: &[R], m: &Matrix<R>) -> Vec<R> {
    debug_assert_eq!(v.len(), m.rows());
    (0..m.cols())
        .map(|j| {
            v.iter()
                .enumerate()
                .fold(R::zero(), |acc, (i, a)| acc + a.clone() * m[(i, j)].clone())
        })
        .collect()
}

/// `m · v` for a column vector of matching length.
pub(crate) fn col_action<R: Ring>(m: &Matrix<R>, v: &[R]) -> Vec<R> {
    debug_assert_eq!(v.len(), m.cols());
    (0..m.rows()).map(|i| dot(m.row(i), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit_sum_sequence() -> RegularSequence<i64> {
        let space = SequenceSpace::new(2).unwrap();
        space
            .sequence(
                vec![
                    Matrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap(),
                    Matrix::from_rows(vec![vec![0, -1], vec![1, 2]]).unwrap(),
                ],
                vec![0, 1],
                vec![1, 0],
            )
            .unwrap()
    }

    #[test]
    fn test_term_values() {
        let s = digit_sum_sequence();
        let first: Vec<i64> = (0..10).map(|n| s.term(n)).collect();
        assert_eq!(first, vec![0, 1, 1, 2, 1, 2, 2, 3, 1, 2]);
        // binary digit sum
        for n in 0..64u64 {
            assert_eq!(s.term(n), n.count_ones() as i64);
        }
    }

    #[test]
    fn test_term_is_memoized_consistently() {
        let s = digit_sum_sequence();
        assert_eq!(s.term(7), 3);
        assert_eq!(s.term(7), 3);
    }

    #[test]
    fn test_terms_iterator_restarts_at_zero() {
        let s = digit_sum_sequence();
        let a: Vec<i64> = s.terms().take(4).collect();
        let b: Vec<i64> = s.terms().take(4).collect();
        assert_eq!(a, b);
        assert_eq!(a, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_left_and_right_states_agree() {
        let s = digit_sum_sequence();
        for n in 0..20 {
            assert_eq!(dot(&s.left_state(n), s.right()), s.term(n));
            assert_eq!(dot(s.left(), &s.right_state(n)), s.term(n));
        }
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let space = SequenceSpace::<i64>::new(2).unwrap();
        // only one matrix for k = 2
        let result = space.sequence(
            vec![Matrix::identity(2)],
            vec![0, 1],
            vec![1, 0],
        );
        assert!(matches!(result, Err(SequenceError::ShapeMismatch(_))));
        // left vector of wrong length
        let result = space.sequence(
            vec![Matrix::identity(2), Matrix::identity(2)],
            vec![0],
            vec![1, 0],
        );
        assert!(matches!(result, Err(SequenceError::ShapeMismatch(_))));
    }

    #[test]
    fn test_rejects_small_base() {
        assert_eq!(
            SequenceSpace::<i64>::new(1).unwrap_err(),
            SequenceError::InvalidBase(1)
        );
    }

    #[test]
    fn test_sum_and_scaled() {
        let s = digit_sum_sequence();
        let doubled = s.sum(&s).unwrap();
        let scaled = s.scaled(&2);
        for n in 0..32 {
            assert_eq!(doubled.term(n), 2 * s.term(n));
            assert_eq!(scaled.term(n), 2 * s.term(n));
        }
    }

    #[test]
    fn test_one_hadamard() {
        let space = SequenceSpace::<i64>::new(3).unwrap();
        let ones = space.one_hadamard();
        assert!(ones.terms().take(20).all(|t| t == 1));
    }

    #[test]
    fn test_display_preview() {
        let s = digit_sum_sequence();
        assert_eq!(
            s.to_string(),
            "2-regular sequence 0, 1, 1, 2, 1, 2, 2, 3, 1, 2, ..."
        );
    }

    #[test]
    fn test_zero_digit_consistency_flag() {
        let s = digit_sum_sequence();
        assert!(s.zero_digit_consistent());
        let space = SequenceSpace::<i64>::new(2).unwrap();
        // mu[0] maps right = (1) to (2): inconsistent but constructible
        let odd = space.sequence(
            vec![
                Matrix::from_rows(vec![vec![2]]).unwrap(),
                Matrix::from_rows(vec![vec![1]]).unwrap(),
            ],
            vec![1],
            vec![1],
        );
        assert!(odd.is_ok());
        assert!(!odd.unwrap().zero_digit_consistent());
    }
}
