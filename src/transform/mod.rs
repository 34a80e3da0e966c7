//! Index transforms on linear representations
//!
//! [`RegularSequence::subsequence_sum`] builds a representation for
//! `g(n) = Σ_j c_j · f(a·n + b_j)` out of one for `f`. The key identity
//! is the digit recursion
//!
//! ```text
//! a·(k·m + r) + c  =  k·(a·m + d) + f      where (d, f) = divmod(a·r + c, k)
//! ```
//!
//! so the transformed function at digit `r` and shift `c` reduces to the
//! shift-`d` function read through original digit `f`. Closing the set
//! of shifts under this recursion (the *kernel*) yields a block
//! representation with one d-dimensional block per kernel entry. The
//! kernel stays inside `[min(b_j, 0), max(a, a + b_j))`, which bounds
//! the worklist and guarantees termination.
//!
//! Forward/backward differences are subsequence combinations; partial
//! sums use a dedicated doubled-dimension construction on suffix sums
//! of the digit matrices.

use crate::algebra::{Matrix, Ring};
use crate::series::{RegularSequence, SequenceSpace};
use crate::{Result, SequenceError};

impl<R: Ring> RegularSequence<R> {
    /// The subsequence `n ↦ f(a·n + b)`.
    ///
    /// `a` must be nonnegative; terms at negative indices are 0.
    pub fn subsequence(&self, a: i64, b: i64) -> Result<Self> {
        self.subsequence_sum(a, &[(b, R::one())])
    }

    /// The combination `n ↦ Σ_j c_j · f(a·n + b_j)` for offset/weight
    /// pairs `(b_j, c_j)`.
    ///
    /// Duplicate offsets are merged by adding their weights. Fast paths:
    /// `a = 0` yields a constant sequence, and `a = 1` with the single
    /// offset 0 is a scalar multiple of `self` (no new representation is
    /// derived). `a < 0` is rejected.
    pub fn subsequence_sum(&self, a: i64, offsets: &[(i64, R)]) -> Result<Self> {
        if a < 0 {
            return Err(SequenceError::NegativeScale(a));
        }

        let mut combined: Vec<(i64, R)> = Vec::new();
        for (b, c) in offsets {
            match combined.iter_mut().find(|(known, _)| known == b) {
                Some(slot) => slot.1 = slot.1.clone() + c.clone(),
                None => combined.push((*b, c.clone())),
            }
        }
        if combined.is_empty() {
            return Err(SequenceError::EmptyOffsets);
        }

        if a == 0 {
            let mut value = R::zero();
            for (b, c) in &combined {
                if *b >= 0 {
                    value = value + c.clone() * self.term(*b as u64);
                }
            }
            let ones = SequenceSpace::<R>::new(self.k())?.one_hadamard();
            return Ok(ones.scaled(&value));
        }
        if a == 1 && combined.len() == 1 && combined[0].0 == 0 {
            return Ok(self.scaled(&combined[0].1));
        }

        self.kernel_closure(a, &combined)
    }

    /// General case of [`Self::subsequence_sum`]: close the offset set
    /// under the digit recursion and assemble the block representation.
    fn kernel_closure(&self, a: i64, offsets: &[(i64, R)]) -> Result<Self> {
        let k = self.k() as usize;
        let dim = self.dim();

        // The kernel starts with the requested offsets, in their given
        // order, so offset j sits at block j.
        let mut kernel: Vec<i64> = offsets.iter().map(|(b, _)| *b).collect();

        let bound_low = kernel.iter().copied().min().unwrap_or(0).min(0);
        let bound_high = kernel
            .iter()
            .copied()
            .map(|b| a + b)
            .max()
            .unwrap_or(a)
            .max(a);

        // Per digit r, the block rows in discovery order: each kernel
        // entry contributes the rows of mu[f], placed at block column d.
        let mut pending: Vec<Vec<(usize, usize)>> = vec![Vec::new(); k];
        let mut next = 0;
        while next < kernel.len() {
            let c = kernel[next];
            for (r, rows) in pending.iter_mut().enumerate() {
                let x = i128::from(a) * r as i128 + i128::from(c);
                let d = x.div_euclid(k as i128) as i64;
                let f = x.rem_euclid(k as i128) as usize;
                let block = match kernel.iter().position(|&e| e == d) {
                    Some(i) => i,
                    None => {
                        debug_assert!(
                            d >= bound_low && d < bound_high,
                            "kernel offset {d} escapes [{bound_low}, {bound_high})"
                        );
                        kernel.push(d);
                        kernel.len() - 1
                    }
                };
                rows.push((block, f));
            }
            next += 1;
        }

        let ndim = kernel.len() * dim;
        let mut mu = Vec::with_capacity(k);
        for rows in &pending {
            let mut lines = Vec::with_capacity(ndim);
            for &(block, f) in rows {
                for i in 0..dim {
                    let mut line = vec![R::zero(); ndim];
                    for (j, v) in self.mu()[f].row(i).iter().enumerate() {
                        line[block * dim + j] = v.clone();
                    }
                    lines.push(line);
                }
            }
            mu.push(Matrix::from_rows(lines)?);
        }

        let mut left = vec![R::zero(); ndim];
        for (j, (_, c)) in offsets.iter().enumerate() {
            for (i, v) in self.left().iter().enumerate() {
                let slot = &mut left[j * dim + i];
                *slot = slot.clone() + c.clone() * v.clone();
            }
        }

        let mut right = Vec::with_capacity(ndim);
        for &c in &kernel {
            if c >= 0 {
                right.extend(self.right_state(c as u64));
            } else {
                right.extend(std::iter::repeat_with(R::zero).take(dim));
            }
        }

        Ok(Self::from_parts_unchecked(self.k(), mu, left, right))
    }

    /// The backward difference sequence `n ↦ f(n) - f(n-1)`, with
    /// `f(-1)` taken as 0.
    pub fn backward_differences(&self) -> Result<Self> {
        self.subsequence_sum(1, &[(0, R::one()), (-1, -R::one())])
    }

    /// The forward difference sequence `n ↦ f(n+1) - f(n)`.
    pub fn forward_differences(&self) -> Result<Self> {
        self.subsequence_sum(1, &[(1, R::one()), (0, -R::one())])
    }

    /// The partial sum sequence: term `n` is the sum of all terms of
    /// `self` with index `< n`, or `<= n` when `include_n` is set.
    ///
    /// Uses a dedicated doubled-dimension construction instead of the
    /// kernel closure: with `S[r] = Σ_{a >= r} mu[a]` (and `S[k] = 0`),
    /// the top block row tracks the running total while the bottom one
    /// carries the original state transition, the suffix sum `-S[r+1]`
    /// correcting for terms already counted.
    pub fn partial_sums(&self, include_n: bool) -> Result<Self> {
        let k = self.k() as usize;
        let dim = self.dim();

        let mut suffix = vec![Matrix::zero(dim, dim); k + 1];
        for r in (0..k).rev() {
            suffix[r] = suffix[r + 1].add(&self.mu()[r])?;
        }

        let total = suffix[0].stack(&Matrix::zero(dim, dim))?;
        let mut mu = Vec::with_capacity(k);
        for r in 0..k {
            let carry = suffix[r + 1].neg().stack(&self.mu()[r])?;
            mu.push(total.augment(&carry)?);
        }

        let mut left = self.left().to_vec();
        if include_n {
            left.extend(std::iter::repeat_with(R::zero).take(dim));
        } else {
            left.extend(self.left().iter().map(|v| -v.clone()));
        }
        let mut right = self.right().to_vec();
        right.extend_from_slice(self.right());

        Ok(Self::from_parts_unchecked(self.k(), mu, left, right))
    }
}
