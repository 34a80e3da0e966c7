//! Guessing linear representations from samples
//!
//! [`SequenceSpace::guess`] reconstructs a representation for a
//! black-box function `f` from values at indices up to `n_max`. The
//! state is an ordered basis of *lines* (t, r, s), each standing for a
//! sub-function `m ↦ f(k^t·m + r)` admitted as linearly independent
//! and assigned to the matrix of digit s.
//!
//! Dependence tests are exact: an invertible *observation matrix* of
//! basis-function values at strictly increasing sample indices is
//! solved for a coefficient row, which is then verified on the whole
//! sample window, not just the solving indices. A failed verification
//! admits the candidate as a new basis line and the worklist descends
//! one digit deeper; `d_max` bounds that descent.
//!
//! The result reproduces `f` on the sample window. It is a sufficient
//! statistic for that window, not a certified minimal automaton.

use std::collections::HashMap;

use tracing::debug;

use crate::algebra::{dot, Field, Matrix};
use crate::series::{row_action, RegularSequence, SequenceSpace};
use crate::{Result, SequenceError};

/// Bounds for the [`SequenceSpace::guess`] search.
///
/// These are the only guards against unbounded search; `k^d_max` must
/// fit in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessConfig {
    /// Largest sample index the learner may request.
    pub n_max: u64,
    /// Maximum digit-recursion depth for admitted basis functions.
    pub d_max: u32,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            n_max: 100,
            d_max: 10,
        }
    }
}

/// One admitted basis function `m ↦ f(k^t·m + r)`, owned by digit `s`.
#[derive(Debug, Clone, Copy)]
struct Line {
    depth: u32,
    shift: u64,
    digit: u32,
}

impl<F: Field> SequenceSpace<F> {
    /// Guess a representation for `f` with default bounds and no seed.
    /// See [`Self::guess_with`].
    pub fn guess(&self, f: impl FnMut(u64) -> F) -> Result<RegularSequence<F>> {
        self.guess_with(f, &GuessConfig::default(), None)
    }

    /// Reconstruct a linear representation reproducing `f` on
    /// `[0, n_max]`.
    ///
    /// A `seed` representation contributes its own state functions as
    /// already-known basis entries, so structure shared with the seed
    /// is not rediscovered.
    ///
    /// Fails with [`SequenceError::SearchExhausted`] when no invertible
    /// observation matrix exists below `n_max`, and with
    /// [`SequenceError::DepthExhausted`] when a basis function is
    /// admitted at depth `d_max`; both are terminal. Raising the bounds
    /// and retrying is up to the caller.
    ///
    /// The result is not minimized.
    pub fn guess_with(
        &self,
        f: impl FnMut(u64) -> F,
        config: &GuessConfig,
        seed: Option<&RegularSequence<F>>,
    ) -> Result<RegularSequence<F>> {
        let seed_dim = seed.map_or(0, RegularSequence::dim);
        let mu_rows = match seed {
            Some(seq) => seq.mu().iter().map(Matrix::to_rows).collect(),
            None => vec![Vec::new(); self.k() as usize],
        };
        let learner = Learner {
            k: self.k(),
            n_max: config.n_max,
            d_max: config.d_max,
            f,
            samples: HashMap::new(),
            seed,
            seed_dim,
            seed_states: HashMap::new(),
            lines: Vec::new(),
            mu_rows,
            observations: HashMap::new(),
        };
        learner.run(self)
    }
}

/// Working state of one `guess` call; discarded on return.
struct Learner<'a, F: Field, G> {
    k: u32,
    n_max: u64,
    d_max: u32,
    f: G,
    /// Memoized black-box samples.
    samples: HashMap<u64, F>,
    seed: Option<&'a RegularSequence<F>>,
    seed_dim: usize,
    /// Memoized seed state rows `seed.left · mu(word(m))`.
    seed_states: HashMap<u64, Vec<F>>,
    /// Admitted basis lines, in admission order. Doubles as the FIFO
    /// worklist via a cursor.
    lines: Vec<Line>,
    /// Rows of the matrices under construction, one group per digit.
    mu_rows: Vec<Vec<Vec<F>>>,
    /// Per dimension: inverted observation matrix and its sample
    /// indices. Basis lines are only appended, so entries stay valid.
    observations: HashMap<usize, (Matrix<F>, Vec<u64>)>,
}

impl<F: Field, G: FnMut(u64) -> F> Learner<'_, F, G> {
    fn run(mut self, space: &SequenceSpace<F>) -> Result<RegularSequence<F>> {
        // Seed step: when seed functions exist, f itself may already be
        // a combination of them; then no new basis entry is needed.
        let mut left = if self.seed_dim > 0 {
            self.find_dependence(0, 0)?
        } else {
            None
        };
        if left.is_none() {
            self.admit(Line {
                depth: 0,
                shift: 0,
                digit: 0,
            });
            left = Some(self.unit_row());
        }

        let mut cursor = 0;
        while cursor < self.lines.len() {
            let line = self.lines[cursor];
            cursor += 1;
            if line.depth >= self.d_max {
                return Err(SequenceError::DepthExhausted {
                    depth: line.depth,
                    d_max: self.d_max,
                });
            }

            let stride = u64::from(self.k).pow(line.depth);
            for digit in 0..self.k {
                let shift = stride * u64::from(digit) + line.shift;
                let depth = line.depth + 1;
                // Test against the current basis, which may have grown
                // since `line` was admitted.
                let row = match self.find_dependence(depth, shift)? {
                    Some(coeffs) => coeffs,
                    None => {
                        self.admit(Line {
                            depth,
                            shift,
                            digit,
                        });
                        self.unit_row()
                    }
                };
                debug!(
                    digit,
                    stride = stride * u64::from(self.k),
                    shift,
                    "recorded matrix row"
                );
                self.mu_rows[digit as usize].push(row);
            }
        }

        // Assemble, padding every row to the final dimension.
        let dim = self.seed_dim + self.lines.len();
        let mut mu = Vec::with_capacity(self.k as usize);
        for rows in &self.mu_rows {
            debug_assert_eq!(rows.len(), dim);
            let padded = rows
                .iter()
                .map(|row| {
                    let mut row = row.clone();
                    row.resize(dim, F::zero());
                    row
                })
                .collect();
            mu.push(Matrix::from_rows(padded)?);
        }
        let right = self.values(0);
        let mut left = match left {
            Some(row) => row,
            None => unreachable!("left is assigned before the worklist runs"),
        };
        left.resize(dim, F::zero());

        // Constructing through the space re-checks shapes and logs the
        // mu[0]·right consistency warning when applicable.
        space.sequence(mu, left, right)
    }

    /// Admit a new basis line (one more dimension) and enqueue it.
    fn admit(&mut self, line: Line) {
        debug!(
            stride = u64::from(self.k).pow(line.depth),
            shift = line.shift,
            digit = line.digit,
            "including basis function"
        );
        self.lines.push(line);
    }

    /// Unit coefficient row selecting the most recently admitted line.
    fn unit_row(&self) -> Vec<F> {
        let width = self.seed_dim + self.lines.len();
        let mut row = vec![F::zero(); width];
        row[width - 1] = F::one();
        row
    }

    /// Memoized black-box sample.
    fn sample(&mut self, n: u64) -> F {
        if let Some(value) = self.samples.get(&n) {
            return value.clone();
        }
        let value = (self.f)(n);
        self.samples.insert(n, value.clone());
        value
    }

    /// Values of all current basis functions at sample index `m`:
    /// seed states first, then one sample per admitted line.
    fn values(&mut self, m: u64) -> Vec<F> {
        let mut row = match self.seed {
            Some(seq) => self
                .seed_states
                .entry(m)
                .or_insert_with(|| seq.left_state(m))
                .clone(),
            None => Vec::new(),
        };
        for i in 0..self.lines.len() {
            let line = self.lines[i];
            let arg = u64::from(self.k).pow(line.depth) * m + line.shift;
            row.push(self.sample(arg));
        }
        row
    }

    /// Solve for the coefficients of `m ↦ f(k^depth·m + shift)` over
    /// the current basis and verify them on the whole sample window.
    ///
    /// `Ok(None)` means the candidate is independent of the basis.
    fn find_dependence(&mut self, depth: u32, shift: u64) -> Result<Option<Vec<F>>> {
        let dim = self.seed_dim + self.lines.len();
        let (inverse, indices) = self.observation(dim)?;
        let stride = u64::from(self.k).pow(depth);
        let observed: Vec<F> = indices
            .iter()
            .map(|&m| self.sample(stride * m + shift))
            .collect();
        let coeffs = row_action(&observed, &inverse);
        if self.verify(depth, shift, &coeffs) {
            Ok(Some(coeffs))
        } else {
            Ok(None)
        }
    }

    /// Check `f(k^depth·m + shift) = coeffs · values(m)` for every
    /// sample index `m` with `k^depth·m + shift <= n_max`.
    ///
    /// Candidates shifted beyond `n_max` have an empty window and
    /// verify vacuously.
    fn verify(&mut self, depth: u32, shift: u64, coeffs: &[F]) -> bool {
        let stride = u64::from(self.k).pow(depth);
        let bound = (self.n_max as i128 - shift as i128).div_euclid(stride as i128);
        let mut m: u64 = 0;
        while (m as i128) <= bound {
            let expected = self.sample(stride * m + shift);
            let actual = dot(coeffs, &self.values(m));
            if expected != actual {
                return false;
            }
            m += 1;
        }
        true
    }

    /// The inverted observation matrix for the current dimension,
    /// cached per dimension.
    ///
    /// Strictly increasing index tuples below `n_max` are tried in
    /// lexicographic order until the matrix of basis-function values
    /// becomes invertible. Running out of tuples is the terminal
    /// search-exhaustion failure.
    fn observation(&mut self, dim: usize) -> Result<(Matrix<F>, Vec<u64>)> {
        if let Some(found) = self.observations.get(&dim) {
            return Ok(found.clone());
        }
        if dim as u64 > self.n_max {
            return Err(SequenceError::SearchExhausted { n_max: self.n_max });
        }

        let mut indices: Vec<u64> = (0..dim as u64).collect();
        loop {
            let rows: Vec<Vec<F>> = indices.iter().map(|&m| self.values(m)).collect();
            let candidate = Matrix::from_rows(rows)?.transpose();
            match candidate.inverse() {
                Ok(inverse) => {
                    self.observations
                        .insert(dim, (inverse.clone(), indices.clone()));
                    return Ok((inverse, indices));
                }
                Err(SequenceError::Singular) => {
                    if !next_combination(&mut indices, self.n_max) {
                        return Err(SequenceError::SearchExhausted { n_max: self.n_max });
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }
}

/// Advance to the lexicographically next strictly increasing tuple with
/// entries below `limit`. Returns false when the last tuple was reached.
fn next_combination(indices: &mut [u64], limit: u64) -> bool {
    let len = indices.len();
    let mut i = len;
    while i > 0 {
        i -= 1;
        let ceiling = limit - (len - 1 - i) as u64;
        if indices[i] + 1 < ceiling {
            indices[i] += 1;
            for j in i + 1..len {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
