//! # Exact k-Regular Sequence Engine
//!
//! A sequence f(n) is *k-regular* when its values can be written as
//! `left · mu[d_0] · mu[d_1] · … · right`, where `d_0, d_1, …` are the
//! base-k digits of n (least significant first) and the `mu[d]` are
//! square matrices over an exact coefficient domain.
//!
//! This crate implements:
//!
//! 1. **Linear representations**: the (k, matrices, left, right) data
//!    model with memoized evaluation and lazy iteration
//! 2. **Index transforms**: subsequences along arithmetic progressions
//!    via a digit-closure construction, forward/backward differences,
//!    and partial sums
//! 3. **Learning**: reconstruction of a representation for a black-box
//!    sequence from finitely many samples, discovering the internal
//!    dimension through exact linear algebra
//!
//! ## Usage Example
//!
//! ```
//! use regulus::{Matrix, SequenceSpace};
//!
//! // The binary sum-of-digits sequence 0, 1, 1, 2, 1, 2, 2, 3, ...
//! let space = SequenceSpace::<i64>::new(2).unwrap();
//! let s = space.sequence(
//!     vec![
//!         Matrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap(),
//!         Matrix::from_rows(vec![vec![0, -1], vec![1, 2]]).unwrap(),
//!     ],
//!     vec![0, 1],
//!     vec![1, 0],
//! ).unwrap();
//! assert_eq!(s.term(7), 3);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - each implements one layer of the engine
pub mod algebra;   // Exact rings, fields and dense matrices
pub mod digits;    // Base-k digit codec
pub mod learn;     // Guessing representations from samples
pub mod series;    // Linear representations and their evaluation
pub mod transform; // Digit-closure index transforms

// Re-exports for convenience
pub use algebra::{Field, Matrix, Ring};
pub use learn::GuessConfig;
pub use series::{RegularSequence, SequenceSpace};

use thiserror::Error;

/// Errors that can occur while building or transforming sequences
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Digit base below 2
    #[error("k={0} is not a valid base (k >= 2 required)")]
    InvalidBase(u32),

    /// `split_interlace` called with a part count that does not divide the base
    #[error("p={p} is not a divisor of k={k}")]
    NotADivisor {
        /// Requested number of parts
        p: u32,
        /// Digit base being split
        k: u32,
    },

    /// Negative scale factor passed to `subsequence`
    #[error("a={0} is not nonnegative")]
    NegativeScale(i64),

    /// Offset combination for `subsequence_sum` was empty
    #[error("offset combination must not be empty")]
    EmptyOffsets,

    /// Matrix or vector dimensions do not fit together
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Two sequences over different bases were combined
    #[error("cannot combine a {0}-regular with a {1}-regular sequence")]
    BaseMismatch(u32, u32),

    /// A matrix inversion was requested for a singular matrix
    #[error("matrix is singular")]
    Singular,

    /// The learner found no invertible observation matrix below `n_max`
    #[error("no invertible observation matrix among sample indices below {n_max}")]
    SearchExhausted {
        /// Sample bound that was exhausted
        n_max: u64,
    },

    /// The learner admitted a basis function at the depth limit
    #[error("basis function at depth {depth} reached d_max={d_max}")]
    DepthExhausted {
        /// Depth of the offending basis function
        depth: u32,
        /// Configured depth limit
        d_max: u32,
    },
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SequenceError>;
