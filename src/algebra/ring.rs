//! Coefficient domain traits
//!
//! A [`Ring`] is anything with exact add/sub/mul/neg, a zero and a one.
//! The blanket implementation picks up `i64`, `num_bigint::BigInt`,
//! `num_rational::BigRational` and friends without further ceremony.
//!
//! [`Field`] additionally requires exact division and is implemented
//! explicitly, never as a blanket: integer types satisfy `Div` but
//! truncate, which would silently break the learner's linear solves.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_rational::{BigRational, Ratio};
use num_traits::{One, Zero};

/// An exact commutative coefficient ring.
///
/// Floating-point types technically satisfy these bounds but must not be
/// used: the engine relies on exact equality for closure detection and
/// linear dependence tests.
pub trait Ring:
    Clone
    + PartialEq
    + Debug
    + Display
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
}

impl<T> Ring for T where
    T: Clone
        + PartialEq
        + Debug
        + Display
        + Zero
        + One
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Neg<Output = T>
{
}

/// A [`Ring`] with exact division by nonzero elements.
///
/// Required wherever a linear system is solved: matrix inversion,
/// minimization and the representation learner.
pub trait Field: Ring + Div<Output = Self> {}

impl Field for BigRational {}
impl Field for Ratio<i64> {}
impl Field for Ratio<i32> {}
