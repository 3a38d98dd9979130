#![forbid(unsafe_code)]

//! Fractional shares of a split's extent.
//!
//! A [`Proportion`] is a child's share of its parent split along the split
//! axis. Siblings always sum to [`Proportion::FULL`] within [`EPSILON`]
//! after a structural mutation completes.
//!
//! # Pixel conversion
//!
//! [`Proportion::portion`] multiplies by an integer extent and rounds
//! half away from zero (`0.5 -> 1`, `2.5 -> 3`). The result saturates into
//! `u32`, so a negative or NaN proportion allots zero pixels. Placement uses
//! [`Proportion::overdraws`] to refuse such a share instead of silently
//! giving its deficit to the siblings.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Tolerance for comparing proportions.
pub const EPSILON: f64 = 0.0001;

/// A node's share of its parent's extent along the split axis.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proportion(f64);

impl Proportion {
    /// The whole extent.
    pub const FULL: Self = Self(1.0);

    /// No extent at all.
    pub const ZERO: Self = Self(0.0);

    /// Wrap a raw value without validation.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Even share of one among `count` siblings (`1 / count`).
    ///
    /// `count == 0` yields [`Proportion::FULL`].
    #[inline]
    #[must_use]
    pub fn even(count: usize) -> Self {
        if count == 0 {
            return Self::FULL;
        }
        Self(1.0 / count as f64)
    }

    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Pixels allotted out of `extent`, rounded half away from zero.
    #[inline]
    #[must_use]
    pub fn portion(self, extent: u32) -> u32 {
        // Float-to-int `as` saturates and maps NaN to 0.
        (f64::from(extent) * self.0).round() as u32
    }

    /// True iff the share rounds to a negative pixel count out of `extent`.
    ///
    /// Float noise around zero (`-1e-17`) rounds to zero and does not count.
    #[inline]
    #[must_use]
    pub fn overdraws(self, extent: u32) -> bool {
        (f64::from(extent) * self.0).round() < 0.0
    }

    /// True iff `|self - other| < EPSILON`.
    #[inline]
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.0 - other.0).abs() < EPSILON
    }

    /// True iff the value is finite and within `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn is_unit(self) -> bool {
        self.0.is_finite() && (0.0..=1.0).contains(&self.0)
    }
}

impl From<f64> for Proportion {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Proportion> for f64 {
    fn from(value: Proportion) -> Self {
        value.0
    }
}

impl fmt::Display for Proportion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl Add for Proportion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Proportion {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Proportion {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Proportion {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Proportion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

/// Split a share evenly among `rhs` siblings.
impl Div<usize> for Proportion {
    type Output = Self;

    fn div(self, rhs: usize) -> Self {
        Self(self.0 / rhs as f64)
    }
}

impl Sum for Proportion {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Proportion> for Proportion {
    fn sum<I: Iterator<Item = &'a Proportion>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
