// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Typed Quantities
//!
//! Cargo volumes and weights are carried as thin `f64` newtypes so that a volume can never
//! be added to a weight by accident. All comparisons that decide feasibility go through
//! [`VOLUME_EPSILON`].

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

/// Absolute tolerance, in cubic metres, used for every volume equality and bound check.
pub const VOLUME_EPSILON: f64 = 1e-6;

/// A liquid volume in cubic metres.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl std::fmt::Display for Volume {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} m3", self.0)
    }
}

impl From<f64> for Volume {
    #[inline]
    fn from(v: f64) -> Self {
        Volume(v)
    }
}

impl Volume {
    #[inline]
    pub const fn new(v: f64) -> Self {
        Volume(v)
    }

    #[inline]
    pub const fn zero() -> Self {
        Volume(0.0)
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > VOLUME_EPSILON
    }

    #[inline]
    pub fn abs(self) -> Self {
        Volume(self.0.abs())
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Volume(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Volume(self.0.max(other.0))
    }

    /// Returns `self - other`, floored at zero.
    #[inline]
    pub fn saturating_sub(self, other: Self) -> Self {
        Volume((self.0 - other.0).max(0.0))
    }

    #[inline]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.0 - other.0).abs() <= VOLUME_EPSILON
    }

    /// `self <= other` within [`VOLUME_EPSILON`].
    #[inline]
    pub fn approx_le(self, other: Self) -> bool {
        self.0 <= other.0 + VOLUME_EPSILON
    }

    /// `self >= other` within [`VOLUME_EPSILON`].
    #[inline]
    pub fn approx_ge(self, other: Self) -> bool {
        self.0 + VOLUME_EPSILON >= other.0
    }

    /// Scales the volume by a dimensionless factor, e.g. a fill fraction.
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        Volume(self.0 * factor)
    }

    /// The ratio `self / capacity`, or zero for a non-positive capacity.
    #[inline]
    pub fn fraction_of(self, capacity: Volume) -> f64 {
        if capacity.0 > 0.0 {
            self.0 / capacity.0
        } else {
            0.0
        }
    }

    /// The volume as an integer count of [`VOLUME_EPSILON`] steps.
    ///
    /// Used wherever volumes take part in total orders or hashed signatures.
    #[inline]
    pub fn quantized(self) -> i64 {
        (self.0 / VOLUME_EPSILON).round() as i64
    }

    /// Converts the volume into a weight given a density in t/m3.
    #[inline]
    pub fn weight(self, density: f64) -> Weight {
        Weight::new(self.0 * density)
    }
}

impl Add for Volume {
    type Output = Volume;

    #[inline]
    fn add(self, rhs: Volume) -> Self::Output {
        Volume(self.0 + rhs.0)
    }
}

impl Sub for Volume {
    type Output = Volume;

    #[inline]
    fn sub(self, rhs: Volume) -> Self::Output {
        Volume(self.0 - rhs.0)
    }
}

impl AddAssign for Volume {
    #[inline]
    fn add_assign(&mut self, rhs: Volume) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Volume {
    #[inline]
    fn sub_assign(&mut self, rhs: Volume) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Volume {
    type Output = Volume;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Volume(self.0 * rhs)
    }
}

impl Div<f64> for Volume {
    type Output = Volume;

    #[inline]
    fn div(self, rhs: f64) -> Self::Output {
        Volume(self.0 / rhs)
    }
}

impl Div for Volume {
    type Output = f64;

    #[inline]
    fn div(self, rhs: Volume) -> Self::Output {
        self.0 / rhs.0
    }
}

impl Neg for Volume {
    type Output = Volume;

    #[inline]
    fn neg(self) -> Self::Output {
        Volume(-self.0)
    }
}

impl Zero for Volume {
    #[inline]
    fn zero() -> Self {
        Volume::new(0.0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.abs() <= VOLUME_EPSILON
    }
}

impl Sum for Volume {
    #[inline]
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Self {
        iter.fold(Volume::zero(), |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a Volume> for Volume {
    #[inline]
    fn sum<I: Iterator<Item = &'a Volume>>(iter: I) -> Self {
        iter.fold(Volume::zero(), |acc, v| acc + *v)
    }
}

/// A cargo weight in metric tonnes.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(f64);

impl std::fmt::Display for Weight {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} t", self.0)
    }
}

impl From<f64> for Weight {
    #[inline]
    fn from(v: f64) -> Self {
        Weight(v)
    }
}

impl Weight {
    #[inline]
    pub const fn new(v: f64) -> Self {
        Weight(v)
    }

    #[inline]
    pub const fn zero() -> Self {
        Weight(0.0)
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn abs(self) -> Self {
        Weight(self.0.abs())
    }
}

impl Add for Weight {
    type Output = Weight;

    #[inline]
    fn add(self, rhs: Weight) -> Self::Output {
        Weight(self.0 + rhs.0)
    }
}

impl Sub for Weight {
    type Output = Weight;

    #[inline]
    fn sub(self, rhs: Weight) -> Self::Output {
        Weight(self.0 - rhs.0)
    }
}

impl AddAssign for Weight {
    #[inline]
    fn add_assign(&mut self, rhs: Weight) {
        self.0 += rhs.0;
    }
}

impl Mul<f64> for Weight {
    type Output = Weight;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Weight(self.0 * rhs)
    }
}

impl Zero for Weight {
    #[inline]
    fn zero() -> Self {
        Weight::new(0.0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Sum for Weight {
    #[inline]
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Self {
        iter.fold(Weight::zero(), |acc, w| acc + w)
    }
}
