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

//! # Core Primitives
//!
//! This module provides the closed interval used for fill envelopes: a tank accepts any
//! volume in `[min, max]`, and a selection of tanks accepts any volume in the sum of their
//! envelopes.

use crate::volume::Volume;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A closed interval `[start, end]`.
///
/// Both bounds are inclusive, so that `[start, end]` includes all values `x` such that
/// `start <= x <= end`.
///
/// # Examples
///
/// ```
/// use tank_alloc_core::primitives::ClosedInterval;
/// let interval = ClosedInterval::new(1, 5);
/// assert!(interval.contains(1));
/// assert!(interval.contains(5));
/// assert!(!interval.contains(6));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClosedInterval<T> {
    start: T,
    end: T,
}

impl<T> ClosedInterval<T> {
    /// Creates a new closed interval `[start, end]`.
    ///
    /// The bounds are swapped if `b < a`, so the interval is always well formed.
    ///
    /// # Panics
    ///
    /// If `a` and `b` are not comparable (e.g., if they are NaN), this function will panic.
    ///
    /// # Examples
    ///
    /// ```
    /// use tank_alloc_core::primitives::ClosedInterval;
    ///
    /// let interval = ClosedInterval::new(5, 3);
    /// assert_eq!(interval.start(), 3);
    /// assert_eq!(interval.end(), 5);
    /// ```
    #[inline]
    pub fn new(a: T, b: T) -> Self
    where
        T: PartialOrd + Copy,
    {
        let ord = a
            .partial_cmp(&b)
            .expect("ClosedInterval::new: non-comparable bounds (NaN?)");
        let (start, end) = match ord {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> T
    where
        T: Copy,
    {
        self.start
    }

    #[inline]
    pub fn end(&self) -> T
    where
        T: Copy,
    {
        self.end
    }

    #[inline]
    pub fn contains(&self, x: T) -> bool
    where
        T: PartialOrd,
    {
        x >= self.start && x <= self.end
    }

    /// Returns a copy of the interval with a different lower bound.
    ///
    /// The upper bound is kept; a `start` above it collapses the interval to a point.
    #[inline]
    pub fn with_start(&self, start: T) -> Self
    where
        T: PartialOrd + Copy,
    {
        if start > self.end {
            Self {
                start: self.end,
                end: self.end,
            }
        } else {
            Self {
                start,
                end: self.end,
            }
        }
    }
}

impl ClosedInterval<Volume> {
    /// The empty sum, `[0, 0]`.
    #[inline]
    pub const fn zero() -> Self {
        Self {
            start: Volume::zero(),
            end: Volume::zero(),
        }
    }

    /// Membership test tolerant to [`crate::volume::VOLUME_EPSILON`] on both bounds.
    #[inline]
    pub fn contains_approx(&self, v: Volume) -> bool {
        v.approx_ge(self.start) && v.approx_le(self.end)
    }

    #[inline]
    pub fn width(&self) -> Volume {
        self.end - self.start
    }
}

impl<T: Add<Output = T>> Add for ClosedInterval<T> {
    type Output = ClosedInterval<T>;

    /// Minkowski sum of two intervals.
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        ClosedInterval {
            start: self.start + rhs.start,
            end: self.end + rhs.end,
        }
    }
}

impl Sum for ClosedInterval<Volume> {
    #[inline]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ClosedInterval::zero(), |acc, i| acc + i)
    }
}

impl<T: fmt::Display> fmt::Display for ClosedInterval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_order() {
        let i = ClosedInterval::new(5i32, 3i32);
        assert_eq!(i.start(), 3);
        assert_eq!(i.end(), 5);
    }

    #[test]
    #[should_panic]
    fn test_new_panics_on_nan() {
        let _ = ClosedInterval::new(f64::NAN, 1.0f64);
    }

    #[test]
    fn test_contains_is_inclusive_on_both_ends() {
        let i = ClosedInterval::new(1, 5);
        assert!(i.contains(1));
        assert!(i.contains(5));
        assert!(!i.contains(0));
        assert!(!i.contains(6));
    }

    #[test]
    fn test_sum_of_volume_envelopes() {
        let a = ClosedInterval::new(Volume::new(1500.0), Volume::new(2940.0));
        let b = ClosedInterval::new(Volume::new(1000.0), Volume::new(1960.0));
        let s: ClosedInterval<Volume> = [a, b].into_iter().sum();
        assert_eq!(s.start(), Volume::new(2500.0));
        assert_eq!(s.end(), Volume::new(4900.0));
        assert_eq!(s.width(), Volume::new(2400.0));
    }

    #[test]
    fn test_contains_approx_tolerates_rounding() {
        let i = ClosedInterval::new(Volume::new(1500.0), Volume::new(2940.0));
        assert!(i.contains_approx(Volume::new(2940.0 + 1e-9)));
        assert!(i.contains_approx(Volume::new(1500.0 - 1e-9)));
        assert!(!i.contains_approx(Volume::new(2941.0)));
    }

    #[test]
    fn test_with_start_lowers_floor() {
        let i = ClosedInterval::new(Volume::new(1500.0), Volume::new(2940.0));
        let relaxed = i.with_start(Volume::new(1350.0));
        assert_eq!(relaxed.start(), Volume::new(1350.0));
        assert_eq!(relaxed.end(), Volume::new(2940.0));
        let collapsed = i.with_start(Volume::new(3000.0));
        assert_eq!(collapsed.start(), collapsed.end());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ClosedInterval::new(1, 2)), "[1, 2]");
    }
}
