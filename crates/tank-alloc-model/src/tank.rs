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

use crate::{err::TankDefect, id::TankId};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tank_alloc_core::{primitives::ClosedInterval, volume::Volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Port,
    Starboard,
    Center,
}

impl Side {
    #[inline]
    pub fn is_wing(self) -> bool {
        !matches!(self, Side::Center)
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Port => write!(f, "port"),
            Side::Starboard => write!(f, "starboard"),
            Side::Center => write!(f, "center"),
        }
    }
}

fn default_included() -> bool {
    true
}

/// A cargo tank as supplied by the caller.
///
/// Fill limits are fractions of `capacity`; the usable envelope of the tank is
/// `[capacity * min_fill, capacity * max_fill]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    id: TankId,
    capacity: Volume,
    min_fill: f64,
    max_fill: f64,
    #[serde(default = "default_included")]
    included: bool,
    side: Side,
}

impl Tank {
    #[inline]
    pub fn new(id: impl Into<TankId>, capacity: Volume, min_fill: f64, max_fill: f64, side: Side) -> Self {
        Self {
            id: id.into(),
            capacity,
            min_fill,
            max_fill,
            included: true,
            side,
        }
    }

    #[inline]
    pub fn with_included(mut self, included: bool) -> Self {
        self.included = included;
        self
    }

    #[inline]
    pub fn id(&self) -> &TankId {
        &self.id
    }

    #[inline]
    pub fn capacity(&self) -> Volume {
        self.capacity
    }

    #[inline]
    pub fn min_fill(&self) -> f64 {
        self.min_fill
    }

    #[inline]
    pub fn max_fill(&self) -> f64 {
        self.max_fill
    }

    #[inline]
    pub fn included(&self) -> bool {
        self.included
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn min_volume(&self) -> Volume {
        self.capacity.scale(self.min_fill)
    }

    #[inline]
    pub fn max_volume(&self) -> Volume {
        self.capacity.scale(self.max_fill)
    }

    #[inline]
    pub fn envelope(&self) -> ClosedInterval<Volume> {
        ClosedInterval::new(self.min_volume(), self.max_volume())
    }

    /// The lowest volume the tank may hold when it is the band-relaxed tank of a plan.
    ///
    /// Never above the configured minimum: a floor fraction at or above `min_fill`
    /// leaves the tank unrelaxable.
    #[inline]
    pub fn band_floor(&self, floor_fraction: f64) -> Volume {
        self.capacity.scale(floor_fraction).min(self.min_volume())
    }

    /// How far below its minimum the tank may go when band-relaxed.
    #[inline]
    pub fn relaxation_headroom(&self, floor_fraction: f64) -> Volume {
        self.min_volume() - self.band_floor(floor_fraction)
    }

    pub fn validate(&self) -> Result<(), TankDefect> {
        let cap = self.capacity.value();
        if !cap.is_finite() || cap <= 0.0 {
            return Err(TankDefect::NonPositiveCapacity(cap));
        }
        let in_unit = |f: f64| f.is_finite() && (0.0..=1.0).contains(&f);
        if !in_unit(self.min_fill) || !in_unit(self.max_fill) {
            return Err(TankDefect::FillFractionOutOfRange {
                min_fill: self.min_fill,
                max_fill: self.max_fill,
            });
        }
        if self.min_fill > self.max_fill {
            return Err(TankDefect::MinAboveMax {
                min_fill: self.min_fill,
                max_fill: self.max_fill,
            });
        }
        Ok(())
    }
}

impl Display for Tank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tank({}, {}, capacity: {}, fill: [{:.2}, {:.2}]{})",
            self.id,
            self.side,
            self.capacity,
            self.min_fill,
            self.max_fill,
            if self.included { "" } else { ", excluded" }
        )
    }
}
