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

//! Splitting one parcel's volume across the tanks chosen for it.
//!
//! Every tank starts at its minimum and the rest is poured in equal increments over the
//! tanks that still have room, so the split stays as even as the envelopes allow.

use std::fmt::Display;
use tank_alloc_core::{primitives::ClosedInterval, volume::Volume};

/// One tank taking part in a fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSlot {
    envelope: ClosedInterval<Volume>,
    floor: Volume,
}

impl FillSlot {
    /// `floor` is the lowest volume the tank may hold if it becomes the relaxed tank.
    #[inline]
    pub fn new(envelope: ClosedInterval<Volume>, floor: Volume) -> Self {
        Self {
            envelope,
            floor: floor.min(envelope.start()),
        }
    }

    #[inline]
    pub fn envelope(&self) -> ClosedInterval<Volume> {
        self.envelope
    }

    /// How far the tank may drop below its minimum.
    #[inline]
    pub fn headroom(&self) -> Volume {
        self.envelope.start() - self.floor
    }
}

/// Per-slot volumes of a successful fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FillOutcome {
    volumes: Vec<Volume>,
    relaxed: Option<usize>,
}

impl FillOutcome {
    /// Volumes in the order of the slots passed in.
    #[inline]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// The slot that was filled below its minimum.
    #[inline]
    pub fn relaxed(&self) -> Option<usize> {
        self.relaxed
    }

    /// Consumes the outcome, keeping only the volumes.
    #[inline]
    pub fn into_volumes(self) -> Vec<Volume> {
        self.volumes
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillError {
    NoTanks,
    AboveMaximum { target: Volume, maximum: Volume },
    BelowMinimum { target: Volume, minimum: Volume },
}

impl Display for FillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillError::NoTanks => write!(f, "no tanks to fill"),
            FillError::AboveMaximum { target, maximum } => {
                write!(f, "target {target} exceeds the combined maximum {maximum}")
            }
            FillError::BelowMinimum { target, minimum } => {
                write!(f, "target {target} is below the combined minimum {minimum}")
            }
        }
    }
}

impl std::error::Error for FillError {}

/// Distributes `target` over `slots`.
///
/// With `allow_relaxation`, a target below the combined minimum may be met by loading the
/// one slot with the most headroom down towards its floor.
pub fn water_fill(
    target: Volume,
    slots: &[FillSlot],
    allow_relaxation: bool,
) -> Result<FillOutcome, FillError> {
    if slots.is_empty() {
        return Err(FillError::NoTanks);
    }
    let minimum: Volume = slots.iter().map(|s| s.envelope.start()).sum();
    let maximum: Volume = slots.iter().map(|s| s.envelope.end()).sum();
    if !target.approx_le(maximum) {
        return Err(FillError::AboveMaximum { target, maximum });
    }

    let mut volumes: Vec<Volume> = slots.iter().map(|s| s.envelope.start()).collect();
    let mut relaxed = None;
    if !target.approx_ge(minimum) {
        let below = FillError::BelowMinimum { target, minimum };
        if !allow_relaxation {
            return Err(below);
        }
        let (idx, slot) = slots
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &FillSlot)>, (i, s)| match best {
                Some((_, b)) if b.headroom() >= s.headroom() => best,
                _ => Some((i, s)),
            })
            .ok_or(below)?;
        if !(minimum - slot.headroom()).approx_le(target) {
            return Err(below);
        }
        volumes[idx] = slot.floor;
        relaxed = Some(idx);
    }

    let mut remaining = target - volumes.iter().copied().sum::<Volume>();
    for _ in 0..=slots.len() {
        if !remaining.is_positive() {
            break;
        }
        let open: Vec<usize> = (0..slots.len())
            .filter(|&i| !volumes[i].approx_ge(slots[i].envelope.end()))
            .collect();
        if open.is_empty() {
            break;
        }
        let step = remaining / open.len() as f64;
        let mut consumed = Volume::zero();
        for i in open {
            let take = step.min(slots[i].envelope.end() - volumes[i]);
            volumes[i] += take;
            consumed += take;
        }
        if !consumed.is_positive() {
            break;
        }
        remaining -= consumed;
    }

    Ok(FillOutcome { volumes, relaxed })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(min: f64, max: f64, floor: f64) -> FillSlot {
        FillSlot::new(
            ClosedInterval::new(Volume::new(min), Volume::new(max)),
            Volume::new(floor),
        )
    }

    fn total(o: &FillOutcome) -> Volume {
        o.volumes().iter().copied().sum()
    }

    #[test]
    fn test_even_split() {
        let slots = [slot(1500.0, 2940.0, 1350.0); 4];
        let o = water_fill(Volume::new(11000.0), &slots, false).unwrap();
        for v in o.volumes() {
            assert!(v.approx_eq(Volume::new(2750.0)));
        }
        assert_eq!(o.relaxed(), None);
    }

    #[test]
    fn test_saturated_tanks_pass_the_rest_on() {
        let slots = [slot(100.0, 200.0, 90.0), slot(100.0, 1000.0, 90.0)];
        let o = water_fill(Volume::new(900.0), &slots, false).unwrap();
        assert!(o.volumes()[0].approx_eq(Volume::new(200.0)));
        assert!(o.volumes()[1].approx_eq(Volume::new(700.0)));
        assert!(total(&o).approx_eq(Volume::new(900.0)));
    }

    #[test]
    fn test_exact_bounds() {
        let slots = [slot(1500.0, 2940.0, 1350.0); 2];
        let o = water_fill(Volume::new(5880.0), &slots, false).unwrap();
        assert!(o.volumes().iter().all(|v| v.approx_eq(Volume::new(2940.0))));
        let o = water_fill(Volume::new(3000.0), &slots, false).unwrap();
        assert!(o.volumes().iter().all(|v| v.approx_eq(Volume::new(1500.0))));
    }

    #[test]
    fn test_above_maximum() {
        let slots = [slot(10.0, 20.0, 9.0)];
        assert!(matches!(
            water_fill(Volume::new(25.0), &slots, true),
            Err(FillError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn test_below_minimum_without_relaxation() {
        let slots = [slot(1500.0, 2940.0, 1350.0); 2];
        assert!(matches!(
            water_fill(Volume::new(2900.0), &slots, false),
            Err(FillError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_relaxes_tank_with_most_headroom() {
        let slots = [slot(1500.0, 2940.0, 1400.0), slot(1500.0, 2940.0, 1350.0)];
        let o = water_fill(Volume::new(2900.0), &slots, true).unwrap();
        assert_eq!(o.relaxed(), Some(1));
        assert!(total(&o).approx_eq(Volume::new(2900.0)));
        assert!(o.volumes()[1].value() < 1500.0);
        assert!(o.volumes()[1].value() >= 1350.0 - 1e-9);
    }

    #[test]
    fn test_relaxation_that_cannot_reach_target() {
        let slots = [slot(1500.0, 2940.0, 1350.0); 2];
        assert!(matches!(
            water_fill(Volume::new(2700.0), &slots, true),
            Err(FillError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_no_slots() {
        assert_eq!(water_fill(Volume::new(1.0), &[], true), Err(FillError::NoTanks));
    }
}
