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

//! Pairing of validated tanks into symmetric wing pairs, center tanks and leftovers.
//!
//! A wing tank takes part in a pair when its identifier reads `COT<n><side>` (case
//! insensitive) or starts with `SLOP`, and the opposite wing tank with the same index is
//! also present. Every other included wing tank is *unpaired*: it is never part of a
//! symmetric selection but may still take a single-wing placement or a fill-remaining
//! parcel.

use crate::order::middle_out;
use std::collections::{BTreeMap, HashMap};
use tank_alloc_core::{primitives::ClosedInterval, volume::Volume};
use tank_alloc_model::prelude::*;

/// Parses the pair index encoded in a tank identifier.
///
/// Returns `None` for identifiers that follow neither `COT<n><P|S|C>` nor `SLOP*`, and
/// for numbers that would collide with the slop sentinel.
pub fn parse_pair_index(id: &str) -> Option<PairIndex> {
    let upper = id.trim().to_ascii_uppercase();
    if upper.starts_with("SLOP") {
        return Some(PairIndex::SLOP);
    }
    let rest = upper.strip_prefix("COT")?;
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (number, suffix) = rest.split_at(digits);
    if !matches!(suffix, "P" | "S" | "C") {
        return None;
    }
    let n: u32 = number.parse().ok()?;
    (n < PairIndex::SLOP.value()).then_some(PairIndex::new(n))
}

/// A port/starboard pair sharing one index.
#[derive(Debug, Clone, Copy)]
pub struct Pair<'t> {
    index: PairIndex,
    port: &'t Tank,
    starboard: &'t Tank,
}

impl<'t> Pair<'t> {
    #[inline]
    pub fn index(&self) -> PairIndex {
        self.index
    }

    #[inline]
    pub fn port(&self) -> &'t Tank {
        self.port
    }

    #[inline]
    pub fn starboard(&self) -> &'t Tank {
        self.starboard
    }

    #[inline]
    pub fn tanks(&self) -> [&'t Tank; 2] {
        [self.port, self.starboard]
    }

    #[inline]
    pub fn is_slop(&self) -> bool {
        self.index.is_slop()
    }

    #[inline]
    pub fn min_volume(&self) -> Volume {
        self.port.min_volume() + self.starboard.min_volume()
    }

    #[inline]
    pub fn max_volume(&self) -> Volume {
        self.port.max_volume() + self.starboard.max_volume()
    }

    #[inline]
    pub fn envelope(&self) -> ClosedInterval<Volume> {
        self.port.envelope() + self.starboard.envelope()
    }

    pub fn contains(&self, tank: &TankId) -> bool {
        self.port.id() == tank || self.starboard.id() == tank
    }
}

/// A center tank together with the station parsed from its identifier, if any.
#[derive(Debug, Clone, Copy)]
pub struct CenterTank<'t> {
    tank: &'t Tank,
    index: Option<PairIndex>,
}

impl<'t> CenterTank<'t> {
    #[inline]
    pub fn tank(&self) -> &'t Tank {
        self.tank
    }

    #[inline]
    pub fn index(&self) -> Option<PairIndex> {
        self.index
    }
}

/// The layout a planning call works on. Built once per call from the validated tanks
/// and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Topology<'t> {
    pairs: BTreeMap<PairIndex, Pair<'t>>,
    centers: Vec<CenterTank<'t>>,
    unpaired: Vec<&'t Tank>,
    included: Vec<&'t Tank>,
    pair_of: HashMap<TankId, PairIndex>,
    order: Vec<PairIndex>,
    midpoint: f64,
    slop_station: f64,
}

impl<'t> Topology<'t> {
    /// Builds the topology from included, validated tanks.
    pub fn new(tanks: &[&'t Tank]) -> Self {
        let mut included: Vec<&'t Tank> = tanks.iter().copied().filter(|t| t.included()).collect();
        included.sort_by(|a, b| a.id().cmp(b.id()));

        let mut slots: BTreeMap<PairIndex, (Option<&'t Tank>, Option<&'t Tank>)> = BTreeMap::new();
        let mut centers = Vec::new();
        let mut unpaired = Vec::new();

        for &tank in &included {
            let index = parse_pair_index(tank.id().as_str());
            match tank.side() {
                Side::Center => centers.push(CenterTank {
                    tank,
                    index: index.filter(|i| !i.is_slop()),
                }),
                side => {
                    let Some(index) = index else {
                        unpaired.push(tank);
                        continue;
                    };
                    let slot = slots.entry(index).or_default();
                    let place = if side == Side::Port { &mut slot.0 } else { &mut slot.1 };
                    if place.is_some() {
                        unpaired.push(tank);
                    } else {
                        *place = Some(tank);
                    }
                }
            }
        }

        let mut pairs = BTreeMap::new();
        for (index, slot) in slots {
            match slot {
                (Some(port), Some(starboard)) => {
                    pairs.insert(index, Pair { index, port, starboard });
                }
                (Some(t), None) | (None, Some(t)) => unpaired.push(t),
                (None, None) => {}
            }
        }
        unpaired.sort_by(|a, b| a.id().cmp(b.id()));

        let mut pair_of = HashMap::with_capacity(pairs.len() * 2);
        for pair in pairs.values() {
            pair_of.insert(pair.port.id().clone(), pair.index);
            pair_of.insert(pair.starboard.id().clone(), pair.index);
        }

        let numbered: Vec<PairIndex> = pairs.keys().copied().filter(|i| !i.is_slop()).collect();
        let midpoint = median_station(&numbered);
        let slop_station = numbered.last().map_or(1.0, |i| f64::from(i.value()) + 1.0);

        let all: Vec<PairIndex> = pairs.keys().copied().collect();
        let order = middle_out(&all);

        Self {
            pairs,
            centers,
            unpaired,
            included,
            pair_of,
            order,
            midpoint,
            slop_station,
        }
    }

    #[inline]
    pub fn pair(&self, index: PairIndex) -> Option<&Pair<'t>> {
        self.pairs.get(&index)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair<'t>> {
        self.pairs.values()
    }

    #[inline]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn centers(&self) -> &[CenterTank<'t>] {
        &self.centers
    }

    #[inline]
    pub fn unpaired(&self) -> &[&'t Tank] {
        &self.unpaired
    }

    /// Every included tank, sorted by identifier.
    #[inline]
    pub fn included(&self) -> &[&'t Tank] {
        &self.included
    }

    pub fn tank(&self, id: &TankId) -> Option<&'t Tank> {
        self.included.iter().copied().find(|t| t.id() == id)
    }

    #[inline]
    pub fn pair_of(&self, tank: &TankId) -> Option<PairIndex> {
        self.pair_of.get(tank).copied()
    }

    /// Every pair index, slop included as the sternmost, in middle-out order.
    #[inline]
    pub fn order(&self) -> &[PairIndex] {
        &self.order
    }

    /// The longitudinal station separating forward from aft.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        self.midpoint
    }

    #[inline]
    pub fn station(&self, index: PairIndex) -> f64 {
        if index.is_slop() {
            self.slop_station
        } else {
            f64::from(index.value())
        }
    }

    /// The station of any included tank; tanks without one sit on the midpoint.
    pub fn tank_station(&self, tank: &Tank) -> f64 {
        if let Some(index) = self.pair_of(tank.id()) {
            return self.station(index);
        }
        match parse_pair_index(tank.id().as_str()) {
            Some(index) => self.station(index),
            None => self.midpoint,
        }
    }

    #[inline]
    pub fn center_station(&self, center: &CenterTank<'_>) -> f64 {
        center.index.map_or(self.midpoint, |i| self.station(i))
    }

    /// `[smallest min volume, largest max volume]` over the included tanks.
    pub fn reference(&self) -> ClosedInterval<Volume> {
        let mut it = self.included.iter();
        let Some(first) = it.next() else {
            return ClosedInterval::zero();
        };
        let (lo, hi) = it.fold((first.min_volume(), first.max_volume()), |(lo, hi), t| {
            (lo.min(t.min_volume()), hi.max(t.max_volume()))
        });
        ClosedInterval::new(lo, hi)
    }

    pub fn total_max(&self) -> Volume {
        self.included.iter().map(|t| t.max_volume()).sum()
    }
}

fn median_station(sorted: &[PairIndex]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let at = |i: usize| f64::from(sorted[i].value());
    if n % 2 == 1 {
        at(n / 2)
    } else {
        (at(n / 2 - 1) + at(n / 2)) / 2.0
    }
}
