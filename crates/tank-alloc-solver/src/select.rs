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

//! Subset search: which free pairs, plus at most one center tank, take a parcel.
//!
//! Candidates are enumerated by tank count. For each count the pair combinations are
//! generated lexicographically over the pool, which the caller passes in middle-out
//! order, so the first candidate seen at a given score is also the canonical one.

use crate::{
    config::Objective,
    topology::{CenterTank, Pair, Topology},
};
use std::fmt::Display;
use tank_alloc_core::{iter::Combinations, primitives::ClosedInterval, volume::Volume};
use tank_alloc_model::prelude::*;
use tracing::{instrument, trace};

/// The range of tank counts that can possibly hold a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountBounds {
    k_low: Option<usize>,
    k_high: Option<usize>,
}

impl CountBounds {
    pub fn compute(volume: Volume, pairs: &[Pair<'_>], centers: &[CenterTank<'_>]) -> Self {
        let n = pairs.len();

        let mut maxes: Vec<Volume> = pairs.iter().map(Pair::max_volume).collect();
        maxes.sort_by(|a, b| b.value().total_cmp(&a.value()));
        let mut mins: Vec<Volume> = pairs.iter().map(Pair::min_volume).collect();
        mins.sort_by(|a, b| a.value().total_cmp(&b.value()));
        let max_prefix = prefix_sums(&maxes);
        let min_prefix = prefix_sums(&mins);

        let best_center_max = centers
            .iter()
            .map(|c| c.tank().max_volume())
            .max_by(|a, b| a.value().total_cmp(&b.value()));
        let least_center_min = centers
            .iter()
            .map(|c| c.tank().min_volume())
            .min_by(|a, b| a.value().total_cmp(&b.value()));

        let even_low = (1..=n).find(|&p| max_prefix[p].approx_ge(volume)).map(|p| 2 * p);
        let odd_low = best_center_max.and_then(|c| {
            (0..=n)
                .find(|&p| (c + max_prefix[p]).approx_ge(volume))
                .map(|p| 2 * p + 1)
        });
        let even_high = (1..=n).rev().find(|&p| min_prefix[p].approx_le(volume)).map(|p| 2 * p);
        let odd_high = least_center_min.and_then(|c| {
            (0..=n)
                .rev()
                .find(|&p| (c + min_prefix[p]).approx_le(volume))
                .map(|p| 2 * p + 1)
        });

        Self {
            k_low: even_low.into_iter().chain(odd_low).min(),
            k_high: even_high.into_iter().chain(odd_high).max(),
        }
    }

    #[inline]
    pub fn k_low(&self) -> Option<usize> {
        self.k_low
    }

    #[inline]
    pub fn k_high(&self) -> Option<usize> {
        self.k_high
    }

    /// True when no count can hold the volume within the configured minimums.
    #[inline]
    pub fn is_disjoint(&self) -> bool {
        match (self.k_low, self.k_high) {
            (Some(lo), Some(hi)) => lo > hi,
            _ => true,
        }
    }
}

impl Display for CountBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |k: Option<usize>| k.map_or_else(|| "-".to_string(), |k| k.to_string());
        write!(f, "k in [{}, {}]", show(self.k_low), show(self.k_high))
    }
}

fn prefix_sums(values: &[Volume]) -> Vec<Volume> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut acc = Volume::zero();
    out.push(acc);
    for &v in values {
        acc += v;
        out.push(acc);
    }
    out
}

/// Lexicographic score of a feasible candidate; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionScore {
    imbalance: i64,
    longest_run: usize,
    neg_span: i64,
    neg_slop: i8,
    locked: i64,
}

impl SelectionScore {
    /// Forward/aft difference of locked capacity, quantized.
    #[inline]
    pub fn imbalance(&self) -> i64 {
        self.imbalance
    }

    /// Longest streak of consecutive numbered pairs.
    #[inline]
    pub fn longest_run(&self) -> usize {
        self.longest_run
    }

    #[inline]
    pub fn span(&self) -> u32 {
        self.neg_span.unsigned_abs() as u32
    }

    #[inline]
    pub fn uses_slop(&self) -> bool {
        self.neg_slop < 0
    }
}

/// Longest streak of consecutive values and `max - min` over sorted indices.
pub fn run_and_span(sorted: &[u32]) -> (usize, u32) {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return (0, 0);
    };
    let mut longest = 1;
    let mut current = 1;
    for w in sorted.windows(2) {
        if w[1] == w[0] + 1 {
            current += 1;
            longest = longest.max(current);
        } else if w[1] != w[0] {
            current = 1;
        }
    }
    (longest, last - first)
}

/// The winning subset of one search: its pairs, the optional center and the combined
/// `[min, max]` envelope of the chosen tanks.
#[derive(Debug, Clone)]
pub struct Selection<'t> {
    pairs: Vec<Pair<'t>>,
    center: Option<CenterTank<'t>>,
    envelope: ClosedInterval<Volume>,
    score: SelectionScore,
    needs_relaxation: bool,
}

impl<'t> Selection<'t> {
    /// Chosen pairs in enumeration order.
    #[inline]
    pub fn pairs(&self) -> &[Pair<'t>] {
        &self.pairs
    }

    pub fn pair_indices(&self) -> Vec<PairIndex> {
        let mut v: Vec<PairIndex> = self.pairs.iter().map(Pair::index).collect();
        v.sort();
        v
    }

    #[inline]
    pub fn center(&self) -> Option<&CenterTank<'t>> {
        self.center.as_ref()
    }

    #[inline]
    pub fn tank_count(&self) -> usize {
        self.pairs.len() * 2 + usize::from(self.center.is_some())
    }

    /// Port then starboard tank of each pair, then the center.
    pub fn tanks(&self) -> Vec<&'t Tank> {
        self.pairs
            .iter()
            .flat_map(Pair::tanks)
            .chain(self.center.map(|c| c.tank()))
            .collect()
    }

    #[inline]
    pub fn envelope(&self) -> ClosedInterval<Volume> {
        self.envelope
    }

    /// Sum of the selected tanks' maximum volumes.
    #[inline]
    pub fn locked(&self) -> Volume {
        self.envelope.end()
    }

    /// The score this subset won with.
    #[inline]
    pub fn score(&self) -> SelectionScore {
        self.score
    }

    #[inline]
    pub fn uses_slop(&self) -> bool {
        self.pairs.iter().any(Pair::is_slop)
    }

    /// The volume can only be met by loading one tank below its minimum.
    #[inline]
    pub fn needs_relaxation(&self) -> bool {
        self.needs_relaxation
    }
}

/// Outcome of [`Selector::select`].
///
/// Carries the count bounds and search statistics even when no subset was found, so
/// callers can trace why a parcel could not be placed.
#[derive(Debug, Clone)]
pub struct SelectionReport<'t> {
    bounds: CountBounds,
    selection: Option<Selection<'t>>,
    evaluated: usize,
    truncated: bool,
}

impl<'t> SelectionReport<'t> {
    #[inline]
    pub fn bounds(&self) -> CountBounds {
        self.bounds
    }

    #[inline]
    pub fn selection(&self) -> Option<&Selection<'t>> {
        self.selection.as_ref()
    }

    #[inline]
    pub fn into_selection(self) -> Option<Selection<'t>> {
        self.selection
    }

    /// Number of candidates whose feasibility was tested.
    #[inline]
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// The search stopped at the enumeration limit.
    #[inline]
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

#[derive(Debug, Clone, Copy)]
struct Member {
    min: Volume,
    max: Volume,
    headroom: Volume,
    station: f64,
    index: Option<u32>,
    slop: bool,
}

struct Candidate {
    rank: (i64, i64, SelectionScore),
    combo: Vec<usize>,
    center: Option<usize>,
    envelope: ClosedInterval<Volume>,
    score: SelectionScore,
    needs_relaxation: bool,
}

/// Subset search over free pairs and centers.
///
/// For each tank count from the lower bound upward, every pair combination (with each
/// center for odd counts) whose combined envelope holds the volume is scored; the
/// [`Objective`] decides which count wins. A contiguous block of two or more pairs
/// that touches neither end of the ship is skipped.
///
/// # Examples
///
/// ```
/// use tank_alloc_core::volume::Volume;
/// use tank_alloc_model::prelude::*;
/// use tank_alloc_solver::{Objective, select::Selector, topology::Topology};
///
/// let tanks: Vec<Tank> = (1..=4)
///     .flat_map(|i| {
///         [
///             Tank::new(format!("COT{i}P"), Volume::new(3000.0), 0.5, 0.98, Side::Port),
///             Tank::new(format!("COT{i}S"), Volume::new(3000.0), 0.5, 0.98, Side::Starboard),
///         ]
///     })
///     .collect();
/// let refs: Vec<&Tank> = tanks.iter().collect();
/// let topology = Topology::new(&refs);
/// let pairs: Vec<_> = topology
///     .order()
///     .iter()
///     .filter_map(|i| topology.pair(*i).copied())
///     .collect();
///
/// let report = Selector::new(&topology, Objective::MinK).select(
///     Volume::new(11000.0),
///     &pairs,
///     topology.centers(),
/// );
/// let selection = report.selection().unwrap();
/// assert_eq!(selection.tank_count(), 4);
/// assert_eq!(selection.pair_indices(), vec![PairIndex::new(1), PairIndex::new(4)]);
/// ```
pub struct Selector<'a, 't> {
    topology: &'a Topology<'t>,
    objective: Objective,
    band_floor: Option<f64>,
    enumeration_limit: Option<usize>,
}

impl<'a, 't> Selector<'a, 't> {
    #[inline]
    pub fn new(topology: &'a Topology<'t>, objective: Objective) -> Self {
        Self {
            topology,
            objective,
            band_floor: None,
            enumeration_limit: None,
        }
    }

    /// Allows one tank of the selection to go down to `floor` of its capacity.
    #[inline]
    pub fn with_relaxation(mut self, floor: Option<f64>) -> Self {
        self.band_floor = floor;
        self
    }

    /// Stops the search after `limit` candidates; the best one seen so far is kept.
    #[inline]
    pub fn with_enumeration_limit(mut self, limit: Option<usize>) -> Self {
        self.enumeration_limit = limit;
        self
    }

    fn pair_member(&self, pair: &Pair<'_>) -> Member {
        let headroom = self.band_floor.map_or(Volume::zero(), |f| {
            pair.port()
                .relaxation_headroom(f)
                .max(pair.starboard().relaxation_headroom(f))
        });
        Member {
            min: pair.min_volume(),
            max: pair.max_volume(),
            headroom,
            station: self.topology.station(pair.index()),
            index: (!pair.is_slop()).then(|| pair.index().value()),
            slop: pair.is_slop(),
        }
    }

    fn center_member(&self, center: &CenterTank<'_>) -> Member {
        let tank = center.tank();
        Member {
            min: tank.min_volume(),
            max: tank.max_volume(),
            headroom: self
                .band_floor
                .map_or(Volume::zero(), |f| tank.relaxation_headroom(f)),
            station: self.topology.center_station(center),
            index: None,
            slop: false,
        }
    }

    /// Searches the pools for the best subset holding `volume`.
    ///
    /// `pairs` must be in middle-out order; it is the enumeration order and the final
    /// tie-break.
    #[instrument(level = "trace", skip_all, fields(volume = volume.value(), pairs = pairs.len(), centers = centers.len()))]
    pub fn select(
        &self,
        volume: Volume,
        pairs: &[Pair<'t>],
        centers: &[CenterTank<'t>],
    ) -> SelectionReport<'t> {
        let bounds = CountBounds::compute(volume, pairs, centers);
        let relax = self.band_floor.is_some();
        let mut report = SelectionReport {
            bounds,
            selection: None,
            evaluated: 0,
            truncated: false,
        };

        let Some(k_low) = bounds.k_low else {
            trace!(%bounds, "no subset reaches the volume");
            return report;
        };
        if !relax && bounds.is_disjoint() {
            trace!(%bounds, "minimums exceed the volume at every reachable count");
            return report;
        }

        let pair_members: Vec<Member> = pairs.iter().map(|p| self.pair_member(p)).collect();
        let center_members: Vec<Member> = centers.iter().map(|c| self.center_member(c)).collect();
        let extremes = {
            let mut numbered = pair_members.iter().filter_map(|m| m.index);
            numbered.next().map(|first| {
                numbered.fold((first, first), |(lo, hi), i| (lo.min(i), hi.max(i)))
            })
        };

        let k_max = pairs.len() * 2 + usize::from(!centers.is_empty());
        let k_high = if relax {
            k_max
        } else {
            bounds.k_high.unwrap_or(0).min(k_max)
        };

        let mut best: Option<Candidate> = None;
        'counts: for k in k_low..=k_high {
            for (combo, center) in candidates(k, pairs.len(), centers.len()) {
                if self
                    .enumeration_limit
                    .is_some_and(|limit| report.evaluated >= limit)
                {
                    report.truncated = true;
                    break 'counts;
                }
                report.evaluated += 1;

                let members = combo
                    .iter()
                    .map(|&i| &pair_members[i])
                    .chain(center.map(|c| &center_members[c]));
                let Some((score, envelope, needs_relaxation)) =
                    self.evaluate(volume, members, relax, extremes)
                else {
                    continue;
                };
                let rank = self.rank(k, score);
                if best.as_ref().is_none_or(|b| rank < b.rank) {
                    best = Some(Candidate {
                        rank,
                        combo,
                        center,
                        envelope,
                        score,
                        needs_relaxation,
                    });
                }
            }
            if self.objective == Objective::MinK && best.is_some() {
                break;
            }
        }

        report.selection = best.map(|b| Selection {
            pairs: b.combo.iter().map(|&i| pairs[i]).collect(),
            center: b.center.map(|c| centers[c]),
            envelope: b.envelope,
            score: b.score,
            needs_relaxation: b.needs_relaxation,
        });
        match &report.selection {
            Some(s) => trace!(
                k = s.tank_count(),
                pairs = ?s.pair_indices(),
                evaluated = report.evaluated,
                "subset selected"
            ),
            None => trace!(evaluated = report.evaluated, truncated = report.truncated, "no feasible subset"),
        }
        report
    }

    fn rank(&self, k: usize, score: SelectionScore) -> (i64, i64, SelectionScore) {
        let k = k as i64;
        match self.objective {
            Objective::MinK => (0, 0, score),
            Objective::MaxK => (-k, score.locked, score),
            Objective::MinLockedGlobal => (score.locked, k, score),
        }
    }

    fn evaluate<'m>(
        &self,
        volume: Volume,
        members: impl Iterator<Item = &'m Member>,
        relax: bool,
        extremes: Option<(u32, u32)>,
    ) -> Option<(SelectionScore, ClosedInterval<Volume>, bool)> {
        let mid = self.topology.midpoint();
        let (mut min, mut max, mut headroom) = (Volume::zero(), Volume::zero(), Volume::zero());
        let (mut fwd, mut aft) = (Volume::zero(), Volume::zero());
        let mut numbered = Vec::new();
        let mut slop = false;

        for m in members {
            min += m.min;
            max += m.max;
            headroom = headroom.max(m.headroom);
            if m.station < mid {
                fwd += m.max;
            } else if m.station > mid {
                aft += m.max;
            }
            if let Some(i) = m.index {
                numbered.push(i);
            }
            slop |= m.slop;
        }

        if !volume.approx_le(max) {
            return None;
        }
        let needs_relaxation = !volume.approx_ge(min);
        if needs_relaxation && !(relax && volume.approx_ge(min - headroom)) {
            return None;
        }

        numbered.sort_unstable();
        let (longest_run, span) = run_and_span(&numbered);
        if !slop
            && numbered.len() >= 2
            && longest_run == numbered.len()
            && extremes.is_some_and(|(lo, hi)| numbered[0] > lo && numbered[numbered.len() - 1] < hi)
        {
            return None;
        }

        let score = SelectionScore {
            imbalance: (fwd - aft).abs().quantized(),
            longest_run,
            neg_span: -i64::from(span),
            neg_slop: if slop { -1 } else { 0 },
            locked: max.quantized(),
        };
        Some((score, ClosedInterval::new(min, max), needs_relaxation))
    }
}

/// Candidates with exactly `k` tanks: even counts are pairs only, odd counts try each
/// center alone and then with every pair combination.
fn candidates(
    k: usize,
    pair_count: usize,
    center_count: usize,
) -> impl Iterator<Item = (Vec<usize>, Option<usize>)> {
    let p = k / 2;
    let center_choices: Vec<Option<usize>> = if k % 2 == 1 {
        (0..center_count).map(Some).collect()
    } else if p > 0 {
        vec![None]
    } else {
        Vec::new()
    };
    center_choices
        .into_iter()
        .flat_map(move |c| Combinations::new(pair_count, p).map(move |combo| (combo, c)))
}
