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

//! Several equally small but materially different plans for the leading parcel.
//!
//! The leading fixed parcel's minimal tank count is found once; every pair subset of
//! that size (with each center when the count is odd) is then forced through the full
//! planner. Plans that place the parcel are deduplicated by allocation signature and
//! ranked for trim diversity.

use crate::{
    config::{Objective, PlannerConfig},
    diagnostics::moment_difference,
    input::PlanInput,
    schedule::Planner,
    select::{Selector, run_and_span},
    topology::{CenterTank, Pair, Topology},
};
use std::{cmp::Reverse, collections::HashSet};
use tank_alloc_core::iter::Combinations;
use tank_alloc_model::prelude::*;
use tracing::{debug, info, instrument};

/// Ordering of surviving alternatives; lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct AlternativeRank {
    slop: Reverse<bool>,
    moment: i64,
    dead_space: i64,
    longest_run: usize,
    span: Reverse<u32>,
}

fn rank(plan: &PlanResult, parcel: &ParcelId, tanks: &[Tank], topology: &Topology<'_>) -> AlternativeRank {
    let pairs = plan
        .diagnostics()
        .trace_for(parcel)
        .map(TraceEntry::pairs)
        .unwrap_or_default();
    let numbered: Vec<u32> = pairs.iter().filter(|i| !i.is_slop()).map(|i| i.value()).collect();
    let (longest_run, span) = run_and_span(&numbered);
    AlternativeRank {
        slop: Reverse(pairs.iter().any(|i| i.is_slop())),
        moment: (moment_difference(plan.allocations(), topology) * 1e6).round() as i64,
        dead_space: plan.dead_space_for(parcel, tanks).quantized(),
        longest_run,
        span: Reverse(span),
    }
}

/// Up to `max_alternatives` plans, best ranked first.
///
/// Without a fixed parcel, or when it cannot be placed at all, the single plan of
/// `config` is returned as is.
#[instrument(level = "info", skip_all, fields(max_alternatives = max_alternatives))]
pub fn enumerate_alternatives(
    tanks: &[Tank],
    parcels: &[Parcel],
    max_alternatives: usize,
    config: &PlannerConfig,
) -> Vec<PlanResult> {
    if max_alternatives == 0 {
        return Vec::new();
    }
    let input = PlanInput::validate(tanks, parcels);
    let topology = Topology::new(input.tanks());
    let fixed = input.fixed_by_priority(topology.reference().end());
    let Some(leader) = fixed.first().copied() else {
        return vec![Planner::new(config.clone()).plan(tanks, parcels)];
    };

    let pairs: Vec<Pair<'_>> = topology
        .order()
        .iter()
        .filter_map(|i| topology.pair(*i).copied())
        .collect();
    let centers: Vec<CenterTank<'_>> = topology.centers().to_vec();
    let floor = (config.band_slots > 0).then_some(config.band_floor);
    let report = Selector::new(&topology, Objective::MinK)
        .with_relaxation(floor)
        .with_enumeration_limit(config.enumeration_limit)
        .select(leader.volume(), &pairs, &centers);
    let Some(minimal) = report.selection() else {
        debug!(parcel = %leader.id(), "leading parcel has no feasible subset");
        return vec![Planner::new(config.clone()).plan(tanks, parcels)];
    };

    let k = minimal.tank_count();
    let center_options: Vec<Option<CenterTank<'_>>> = if k % 2 == 1 {
        centers.iter().copied().map(Some).collect()
    } else {
        vec![None]
    };

    let mut seen = HashSet::new();
    let mut survivors: Vec<(AlternativeRank, PlanResult)> = Vec::new();
    let mut attempts = 0usize;
    'subsets: for center in center_options {
        for combo in Combinations::new(pairs.len(), k / 2) {
            if config.enumeration_limit.is_some_and(|limit| attempts >= limit) {
                debug!(attempts, "enumeration limit reached");
                break 'subsets;
            }
            attempts += 1;

            let forced: Vec<TankId> = combo
                .iter()
                .flat_map(|&i| pairs[i].tanks())
                .chain(center.map(|c| c.tank()))
                .map(|t| t.id().clone())
                .collect();
            let mut forced_config = config.clone();
            forced_config.forced_tanks.insert(leader.id().clone(), forced);
            let plan = Planner::new(forced_config).plan(tanks, parcels);

            let placed = plan
                .diagnostics()
                .trace_for(leader.id())
                .is_some_and(TraceEntry::feasible)
                && !plan
                    .diagnostics()
                    .errors()
                    .iter()
                    .any(|e| e.parcel() == Some(leader.id()));
            if !placed || !seen.insert(plan.signature()) {
                continue;
            }
            survivors.push((rank(&plan, leader.id(), tanks, &topology), plan));
        }
    }

    survivors.sort_by(|a, b| a.0.cmp(&b.0));
    info!(
        parcel = %leader.id(),
        k,
        attempts,
        distinct = survivors.len(),
        "alternatives enumerated"
    );
    survivors
        .into_iter()
        .take(max_alternatives)
        .map(|(_, plan)| plan)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_alloc_core::volume::Volume;

    fn four_pairs() -> Vec<Tank> {
        (1..=4)
            .flat_map(|i| {
                [
                    Tank::new(format!("COT{i}P"), Volume::new(3000.0), 0.5, 0.98, Side::Port),
                    Tank::new(format!("COT{i}S"), Volume::new(3000.0), 0.5, 0.98, Side::Starboard),
                ]
            })
            .collect()
    }

    fn pair_of(plan: &PlanResult, parcel: &str) -> Vec<PairIndex> {
        plan.diagnostics()
            .trace_for(&ParcelId::new(parcel))
            .unwrap()
            .pairs()
            .to_vec()
    }

    #[test]
    fn test_distinct_alternatives_ranked_by_moment() {
        let tanks = four_pairs();
        let parcels = vec![Parcel::fixed("A", "Alpha", Volume::new(5000.0), 0.8, 15.0)];
        let plans = enumerate_alternatives(&tanks, &parcels, 3, &PlannerConfig::default());

        assert_eq!(plans.len(), 3);
        assert_eq!(pair_of(&plans[0], "A"), vec![PairIndex::new(2)]);
        assert_eq!(pair_of(&plans[1], "A"), vec![PairIndex::new(3)]);
        assert_eq!(pair_of(&plans[2], "A"), vec![PairIndex::new(1)]);

        let signatures: HashSet<AllocationSignature> = plans.iter().map(PlanResult::signature).collect();
        assert_eq!(signatures.len(), 3);
        for p in &plans {
            assert!(p.volume_for(&ParcelId::new("A")).approx_eq(Volume::new(5000.0)));
            assert_eq!(p.allocations().len(), 2);
        }
    }

    #[test]
    fn test_every_minimal_subset_is_offered() {
        let tanks = four_pairs();
        let parcels = vec![Parcel::fixed("A", "Alpha", Volume::new(11000.0), 0.8, 15.0)];
        let plans = enumerate_alternatives(&tanks, &parcels, 10, &PlannerConfig::default());
        // Forced subsets bypass the interior-run rule, so all six pair combinations survive.
        assert_eq!(plans.len(), 6);
        assert!(plans.iter().all(|p| p.allocations().len() == 4));
        assert_eq!(pair_of(&plans[0], "A").len(), 2);
    }

    #[test]
    fn test_zero_and_missing_leader() {
        let tanks = four_pairs();
        let parcels = vec![Parcel::fill_remaining("R", "Rest", 0.8, 15.0)];
        assert!(enumerate_alternatives(&tanks, &parcels, 0, &PlannerConfig::default()).is_empty());
        let plans = enumerate_alternatives(&tanks, &parcels, 3, &PlannerConfig::default());
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].allocations().len(), 8);
    }
}
