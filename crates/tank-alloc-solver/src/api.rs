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

//! Named planning entry points. Each is a preset over [`PlannerConfig`].

use crate::{
    alternatives::enumerate_alternatives,
    config::{MinKPolicy, Objective, PlannerConfig},
    schedule::Planner,
};
use tank_alloc_model::prelude::*;

#[inline]
fn run(config: PlannerConfig, tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    Planner::new(config).plan(tanks, parcels)
}

/// Fewest tanks per parcel.
pub fn compute_plan(tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    run(PlannerConfig::default(), tanks, parcels)
}

/// Least locked capacity per parcel over every tank count, leaving the most room behind.
pub fn compute_plan_max_remaining(tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    run(
        PlannerConfig::default().with_objective(Objective::MinLockedGlobal),
        tanks,
        parcels,
    )
}

/// Most tanks per parcel.
pub fn compute_plan_max_k(tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    run(PlannerConfig::default().with_objective(Objective::MaxK), tanks, parcels)
}

/// Fewest tanks, trying a single wing tank before any symmetric subset.
pub fn compute_plan_min_tanks_aggressive(tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    let config = PlannerConfig {
        aggressive_single_wing: true,
        ..PlannerConfig::default()
    };
    run(config, tanks, parcels)
}

/// Fewest tanks, swapping a symmetric subset for one wing tank when that locks less.
pub fn compute_plan_single_wing_alternative(tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    let config = PlannerConfig {
        prefer_single_wing: true,
        ..PlannerConfig::default()
    };
    run(config, tanks, parcels)
}

/// Fewest tanks, holding the slop pair back for the smallest fixed parcel.
pub fn compute_plan_min_keep_slops_small(tanks: &[Tank], parcels: &[Parcel]) -> PlanResult {
    let config = PlannerConfig {
        reserve_slop_for_small: true,
        ..PlannerConfig::default()
    };
    run(config, tanks, parcels)
}

/// Fewest tanks, tuned by a serializable `policy` on top of the defaults.
pub fn compute_plan_min_k_policy(tanks: &[Tank], parcels: &[Parcel], policy: &MinKPolicy) -> PlanResult {
    run(PlannerConfig::from(policy), tanks, parcels)
}

/// Up to `max_alternatives` distinct minimal-tank plans for the leading parcel.
pub fn compute_plan_min_k_alternatives(
    tanks: &[Tank],
    parcels: &[Parcel],
    max_alternatives: usize,
) -> Vec<PlanResult> {
    enumerate_alternatives(tanks, parcels, max_alternatives, &PlannerConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_alloc_core::volume::Volume;

    fn pairs(caps: &[f64]) -> Vec<Tank> {
        caps.iter()
            .zip(1u32..)
            .flat_map(|(&cap, i)| {
                [
                    Tank::new(format!("COT{i}P"), Volume::new(cap), 0.5, 0.98, Side::Port),
                    Tank::new(format!("COT{i}S"), Volume::new(cap), 0.5, 0.98, Side::Starboard),
                ]
            })
            .collect()
    }

    fn locked(plan: &PlanResult, tanks: &[Tank]) -> f64 {
        plan.allocations()
            .iter()
            .filter_map(|a| tanks.iter().find(|t| t.id() == a.tank_id()))
            .map(|t| t.max_volume().value())
            .sum()
    }

    fn has_warning(plan: &PlanResult, f: impl Fn(&PlanWarning) -> bool) -> bool {
        plan.diagnostics().warnings().iter().any(f)
    }

    #[test]
    fn test_max_remaining_never_locks_more() {
        let tanks = pairs(&[1200.0, 1500.0, 3000.0, 2200.0, 1800.0]);
        for v in [2500.0, 4100.0, 6000.0, 9000.0] {
            let parcels = vec![Parcel::fixed("A", "Alpha", Volume::new(v), 0.8, 15.0)];
            let min_k = compute_plan(&tanks, &parcels);
            let max_remaining = compute_plan_max_remaining(&tanks, &parcels);
            assert!(max_remaining.volume_for(&ParcelId::new("A")).approx_eq(Volume::new(v)));
            assert!(locked(&max_remaining, &tanks) <= locked(&min_k, &tanks) + 1e-6);
        }
    }

    #[test]
    fn test_max_k_spreads_parcel() {
        let tanks = pairs(&[3000.0; 4]);
        let parcels = vec![Parcel::fixed("A", "Alpha", Volume::new(9500.0), 0.8, 15.0)];
        assert_eq!(compute_plan(&tanks, &parcels).allocations().len(), 4);
        assert_eq!(compute_plan_max_k(&tanks, &parcels).allocations().len(), 6);
    }

    #[test]
    fn test_single_wing_presets() {
        let tanks = pairs(&[2000.0, 3000.0]);
        let parcels = vec![Parcel::fixed("A", "Alpha", Volume::new(2500.0), 0.8, 15.0)];

        let plan = compute_plan(&tanks, &parcels);
        assert_eq!(plan.allocations().len(), 2);
        assert!(plan.allocations_for(&ParcelId::new("A")).all(|a| a.tank_id().as_str().starts_with("COT1")));

        let plan = compute_plan_min_tanks_aggressive(&tanks, &parcels);
        assert_eq!(plan.allocations().len(), 1);
        assert!(plan.volume_for(&ParcelId::new("A")).approx_eq(Volume::new(2500.0)));

        let plan = compute_plan_single_wing_alternative(&tanks, &parcels);
        assert_eq!(plan.allocations().len(), 1);
        assert!(has_warning(&plan, |w| matches!(w, PlanWarning::SingleWing { .. })));
    }

    #[test]
    fn test_keep_slops_small() {
        let mut tanks = pairs(&[1000.0, 1000.0]);
        tanks.push(Tank::new("SLOPP", Volume::new(800.0), 0.5, 0.98, Side::Port));
        tanks.push(Tank::new("SLOPS", Volume::new(800.0), 0.5, 0.98, Side::Starboard));
        let parcels = vec![
            Parcel::fixed("A", "Alpha", Volume::new(1200.0), 0.8, 15.0),
            Parcel::fixed("B", "Bravo", Volume::new(1000.0), 0.8, 15.0),
        ];
        let plan = compute_plan_min_keep_slops_small(&tanks, &parcels);
        assert!(plan.is_feasible());
        assert!(plan
            .allocations_for(&ParcelId::new("A"))
            .all(|a| !a.tank_id().as_str().starts_with("SLOP")));
        assert!(!has_warning(&plan, |w| matches!(w, PlanWarning::SlopReleased { .. })));
    }

    #[test]
    fn test_policy_without_band_slots() {
        let tanks = pairs(&[3000.0; 3]);
        let parcels = vec![Parcel::fixed("A", "Alpha", Volume::new(2900.0), 0.8, 15.0)];

        let relaxed = compute_plan_min_k_policy(&tanks, &parcels, &MinKPolicy::default());
        assert!(has_warning(&relaxed, |w| matches!(w, PlanWarning::BandRelaxed { .. })));

        let strict = MinKPolicy {
            band_slots: Some(0),
            ..MinKPolicy::default()
        };
        let plan = compute_plan_min_k_policy(&tanks, &parcels, &strict);
        assert!(!has_warning(&plan, |w| matches!(w, PlanWarning::BandRelaxed { .. })));
        assert_eq!(plan.allocations().len(), 1);
        assert!(plan.volume_for(&ParcelId::new("A")).approx_eq(Volume::new(2900.0)));
    }

    #[test]
    fn test_alternatives_are_distinct() {
        let tanks = pairs(&[3000.0; 5]);
        let parcels = vec![
            Parcel::fixed("A", "Alpha", Volume::new(5500.0), 0.8, 15.0),
            Parcel::fill_remaining("R", "Rest", 0.8, 15.0),
        ];
        let plans = compute_plan_min_k_alternatives(&tanks, &parcels, 4);
        assert_eq!(plans.len(), 4);
        for (i, a) in plans.iter().enumerate() {
            for b in &plans[i + 1..] {
                assert_ne!(a.signature(), b.signature());
            }
        }
    }
}
