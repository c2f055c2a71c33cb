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

//! Post-planning checks: port/starboard balance, envelope audit and longitudinal moments.

use crate::topology::Topology;
use std::collections::{HashMap, HashSet};
use tank_alloc_core::volume::Weight;
use tank_alloc_model::prelude::*;

/// Loaded weight per side and the resulting lateral status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    pub port: Weight,
    pub starboard: Weight,
    pub center: Weight,
    pub imbalance_pct: f64,
    pub status: BalanceStatus,
}

/// Port and starboard weight compared against `tolerance_pct` of the wing total.
/// Center tanks and unknown tanks count toward `center` only.
pub fn balance(allocations: &[Allocation], topology: &Topology<'_>, tolerance_pct: f64) -> Balance {
    let sides: HashMap<&TankId, Side> = topology
        .included()
        .iter()
        .map(|t| (t.id(), t.side()))
        .collect();

    let (mut port, mut starboard, mut center) = (Weight::zero(), Weight::zero(), Weight::zero());
    for a in allocations {
        match sides.get(a.tank_id()) {
            Some(Side::Port) => port += a.weight(),
            Some(Side::Starboard) => starboard += a.weight(),
            Some(Side::Center) | None => center += a.weight(),
        }
    }

    let wings = port.value() + starboard.value();
    let (imbalance_pct, status) = if wings <= 0.0 {
        (0.0, BalanceStatus::Empty)
    } else {
        let pct = (port.value() - starboard.value()).abs() / wings * 100.0;
        let status = if pct <= tolerance_pct {
            BalanceStatus::Balanced
        } else if port.value() > starboard.value() {
            BalanceStatus::PortHeavy
        } else {
            BalanceStatus::StarboardHeavy
        };
        (pct, status)
    };

    Balance {
        port,
        starboard,
        center,
        imbalance_pct,
        status,
    }
}

/// Allocations outside their tank's `[min, max]`, except in tanks that spent the
/// band relaxation.
pub fn envelope_violations(
    allocations: &[Allocation],
    topology: &Topology<'_>,
    relaxed: &HashSet<TankId>,
) -> Vec<PlanWarning> {
    allocations
        .iter()
        .filter(|a| !relaxed.contains(a.tank_id()))
        .filter_map(|a| {
            let tank = topology.tank(a.tank_id())?;
            let envelope = tank.envelope();
            (!envelope.contains_approx(a.volume())).then(|| PlanWarning::OutsideEnvelope {
                tank: a.tank_id().clone(),
                parcel: a.parcel_id().clone(),
                volume: a.volume(),
                envelope,
            })
        })
        .collect()
}

/// `|forward moment - aft moment|` of the loaded weight about the midpoint station.
pub fn moment_difference(allocations: &[Allocation], topology: &Topology<'_>) -> f64 {
    let mid = topology.midpoint();
    let (fwd, aft) = allocations.iter().fold((0.0, 0.0), |(fwd, aft), a| {
        let Some(tank) = topology.tank(a.tank_id()) else {
            return (fwd, aft);
        };
        let lever = topology.tank_station(tank) - mid;
        let w = a.weight().value();
        if lever < 0.0 {
            (fwd - lever * w, aft)
        } else {
            (fwd, aft + lever * w)
        }
    });
    (fwd - aft).abs()
}

/// Builds the final diagnostics from a finished context's parts.
pub fn summarize(
    allocations: Vec<Allocation>,
    mut warnings: Vec<PlanWarning>,
    errors: Vec<PlanError>,
    trace: Vec<TraceEntry>,
    topology: &Topology<'_>,
    relaxed: &HashSet<TankId>,
    tolerance_pct: f64,
) -> PlanResult {
    warnings.extend(envelope_violations(&allocations, topology, relaxed));
    let b = balance(&allocations, topology, tolerance_pct);
    let heavy = match b.status {
        BalanceStatus::PortHeavy => Some(Side::Port),
        BalanceStatus::StarboardHeavy => Some(Side::Starboard),
        BalanceStatus::Balanced | BalanceStatus::Empty => None,
    };
    if let Some(heavy_side) = heavy {
        warnings.push(PlanWarning::ListImbalance {
            imbalance_pct: b.imbalance_pct,
            heavy_side,
        });
    }
    PlanResult::new(
        allocations,
        PlanDiagnostics::new(
            b.port,
            b.starboard,
            b.center,
            b.imbalance_pct,
            b.status,
            warnings,
            errors,
            trace,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_alloc_core::volume::Volume;

    fn tanks() -> Vec<Tank> {
        vec![
            Tank::new("COT1P", Volume::new(3000.0), 0.5, 0.98, Side::Port),
            Tank::new("COT1S", Volume::new(3000.0), 0.5, 0.98, Side::Starboard),
            Tank::new("COT3P", Volume::new(3000.0), 0.5, 0.98, Side::Port),
            Tank::new("COT3S", Volume::new(3000.0), 0.5, 0.98, Side::Starboard),
            Tank::new("COT2C", Volume::new(3000.0), 0.5, 0.98, Side::Center),
        ]
    }

    fn alloc(tank: &str, v: f64) -> Allocation {
        Allocation::new(TankId::new(tank), ParcelId::new("A"), Volume::new(v), Volume::new(3000.0), 1.0)
    }

    #[test]
    fn test_balance_status() {
        let tanks = tanks();
        let refs: Vec<&Tank> = tanks.iter().collect();
        let topo = Topology::new(&refs);

        let b = balance(&[alloc("COT1P", 2000.0), alloc("COT1S", 2000.0)], &topo, 2.0);
        assert_eq!(b.status, BalanceStatus::Balanced);
        assert_eq!(b.imbalance_pct, 0.0);

        let b = balance(&[alloc("COT1P", 2000.0), alloc("COT2C", 2000.0)], &topo, 2.0);
        assert_eq!(b.status, BalanceStatus::PortHeavy);
        assert_eq!(b.imbalance_pct, 100.0);
        assert_eq!(b.center.value(), 2000.0);

        let b = balance(&[alloc("COT2C", 2000.0)], &topo, 2.0);
        assert_eq!(b.status, BalanceStatus::Empty);
    }

    #[test]
    fn test_envelope_violations_skip_relaxed_tank() {
        let tanks = tanks();
        let refs: Vec<&Tank> = tanks.iter().collect();
        let topo = Topology::new(&refs);
        let allocations = [alloc("COT1P", 1400.0), alloc("COT1S", 1400.0)];
        let relaxed: HashSet<TankId> = [TankId::new("COT1P")].into_iter().collect();

        let w = envelope_violations(&allocations, &topo, &relaxed);
        assert_eq!(w.len(), 1);
        assert!(matches!(&w[0], PlanWarning::OutsideEnvelope { tank, .. } if tank.as_str() == "COT1S"));
    }

    #[test]
    fn test_moment_difference() {
        let tanks = tanks();
        let refs: Vec<&Tank> = tanks.iter().collect();
        let topo = Topology::new(&refs);
        assert_eq!(topo.midpoint(), 2.0);

        let even = [alloc("COT1P", 1000.0), alloc("COT3P", 1000.0)];
        assert!(moment_difference(&even, &topo).abs() < 1e-9);
        let forward = [alloc("COT1P", 1000.0), alloc("COT2C", 1000.0)];
        assert!((moment_difference(&forward, &topo) - 1000.0).abs() < 1e-9);
    }
}
