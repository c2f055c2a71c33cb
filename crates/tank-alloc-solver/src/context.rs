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

use crate::topology::{CenterTank, Pair, Topology};
use std::collections::HashSet;
use tank_alloc_core::volume::Volume;
use tank_alloc_model::prelude::*;
use tracing::warn;

/// Mutable state of one planning call.
///
/// Tracks which tanks hold cargo, which pair indices are consumed, how much band
/// relaxation is left, and collects the plan's allocations and diagnostics. Created
/// fresh per call; nothing is shared between calls.
#[derive(Debug, Clone, Default)]
pub struct PlanningContext {
    used_tanks: HashSet<TankId>,
    consumed_pairs: HashSet<PairIndex>,
    relaxations_left: usize,
    relaxed_tanks: HashSet<TankId>,
    allocations: Vec<Allocation>,
    warnings: Vec<PlanWarning>,
    errors: Vec<PlanError>,
    trace: Vec<TraceEntry>,
}

impl PlanningContext {
    /// A context allowing `band_slots` tanks to go below their minimum.
    pub fn new(band_slots: usize) -> Self {
        Self {
            relaxations_left: band_slots,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_tank_free(&self, tank: &TankId) -> bool {
        !self.used_tanks.contains(tank)
    }

    #[inline]
    pub fn is_pair_consumed(&self, index: PairIndex) -> bool {
        self.consumed_pairs.contains(&index)
    }

    pub fn is_pair_free(&self, pair: &Pair<'_>) -> bool {
        !self.is_pair_consumed(pair.index())
            && pair.tanks().iter().all(|t| self.is_tank_free(t.id()))
    }

    /// Free pairs in the topology's middle-out order.
    pub fn free_pairs<'t>(&self, topology: &Topology<'t>) -> Vec<Pair<'t>> {
        topology
            .order()
            .iter()
            .filter_map(|i| topology.pair(*i))
            .filter(|p| self.is_pair_free(p))
            .copied()
            .collect()
    }

    pub fn free_centers<'t>(&self, topology: &Topology<'t>) -> Vec<CenterTank<'t>> {
        topology
            .centers()
            .iter()
            .filter(|c| self.is_tank_free(c.tank().id()))
            .copied()
            .collect()
    }

    /// Included wing tanks that could take a parcel on their own: free, and not part of
    /// a consumed pair.
    pub fn free_wing_tanks<'t>(&self, topology: &Topology<'t>) -> Vec<&'t Tank> {
        topology
            .included()
            .iter()
            .copied()
            .filter(|t| t.side().is_wing() && self.is_tank_free(t.id()))
            .filter(|t| {
                topology
                    .pair_of(t.id())
                    .is_none_or(|i| !self.is_pair_consumed(i))
            })
            .collect()
    }

    /// Included tanks that hold no cargo yet.
    pub fn free_tanks<'t>(&self, topology: &Topology<'t>) -> Vec<&'t Tank> {
        topology
            .included()
            .iter()
            .copied()
            .filter(|t| self.is_tank_free(t.id()))
            .collect()
    }

    /// Summed maximum volume of the free tanks.
    pub fn free_capacity(&self, topology: &Topology<'_>) -> Volume {
        self.free_tanks(topology).iter().map(|t| t.max_volume()).sum()
    }

    #[inline]
    pub fn relaxation_available(&self) -> bool {
        self.relaxations_left > 0
    }

    /// The band floor the next selection may use, if any relaxation is left.
    #[inline]
    pub fn band_floor(&self, floor: f64) -> Option<f64> {
        self.relaxation_available().then_some(floor)
    }

    #[inline]
    pub fn relaxed_tanks(&self) -> &HashSet<TankId> {
        &self.relaxed_tanks
    }

    #[inline]
    pub fn consume_pair(&mut self, index: PairIndex) {
        self.consumed_pairs.insert(index);
    }

    /// Records `volumes[i]` of `parcel` in `tanks[i]`. `relaxed` names the tank that was
    /// loaded below its minimum and spends one relaxation.
    pub fn commit(
        &mut self,
        parcel: &Parcel,
        tanks: &[&Tank],
        volumes: &[Volume],
        relaxed: Option<usize>,
    ) {
        debug_assert_eq!(tanks.len(), volumes.len());
        for (i, (tank, &volume)) in tanks.iter().zip(volumes).enumerate() {
            self.allocations.push(Allocation::new(
                tank.id().clone(),
                parcel.id().clone(),
                volume,
                tank.capacity(),
                parcel.density(),
            ));
            self.used_tanks.insert(tank.id().clone());
            if relaxed == Some(i) {
                self.relaxations_left = self.relaxations_left.saturating_sub(1);
                self.relaxed_tanks.insert(tank.id().clone());
                self.warn(PlanWarning::BandRelaxed {
                    tank: tank.id().clone(),
                    parcel: parcel.id().clone(),
                    volume,
                    configured_min: tank.min_volume(),
                });
            }
        }
    }

    pub fn warn(&mut self, warning: PlanWarning) {
        warn!(%warning, "plan warning");
        self.warnings.push(warning);
    }

    pub fn error(&mut self, error: PlanError) {
        warn!(%error, "plan error");
        self.errors.push(error);
    }

    #[inline]
    pub fn push_trace(&mut self, entry: TraceEntry) {
        self.trace.push(entry);
    }

    #[inline]
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    #[inline]
    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }

    #[inline]
    pub fn errors(&self) -> &[PlanError] {
        &self.errors
    }

    #[inline]
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn into_parts(self) -> (Vec<Allocation>, Vec<PlanWarning>, Vec<PlanError>, Vec<TraceEntry>) {
        (self.allocations, self.warnings, self.errors, self.trace)
    }
}
