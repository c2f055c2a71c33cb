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

use crate::{
    err::{PlanError, PlanWarning},
    id::{PairIndex, ParcelId, TankId},
    tank::Tank,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tank_alloc_core::{
    primitives::ClosedInterval,
    volume::{Volume, Weight},
};

/// One tank's share of one parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    tank_id: TankId,
    parcel_id: ParcelId,
    volume: Volume,
    fill_fraction: f64,
    #[serde(rename = "weight_mt")]
    weight: Weight,
}

impl Allocation {
    #[inline]
    pub fn new(
        tank_id: TankId,
        parcel_id: ParcelId,
        volume: Volume,
        capacity: Volume,
        density: f64,
    ) -> Self {
        Self {
            tank_id,
            parcel_id,
            volume,
            fill_fraction: volume.fraction_of(capacity),
            weight: volume.weight(density),
        }
    }

    #[inline]
    pub fn tank_id(&self) -> &TankId {
        &self.tank_id
    }

    #[inline]
    pub fn parcel_id(&self) -> &ParcelId {
        &self.parcel_id
    }

    #[inline]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    #[inline]
    pub fn fill_fraction(&self) -> f64 {
        self.fill_fraction
    }

    #[inline]
    pub fn weight(&self) -> Weight {
        self.weight
    }
}

impl Display for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <- {}: {} ({:.1}%, {})",
            self.tank_id,
            self.parcel_id,
            self.volume,
            self.fill_fraction * 100.0,
            self.weight
        )
    }
}

/// How a required tank count was reconciled with pair symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParityAdjustment {
    #[default]
    None,
    /// An odd count completed by one center tank.
    OddWithCenter,
    /// An odd estimate rounded up to the next even count.
    PlusOne,
}

impl Display for ParityAdjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParityAdjustment::None => write!(f, "none"),
            ParityAdjustment::OddWithCenter => write!(f, "odd+center"),
            ParityAdjustment::PlusOne => write!(f, "+1"),
        }
    }
}

/// Audit record of how one parcel was placed, or why it was not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    parcel_id: ParcelId,
    target: Option<Volume>,
    reference: ClosedInterval<Volume>,
    k_low: Option<usize>,
    k_high: Option<usize>,
    chosen_k: Option<usize>,
    parity: ParityAdjustment,
    pairs: Vec<PairIndex>,
    centers: Vec<TankId>,
    single_wing: Option<TankId>,
    feasible: bool,
    reason: String,
}

impl TraceEntry {
    /// Starts a trace for a parcel. `reference` is the per-tank `[min, max]` the count
    /// estimates are based on.
    pub fn new(parcel_id: ParcelId, target: Option<Volume>, reference: ClosedInterval<Volume>) -> Self {
        Self {
            parcel_id,
            target,
            reference,
            k_low: None,
            k_high: None,
            chosen_k: None,
            parity: ParityAdjustment::None,
            pairs: Vec::new(),
            centers: Vec::new(),
            single_wing: None,
            feasible: false,
            reason: String::new(),
        }
    }

    #[inline]
    pub fn set_bounds(&mut self, k_low: Option<usize>, k_high: Option<usize>) {
        self.k_low = k_low;
        self.k_high = k_high;
    }

    pub fn record_selection(
        &mut self,
        chosen_k: usize,
        parity: ParityAdjustment,
        pairs: Vec<PairIndex>,
        centers: Vec<TankId>,
        reason: impl Into<String>,
    ) {
        self.chosen_k = Some(chosen_k);
        self.parity = parity;
        self.pairs = pairs;
        self.centers = centers;
        self.single_wing = None;
        self.feasible = true;
        self.reason = reason.into();
    }

    pub fn record_single_wing(&mut self, tank: TankId, reason: impl Into<String>) {
        self.chosen_k = Some(1);
        self.parity = ParityAdjustment::None;
        self.pairs.clear();
        self.centers.clear();
        self.single_wing = Some(tank);
        self.feasible = true;
        self.reason = reason.into();
    }

    pub fn mark_infeasible(&mut self, reason: impl Into<String>) {
        self.feasible = false;
        self.chosen_k = None;
        self.pairs.clear();
        self.centers.clear();
        self.single_wing = None;
        self.reason = reason.into();
    }

    #[inline]
    pub fn parcel_id(&self) -> &ParcelId {
        &self.parcel_id
    }

    #[inline]
    pub fn target(&self) -> Option<Volume> {
        self.target
    }

    #[inline]
    pub fn reference(&self) -> ClosedInterval<Volume> {
        self.reference
    }

    #[inline]
    pub fn k_low(&self) -> Option<usize> {
        self.k_low
    }

    #[inline]
    pub fn k_high(&self) -> Option<usize> {
        self.k_high
    }

    #[inline]
    pub fn chosen_k(&self) -> Option<usize> {
        self.chosen_k
    }

    #[inline]
    pub fn parity(&self) -> ParityAdjustment {
        self.parity
    }

    #[inline]
    pub fn pairs(&self) -> &[PairIndex] {
        &self.pairs
    }

    #[inline]
    pub fn centers(&self) -> &[TankId] {
        &self.centers
    }

    #[inline]
    pub fn single_wing(&self) -> Option<&TankId> {
        self.single_wing.as_ref()
    }

    #[inline]
    pub fn feasible(&self) -> bool {
        self.feasible
    }

    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.parcel_id)?;
        match self.chosen_k {
            Some(k) => write!(f, "k={k} ({})", self.parity)?,
            None => write!(f, "infeasible")?,
        }
        write!(f, " - {}", self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Balanced,
    PortHeavy,
    StarboardHeavy,
    /// Nothing was loaded into a wing tank.
    Empty,
}

impl Display for BalanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceStatus::Balanced => write!(f, "balanced"),
            BalanceStatus::PortHeavy => write!(f, "port heavy"),
            BalanceStatus::StarboardHeavy => write!(f, "starboard heavy"),
            BalanceStatus::Empty => write!(f, "empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    port_weight: Weight,
    starboard_weight: Weight,
    center_weight: Weight,
    imbalance_pct: f64,
    balance: BalanceStatus,
    warnings: Vec<PlanWarning>,
    errors: Vec<PlanError>,
    trace: Vec<TraceEntry>,
}

impl PlanDiagnostics {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        port_weight: Weight,
        starboard_weight: Weight,
        center_weight: Weight,
        imbalance_pct: f64,
        balance: BalanceStatus,
        warnings: Vec<PlanWarning>,
        errors: Vec<PlanError>,
        trace: Vec<TraceEntry>,
    ) -> Self {
        Self {
            port_weight,
            starboard_weight,
            center_weight,
            imbalance_pct,
            balance,
            warnings,
            errors,
            trace,
        }
    }

    #[inline]
    pub fn port_weight(&self) -> Weight {
        self.port_weight
    }

    #[inline]
    pub fn starboard_weight(&self) -> Weight {
        self.starboard_weight
    }

    #[inline]
    pub fn center_weight(&self) -> Weight {
        self.center_weight
    }

    /// `|port - starboard| / (port + starboard)` in percent.
    #[inline]
    pub fn imbalance_pct(&self) -> f64 {
        self.imbalance_pct
    }

    #[inline]
    pub fn balance(&self) -> BalanceStatus {
        self.balance
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

    #[inline]
    pub fn trace_for(&self, parcel: &ParcelId) -> Option<&TraceEntry> {
        self.trace.iter().find(|t| t.parcel_id() == parcel)
    }
}

/// An allocation signature: `(tank, parcel, quantized volume)` sorted by tank then parcel.
pub type AllocationSignature = Vec<(TankId, ParcelId, i64)>;

/// The outcome of one planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    allocations: Vec<Allocation>,
    diagnostics: PlanDiagnostics,
}

impl PlanResult {
    #[inline]
    pub fn new(allocations: Vec<Allocation>, diagnostics: PlanDiagnostics) -> Self {
        Self {
            allocations,
            diagnostics,
        }
    }

    #[inline]
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    #[inline]
    pub fn diagnostics(&self) -> &PlanDiagnostics {
        &self.diagnostics
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.diagnostics.errors.is_empty()
    }

    pub fn allocations_for<'a>(
        &'a self,
        parcel: &'a ParcelId,
    ) -> impl Iterator<Item = &'a Allocation> + 'a {
        self.allocations
            .iter()
            .filter(move |a| a.parcel_id() == parcel)
    }

    pub fn volume_for(&self, parcel: &ParcelId) -> Volume {
        self.allocations_for(parcel).map(Allocation::volume).sum()
    }

    pub fn total_volume(&self) -> Volume {
        self.allocations.iter().map(Allocation::volume).sum()
    }

    /// Capacity locked by a parcel but left empty: the maximum volume of every tank it
    /// occupies minus what it actually holds.
    pub fn dead_space_for(&self, parcel: &ParcelId, tanks: &[Tank]) -> Volume {
        let locked: Volume = self
            .allocations_for(parcel)
            .filter_map(|a| tanks.iter().find(|t| t.id() == a.tank_id()))
            .map(Tank::max_volume)
            .sum();
        locked.saturating_sub(self.volume_for(parcel))
    }

    pub fn total_weight(&self) -> Weight {
        self.allocations.iter().map(Allocation::weight).sum()
    }

    pub fn signature(&self) -> AllocationSignature {
        let mut sig: AllocationSignature = self
            .allocations
            .iter()
            .map(|a| {
                (
                    a.tank_id().clone(),
                    a.parcel_id().clone(),
                    a.volume().quantized(),
                )
            })
            .collect();
        sig.sort();
        sig
    }
}

impl Display for PlanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Plan:")?;
        for a in &self.allocations {
            writeln!(f, "  {a}")?;
        }
        writeln!(
            f,
            "  Port {} / Starboard {} ({:.2}%, {})",
            self.diagnostics.port_weight,
            self.diagnostics.starboard_weight,
            self.diagnostics.imbalance_pct,
            self.diagnostics.balance
        )?;
        for w in &self.diagnostics.warnings {
            writeln!(f, "  warning: {w}")?;
        }
        for e in &self.diagnostics.errors {
            writeln!(f, "  error: {e}")?;
        }
        Ok(())
    }
}
