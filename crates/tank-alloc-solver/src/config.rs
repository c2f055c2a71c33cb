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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tank_alloc_model::prelude::*;

/// Default lowest fill fraction a band-relaxed tank may be loaded to.
pub const DEFAULT_BAND_FLOOR: f64 = 0.45;

/// Default number of tanks per plan that may be loaded below their configured minimum.
pub const DEFAULT_BAND_SLOTS: usize = 1;

/// What the subset search optimises for a single parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Fewest tanks; best score among the feasible subsets of the smallest count.
    #[default]
    MinK,
    /// Most tanks; ties go to the smallest locked capacity.
    MaxK,
    /// Smallest locked capacity over every count; ties go to the fewest tanks.
    MinLockedGlobal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub objective: Objective,
    pub band_floor: f64,
    pub band_slots: usize,
    /// Keep one pair back for the smallest later parcel.
    pub small_parcel_buffer: bool,
    /// Keep the slop pair for the smallest fixed parcel.
    pub reserve_slop_for_small: bool,
    /// Try a single wing tank before any symmetric selection.
    pub aggressive_single_wing: bool,
    /// Swap a symmetric selection for a single wing tank that locks less capacity.
    pub prefer_single_wing: bool,
    /// Port/starboard imbalance, in percent, still reported as balanced.
    pub balance_tolerance_pct: f64,
    /// Upper bound on combinations evaluated per selection.
    pub enumeration_limit: Option<usize>,
    /// Tanks a parcel must be loaded into, bypassing the subset search.
    pub forced_tanks: BTreeMap<ParcelId, Vec<TankId>>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            objective: Objective::MinK,
            band_floor: DEFAULT_BAND_FLOOR,
            band_slots: DEFAULT_BAND_SLOTS,
            small_parcel_buffer: true,
            reserve_slop_for_small: false,
            aggressive_single_wing: false,
            prefer_single_wing: false,
            balance_tolerance_pct: 2.0,
            enumeration_limit: None,
            forced_tanks: BTreeMap::new(),
        }
    }
}

impl PlannerConfig {
    #[inline]
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    #[inline]
    pub fn forced_for(&self, parcel: &ParcelId) -> Option<&[TankId]> {
        self.forced_tanks.get(parcel).map(Vec::as_slice)
    }
}

/// The knobs exposed by the policy-driven minimum-tank planner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MinKPolicy {
    #[serde(default)]
    pub band_floor: Option<f64>,
    #[serde(default)]
    pub band_slots: Option<usize>,
    #[serde(default)]
    pub aggressive_single_wing: bool,
    #[serde(default)]
    pub forced_tanks: BTreeMap<ParcelId, Vec<TankId>>,
}

impl From<&MinKPolicy> for PlannerConfig {
    fn from(policy: &MinKPolicy) -> Self {
        let defaults = PlannerConfig::default();
        Self {
            band_floor: policy.band_floor.unwrap_or(defaults.band_floor),
            band_slots: policy.band_slots.unwrap_or(defaults.band_slots),
            aggressive_single_wing: policy.aggressive_single_wing,
            forced_tanks: policy.forced_tanks.clone(),
            ..defaults
        }
    }
}
