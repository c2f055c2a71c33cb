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

//! # Tank Allocation Model (`tank-alloc-model`)
//!
//! This crate provides the data model for planning how liquid cargo parcels are loaded
//! into a ship's tanks. It builds on the typed quantities of `tank-alloc-core` and is
//! shared between the planning engine and whatever loads or presents its data.
//!
//! ## Key Data Structures
//!
//! - **`Tank`**: a cargo tank with its capacity, fill-fraction limits, side and whether it
//!   takes part in planning.
//! - **`Parcel`**: a cargo lot. Its `ParcelVolume` is either an exact volume or the marker
//!   for the single "fill remaining" parcel of a plan.
//! - **`Allocation`**: the volume of one parcel placed in one tank.
//! - **`PlanResult`**: the allocations of one planning call together with its
//!   `PlanDiagnostics` (balance, warnings, errors and the per-parcel `TraceEntry` audit).
//!
//! All records derive `serde` traits so that `{tanks, parcels}` and plan results can be
//! persisted verbatim.

pub mod err;
pub mod generator;
pub mod id;
pub mod parcel;
pub mod plan;
pub mod tank;

pub mod prelude {
    pub use crate::err::{
        ForcedDefect, ForcedSelectionError, InvalidParcelError, InvalidTankError,
        MissingCenterError, ParcelDefect, PlanError, PlanWarning, RangeExcludedError,
        TankDefect, UnplaceableParcelError,
    };
    pub use crate::id::{PairIndex, ParcelId, TankId};
    pub use crate::parcel::{Parcel, ParcelVolume};
    pub use crate::plan::{
        Allocation, AllocationSignature, BalanceStatus, ParityAdjustment, PlanDiagnostics,
        PlanResult, TraceEntry,
    };
    pub use crate::tank::{Side, Tank};
}
