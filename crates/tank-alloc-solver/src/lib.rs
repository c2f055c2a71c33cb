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

//! # Tank Allocation Solver (`tank-alloc-solver`)
//!
//! The planning engine that assigns cargo parcels to a ship's tanks while keeping the
//! vessel laterally balanced.
//!
//! Planning runs in one pass per call: the [`topology`] groups included tanks into
//! port/starboard pairs and centers, fixed parcels are placed in priority order by the
//! [`schedule::Planner`] using the [`select::Selector`] subset search and [`fill`]
//! water-filling, and the fill-remaining parcel takes what is left. Failures never abort a
//! call; they are collected as typed errors and warnings in the result's diagnostics.
//!
//! The [`api`] functions are the named presets most callers want. The
//! [`alternatives`] enumerator returns several distinct minimal-tank plans for the
//! leading parcel.
//!
//! Every call is self-contained and single-threaded; independent calls may run in
//! parallel.

pub mod alternatives;
pub mod api;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod fill;
pub mod input;
pub mod order;
pub mod schedule;
pub mod select;
pub mod topology;

pub use api::{
    compute_plan, compute_plan_max_k, compute_plan_max_remaining, compute_plan_min_k_alternatives,
    compute_plan_min_k_policy, compute_plan_min_keep_slops_small, compute_plan_min_tanks_aggressive,
    compute_plan_single_wing_alternative,
};
pub use config::{MinKPolicy, Objective, PlannerConfig};
pub use schedule::Planner;
