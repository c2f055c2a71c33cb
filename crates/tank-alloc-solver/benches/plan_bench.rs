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

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::{env, hint::black_box};
use tank_alloc_model::{generator::{FleetGenConfigBuilder, FleetGenerator}, prelude::*};
use tank_alloc_solver::{Objective, Planner, PlannerConfig, compute_plan_min_k_alternatives};

fn fleet(pairs: usize, parcels: usize, seed: u64) -> (Vec<Tank>, Vec<Parcel>) {
    let cfg = FleetGenConfigBuilder::new()
        .pair_count(pairs)
        .center_count(pairs / 4)
        .parcel_count(parcels)
        .with_fill_remaining(true)
        .seed(seed)
        .build()
        .expect("valid fleet config");
    FleetGenerator::new(cfg).expect("valid generator").generate()
}

fn register_objectives(c: &mut Criterion, pairs: usize) {
    let mut group = c.benchmark_group(format!("plan/{pairs}_pairs"));
    let (tanks, parcels) = fleet(pairs, (pairs / 2).max(1), 0xC0FF_EE00 + pairs as u64);
    group.throughput(Throughput::Elements(parcels.len() as u64));
    for objective in [Objective::MinK, Objective::MaxK, Objective::MinLockedGlobal] {
        let planner = Planner::new(PlannerConfig::default().with_objective(objective));
        group.bench_function(BenchmarkId::new("objective", format!("{objective:?}")), |b| {
            b.iter(|| black_box(planner.plan(black_box(&tanks), black_box(&parcels))))
        });
    }
    group.finish();
}

fn register_alternatives(c: &mut Criterion, pairs: usize) {
    let mut group = c.benchmark_group(format!("alternatives/{pairs}_pairs"));
    let (tanks, parcels) = fleet(pairs, 3, 0xA17E_0000 + pairs as u64);
    for max in [1usize, 5] {
        group.bench_function(BenchmarkId::new("max", max), |b| {
            b.iter(|| black_box(compute_plan_min_k_alternatives(&tanks, &parcels, max)))
        });
    }
    group.finish();
}

fn plan_benches(c: &mut Criterion) {
    let sizes: Vec<usize> = env::var("PLAN_PAIRS")
        .ok()
        .map(|s| s.split(',').filter_map(|v| v.trim().parse().ok()).collect())
        .unwrap_or_else(|| vec![4, 8, 12]);

    for &pairs in &sizes {
        register_objectives(c, pairs);
        register_alternatives(c, pairs);
    }
}

criterion_group!(benches, plan_benches);
criterion_main!(benches);
