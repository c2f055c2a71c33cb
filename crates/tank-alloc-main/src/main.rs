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

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fmt::Display,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    process::ExitCode,
    time::Instant,
};
use tank_alloc_core::volume::{Volume, Weight};
use tank_alloc_model::{
    generator::{FleetGenConfigBuilder, FleetGenerator},
    prelude::*,
};
use tank_alloc_solver::{
    MinKPolicy, compute_plan, compute_plan_max_k, compute_plan_max_remaining,
    compute_plan_min_k_alternatives, compute_plan_min_k_policy, compute_plan_min_keep_slops_small,
    compute_plan_min_tanks_aggressive, compute_plan_single_wing_alternative,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

const DEFAULT_REPORT: &str = "plan_report.json";
const MAX_ALTERNATIVES: usize = 5;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

/// A planning input as persisted by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scenario {
    tanks: Vec<Tank>,
    parcels: Vec<Parcel>,
    #[serde(default)]
    policy: Option<MinKPolicy>,
}

#[derive(Debug)]
enum ScenarioError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io(e) => write!(f, "I/O error: {e}"),
            ScenarioError::Json(e) => write!(f, "invalid scenario JSON: {e}"),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        ScenarioError::Json(e)
    }
}

fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn demo_scenario() -> Scenario {
    let generated = FleetGenConfigBuilder::new()
        .pair_count(6)
        .center_count(1)
        .parcel_count(4)
        .with_fill_remaining(true)
        .build()
        .and_then(FleetGenerator::new)
        .map(|mut g| g.generate());
    match generated {
        Ok((tanks, parcels)) => Scenario {
            tanks,
            parcels,
            policy: None,
        },
        Err(e) => {
            warn!(%e, "demo fleet could not be generated");
            Scenario {
                tanks: Vec::new(),
                parcels: Vec::new(),
                policy: None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    MinK,
    MaxRemaining,
    MaxK,
    MinTanksAggressive,
    SingleWingAlternative,
    MinKeepSlopsSmall,
    Policy,
}

impl Mode {
    const ALL: [Mode; 7] = [
        Mode::MinK,
        Mode::MaxRemaining,
        Mode::MaxK,
        Mode::MinTanksAggressive,
        Mode::SingleWingAlternative,
        Mode::MinKeepSlopsSmall,
        Mode::Policy,
    ];

    fn name(self) -> &'static str {
        match self {
            Mode::MinK => "min_k",
            Mode::MaxRemaining => "max_remaining",
            Mode::MaxK => "max_k",
            Mode::MinTanksAggressive => "min_tanks_aggressive",
            Mode::SingleWingAlternative => "single_wing_alternative",
            Mode::MinKeepSlopsSmall => "min_keep_slops_small",
            Mode::Policy => "min_k_policy",
        }
    }

    fn plan(self, scenario: &Scenario) -> PlanResult {
        let (t, p) = (scenario.tanks.as_slice(), scenario.parcels.as_slice());
        match self {
            Mode::MinK => compute_plan(t, p),
            Mode::MaxRemaining => compute_plan_max_remaining(t, p),
            Mode::MaxK => compute_plan_max_k(t, p),
            Mode::MinTanksAggressive => compute_plan_min_tanks_aggressive(t, p),
            Mode::SingleWingAlternative => compute_plan_single_wing_alternative(t, p),
            Mode::MinKeepSlopsSmall => compute_plan_min_keep_slops_small(t, p),
            Mode::Policy => {
                compute_plan_min_k_policy(t, p, &scenario.policy.clone().unwrap_or_default())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ModeReport {
    mode: &'static str,
    feasible: bool,
    tanks_used: usize,
    total_volume: Volume,
    total_weight: Weight,
    elapsed_us: u128,
    plan: PlanResult,
}

#[derive(Debug, Clone, Serialize)]
struct Report {
    description: String,
    tank_count: usize,
    parcel_count: usize,
    modes: Vec<ModeReport>,
    alternatives: Vec<PlanResult>,
}

fn run_mode(mode: Mode, scenario: &Scenario) -> ModeReport {
    let t0 = Instant::now();
    let plan = mode.plan(scenario);
    let elapsed = t0.elapsed();
    info!(
        mode = mode.name(),
        feasible = plan.is_feasible(),
        total = %plan.total_volume(),
        elapsed_us = elapsed.as_micros() as u64,
        "mode planned"
    );
    ModeReport {
        mode: mode.name(),
        feasible: plan.is_feasible(),
        tanks_used: plan.allocations().len(),
        total_volume: plan.total_volume(),
        total_weight: plan.total_weight(),
        elapsed_us: elapsed.as_micros(),
        plan,
    }
}

fn run() -> Result<(), ScenarioError> {
    let mut args = env::args().skip(1);
    let (scenario, description) = match args.next() {
        Some(path) => (load_scenario(Path::new(&path))?, format!("Scenario {path}")),
        None => (demo_scenario(), "Generated demo fleet".to_string()),
    };
    let out = args.next().unwrap_or_else(|| DEFAULT_REPORT.to_string());

    let modes: Vec<ModeReport> = Mode::ALL
        .par_iter()
        .map(|&mode| run_mode(mode, &scenario))
        .collect();
    let alternatives =
        compute_plan_min_k_alternatives(&scenario.tanks, &scenario.parcels, MAX_ALTERNATIVES);

    if let Some(min_k) = modes.first() {
        println!("{}", min_k.plan);
    }
    let report = Report {
        description,
        tank_count: scenario.tanks.len(),
        parcel_count: scenario.parcels.len(),
        modes,
        alternatives,
    };

    let mut writer = BufWriter::new(File::create(&out)?);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    println!("Wrote: {out}");
    Ok(())
}

fn main() -> ExitCode {
    enable_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
