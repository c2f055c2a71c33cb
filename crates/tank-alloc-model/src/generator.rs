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

//! Seeded generation of tank layouts and parcel lists for tests and benchmarks.

use crate::{
    parcel::Parcel,
    tank::{Side, Tank},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use std::fmt::Display;
use tank_alloc_core::volume::Volume;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetGenConfigError {
    NoPairs,
    CapacityRange,
    FillRange,
    Utilization,
    NoParcels,
}

impl Display for FleetGenConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use FleetGenConfigError::*;
        match self {
            NoPairs => write!(f, "pair_count must be at least 1"),
            CapacityRange => write!(f, "capacity range must be positive and ordered"),
            FillRange => write!(f, "fill fractions must satisfy 0 <= min <= max <= 1"),
            Utilization => write!(f, "utilization must lie in (0, 1]"),
            NoParcels => write!(f, "parcel_count must be at least 1"),
        }
    }
}

impl std::error::Error for FleetGenConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetGenConfig {
    pair_count: usize,
    center_count: usize,
    with_slops: bool,
    min_capacity: Volume,
    max_capacity: Volume,
    slop_capacity: Volume,
    min_fill: f64,
    max_fill: f64,
    parcel_count: usize,
    /// Share of the total maximum volume requested by the fixed parcels.
    utilization: f64,
    with_fill_remaining: bool,
    seed: u64,
}

impl Default for FleetGenConfig {
    fn default() -> Self {
        Self {
            pair_count: 6,
            center_count: 0,
            with_slops: true,
            min_capacity: Volume::new(2_500.0),
            max_capacity: Volume::new(4_000.0),
            slop_capacity: Volume::new(800.0),
            min_fill: 0.5,
            max_fill: 0.98,
            parcel_count: 4,
            utilization: 0.7,
            with_fill_remaining: false,
            seed: 0x5EED_7A4C,
        }
    }
}

impl FleetGenConfig {
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    #[inline]
    pub fn center_count(&self) -> usize {
        self.center_count
    }

    #[inline]
    pub fn parcel_count(&self) -> usize {
        self.parcel_count
    }

    fn validate(&self) -> Result<(), FleetGenConfigError> {
        if self.pair_count == 0 {
            return Err(FleetGenConfigError::NoPairs);
        }
        if self.parcel_count == 0 {
            return Err(FleetGenConfigError::NoParcels);
        }
        let (lo, hi) = (self.min_capacity.value(), self.max_capacity.value());
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi)
            || self.slop_capacity.value() <= 0.0
        {
            return Err(FleetGenConfigError::CapacityRange);
        }
        if !(0.0..=1.0).contains(&self.min_fill)
            || !(0.0..=1.0).contains(&self.max_fill)
            || self.min_fill > self.max_fill
        {
            return Err(FleetGenConfigError::FillRange);
        }
        if !(self.utilization > 0.0 && self.utilization <= 1.0) {
            return Err(FleetGenConfigError::Utilization);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetGenConfigBuilder {
    config: FleetGenConfig,
}

impl FleetGenConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair_count(mut self, n: usize) -> Self {
        self.config.pair_count = n;
        self
    }

    pub fn center_count(mut self, n: usize) -> Self {
        self.config.center_count = n;
        self
    }

    pub fn with_slops(mut self, yes: bool) -> Self {
        self.config.with_slops = yes;
        self
    }

    pub fn capacity_range(mut self, min: Volume, max: Volume) -> Self {
        self.config.min_capacity = min;
        self.config.max_capacity = max;
        self
    }

    pub fn slop_capacity(mut self, v: Volume) -> Self {
        self.config.slop_capacity = v;
        self
    }

    pub fn fill_limits(mut self, min_fill: f64, max_fill: f64) -> Self {
        self.config.min_fill = min_fill;
        self.config.max_fill = max_fill;
        self
    }

    pub fn parcel_count(mut self, n: usize) -> Self {
        self.config.parcel_count = n;
        self
    }

    pub fn utilization(mut self, u: f64) -> Self {
        self.config.utilization = u;
        self
    }

    pub fn with_fill_remaining(mut self, yes: bool) -> Self {
        self.config.with_fill_remaining = yes;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn build(self) -> Result<FleetGenConfig, FleetGenConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

pub struct FleetGenerator {
    config: FleetGenConfig,
    rng: ChaCha8Rng,
    capacity_distribution: Uniform<f64>,
    share_distribution: Uniform<f64>,
    density_distribution: Uniform<f64>,
}

impl FleetGenerator {
    pub fn new(config: FleetGenConfig) -> Result<Self, FleetGenConfigError> {
        config.validate()?;
        let capacity_distribution = Uniform::new_inclusive(
            config.min_capacity.value(),
            config.max_capacity.value(),
        )
        .map_err(|_| FleetGenConfigError::CapacityRange)?;
        let share_distribution =
            Uniform::new_inclusive(0.5, 1.5).map_err(|_| FleetGenConfigError::Utilization)?;
        let density_distribution =
            Uniform::new_inclusive(0.70, 0.95).map_err(|_| FleetGenConfigError::Utilization)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            capacity_distribution,
            share_distribution,
            density_distribution,
        })
    }

    #[inline]
    pub fn config(&self) -> &FleetGenConfig {
        &self.config
    }

    /// Symmetric wing pairs `COT1..COTn`, optional center tanks around midship and an
    /// optional slop pair.
    pub fn generate_tanks(&mut self) -> Vec<Tank> {
        let cfg = &self.config;
        let (min_fill, max_fill) = (cfg.min_fill, cfg.max_fill);
        let mut tanks = Vec::with_capacity(cfg.pair_count * 2 + cfg.center_count + 2);

        for i in 1..=cfg.pair_count {
            let cap = Volume::new(self.capacity_distribution.sample(&mut self.rng).round());
            tanks.push(Tank::new(format!("COT{i}P"), cap, min_fill, max_fill, Side::Port));
            tanks.push(Tank::new(format!("COT{i}S"), cap, min_fill, max_fill, Side::Starboard));
        }

        let first_center = cfg.pair_count.div_ceil(2);
        for j in 0..cfg.center_count {
            let cap = Volume::new(self.capacity_distribution.sample(&mut self.rng).round());
            let idx = first_center + j;
            tanks.push(Tank::new(format!("COT{idx}C"), cap, min_fill, max_fill, Side::Center));
        }

        if cfg.with_slops {
            let cap = cfg.slop_capacity;
            tanks.push(Tank::new("SLOPP", cap, min_fill, max_fill, Side::Port));
            tanks.push(Tank::new("SLOPS", cap, min_fill, max_fill, Side::Starboard));
        }
        tanks
    }

    /// Parcels sharing `utilization` of the tanks' total maximum volume, plus a trailing
    /// fill-remaining parcel when configured.
    pub fn generate_parcels(&mut self, tanks: &[Tank]) -> Vec<Parcel> {
        let total: Volume = tanks.iter().map(Tank::max_volume).sum();
        let budget = total.scale(self.config.utilization);

        let shares: Vec<f64> = (0..self.config.parcel_count)
            .map(|_| self.share_distribution.sample(&mut self.rng))
            .collect();
        let share_sum: f64 = shares.iter().sum();

        let mut parcels: Vec<Parcel> = shares
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let volume = Volume::new((budget.value() * s / share_sum).round().max(1.0));
                let density = (self.density_distribution.sample(&mut self.rng) * 1000.0).round() / 1000.0;
                Parcel::fixed(format!("P{}", i + 1), format!("Grade {}", i + 1), volume, density, 15.0)
            })
            .collect();

        if self.config.with_fill_remaining {
            let density = (self.density_distribution.sample(&mut self.rng) * 1000.0).round() / 1000.0;
            parcels.push(Parcel::fill_remaining("FR", "Fill remaining", density, 15.0));
        }
        parcels
    }

    pub fn generate(&mut self) -> (Vec<Tank>, Vec<Parcel>) {
        let tanks = self.generate_tanks();
        let parcels = self.generate_parcels(&tanks);
        (tanks, parcels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_invalid_config() {
        assert_eq!(
            FleetGenConfigBuilder::new().pair_count(0).build(),
            Err(FleetGenConfigError::NoPairs)
        );
        assert_eq!(
            FleetGenConfigBuilder::new()
                .capacity_range(Volume::new(10.0), Volume::new(5.0))
                .build(),
            Err(FleetGenConfigError::CapacityRange)
        );
        assert_eq!(
            FleetGenConfigBuilder::new().fill_limits(0.9, 0.5).build(),
            Err(FleetGenConfigError::FillRange)
        );
        assert_eq!(
            FleetGenConfigBuilder::new().utilization(0.0).build(),
            Err(FleetGenConfigError::Utilization)
        );
    }

    #[test]
    fn test_generated_layout_is_symmetric() {
        let cfg = FleetGenConfigBuilder::new()
            .pair_count(5)
            .center_count(1)
            .build()
            .unwrap();
        let mut generator = FleetGenerator::new(cfg).unwrap();
        let tanks = generator.generate_tanks();
        assert_eq!(tanks.len(), 5 * 2 + 1 + 2);
        for i in 1..=5 {
            let p = tanks.iter().find(|t| t.id().as_str() == format!("COT{i}P")).unwrap();
            let s = tanks.iter().find(|t| t.id().as_str() == format!("COT{i}S")).unwrap();
            assert_eq!(p.capacity(), s.capacity());
        }
        assert!(tanks.iter().any(|t| t.id().as_str() == "COT3C"));
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let cfg = FleetGenConfigBuilder::new().seed(7).build().unwrap();
        let a = FleetGenerator::new(cfg.clone()).unwrap().generate();
        let b = FleetGenerator::new(cfg).unwrap().generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parcels_respect_utilization() {
        let cfg = FleetGenConfigBuilder::new()
            .utilization(0.5)
            .parcel_count(3)
            .with_fill_remaining(true)
            .build()
            .unwrap();
        let mut generator = FleetGenerator::new(cfg).unwrap();
        let (tanks, parcels) = generator.generate();
        assert_eq!(parcels.len(), 4);
        assert!(parcels[3].is_fill_remaining());
        let total: Volume = tanks.iter().map(Tank::max_volume).sum();
        let requested: Volume = parcels.iter().filter_map(Parcel::requested_volume).sum();
        assert!((requested.value() - total.value() * 0.5).abs() < 3.0);
    }
}
