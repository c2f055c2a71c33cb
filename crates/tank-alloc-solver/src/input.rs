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

//! Validation of the caller's tanks and parcels, and the priority order of fixed parcels.
//!
//! Invalid records never abort planning: each one becomes a [`PlanError`] and is left
//! out. Duplicates are resolved after sorting by identifier and content, so which record
//! survives does not depend on input order.

use std::{cmp::Ordering, collections::HashSet};
use tank_alloc_core::volume::Volume;
use tank_alloc_model::prelude::*;
use tracing::debug;

/// A parcel with an exact volume to place.
#[derive(Debug, Clone, Copy)]
pub struct FixedParcel<'p> {
    parcel: &'p Parcel,
    volume: Volume,
}

impl<'p> FixedParcel<'p> {
    #[inline]
    pub fn new(parcel: &'p Parcel, volume: Volume) -> Self {
        Self { parcel, volume }
    }

    #[inline]
    pub fn parcel(&self) -> &'p Parcel {
        self.parcel
    }

    #[inline]
    pub fn id(&self) -> &'p ParcelId {
        self.parcel.id()
    }

    #[inline]
    pub fn volume(&self) -> Volume {
        self.volume
    }
}

/// The parcel taking whatever space is left, with its optional cap.
#[derive(Debug, Clone, Copy)]
pub struct RemainderParcel<'p> {
    parcel: &'p Parcel,
    target: Option<Volume>,
}

impl<'p> RemainderParcel<'p> {
    #[inline]
    pub fn parcel(&self) -> &'p Parcel {
        self.parcel
    }

    #[inline]
    pub fn target(&self) -> Option<Volume> {
        self.target
    }
}

#[derive(Debug, Clone)]
pub struct PlanInput<'a> {
    tanks: Vec<&'a Tank>,
    fixed: Vec<FixedParcel<'a>>,
    remainder: Option<RemainderParcel<'a>>,
    errors: Vec<PlanError>,
}

fn content_cmp(a: &Parcel, b: &Parcel) -> Ordering {
    let volume = |p: &Parcel| p.requested_volume().map(Volume::value);
    a.name()
        .cmp(b.name())
        .then_with(|| a.temperature().total_cmp(&b.temperature()))
        .then_with(|| a.id().cmp(b.id()))
        .then_with(|| a.density().total_cmp(&b.density()))
        .then_with(|| a.is_fill_remaining().cmp(&b.is_fill_remaining()))
        .then_with(|| match (volume(a), volume(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        })
}

impl<'a> PlanInput<'a> {
    pub fn validate(tanks: &'a [Tank], parcels: &'a [Parcel]) -> Self {
        let mut errors = Vec::new();

        let mut sorted_tanks: Vec<&'a Tank> = tanks.iter().collect();
        sorted_tanks.sort_by(|a, b| a.id().cmp(b.id()));
        let mut seen_tanks = HashSet::with_capacity(sorted_tanks.len());
        let mut valid_tanks = Vec::with_capacity(sorted_tanks.len());
        for tank in sorted_tanks {
            if let Err(defect) = tank.validate() {
                errors.push(InvalidTankError::new(tank.id().clone(), defect).into());
            } else if !seen_tanks.insert(tank.id()) {
                errors.push(InvalidTankError::new(tank.id().clone(), TankDefect::DuplicateId).into());
            } else {
                valid_tanks.push(tank);
            }
        }

        let mut sorted_parcels: Vec<&'a Parcel> = parcels.iter().collect();
        sorted_parcels.sort_by(|a, b| a.id().cmp(b.id()).then_with(|| content_cmp(a, b)));
        let mut seen_parcels = HashSet::with_capacity(sorted_parcels.len());
        let mut fixed = Vec::with_capacity(sorted_parcels.len());
        let mut remainders = Vec::new();
        for parcel in sorted_parcels {
            if let Err(defect) = parcel.validate() {
                errors.push(InvalidParcelError::new(parcel.id().clone(), defect).into());
                continue;
            }
            if !seen_parcels.insert(parcel.id()) {
                errors.push(
                    InvalidParcelError::new(parcel.id().clone(), ParcelDefect::DuplicateId).into(),
                );
                continue;
            }
            match parcel.volume() {
                ParcelVolume::Fixed { volume } => fixed.push(FixedParcel { parcel, volume }),
                ParcelVolume::FillRemaining { target } => {
                    remainders.push(RemainderParcel { parcel, target })
                }
            }
        }

        remainders.sort_by(|a, b| content_cmp(a.parcel, b.parcel));
        let mut remainders = remainders.into_iter();
        let remainder = remainders.next();
        for extra in remainders {
            errors.push(
                InvalidParcelError::new(extra.parcel.id().clone(), ParcelDefect::ExtraFillRemaining)
                    .into(),
            );
        }

        if !errors.is_empty() {
            debug!(count = errors.len(), "input records rejected");
        }
        Self {
            tanks: valid_tanks,
            fixed,
            remainder,
            errors,
        }
    }

    /// Valid tanks, included or not, sorted by identifier.
    #[inline]
    pub fn tanks(&self) -> &[&'a Tank] {
        &self.tanks
    }

    #[inline]
    pub fn fixed(&self) -> &[FixedParcel<'a>] {
        &self.fixed
    }

    #[inline]
    pub fn remainder(&self) -> Option<RemainderParcel<'a>> {
        self.remainder
    }

    #[inline]
    pub fn errors(&self) -> &[PlanError] {
        &self.errors
    }

    /// Fixed parcels in scheduling order.
    ///
    /// Larger estimated tank counts go first, then larger volumes, then denser cargo;
    /// name, temperature and identifier settle the rest.
    pub fn fixed_by_priority(&self, reference_max: Volume) -> Vec<FixedParcel<'a>> {
        let mut out = self.fixed.clone();
        out.sort_by(|a, b| {
            estimated_count(b.volume, reference_max)
                .cmp(&estimated_count(a.volume, reference_max))
                .then_with(|| b.volume.value().total_cmp(&a.volume.value()))
                .then_with(|| b.parcel.density().total_cmp(&a.parcel.density()))
                .then_with(|| content_cmp(a.parcel, b.parcel))
        });
        out
    }
}

/// `ceil(volume / reference_max)`, the tank count a volume needs if every tank were the
/// largest one.
pub fn estimated_count(volume: Volume, reference_max: Volume) -> usize {
    if !reference_max.is_positive() {
        return 0;
    }
    let ratio = volume / reference_max;
    let rounded = ratio.round();
    if (ratio - rounded).abs() < 1e-9 {
        rounded as usize
    } else {
        ratio.ceil() as usize
    }
}
