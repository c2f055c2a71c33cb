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

use crate::{err::ParcelDefect, id::ParcelId};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tank_alloc_core::volume::Volume;

/// How much of a parcel is to be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParcelVolume {
    /// An exact volume to be placed.
    Fixed { volume: Volume },
    /// Whatever space is left after every fixed parcel, optionally capped with a target.
    FillRemaining { target: Option<Volume> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    id: ParcelId,
    name: String,
    volume: ParcelVolume,
    density: f64,
    temperature: f64,
}

impl Parcel {
    #[inline]
    pub fn new(
        id: impl Into<ParcelId>,
        name: impl Into<String>,
        volume: ParcelVolume,
        density: f64,
        temperature: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            volume,
            density,
            temperature,
        }
    }

    #[inline]
    pub fn fixed(
        id: impl Into<ParcelId>,
        name: impl Into<String>,
        volume: Volume,
        density: f64,
        temperature: f64,
    ) -> Self {
        Self::new(id, name, ParcelVolume::Fixed { volume }, density, temperature)
    }

    #[inline]
    pub fn fill_remaining(
        id: impl Into<ParcelId>,
        name: impl Into<String>,
        density: f64,
        temperature: f64,
    ) -> Self {
        Self::new(
            id,
            name,
            ParcelVolume::FillRemaining { target: None },
            density,
            temperature,
        )
    }

    #[inline]
    pub fn id(&self) -> &ParcelId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn volume(&self) -> ParcelVolume {
        self.volume
    }

    #[inline]
    pub fn density(&self) -> f64 {
        self.density
    }

    #[inline]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    pub fn is_fill_remaining(&self) -> bool {
        matches!(self.volume, ParcelVolume::FillRemaining { .. })
    }

    /// The exact volume to place, if the parcel has one.
    #[inline]
    pub fn requested_volume(&self) -> Option<Volume> {
        match self.volume {
            ParcelVolume::Fixed { volume } => Some(volume),
            ParcelVolume::FillRemaining { target } => target,
        }
    }

    pub fn validate(&self) -> Result<(), ParcelDefect> {
        if let Some(v) = self.requested_volume()
            && (!v.is_finite() || v.value() <= 0.0)
        {
            return Err(ParcelDefect::NonPositiveVolume(v.value()));
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(ParcelDefect::NonPositiveDensity(self.density));
        }
        Ok(())
    }
}

impl Display for Parcel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.volume {
            ParcelVolume::Fixed { volume } => write!(f, "Parcel({} '{}', {})", self.id, self.name, volume),
            ParcelVolume::FillRemaining { target: Some(t) } => {
                write!(f, "Parcel({} '{}', fill remaining up to {})", self.id, self.name, t)
            }
            ParcelVolume::FillRemaining { target: None } => {
                write!(f, "Parcel({} '{}', fill remaining)", self.id, self.name)
            }
        }
    }
}
