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
    id::{PairIndex, ParcelId, TankId},
    tank::Side,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tank_alloc_core::{primitives::ClosedInterval, volume::Volume};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "defect", content = "value", rename_all = "snake_case")]
pub enum TankDefect {
    NonPositiveCapacity(f64),
    FillFractionOutOfRange { min_fill: f64, max_fill: f64 },
    MinAboveMax { min_fill: f64, max_fill: f64 },
    DuplicateId,
}

impl Display for TankDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TankDefect::NonPositiveCapacity(c) => write!(f, "capacity {c} is not positive"),
            TankDefect::FillFractionOutOfRange { min_fill, max_fill } => write!(
                f,
                "fill fractions [{min_fill}, {max_fill}] are outside [0, 1]"
            ),
            TankDefect::MinAboveMax { min_fill, max_fill } => {
                write!(f, "min fill {min_fill} exceeds max fill {max_fill}")
            }
            TankDefect::DuplicateId => write!(f, "identifier is used by another tank"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "defect", content = "value", rename_all = "snake_case")]
pub enum ParcelDefect {
    NonPositiveVolume(f64),
    NonPositiveDensity(f64),
    DuplicateId,
    ExtraFillRemaining,
}

impl Display for ParcelDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParcelDefect::NonPositiveVolume(v) => write!(f, "volume {v} is not positive"),
            ParcelDefect::NonPositiveDensity(d) => write!(f, "density {d} is not positive"),
            ParcelDefect::DuplicateId => write!(f, "identifier is used by another parcel"),
            ParcelDefect::ExtraFillRemaining => {
                write!(f, "only one fill-remaining parcel is allowed per plan")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidTankError {
    id: TankId,
    defect: TankDefect,
}

impl InvalidTankError {
    #[inline]
    pub fn new(id: TankId, defect: TankDefect) -> Self {
        Self { id, defect }
    }

    #[inline]
    pub fn id(&self) -> &TankId {
        &self.id
    }

    #[inline]
    pub fn defect(&self) -> TankDefect {
        self.defect
    }
}

impl Display for InvalidTankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tank {} ignored: {}", self.id, self.defect)
    }
}

impl std::error::Error for InvalidTankError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidParcelError {
    id: ParcelId,
    defect: ParcelDefect,
}

impl InvalidParcelError {
    #[inline]
    pub fn new(id: ParcelId, defect: ParcelDefect) -> Self {
        Self { id, defect }
    }

    #[inline]
    pub fn id(&self) -> &ParcelId {
        &self.id
    }

    #[inline]
    pub fn defect(&self) -> ParcelDefect {
        self.defect
    }
}

impl Display for InvalidParcelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parcel {} skipped: {}", self.id, self.defect)
    }
}

impl std::error::Error for InvalidParcelError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnplaceableParcelError {
    parcel: ParcelId,
    volume: Volume,
    free_capacity: Volume,
}

impl UnplaceableParcelError {
    #[inline]
    pub fn new(parcel: ParcelId, volume: Volume, free_capacity: Volume) -> Self {
        Self {
            parcel,
            volume,
            free_capacity,
        }
    }

    #[inline]
    pub fn parcel(&self) -> &ParcelId {
        &self.parcel
    }

    #[inline]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Sum of the maximum volumes of the tanks that were still free.
    #[inline]
    pub fn free_capacity(&self) -> Volume {
        self.free_capacity
    }
}

impl Display for UnplaceableParcelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parcel {} ({}) cannot be placed with current tank limits (free capacity {})",
            self.parcel, self.volume, self.free_capacity
        )
    }
}

impl std::error::Error for UnplaceableParcelError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingCenterError {
    parcel: ParcelId,
    tank_count: usize,
}

impl MissingCenterError {
    #[inline]
    pub fn new(parcel: ParcelId, tank_count: usize) -> Self {
        Self { parcel, tank_count }
    }

    #[inline]
    pub fn parcel(&self) -> &ParcelId {
        &self.parcel
    }

    #[inline]
    pub fn tank_count(&self) -> usize {
        self.tank_count
    }
}

impl Display for MissingCenterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parcel {} needs an odd count of {} tanks but no free center tank remains",
            self.parcel, self.tank_count
        )
    }
}

impl std::error::Error for MissingCenterError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeExcludedError {
    parcel: ParcelId,
    volume: Volume,
    range: ClosedInterval<Volume>,
}

impl RangeExcludedError {
    #[inline]
    pub fn new(parcel: ParcelId, volume: Volume, range: ClosedInterval<Volume>) -> Self {
        Self {
            parcel,
            volume,
            range,
        }
    }

    #[inline]
    pub fn parcel(&self) -> &ParcelId {
        &self.parcel
    }

    #[inline]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    #[inline]
    pub fn range(&self) -> ClosedInterval<Volume> {
        self.range
    }
}

impl Display for RangeExcludedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parcel {} volume {} is outside the selected tanks' range {}",
            self.parcel, self.volume, self.range
        )
    }
}

impl std::error::Error for RangeExcludedError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "defect", content = "tank", rename_all = "snake_case")]
pub enum ForcedDefect {
    Empty,
    UnknownTank(TankId),
    TankUnavailable(TankId),
    IncompletePair(TankId),
    TooManyCenters,
}

impl Display for ForcedDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForcedDefect::Empty => write!(f, "no tanks were given"),
            ForcedDefect::UnknownTank(t) => write!(f, "tank {t} is not part of the topology"),
            ForcedDefect::TankUnavailable(t) => write!(f, "tank {t} is already in use"),
            ForcedDefect::IncompletePair(t) => {
                write!(f, "tank {t} is given without its pair partner")
            }
            ForcedDefect::TooManyCenters => write!(f, "more than one center tank was given"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedSelectionError {
    parcel: ParcelId,
    defect: ForcedDefect,
}

impl ForcedSelectionError {
    #[inline]
    pub fn new(parcel: ParcelId, defect: ForcedDefect) -> Self {
        Self { parcel, defect }
    }

    #[inline]
    pub fn parcel(&self) -> &ParcelId {
        &self.parcel
    }

    #[inline]
    pub fn defect(&self) -> &ForcedDefect {
        &self.defect
    }
}

impl Display for ForcedSelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Forced selection for parcel {} rejected: {}",
            self.parcel, self.defect
        )
    }
}

impl std::error::Error for ForcedSelectionError {}

/// A per-parcel or per-input failure recorded in a plan's diagnostics.
///
/// None of these stop the planner; the affected tank or parcel is left out and
/// planning continues with the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanError {
    InvalidTank(InvalidTankError),
    InvalidParcel(InvalidParcelError),
    Unplaceable(UnplaceableParcelError),
    MissingCenter(MissingCenterError),
    RangeExcluded(RangeExcludedError),
    ForcedSelection(ForcedSelectionError),
}

impl PlanError {
    /// The parcel the error is about, if any.
    pub fn parcel(&self) -> Option<&ParcelId> {
        match self {
            PlanError::InvalidTank(_) => None,
            PlanError::InvalidParcel(e) => Some(e.id()),
            PlanError::Unplaceable(e) => Some(e.parcel()),
            PlanError::MissingCenter(e) => Some(e.parcel()),
            PlanError::RangeExcluded(e) => Some(e.parcel()),
            PlanError::ForcedSelection(e) => Some(e.parcel()),
        }
    }
}

impl Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::InvalidTank(e) => write!(f, "{e}"),
            PlanError::InvalidParcel(e) => write!(f, "{e}"),
            PlanError::Unplaceable(e) => write!(f, "{e}"),
            PlanError::MissingCenter(e) => write!(f, "{e}"),
            PlanError::RangeExcluded(e) => write!(f, "{e}"),
            PlanError::ForcedSelection(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PlanError {}

impl From<InvalidTankError> for PlanError {
    fn from(e: InvalidTankError) -> Self {
        PlanError::InvalidTank(e)
    }
}

impl From<InvalidParcelError> for PlanError {
    fn from(e: InvalidParcelError) -> Self {
        PlanError::InvalidParcel(e)
    }
}

impl From<UnplaceableParcelError> for PlanError {
    fn from(e: UnplaceableParcelError) -> Self {
        PlanError::Unplaceable(e)
    }
}

impl From<MissingCenterError> for PlanError {
    fn from(e: MissingCenterError) -> Self {
        PlanError::MissingCenter(e)
    }
}

impl From<RangeExcludedError> for PlanError {
    fn from(e: RangeExcludedError) -> Self {
        PlanError::RangeExcluded(e)
    }
}

impl From<ForcedSelectionError> for PlanError {
    fn from(e: ForcedSelectionError) -> Self {
        PlanError::ForcedSelection(e)
    }
}

/// An advisory recorded in a plan's diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// A final assignment lies outside the tank's envelope without being the relaxed tank.
    OutsideEnvelope {
        tank: TankId,
        parcel: ParcelId,
        volume: Volume,
        envelope: ClosedInterval<Volume>,
    },
    /// The pair kept back for a smaller parcel had to be used.
    BufferReleased { parcel: ParcelId, pair: PairIndex },
    /// The slop pair kept back for the smallest parcel had to be used.
    SlopReleased { parcel: ParcelId },
    /// The plan's band relaxation was spent on this tank.
    BandRelaxed {
        tank: TankId,
        parcel: ParcelId,
        volume: Volume,
        configured_min: Volume,
    },
    /// The parcel went into a single wing tank; counter-ballast is needed.
    SingleWing {
        tank: TankId,
        parcel: ParcelId,
        side: Side,
    },
    /// The request exceeded the total capacity and every tank was filled to its maximum.
    ShortLoaded {
        parcel: ParcelId,
        requested: Volume,
        loaded: Volume,
    },
    /// A fill-remaining parcel found no free tank.
    NothingRemaining { parcel: ParcelId },
    /// The final port/starboard split exceeds the balance tolerance.
    ListImbalance { imbalance_pct: f64, heavy_side: Side },
}

impl Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::OutsideEnvelope {
                tank,
                parcel,
                volume,
                envelope,
            } => write!(
                f,
                "Tank {tank} holds {volume} of parcel {parcel}, outside its limits {envelope}"
            ),
            PlanWarning::BufferReleased { parcel, pair } => write!(
                f,
                "Parcel {parcel} needed pair {pair}, which was reserved for a smaller parcel"
            ),
            PlanWarning::SlopReleased { parcel } => write!(
                f,
                "Parcel {parcel} needed the slop pair, which was reserved for the smallest parcel"
            ),
            PlanWarning::BandRelaxed {
                tank,
                parcel,
                volume,
                configured_min,
            } => write!(
                f,
                "Tank {tank} filled to {volume} for parcel {parcel}, below its minimum {configured_min} (band relaxation used)"
            ),
            PlanWarning::SingleWing { tank, parcel, side } => write!(
                f,
                "Parcel {parcel} loaded into single {side} tank {tank}; check list and counter-ballast"
            ),
            PlanWarning::ShortLoaded {
                parcel,
                requested,
                loaded,
            } => write!(
                f,
                "Parcel {parcel} requested {requested} but total capacity is {loaded}; short-loaded"
            ),
            PlanWarning::NothingRemaining { parcel } => {
                write!(f, "Parcel {parcel} found no free tank to fill")
            }
            PlanWarning::ListImbalance {
                imbalance_pct,
                heavy_side,
            } => write!(
                f,
                "Port/starboard imbalance {imbalance_pct:.2}% ({heavy_side} heavy)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_error_display_wraps_inner() {
        let e: PlanError =
            UnplaceableParcelError::new(ParcelId::new("A"), Volume::new(10.0), Volume::new(5.0))
                .into();
        let s = format!("{e}");
        assert!(s.contains("cannot be placed with current tank limits"));
        assert_eq!(e.parcel(), Some(&ParcelId::new("A")));
    }

    #[test]
    fn test_invalid_tank_has_no_parcel() {
        let e: PlanError =
            InvalidTankError::new(TankId::new("COT1P"), TankDefect::DuplicateId).into();
        assert_eq!(e.parcel(), None);
        assert_eq!(
            format!("{e}"),
            "Tank COT1P ignored: identifier is used by another tank"
        );
    }

    #[test]
    fn test_warning_display() {
        let w = PlanWarning::SingleWing {
            tank: TankId::new("COT3P"),
            parcel: ParcelId::new("B"),
            side: Side::Port,
        };
        assert_eq!(
            format!("{w}"),
            "Parcel B loaded into single port tank COT3P; check list and counter-ballast"
        );
    }
}
