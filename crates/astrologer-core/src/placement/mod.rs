//! Body Placement Assembler: frame-transformed positions to sign, degree,
//! house and motion state.

pub mod signs;

pub use signs::{sign_of, Element, Quality, ZodiacSign};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ephemeris::{BodyPosition, Point, PointKind};
use crate::houses::HouseCusps;

/// Daily speed (deg/day) below which a body counts as stationary
pub const DEFAULT_STATIONARY_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Direct,
    Retrograde,
    Stationary,
}

impl MotionState {
    pub fn from_speed(speed: f64, epsilon: f64) -> Self {
        if speed.abs() < epsilon {
            MotionState::Stationary
        } else if speed < 0.0 {
            MotionState::Retrograde
        } else {
            MotionState::Direct
        }
    }

    pub fn is_retrograde(&self) -> bool {
        *self == MotionState::Retrograde
    }
}

/// One body (or point) as it appears in a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub point: Point,
    pub kind: PointKind,
    pub sign: ZodiacSign,
    /// 0-based, Aries = 0
    pub sign_index: u8,
    /// Degree within the sign, [0, 30)
    pub degree: f64,
    /// Absolute ecliptic longitude in the chart's zodiac
    pub longitude: f64,
    pub latitude: f64,
    pub distance: f64,
    /// Degrees per day
    pub speed: f64,
    /// 1-12, absent when the chart has no houses
    pub house: Option<u8>,
    pub motion: MotionState,
    pub element: Element,
    pub quality: Quality,
}

impl Placement {
    pub fn is_retrograde(&self) -> bool {
        self.motion.is_retrograde()
    }
}

/// Builds placements from positions that are already in the chart's zodiac
#[derive(Debug, Clone, Copy)]
pub struct PlacementAssembler {
    stationary_epsilon: f64,
}

impl Default for PlacementAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_STATIONARY_EPSILON)
    }
}

impl PlacementAssembler {
    pub fn new(stationary_epsilon: f64) -> Self {
        Self { stationary_epsilon }
    }

    pub fn place(&self, point: Point, position: &BodyPosition, houses: Option<&HouseCusps>) -> Placement {
        let (sign, degree) = sign_of(position.longitude);
        Placement {
            point,
            kind: point.kind(),
            sign,
            sign_index: sign.index(),
            degree,
            longitude: position.longitude,
            latitude: position.latitude,
            distance: position.distance,
            speed: position.speed,
            house: houses.map(|h| h.house_of(position.longitude)),
            motion: MotionState::from_speed(position.speed, self.stationary_epsilon),
            element: sign.element(),
            quality: sign.quality(),
        }
    }

    /// Placements in canonical point order
    pub fn assemble(
        &self,
        positions: &BTreeMap<Point, BodyPosition>,
        houses: Option<&HouseCusps>,
    ) -> Vec<Placement> {
        positions
            .iter()
            .map(|(point, position)| self.place(*point, position, houses))
            .collect()
    }
}
