use serde::{Deserialize, Serialize};

use crate::aspects::Aspect;
use crate::chart::lunar_phase::LunarPhase;
use crate::chart::options::ChartType;
use crate::chart::relationship::RelationshipScore;
use crate::ephemeris::{Perspective, Point};
use crate::houses::{HouseCusps, HouseSystem};
use crate::instant::Instant;
use crate::placement::Placement;
use crate::zodiac::{SiderealMode, ZodiacType};

/// One subject as computed for a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectChart {
    pub name: String,
    pub instant: Instant,
    pub zodiac_type: ZodiacType,
    pub sidereal_mode: Option<SiderealMode>,
    /// Ayanamsha applied, degrees (zero for the tropical zodiac)
    pub ayanamsha: f64,
    pub house_system: HouseSystem,
    pub perspective: Perspective,
    /// Cusps that the placements' house numbers refer to. For the moment of a
    /// transit chart these are the natal cusps.
    pub houses: Option<HouseCusps>,
    pub placements: Vec<Placement>,
    pub lunar_phase: Option<LunarPhase>,
}

impl SubjectChart {
    pub fn placement(&self, point: Point) -> Option<&Placement> {
        self.placements.iter().find(|p| p.point == point)
    }
}

/// A point of one subject located in another subject's houses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseOverlay {
    /// Subject owning the point
    pub subject: usize,
    pub point: Point,
    /// Subject whose houses are used
    pub houses_of: usize,
    pub house: u8,
}

/// A computed chart. Subjects are indexed as follows:
///
/// - natal: `[subject]`
/// - transit: `[natal, moment]`
/// - synastry: `[first, second]`
/// - composite: `[first, second, composite]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub chart_type: ChartType,
    pub subjects: Vec<SubjectChart>,
    pub aspects: Vec<Aspect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub house_overlays: Vec<HouseOverlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipScore>,
}

impl Chart {
    pub fn subject(&self, index: usize) -> Option<&SubjectChart> {
        self.subjects.get(index)
    }

    /// The subject the chart is primarily about (the composite for composites)
    pub fn primary(&self) -> Option<&SubjectChart> {
        match self.chart_type {
            ChartType::Composite => self.subjects.last(),
            _ => self.subjects.first(),
        }
    }
}
