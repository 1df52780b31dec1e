use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::ephemeris::{Perspective, Point};
use crate::error::AstroError;
use crate::houses::HouseSystem;
use crate::instant::AmbiguousTimePolicy;
use crate::zodiac::{SiderealMode, ZodiacType};

/// Kind of chart to compose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ChartType {
    #[default]
    Natal,
    /// Subjects: natal first, then the transiting moment
    Transit,
    Synastry,
    /// Midpoint composite of two subjects
    Composite,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::Natal,
        ChartType::Transit,
        ChartType::Synastry,
        ChartType::Composite,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartType::Natal => "natal",
            ChartType::Transit => "transit",
            ChartType::Synastry => "synastry",
            ChartType::Composite => "composite",
        }
    }

    pub fn subject_count(&self) -> usize {
        match self {
            ChartType::Natal => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartType {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let key = match key.as_str() {
            "birth" | "radix" => "natal",
            "transits" => "transit",
            other => other,
        };
        ChartType::ALL
            .iter()
            .copied()
            .find(|c| c.name() == key)
            .ok_or_else(|| AstroError::unsupported("chart_type", s, ChartType::ALL.iter().map(|c| c.name())))
    }
}

impl From<ChartType> for String {
    fn from(c: ChartType) -> Self {
        c.name().to_string()
    }
}

impl TryFrom<String> for ChartType {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where composite house cusps come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CompositeHouseMode {
    /// Houses for the mean moment at the mean location of the two subjects
    #[default]
    DerivedMidpoint,
    /// Composite placements carry no houses
    Unavailable,
}

impl CompositeHouseMode {
    pub fn name(&self) -> &'static str {
        match self {
            CompositeHouseMode::DerivedMidpoint => "derived_midpoint",
            CompositeHouseMode::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for CompositeHouseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompositeHouseMode {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "derived_midpoint" | "midpoint" => Ok(CompositeHouseMode::DerivedMidpoint),
            "unavailable" | "none" => Ok(CompositeHouseMode::Unavailable),
            _ => Err(AstroError::unsupported(
                "composite_houses",
                s,
                ["derived_midpoint", "unavailable"],
            )),
        }
    }
}

impl From<CompositeHouseMode> for String {
    fn from(m: CompositeHouseMode) -> Self {
        m.name().to_string()
    }
}

impl TryFrom<String> for CompositeHouseMode {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-request calculation options. Absent values take the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub zodiac_type: ZodiacType,
    /// Required exactly when `zodiac_type` is sidereal
    pub sidereal_mode: Option<SiderealMode>,
    pub house_system: Option<HouseSystem>,
    pub perspective: Perspective,
    pub active_points: Option<Vec<Point>>,
    /// Aspect name to orb in degrees; naming an aspect enables it
    pub orb_overrides: HashMap<String, f64>,
    pub include_minor_aspects: Option<bool>,
    pub composite_houses: Option<CompositeHouseMode>,
    pub ambiguous_time: Option<AmbiguousTimePolicy>,
}

impl ChartOptions {
    pub fn sidereal(mode: SiderealMode) -> Self {
        Self {
            zodiac_type: ZodiacType::Sidereal,
            sidereal_mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn with_house_system(mut self, system: HouseSystem) -> Self {
        self.house_system = Some(system);
        self
    }

    pub fn with_active_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.active_points = Some(points.into_iter().collect());
        self
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn with_orb(mut self, aspect: impl Into<String>, orb: f64) -> Self {
        self.orb_overrides.insert(aspect.into(), orb);
        self
    }
}
