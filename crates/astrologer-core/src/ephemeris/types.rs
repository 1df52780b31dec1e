use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::AstroError;

/// Celestial bodies and computed points a chart can carry.
///
/// The declaration order is the canonical presentation order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Point {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
    MeanNode,
    TrueNode,
    MeanSouthNode,
    TrueSouthNode,
    MeanLilith,
    Ascendant,
    Midheaven,
    Descendant,
    ImumCoeli,
}

/// Broad category of a [`Point`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Planet,
    LunarPoint,
    Angle,
}

impl Point {
    pub const ALL: [Point; 20] = [
        Point::Sun,
        Point::Moon,
        Point::Mercury,
        Point::Venus,
        Point::Mars,
        Point::Jupiter,
        Point::Saturn,
        Point::Uranus,
        Point::Neptune,
        Point::Pluto,
        Point::Chiron,
        Point::MeanNode,
        Point::TrueNode,
        Point::MeanSouthNode,
        Point::TrueSouthNode,
        Point::MeanLilith,
        Point::Ascendant,
        Point::Midheaven,
        Point::Descendant,
        Point::ImumCoeli,
    ];

    /// Points included when a request does not name any
    pub const DEFAULT_ACTIVE: [Point; 15] = [
        Point::Sun,
        Point::Moon,
        Point::Mercury,
        Point::Venus,
        Point::Mars,
        Point::Jupiter,
        Point::Saturn,
        Point::Uranus,
        Point::Neptune,
        Point::Pluto,
        Point::MeanNode,
        Point::Ascendant,
        Point::Midheaven,
        Point::Descendant,
        Point::ImumCoeli,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Point::Sun => "sun",
            Point::Moon => "moon",
            Point::Mercury => "mercury",
            Point::Venus => "venus",
            Point::Mars => "mars",
            Point::Jupiter => "jupiter",
            Point::Saturn => "saturn",
            Point::Uranus => "uranus",
            Point::Neptune => "neptune",
            Point::Pluto => "pluto",
            Point::Chiron => "chiron",
            Point::MeanNode => "mean_node",
            Point::TrueNode => "true_node",
            Point::MeanSouthNode => "mean_south_node",
            Point::TrueSouthNode => "true_south_node",
            Point::MeanLilith => "mean_lilith",
            Point::Ascendant => "ascendant",
            Point::Midheaven => "midheaven",
            Point::Descendant => "descendant",
            Point::ImumCoeli => "imum_coeli",
        }
    }

    pub fn kind(&self) -> PointKind {
        match self {
            Point::MeanNode
            | Point::TrueNode
            | Point::MeanSouthNode
            | Point::TrueSouthNode
            | Point::MeanLilith => PointKind::LunarPoint,
            Point::Ascendant | Point::Midheaven | Point::Descendant | Point::ImumCoeli => {
                PointKind::Angle
            }
            _ => PointKind::Planet,
        }
    }

    pub fn is_angle(&self) -> bool {
        self.kind() == PointKind::Angle
    }

    /// The opposite lunar node, for node points
    pub fn paired_node(&self) -> Option<Point> {
        match self {
            Point::MeanNode => Some(Point::MeanSouthNode),
            Point::MeanSouthNode => Some(Point::MeanNode),
            Point::TrueNode => Some(Point::TrueSouthNode),
            Point::TrueSouthNode => Some(Point::TrueNode),
            _ => None,
        }
    }

    /// Whether the point has a meaning from the given vantage point.
    ///
    /// Heliocentric charts have no Sun, Moon or lunar points.
    pub fn available_in(&self, perspective: Perspective) -> bool {
        match perspective {
            Perspective::Heliocentric => {
                !matches!(self, Point::Sun | Point::Moon) && self.kind() != PointKind::LunarPoint
            }
            _ => true,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Point {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        let alias = match key.as_str() {
            "north_node" | "mean_north_node" | "mean_north_lunar_node" => Some(Point::MeanNode),
            "true_north_node" | "true_north_lunar_node" => Some(Point::TrueNode),
            "south_node" | "mean_south_lunar_node" => Some(Point::MeanSouthNode),
            "true_south_lunar_node" => Some(Point::TrueSouthNode),
            "lilith" | "black_moon_lilith" | "mean_black_moon_lilith" => Some(Point::MeanLilith),
            "asc" => Some(Point::Ascendant),
            "mc" | "medium_coeli" => Some(Point::Midheaven),
            "dsc" | "dc" => Some(Point::Descendant),
            "ic" => Some(Point::ImumCoeli),
            _ => None,
        };
        alias
            .or_else(|| Point::ALL.iter().copied().find(|p| p.name() == key))
            .ok_or_else(|| {
                AstroError::unsupported("active_points", s, Point::ALL.iter().map(|p| p.name()))
            })
    }
}

impl From<Point> for String {
    fn from(point: Point) -> Self {
        point.name().to_string()
    }
}

impl TryFrom<String> for Point {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Vantage point for body positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Perspective {
    #[default]
    Geocentric,
    Topocentric,
    Heliocentric,
}

impl Perspective {
    pub const ALL: [Perspective; 3] = [
        Perspective::Geocentric,
        Perspective::Topocentric,
        Perspective::Heliocentric,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Perspective::Geocentric => "geocentric",
            Perspective::Topocentric => "topocentric",
            Perspective::Heliocentric => "heliocentric",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Perspective {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let found = match key.as_str() {
            "geocentric" | "apparent geocentric" | "apparent_geocentric" => {
                Some(Perspective::Geocentric)
            }
            "topocentric" => Some(Perspective::Topocentric),
            "heliocentric" => Some(Perspective::Heliocentric),
            _ => None,
        };
        found.ok_or_else(|| {
            AstroError::unsupported("perspective", s, Perspective::ALL.iter().map(|p| p.name()))
        })
    }
}

impl From<Perspective> for String {
    fn from(p: Perspective) -> Self {
        p.name().to_string()
    }
}

impl TryFrom<String> for Perspective {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Raw ecliptic position of a body, as returned by a provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    /// Ecliptic longitude of date in degrees (0-360)
    pub longitude: f64,
    /// Ecliptic latitude in degrees
    pub latitude: f64,
    /// Distance in AU (zero for computed points)
    pub distance: f64,
    /// Daily motion in longitude, degrees/day; negative means retrograde
    pub speed: f64,
}

/// Errors raised by ephemeris providers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("{body} is not supported by the {provider} ephemeris: {reason}")]
    UnsupportedBody {
        body: Point,
        provider: String,
        reason: String,
    },
    #[error("{body} position at JD {julian_day} is outside the supported range")]
    OutOfRange { body: Point, julian_day: f64 },
    #[error("Ephemeris data files not found at {path}")]
    DataFilesMissing { path: String },
    #[error("Ephemeris I/O failure: {message}")]
    Io { message: String },
    #[error("Failed to calculate position for {body}: {message}")]
    CalculationFailed { body: Point, message: String },
}

impl EphemerisError {
    /// Only I/O failures are transient
    pub fn is_retryable(&self) -> bool {
        matches!(self, EphemerisError::Io { .. })
    }

    pub fn body(&self) -> Option<Point> {
        match self {
            EphemerisError::UnsupportedBody { body, .. }
            | EphemerisError::OutOfRange { body, .. }
            | EphemerisError::CalculationFailed { body, .. } => Some(*body),
            EphemerisError::Io { .. } | EphemerisError::DataFilesMissing { .. } => None,
        }
    }
}
