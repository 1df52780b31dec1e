use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ephemeris::Point;
use crate::error::AstroError;

/// Canonical aspect angles, ordered by angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AspectKind {
    Conjunction,
    SemiSextile,
    SemiSquare,
    Sextile,
    Quintile,
    Square,
    Trine,
    Sesquiquadrate,
    Biquintile,
    Quincunx,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 11] = [
        AspectKind::Conjunction,
        AspectKind::SemiSextile,
        AspectKind::SemiSquare,
        AspectKind::Sextile,
        AspectKind::Quintile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Sesquiquadrate,
        AspectKind::Biquintile,
        AspectKind::Quincunx,
        AspectKind::Opposition,
    ];

    /// Exact angle in degrees
    pub fn angle(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::SemiSextile => 30.0,
            AspectKind::SemiSquare => 45.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Quintile => 72.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Sesquiquadrate => 135.0,
            AspectKind::Biquintile => 144.0,
            AspectKind::Quincunx => 150.0,
            AspectKind::Opposition => 180.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::SemiSextile => "semi_sextile",
            AspectKind::SemiSquare => "semi_square",
            AspectKind::Sextile => "sextile",
            AspectKind::Quintile => "quintile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Sesquiquadrate => "sesquiquadrate",
            AspectKind::Biquintile => "biquintile",
            AspectKind::Quincunx => "quincunx",
            AspectKind::Opposition => "opposition",
        }
    }

    /// Multiples of 30 degrees; the rest are opt-in
    pub fn is_major(&self) -> bool {
        !matches!(
            self,
            AspectKind::SemiSquare
                | AspectKind::Quintile
                | AspectKind::Sesquiquadrate
                | AspectKind::Biquintile
        )
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectKind {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        let found = match key.as_str() {
            "semisextile" => Some(AspectKind::SemiSextile),
            "semisquare" | "octile" => Some(AspectKind::SemiSquare),
            "sesquisquare" | "sesqui_square" | "sesqui_quadrate" | "trioctile" => {
                Some(AspectKind::Sesquiquadrate)
            }
            "bi_quintile" => Some(AspectKind::Biquintile),
            "inconjunct" => Some(AspectKind::Quincunx),
            other => AspectKind::ALL.iter().copied().find(|k| k.name() == other),
        };
        found.ok_or_else(|| {
            AstroError::unsupported("orb_overrides", s, AspectKind::ALL.iter().map(|k| k.name()))
        })
    }
}

impl From<AspectKind> for String {
    fn from(kind: AspectKind) -> Self {
        kind.name().to_string()
    }
}

impl TryFrom<String> for AspectKind {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether an aspect is tightening or loosening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMotion {
    Applying,
    Separating,
    /// Separation sits on the exact angle
    Exact,
    /// The two bodies keep their separation (no relative motion)
    Stationary,
}

/// One side of an aspect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectEnd {
    /// Index of the owning subject within the chart
    pub subject: usize,
    pub point: Point,
    pub longitude: f64,
    pub speed: f64,
}

/// An angular relationship between two placements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub first: AspectEnd,
    pub second: AspectEnd,
    pub kind: AspectKind,
    /// Exact angle of `kind`
    pub angle: f64,
    /// Shorter-arc separation, [0, 180]
    pub separation: f64,
    /// `separation - angle`; negative when inside the exact angle
    pub orb: f64,
    pub motion: AspectMotion,
    /// `second.speed - first.speed`, degrees per day
    pub relative_speed: f64,
}

impl Aspect {
    pub fn abs_orb(&self) -> f64 {
        self.orb.abs()
    }

    pub fn involves(&self, point: Point) -> bool {
        self.first.point == point || self.second.point == point
    }

    /// True when the two ends are exactly the given points, in either order
    pub fn connects(&self, a: Point, b: Point) -> bool {
        (self.first.point == a && self.second.point == b)
            || (self.first.point == b && self.second.point == a)
    }

    pub fn is_applying(&self) -> bool {
        self.motion == AspectMotion::Applying
    }
}
