use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::astronomy::normalize_degrees;
use crate::error::AstroError;
use crate::zodiac::ayanamsha::{AyanamshaModel, AyanamshaTable, SiderealMode};

/// Tropical or sidereal reckoning of longitudes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ZodiacType {
    #[default]
    Tropical,
    Sidereal,
}

impl ZodiacType {
    pub fn name(&self) -> &'static str {
        match self {
            ZodiacType::Tropical => "tropic",
            ZodiacType::Sidereal => "sidereal",
        }
    }
}

impl fmt::Display for ZodiacType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ZodiacType {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tropic" | "tropical" => Ok(ZodiacType::Tropical),
            "sidereal" => Ok(ZodiacType::Sidereal),
            _ => Err(AstroError::unsupported("zodiac_type", s, ["tropic", "sidereal"])),
        }
    }
}

impl From<ZodiacType> for String {
    fn from(z: ZodiacType) -> Self {
        z.name().to_string()
    }
}

impl TryFrom<String> for ZodiacType {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Converts raw tropical longitudes into the requested zodiac
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZodiacFrame {
    zodiac_type: ZodiacType,
    mode: Option<SiderealMode>,
    model: Option<AyanamshaModel>,
}

impl ZodiacFrame {
    pub fn tropical() -> Self {
        Self {
            zodiac_type: ZodiacType::Tropical,
            mode: None,
            model: None,
        }
    }

    /// Build a frame, enforcing that a sidereal zodiac names its mode and a
    /// tropical one does not.
    pub fn new(
        zodiac_type: ZodiacType,
        mode: Option<SiderealMode>,
        table: &AyanamshaTable,
    ) -> Result<Self, AstroError> {
        match (zodiac_type, mode) {
            (ZodiacType::Tropical, None) => Ok(Self::tropical()),
            (ZodiacType::Tropical, Some(mode)) => Err(AstroError::UnsupportedConfiguration {
                field: "sidereal_mode".to_string(),
                value: mode.to_string(),
                valid: vec!["(none) with a tropical zodiac".to_string()],
            }),
            (ZodiacType::Sidereal, None) => Err(AstroError::MissingAyanamsha),
            (ZodiacType::Sidereal, Some(mode)) => {
                let model = *table.model(mode).ok_or_else(|| {
                    AstroError::unsupported("sidereal_mode", mode.name(), table.modes().map(|m| m.name()))
                })?;
                Ok(Self {
                    zodiac_type,
                    mode: Some(mode),
                    model: Some(model),
                })
            }
        }
    }

    pub fn zodiac_type(&self) -> ZodiacType {
        self.zodiac_type
    }

    pub fn sidereal_mode(&self) -> Option<SiderealMode> {
        self.mode
    }

    /// Ayanamsha at `jd` (zero for the tropical zodiac)
    pub fn ayanamsha(&self, jd: f64) -> f64 {
        self.model.map_or(0.0, |m| m.value(jd))
    }

    /// Tropical longitude to this frame
    pub fn apply(&self, tropical_longitude: f64, jd: f64) -> f64 {
        normalize_degrees(tropical_longitude - self.ayanamsha(jd))
    }

    /// Longitude in this frame back to tropical
    pub fn invert(&self, longitude: f64, jd: f64) -> f64 {
        normalize_degrees(longitude + self.ayanamsha(jd))
    }
}
