use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AstroError;

/// Supported house division systems
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HouseSystem {
    #[default]
    Placidus,
    Koch,
    Porphyry,
    Regiomontanus,
    Campanus,
    /// Equal houses from the Ascendant
    Equal,
    /// Equal houses with the Ascendant in the middle of the first house
    Vehlow,
    WholeSign,
    Morinus,
    /// Axial rotation: equal arcs of right ascension from the RAMC
    Meridian,
    Alcabitius,
    /// Polich-Page
    Topocentric,
}

impl HouseSystem {
    pub const ALL: [HouseSystem; 12] = [
        HouseSystem::Placidus,
        HouseSystem::Koch,
        HouseSystem::Porphyry,
        HouseSystem::Regiomontanus,
        HouseSystem::Campanus,
        HouseSystem::Equal,
        HouseSystem::Vehlow,
        HouseSystem::WholeSign,
        HouseSystem::Morinus,
        HouseSystem::Meridian,
        HouseSystem::Alcabitius,
        HouseSystem::Topocentric,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HouseSystem::Placidus => "placidus",
            HouseSystem::Koch => "koch",
            HouseSystem::Porphyry => "porphyry",
            HouseSystem::Regiomontanus => "regiomontanus",
            HouseSystem::Campanus => "campanus",
            HouseSystem::Equal => "equal",
            HouseSystem::Vehlow => "vehlow",
            HouseSystem::WholeSign => "whole_sign",
            HouseSystem::Morinus => "morinus",
            HouseSystem::Meridian => "meridian",
            HouseSystem::Alcabitius => "alcabitius",
            HouseSystem::Topocentric => "topocentric",
        }
    }

    /// Conventional single-letter identifier
    pub fn code(&self) -> char {
        match self {
            HouseSystem::Placidus => 'P',
            HouseSystem::Koch => 'K',
            HouseSystem::Porphyry => 'O',
            HouseSystem::Regiomontanus => 'R',
            HouseSystem::Campanus => 'C',
            HouseSystem::Equal => 'A',
            HouseSystem::Vehlow => 'V',
            HouseSystem::WholeSign => 'W',
            HouseSystem::Morinus => 'M',
            HouseSystem::Meridian => 'X',
            HouseSystem::Alcabitius => 'B',
            HouseSystem::Topocentric => 'T',
        }
    }

    /// Systems whose cusps 1, 4, 7 and 10 are the angles
    pub fn is_quadrant(&self) -> bool {
        matches!(
            self,
            HouseSystem::Placidus
                | HouseSystem::Koch
                | HouseSystem::Porphyry
                | HouseSystem::Regiomontanus
                | HouseSystem::Campanus
                | HouseSystem::Alcabitius
                | HouseSystem::Topocentric
        )
    }

    /// Systems built on semi-arcs of the Ascendant or of ecliptic points,
    /// which lose meaning inside the polar circle.
    pub fn needs_semi_arcs(&self) -> bool {
        matches!(
            self,
            HouseSystem::Placidus | HouseSystem::Koch | HouseSystem::Alcabitius
        )
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HouseSystem {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let upper = c.to_ascii_uppercase();
            if upper == 'E' {
                return Ok(HouseSystem::Equal);
            }
            if let Some(system) = HouseSystem::ALL.iter().find(|h| h.code() == upper) {
                return Ok(*system);
            }
        }

        let key = trimmed.to_lowercase().replace([' ', '-'], "_");
        let key = key.trim_end_matches("_houses").trim_end_matches("_house");
        let found = match key {
            "equal" | "equal_asc" => Some(HouseSystem::Equal),
            "whole_sign" | "wholesign" | "whole" => Some(HouseSystem::WholeSign),
            "axial_rotation" | "meridian" => Some(HouseSystem::Meridian),
            "alcabitus" | "alcabitius" => Some(HouseSystem::Alcabitius),
            "polich_page" | "topocentric" => Some(HouseSystem::Topocentric),
            other => HouseSystem::ALL.iter().copied().find(|h| h.name() == other),
        };
        found.ok_or_else(|| {
            AstroError::unsupported("house_system", s, HouseSystem::ALL.iter().map(|h| h.name()))
        })
    }
}

impl From<HouseSystem> for String {
    fn from(h: HouseSystem) -> Self {
        h.name().to_string()
    }
}

impl TryFrom<String> for HouseSystem {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
