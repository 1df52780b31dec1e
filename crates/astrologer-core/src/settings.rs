//! Engine-wide defaults loaded from TOML.
//!
//! The file mirrors [`EngineSettings`]; every key is optional:
//!
//! ```toml
//! ephemeris_timeout_ms = 5000
//! stationary_epsilon = 0.001
//! house_system = "placidus"
//! ambiguous_time = "earliest"
//! composite_houses = "derived_midpoint"
//! default_active_points = ["sun", "moon", "ascendant"]
//!
//! [orbs]
//! conjunction = 8.0
//! quintile = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aspects::orbs::validate_orb;
use crate::aspects::{default_orb_table, AspectKind};
use crate::chart::options::CompositeHouseMode;
use crate::ephemeris::Point;
use crate::houses::HouseSystem;
use crate::instant::AmbiguousTimePolicy;
use crate::placement::DEFAULT_STATIONARY_EPSILON;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Validated engine configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSettings {
    /// Upper bound on one asynchronous chart computation
    pub ephemeris_timeout_ms: u64,
    /// Daily speed (deg/day) treated as stationary
    pub stationary_epsilon: f64,
    /// Orb per aspect kind for kinds that are enabled
    pub orbs: BTreeMap<AspectKind, f64>,
    /// Include the minor aspects when a request does not say
    pub include_minor_aspects: bool,
    pub default_active_points: Vec<Point>,
    pub house_system: HouseSystem,
    pub ambiguous_time: AmbiguousTimePolicy,
    pub composite_houses: CompositeHouseMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSettingsToml {
    #[serde(default = "default_timeout_ms")]
    ephemeris_timeout_ms: u64,
    #[serde(default = "default_stationary_epsilon")]
    stationary_epsilon: f64,
    #[serde(default)]
    orbs: BTreeMap<String, f64>,
    #[serde(default)]
    include_minor_aspects: bool,
    #[serde(default)]
    default_active_points: Option<Vec<String>>,
    #[serde(default)]
    house_system: Option<String>,
    #[serde(default)]
    ambiguous_time: Option<String>,
    #[serde(default)]
    composite_houses: Option<String>,
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_stationary_epsilon() -> f64 {
    DEFAULT_STATIONARY_EPSILON
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ephemeris_timeout_ms: default_timeout_ms(),
            stationary_epsilon: default_stationary_epsilon(),
            orbs: default_orb_table(),
            include_minor_aspects: false,
            default_active_points: Point::DEFAULT_ACTIVE.to_vec(),
            house_system: HouseSystem::default(),
            ambiguous_time: AmbiguousTimePolicy::default(),
            composite_houses: CompositeHouseMode::default(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let raw: EngineSettingsToml = toml::from_str(text)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: EngineSettingsToml) -> Result<Self, SettingsError> {
        let invalid = |e: crate::error::AstroError| SettingsError::Invalid(e.to_string());

        if raw.ephemeris_timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "ephemeris_timeout_ms must be positive".to_string(),
            ));
        }
        if !raw.stationary_epsilon.is_finite() || raw.stationary_epsilon < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "stationary_epsilon must be a non-negative number, got {}",
                raw.stationary_epsilon
            )));
        }

        let mut orbs = default_orb_table();
        for (name, orb) in &raw.orbs {
            let kind: AspectKind = name.parse().map_err(invalid)?;
            validate_orb(name, *orb).map_err(invalid)?;
            orbs.insert(kind, *orb);
        }

        let default_active_points = match raw.default_active_points {
            Some(names) => names
                .iter()
                .map(|n| n.parse::<Point>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?,
            None => Point::DEFAULT_ACTIVE.to_vec(),
        };

        Ok(Self {
            ephemeris_timeout_ms: raw.ephemeris_timeout_ms,
            stationary_epsilon: raw.stationary_epsilon,
            orbs,
            include_minor_aspects: raw.include_minor_aspects,
            default_active_points,
            house_system: parse_or_default(raw.house_system).map_err(invalid)?,
            ambiguous_time: parse_or_default(raw.ambiguous_time).map_err(invalid)?,
            composite_houses: parse_or_default(raw.composite_houses).map_err(invalid)?,
        })
    }
}

fn parse_or_default<T>(value: Option<String>) -> Result<T, T::Err>
where
    T: std::str::FromStr + Default,
{
    value.map_or_else(|| Ok(T::default()), |v| v.parse())
}
