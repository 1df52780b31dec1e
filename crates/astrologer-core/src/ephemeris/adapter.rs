use log::debug;
use std::env;
use std::path::PathBuf;
use swisseph::swe::{calc_ut, set_ephe_path};

use crate::ephemeris::provider::EphemerisProvider;
use crate::ephemeris::types::{BodyPosition, EphemerisError, Perspective, Point};
use crate::instant::Instant;

// Swiss Ephemeris body codes
const BODY_CODES: &[(Point, u32)] = &[
    (Point::Sun, 0),
    (Point::Moon, 1),
    (Point::Mercury, 2),
    (Point::Venus, 3),
    (Point::Mars, 4),
    (Point::Jupiter, 5),
    (Point::Saturn, 6),
    (Point::Uranus, 7),
    (Point::Neptune, 8),
    (Point::Pluto, 9),
    (Point::MeanNode, 10),
    (Point::TrueNode, 11),
    (Point::MeanLilith, 12),
    (Point::Chiron, 15),
];

const FLG_SWIEPH: u32 = 2;
const FLG_HELCTR: u32 = 8;
const FLG_SPEED: u32 = 256;

const DEFAULT_EPHEMERIS_PATH: &str = "/usr/local/share/swisseph";

/// Provider backed by the Swiss Ephemeris data files
#[derive(Debug, Clone)]
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter. Without an explicit path, `SWISS_EPHEMERIS_PATH`
    /// is consulted before the system default.
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EPHEMERIS_PATH))
        });

        if !path.exists() {
            return Err(EphemerisError::DataFilesMissing {
                path: path.display().to_string(),
            });
        }
        // The library keeps one global search path; every adapter re-points it
        set_ephe_path(&path.to_string_lossy());
        debug!("Swiss Ephemeris data at {}", path.display());

        Ok(Self {
            ephemeris_path: path,
        })
    }

    pub fn ephemeris_path(&self) -> &PathBuf {
        &self.ephemeris_path
    }

    fn flags(&self, body: Point, perspective: Perspective) -> Result<u32, EphemerisError> {
        let mut flags = FLG_SWIEPH | FLG_SPEED;
        match perspective {
            Perspective::Geocentric => {}
            Perspective::Heliocentric => flags |= FLG_HELCTR,
            Perspective::Topocentric => {
                return Err(EphemerisError::UnsupportedBody {
                    body,
                    provider: self.name().to_string(),
                    reason: "topocentric positions are not exposed by this binding".to_string(),
                })
            }
        }
        Ok(flags)
    }

    fn calc(&self, body: Point, code: u32, jd: f64, flags: u32) -> Result<BodyPosition, EphemerisError> {
        let result = calc_ut(jd, code, flags).map_err(|e| EphemerisError::CalculationFailed {
            body,
            message: format!("Swiss Ephemeris error: {}", e),
        })?;
        let out = result.out;
        Ok(BodyPosition {
            longitude: out[0].rem_euclid(360.0),
            latitude: out[1],
            distance: out[2],
            speed: out[3],
        })
    }
}

impl EphemerisProvider for SwissEphemerisAdapter {
    fn name(&self) -> &str {
        "swisseph"
    }

    fn position(
        &self,
        body: Point,
        instant: &Instant,
        perspective: Perspective,
    ) -> Result<BodyPosition, EphemerisError> {
        if !body.available_in(perspective) {
            return Err(EphemerisError::UnsupportedBody {
                body,
                provider: self.name().to_string(),
                reason: format!("not defined for a {perspective} chart"),
            });
        }
        let flags = self.flags(body, perspective)?;
        let jd = instant.julian_day_ut();

        // South nodes mirror their north node
        let (lookup, mirrored) = match body {
            Point::MeanSouthNode => (Point::MeanNode, true),
            Point::TrueSouthNode => (Point::TrueNode, true),
            other => (other, false),
        };
        let code = BODY_CODES
            .iter()
            .find(|(p, _)| *p == lookup)
            .map(|(_, code)| *code)
            .ok_or_else(|| EphemerisError::UnsupportedBody {
                body,
                provider: self.name().to_string(),
                reason: "no Swiss Ephemeris body code".to_string(),
            })?;

        let mut position = self.calc(body, code, jd, flags)?;
        if mirrored {
            position.longitude = (position.longitude + 180.0).rem_euclid(360.0);
            position.latitude = -position.latitude;
        }
        Ok(position)
    }
}
