//! House System Calculator.

pub mod algorithms;
pub mod system;

pub use system::HouseSystem;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::astronomy::{local_apparent_sidereal_time, normalize_degrees, true_obliquity};
use crate::error::AstroError;
use crate::instant::Instant;
use crate::zodiac::ZodiacFrame;
use algorithms::{arc_forward, is_cyclic};

/// Twelve cusps plus the four angles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusps {
    pub system: HouseSystem,
    /// Cusp longitudes, house 1 first
    pub cusps: [f64; 12],
    pub ascendant: f64,
    pub midheaven: f64,
    pub descendant: f64,
    pub imum_coeli: f64,
    /// Right ascension of the MC (local apparent sidereal time), degrees
    pub armc: f64,
    pub obliquity: f64,
}

impl HouseCusps {
    /// House (1-12) whose interval contains `longitude`, walking cusps
    /// cyclically with wraparound at 360.
    pub fn house_of(&self, longitude: f64) -> u8 {
        let lon = normalize_degrees(longitude);
        for i in 0..12 {
            let start = self.cusps[i];
            let width = arc_forward(start, self.cusps[(i + 1) % 12]);
            if arc_forward(start, lon) < width {
                return (i + 1) as u8;
            }
        }
        // Only reachable through rounding at a cusp boundary
        self.nearest_cusp(lon)
    }

    fn nearest_cusp(&self, lon: f64) -> u8 {
        let mut best = (0, f64::MAX);
        for (i, &cusp) in self.cusps.iter().enumerate() {
            let d = arc_forward(cusp, lon);
            if d < best.1 {
                best = (i, d);
            }
        }
        (best.0 + 1) as u8
    }

    pub fn cusp(&self, house: u8) -> Option<f64> {
        (1..=12)
            .contains(&house)
            .then(|| self.cusps[usize::from(house) - 1])
    }

    /// Re-express the cusps in another zodiac frame.
    ///
    /// Whole-sign cusps are rebuilt from the shifted Ascendant so they stay
    /// on sign boundaries of the target frame.
    pub fn in_frame(&self, frame: &ZodiacFrame, jd: f64) -> HouseCusps {
        let shift = |lon: f64| frame.apply(lon, jd);
        let ascendant = shift(self.ascendant);
        let cusps = if self.system == HouseSystem::WholeSign {
            algorithms::whole_sign(ascendant)
        } else {
            self.cusps.map(shift)
        };
        HouseCusps {
            system: self.system,
            cusps,
            ascendant,
            midheaven: shift(self.midheaven),
            descendant: shift(self.descendant),
            imum_coeli: shift(self.imum_coeli),
            armc: self.armc,
            obliquity: self.obliquity,
        }
    }
}

/// Dispatches to the house algorithms and enforces the polar policy
#[derive(Debug, Clone, Copy, Default)]
pub struct HouseCalculator;

impl HouseCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Tropical cusps for an instant and its location
    pub fn for_instant(
        &self,
        system: HouseSystem,
        instant: &Instant,
    ) -> Result<HouseCusps, AstroError> {
        let location = instant.location();
        let armc = local_apparent_sidereal_time(instant.julian_day_ut(), location.longitude);
        let obliquity = true_obliquity(instant.julian_day_tt());
        self.compute(system, armc, location.latitude, obliquity)
    }

    /// Tropical cusps from sidereal time, latitude and obliquity (all degrees)
    pub fn compute(
        &self,
        system: HouseSystem,
        armc: f64,
        latitude: f64,
        obliquity: f64,
    ) -> Result<HouseCusps, AstroError> {
        let undefined = |reason: &str| AstroError::HouseSystemUndefined {
            system,
            latitude,
            reason: reason.to_string(),
        };

        if latitude.abs() >= 90.0 {
            return Err(undefined("the horizon coincides with the equator at the poles"));
        }
        if system.needs_semi_arcs() && latitude.abs() >= 90.0 - obliquity {
            return Err(undefined("inside the polar circle some ecliptic degrees never rise"));
        }

        let armc = normalize_degrees(armc);
        let ascendant = algorithms::ascendant(armc, latitude, obliquity);
        let midheaven = algorithms::midheaven(armc, obliquity);

        let cusps = match system {
            HouseSystem::Placidus => algorithms::placidus(armc, latitude, obliquity),
            HouseSystem::Koch => algorithms::koch(armc, latitude, obliquity),
            HouseSystem::Alcabitius => algorithms::alcabitius(armc, latitude, obliquity),
            HouseSystem::Porphyry => Ok(algorithms::porphyry(ascendant, midheaven)),
            HouseSystem::Regiomontanus => Ok(algorithms::regiomontanus(armc, latitude, obliquity)),
            HouseSystem::Campanus => Ok(algorithms::campanus(armc, latitude, obliquity)),
            HouseSystem::Topocentric => Ok(algorithms::topocentric(armc, latitude, obliquity)),
            HouseSystem::Equal => Ok(algorithms::equal(ascendant)),
            HouseSystem::Vehlow => Ok(algorithms::vehlow(ascendant)),
            HouseSystem::WholeSign => Ok(algorithms::whole_sign(ascendant)),
            HouseSystem::Morinus => Ok(algorithms::morinus(armc, obliquity)),
            HouseSystem::Meridian => Ok(algorithms::meridian(armc, obliquity)),
        }
        .map_err(undefined)?;

        if cusps.iter().any(|c| !c.is_finite()) {
            return Err(undefined("cusp calculation produced a non-finite value"));
        }
        if !is_cyclic(&cusps) {
            return Err(undefined("cusps are not in zodiacal order at this latitude"));
        }

        debug!(
            "{} houses at ARMC {:.4}, lat {:.4}: ASC {:.4} MC {:.4}",
            system, armc, latitude, ascendant, midheaven
        );

        Ok(HouseCusps {
            system,
            cusps,
            ascendant,
            midheaven,
            descendant: normalize_degrees(ascendant + 180.0),
            imum_coeli: normalize_degrees(midheaven + 180.0),
            armc,
            obliquity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const EPS: f64 = 23.4393;

    #[test]
    fn test_house_of_wraps_through_aries() {
        let houses = HouseCalculator::new()
            .compute(HouseSystem::Equal, 0.0, 0.0, EPS)
            .unwrap();
        // Ascendant is 90, so house 10 starts at 0 and house 9 at 330
        assert_eq!(houses.house_of(95.0), 1);
        assert_eq!(houses.house_of(350.0), 9);
        assert_eq!(houses.house_of(0.0), 10);
        assert_eq!(houses.house_of(89.999), 12);
    }

    #[test]
    fn test_angles_are_opposite() {
        let houses = HouseCalculator::new()
            .compute(HouseSystem::Placidus, 200.0, 40.0, EPS)
            .unwrap();
        assert!((arc_forward(houses.ascendant, houses.descendant) - 180.0).abs() < 1e-9);
        assert!((arc_forward(houses.midheaven, houses.imum_coeli) - 180.0).abs() < 1e-9);
        assert_eq!(houses.cusps[0], houses.ascendant);
        assert_eq!(houses.cusps[9], houses.midheaven);
    }

    #[test]
    fn test_pole_is_undefined_for_every_system() {
        for system in HouseSystem::ALL {
            let err = HouseCalculator::new().compute(system, 10.0, 90.0, EPS).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::HouseSystemUndefined, "{system}");
        }
    }

    #[test]
    fn test_polar_circle_rejects_semi_arc_systems_only() {
        let calc = HouseCalculator::new();
        for system in [HouseSystem::Placidus, HouseSystem::Koch, HouseSystem::Alcabitius] {
            assert!(calc.compute(system, 10.0, 70.0, EPS).is_err(), "{system}");
        }
        for system in [HouseSystem::Equal, HouseSystem::WholeSign, HouseSystem::Meridian] {
            assert!(calc.compute(system, 10.0, 70.0, EPS).is_ok(), "{system}");
        }
    }

    #[test]
    fn test_sidereal_whole_sign_stays_on_boundaries() {
        use crate::zodiac::{AyanamshaTable, SiderealMode, ZodiacType};
        let frame = ZodiacFrame::new(
            ZodiacType::Sidereal,
            Some(SiderealMode::Lahiri),
            AyanamshaTable::builtin(),
        )
        .unwrap();
        let houses = HouseCalculator::new()
            .compute(HouseSystem::WholeSign, 33.0, 45.0, EPS)
            .unwrap()
            .in_frame(&frame, crate::astronomy::J2000);
        for cusp in houses.cusps {
            assert!((cusp / 30.0 - (cusp / 30.0).round()).abs() < 1e-9, "{cusp}");
        }
        assert!(houses.cusps[0] <= houses.ascendant && houses.ascendant < houses.cusps[0] + 30.0);
    }

    #[test]
    fn test_cusp_accessor() {
        let houses = HouseCalculator::new()
            .compute(HouseSystem::Porphyry, 0.0, 10.0, EPS)
            .unwrap();
        assert_eq!(houses.cusp(1), Some(houses.ascendant));
        assert_eq!(houses.cusp(13), None);
    }
}
