//! Built-in analytic ephemeris. Needs no data files; accuracy is in the
//! arcminute range for planets and better than that for the luminaries,
//! which is ample for sign, house and aspect work.

use crate::astronomy::{
    atan2_deg, cos_deg, general_precession_deg, julian_centuries, local_apparent_sidereal_time, normalize_degrees,
    nutation, signed_delta, sin_deg, tan_deg, true_obliquity,
};
use crate::ephemeris::kepler::{earth_j2000, has_elements, heliocentric_j2000, spherical};
use crate::ephemeris::moon::{mean_lilith, mean_node, moon_position, true_node, KM_PER_AU};
use crate::ephemeris::provider::EphemerisProvider;
use crate::ephemeris::types::{BodyPosition, EphemerisError, Perspective, Point};
use crate::instant::{GeoPosition, Instant};

/// 1800-01-01 0h
const FIRST_SUPPORTED_JD: f64 = 2_378_496.5;
/// 2101-01-01 0h
const LAST_SUPPORTED_JD: f64 = 2_488_433.5;

/// Light travel time for one AU, in days
const LIGHT_TIME_PER_AU: f64 = 0.005_775_518_3;
const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_140.0;
const EARTH_AXIS_RATIO: f64 = 0.996_647_19;

/// Reference provider built from closed-form theories
#[derive(Debug, Clone)]
pub struct AnalyticEphemeris {
    /// Half-width of the central difference used for daily motion, in days
    speed_step_days: f64,
}

impl Default for AnalyticEphemeris {
    fn default() -> Self {
        Self {
            speed_step_days: 0.05,
        }
    }
}

/// Position at a single moment before speeds are derived
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    longitude: f64,
    latitude: f64,
    distance: f64,
}

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports(&self, body: Point) -> bool {
        !body.is_angle() && body != Point::Chiron
    }

    fn snapshot(
        &self,
        body: Point,
        jd_tt: f64,
        jd_ut: f64,
        location: GeoPosition,
        perspective: Perspective,
    ) -> Snapshot {
        let t = julian_centuries(jd_tt);
        let (dpsi, _) = nutation(jd_tt);

        let mut snap = match perspective {
            Perspective::Heliocentric => heliocentric(body, t),
            Perspective::Geocentric | Perspective::Topocentric => geocentric(body, t),
        };
        snap.longitude = normalize_degrees(snap.longitude + dpsi);

        if perspective == Perspective::Topocentric && snap.distance > 0.0 {
            snap = topocentric(snap, jd_ut, location, true_obliquity(jd_tt));
        }
        snap
    }
}

impl EphemerisProvider for AnalyticEphemeris {
    fn name(&self) -> &str {
        "analytic"
    }

    fn position(
        &self,
        body: Point,
        instant: &Instant,
        perspective: Perspective,
    ) -> Result<BodyPosition, EphemerisError> {
        if !self.supports(body) {
            return Err(EphemerisError::UnsupportedBody {
                body,
                provider: self.name().to_string(),
                reason: if body.is_angle() {
                    "angles come from the house calculation".to_string()
                } else {
                    "no analytic theory for this body".to_string()
                },
            });
        }
        if !body.available_in(perspective) {
            return Err(EphemerisError::UnsupportedBody {
                body,
                provider: self.name().to_string(),
                reason: format!("not defined for a {perspective} chart"),
            });
        }

        let jd_tt = instant.julian_day_tt();
        let jd_ut = instant.julian_day_ut();
        let h = self.speed_step_days;
        if jd_tt - h < FIRST_SUPPORTED_JD || jd_tt + h > LAST_SUPPORTED_JD {
            return Err(EphemerisError::OutOfRange {
                body,
                julian_day: jd_ut,
            });
        }

        let location = instant.location();
        let now = self.snapshot(body, jd_tt, jd_ut, location, perspective);
        let before = self.snapshot(body, jd_tt - h, jd_ut - h, location, perspective);
        let after = self.snapshot(body, jd_tt + h, jd_ut + h, location, perspective);
        let speed = signed_delta(before.longitude, after.longitude) / (2.0 * h);

        if !(now.longitude.is_finite() && now.latitude.is_finite() && speed.is_finite()) {
            return Err(EphemerisError::CalculationFailed {
                body,
                message: format!("non-finite result at JD {jd_ut}"),
            });
        }

        Ok(BodyPosition {
            longitude: now.longitude,
            latitude: now.latitude,
            distance: now.distance,
            speed,
        })
    }
}

/// Apparent solar position before nutation (Meeus ch. 25)
fn sun(t: f64) -> Snapshot {
    let l0 = 280.46646 + 36_000.76983 * t + 0.0003032 * t * t;
    let m = 357.52911 + 35_999.05029 * t - 0.0001537 * t * t;
    let e = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;
    let c = (1.914602 - 0.004817 * t - 0.000014 * t * t) * sin_deg(m)
        + (0.019993 - 0.000101 * t) * sin_deg(2.0 * m)
        + 0.000289 * sin_deg(3.0 * m);
    let true_longitude = l0 + c;
    let anomaly = m + c;
    let radius = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * cos_deg(anomaly));
    // annual aberration
    Snapshot {
        longitude: normalize_degrees(true_longitude - 0.00569),
        latitude: 0.0,
        distance: radius,
    }
}

fn geocentric(body: Point, t: f64) -> Snapshot {
    match body {
        Point::Sun => sun(t),
        Point::Moon => {
            let (longitude, latitude, km) = moon_position(t);
            Snapshot {
                longitude,
                latitude,
                distance: km / KM_PER_AU,
            }
        }
        Point::MeanNode => computed(mean_node(t)),
        Point::TrueNode => computed(true_node(t)),
        Point::MeanSouthNode => computed(mean_node(t) + 180.0),
        Point::TrueSouthNode => computed(true_node(t) + 180.0),
        Point::MeanLilith => computed(mean_lilith(t)),
        _ => geocentric_planet(body, t),
    }
}

fn computed(longitude: f64) -> Snapshot {
    Snapshot {
        longitude: normalize_degrees(longitude),
        latitude: 0.0,
        distance: 0.0,
    }
}

fn geocentric_planet(body: Point, t: f64) -> Snapshot {
    let earth = earth_j2000(t);
    let relative = |tt: f64| -> Option<[f64; 3]> {
        let p = heliocentric_j2000(body, tt)?;
        Some([p[0] - earth[0], p[1] - earth[1], p[2] - earth[2]])
    };
    let Some(first) = relative(t) else {
        return computed(f64::NAN);
    };
    // one light-time iteration on the planet's own position
    let (_, _, distance) = spherical(first);
    let delay = distance * LIGHT_TIME_PER_AU / 36_525.0;
    let v = relative(t - delay).unwrap_or(first);

    let (lon, lat, dist) = spherical(v);
    Snapshot {
        longitude: normalize_degrees(lon + general_precession_deg(t)),
        latitude: lat,
        distance: dist,
    }
}

fn heliocentric(body: Point, t: f64) -> Snapshot {
    if !has_elements(body) {
        return computed(f64::NAN);
    }
    let v = heliocentric_j2000(body, t).unwrap_or([f64::NAN; 3]);
    let (lon, lat, dist) = spherical(v);
    Snapshot {
        longitude: normalize_degrees(lon + general_precession_deg(t)),
        latitude: lat,
        distance: dist,
    }
}

/// Diurnal parallax in ecliptic coordinates (Meeus ch. 40)
fn topocentric(snap: Snapshot, jd_ut: f64, location: GeoPosition, obliquity: f64) -> Snapshot {
    let phi = location.latitude;
    let u = (EARTH_AXIS_RATIO * tan_deg(phi)).atan().to_degrees();
    let height = location.altitude / EARTH_EQUATORIAL_RADIUS_M;
    let rho_sin = EARTH_AXIS_RATIO * sin_deg(u) + height * sin_deg(phi);
    let rho_cos = cos_deg(u) + height * cos_deg(phi);

    let sin_parallax = sin_deg(8.794 / 3600.0) / snap.distance;
    let theta = local_apparent_sidereal_time(jd_ut, location.longitude);
    let (lambda, beta) = (snap.longitude, snap.latitude);

    let n = cos_deg(lambda) * cos_deg(beta) - rho_cos * sin_parallax * cos_deg(theta);
    let longitude = atan2_deg(
        sin_deg(lambda) * cos_deg(beta)
            - sin_parallax
                * (rho_sin * sin_deg(obliquity) + rho_cos * cos_deg(obliquity) * sin_deg(theta)),
        n,
    );
    let latitude = (cos_deg(longitude)
        * (sin_deg(beta)
            - sin_parallax
                * (rho_sin * cos_deg(obliquity) - rho_cos * sin_deg(obliquity) * sin_deg(theta)))
        / n)
        .atan()
        .to_degrees();

    Snapshot {
        longitude,
        latitude: if latitude.is_finite() { latitude } else { beta },
        distance: snap.distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn instant_at(year: i32, month: u32, day: u32, hour: u32) -> Instant {
        let utc = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
        Instant::from_utc(utc, GeoPosition::new(0.0, 0.0, 0.0).unwrap())
    }

    #[test]
    fn test_sun_matches_meeus_example() {
        // Meeus example 25.a: 1992 October 13, 0h TD -> apparent 199.90988
        let t = julian_centuries(2_448_908.5);
        let (dpsi, _) = nutation(2_448_908.5);
        let lon = normalize_degrees(sun(t).longitude + dpsi);
        assert!((lon - 199.90988).abs() < 0.01, "lon {lon}");
    }

    #[test]
    fn test_sun_moves_about_one_degree_per_day() {
        let eph = AnalyticEphemeris::new();
        let pos = eph
            .position(Point::Sun, &instant_at(2000, 6, 1, 0), Perspective::Geocentric)
            .unwrap();
        assert!((pos.speed - 0.96).abs() < 0.05, "speed {}", pos.speed);
    }

    #[test]
    fn test_venus_near_meeus_example() {
        // Meeus example 33.a: 1992 December 20, 0h TD, apparent lon 313.08102
        let jd_tt = 2_448_976.5;
        let t = julian_centuries(jd_tt);
        let lon = normalize_degrees(geocentric_planet(Point::Venus, t).longitude + nutation(jd_tt).0);
        assert!(signed_delta(313.08102, lon).abs() < 0.1, "lon {lon}");
    }

    #[test]
    fn test_mars_retrograde_in_2020() {
        // Mars stationed retrograde on 2020-09-09 and direct on 2020-11-14
        let eph = AnalyticEphemeris::new();
        let pos = eph
            .position(Point::Mars, &instant_at(2020, 10, 13, 0), Perspective::Geocentric)
            .unwrap();
        assert!(pos.speed < 0.0, "speed {}", pos.speed);
    }

    #[test]
    fn test_chiron_and_angles_unsupported() {
        let eph = AnalyticEphemeris::new();
        let at = instant_at(2000, 1, 1, 0);
        assert!(matches!(
            eph.position(Point::Chiron, &at, Perspective::Geocentric),
            Err(EphemerisError::UnsupportedBody { .. })
        ));
        assert!(eph.position(Point::Ascendant, &at, Perspective::Geocentric).is_err());
    }

    #[test]
    fn test_out_of_range_is_not_retryable() {
        let eph = AnalyticEphemeris::new();
        let err = eph
            .position(Point::Sun, &instant_at(1700, 1, 1, 0), Perspective::Geocentric)
            .unwrap_err();
        assert!(matches!(err, EphemerisError::OutOfRange { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_heliocentric_rejects_luminaries() {
        let eph = AnalyticEphemeris::new();
        let at = instant_at(2000, 1, 1, 0);
        assert!(eph.position(Point::Moon, &at, Perspective::Heliocentric).is_err());
        let mars = eph.position(Point::Mars, &at, Perspective::Heliocentric).unwrap();
        assert!((mars.distance - 1.39).abs() < 0.1);
    }

    #[test]
    fn test_topocentric_moon_shift_is_bounded() {
        let eph = AnalyticEphemeris::new();
        let at = instant_at(2010, 3, 1, 6);
        let geo = eph.position(Point::Moon, &at, Perspective::Geocentric).unwrap();
        let topo = eph.position(Point::Moon, &at, Perspective::Topocentric).unwrap();
        let shift = signed_delta(geo.longitude, topo.longitude).abs();
        assert!(shift > 0.0 && shift < 1.1, "shift {shift}");
    }

    #[test]
    fn test_positions_fan_out() {
        let eph = AnalyticEphemeris::new();
        let at = instant_at(1990, 1, 1, 0);
        let map = eph
            .positions(&at, &[Point::Sun, Point::Moon, Point::Pluto], Perspective::Geocentric)
            .unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.keys().next(), Some(&Point::Sun));
    }
}
