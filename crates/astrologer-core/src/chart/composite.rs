//! Midpoint composite helpers.

use std::collections::BTreeMap;

use crate::astronomy::{asin_deg, normalize_degrees, signed_delta};
use crate::ephemeris::{BodyPosition, Point};
use crate::error::AstroError;
use crate::instant::{GeoPosition, Instant};
use crate::placement::Placement;

/// Shorter-arc midpoint of two longitudes.
///
/// Points exactly opposite have two midpoints; the one 90 degrees ahead of
/// `a` is returned.
pub fn circular_midpoint(a: f64, b: f64) -> f64 {
    normalize_degrees(a + signed_delta(a, b) / 2.0)
}

/// Midpoint positions for every point present in both sets
pub fn midpoint_positions(a: &[Placement], b: &[Placement]) -> BTreeMap<Point, BodyPosition> {
    a.iter()
        .filter_map(|pa| {
            let pb = b.iter().find(|p| p.point == pa.point)?;
            Some((
                pa.point,
                BodyPosition {
                    longitude: circular_midpoint(pa.longitude, pb.longitude),
                    latitude: (pa.latitude + pb.latitude) / 2.0,
                    distance: (pa.distance + pb.distance) / 2.0,
                    speed: (pa.speed + pb.speed) / 2.0,
                },
            ))
        })
        .collect()
}

/// Mean of two places on the sphere.
///
/// Antipodal places have no defined mean direction; their latitudes are
/// averaged and the longitude midpoint taken instead.
pub fn midpoint_location(a: GeoPosition, b: GeoPosition) -> Result<GeoPosition, AstroError> {
    let unit = |g: GeoPosition| {
        let (lat, lon) = (g.latitude.to_radians(), g.longitude.to_radians());
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    };
    let (ua, ub) = (unit(a), unit(b));
    let [x, y, z] = [ua[0] + ub[0], ua[1] + ub[1], ua[2] + ub[2]];
    let norm = (x * x + y * y + z * z).sqrt();
    let altitude = (a.altitude + b.altitude) / 2.0;

    if norm < 1e-9 {
        let longitude = to_signed_longitude(circular_midpoint(a.longitude, b.longitude));
        return GeoPosition::new((a.latitude + b.latitude) / 2.0, longitude, altitude);
    }
    let latitude = asin_deg(z / norm);
    let longitude = if x.abs() < 1e-15 && y.abs() < 1e-15 {
        0.0
    } else {
        y.atan2(x).to_degrees()
    };
    GeoPosition::new(latitude, longitude, altitude)
}

fn to_signed_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// The moment halfway between two instants, at the mean location
pub fn midpoint_instant(a: &Instant, b: &Instant) -> Result<Instant, AstroError> {
    let location = midpoint_location(a.location(), b.location())?;
    let utc = a.utc() + (b.utc() - a.utc()) / 2;
    Ok(Instant::from_utc(utc, location))
}
