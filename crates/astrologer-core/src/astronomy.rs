//! Spherical astronomy helpers shared by the ephemeris, house and zodiac layers.
//!
//! All angles are in degrees unless a name says otherwise. Formulas follow
//! Meeus, *Astronomical Algorithms* (2nd ed.).

use chrono::{DateTime, Datelike, Utc};

/// Julian Day of the J2000.0 epoch (2000-01-01 12:00 TT)
pub const J2000: f64 = 2_451_545.0;

/// Days per Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Normalize an angle into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let r = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Signed shortest difference `to - from`, in (-180, 180]
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let d = normalize_degrees(to - from);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Unsigned shortest arc between two longitudes, in [0, 180]
pub fn separation(a: f64, b: f64) -> f64 {
    signed_delta(a, b).abs()
}

pub fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

pub fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

pub fn tan_deg(x: f64) -> f64 {
    x.to_radians().tan()
}

/// `atan2` returning degrees normalized into [0, 360)
pub fn atan2_deg(y: f64, x: f64) -> f64 {
    normalize_degrees(y.atan2(x).to_degrees())
}

/// `asin` in degrees with the argument clamped into [-1, 1]
pub fn asin_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin().to_degrees()
}

/// `acos` in degrees with the argument clamped into [-1, 1]
pub fn acos_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Julian Day (UT) of a UTC timestamp
pub fn julian_day(dt: DateTime<Utc>) -> f64 {
    let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    seconds / SECONDS_PER_DAY + UNIX_EPOCH_JD
}

/// Inverse of [`julian_day`]. Returns `None` outside chrono's representable range.
pub fn datetime_from_julian_day(jd: f64) -> Option<DateTime<Utc>> {
    let seconds = (jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
}

/// Julian centuries since J2000.0
pub fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

/// Decimal calendar year, good enough for Delta T lookups
pub fn decimal_year(dt: DateTime<Utc>) -> f64 {
    f64::from(dt.year()) + (f64::from(dt.month()) - 0.5) / 12.0
}

/// Delta T = TT - UT in seconds (Espenak & Meeus polynomial fits).
pub fn delta_t_seconds(year: f64) -> f64 {
    let y = year;
    if (1800.0..1860.0).contains(&y) {
        let t = y - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t.powi(2) + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if (1860.0..1900.0).contains(&y) {
        let t = y - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t.powi(2) + 0.01680668 * t.powi(3)
            - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if (1900.0..1920.0).contains(&y) {
        let t = y - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if (1920.0..1941.0).contains(&y) {
        let t = y - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if (1941.0..1961.0).contains(&y) {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if (1961.0..1986.0).contains(&y) {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if (1986.0..2005.0).contains(&y) {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if (2005.0..2050.0).contains(&y) {
        let t = y - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    } else if (2050.0..2150.0).contains(&y) {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

/// Mean obliquity of the ecliptic (IAU 1980), degrees
pub fn mean_obliquity(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    let seconds = 21.448 - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t;
    23.0 + 26.0 / 60.0 + seconds / 3600.0
}

/// Nutation in longitude and obliquity `(dpsi, deps)` in degrees.
///
/// Low-accuracy series (Meeus ch. 22), good to about half an arcsecond.
pub fn nutation(jd: f64) -> (f64, f64) {
    let t = julian_centuries(jd);
    let omega = 125.04452 - 1934.136261 * t;
    let l_sun = 280.4665 + 36000.7698 * t;
    let l_moon = 218.3165 + 481267.8813 * t;

    let dpsi = -17.20 * sin_deg(omega) - 1.32 * sin_deg(2.0 * l_sun) - 0.23 * sin_deg(2.0 * l_moon)
        + 0.21 * sin_deg(2.0 * omega);
    let deps = 9.20 * cos_deg(omega) + 0.57 * cos_deg(2.0 * l_sun) + 0.10 * cos_deg(2.0 * l_moon)
        - 0.09 * cos_deg(2.0 * omega);

    (dpsi / 3600.0, deps / 3600.0)
}

/// True obliquity: mean obliquity plus nutation in obliquity
pub fn true_obliquity(jd: f64) -> f64 {
    mean_obliquity(jd) + nutation(jd).1
}

/// IAU 2006 general precession in ecliptic longitude since J2000, degrees.
/// `t` is Julian centuries since J2000.
pub fn general_precession_deg(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;
    (5028.796195 * t + 1.1054348 * t2 + 0.00007964 * t3 - 0.000023857 * t4 - 0.0000000383 * t5)
        / 3600.0
}

/// Greenwich mean sidereal time in degrees (Meeus 12.4). `jd_ut` is UT.
pub fn gmst_degrees(jd_ut: f64) -> f64 {
    let t = julian_centuries(jd_ut);
    normalize_degrees(
        280.46061837 + 360.98564736629 * (jd_ut - J2000) + 0.000387933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Greenwich apparent sidereal time: GMST plus the equation of the equinoxes
pub fn gast_degrees(jd_ut: f64) -> f64 {
    let (dpsi, _) = nutation(jd_ut);
    normalize_degrees(gmst_degrees(jd_ut) + dpsi * cos_deg(true_obliquity(jd_ut)))
}

/// Local apparent sidereal time (the RAMC) for an east-positive longitude
pub fn local_apparent_sidereal_time(jd_ut: f64, longitude: f64) -> f64 {
    normalize_degrees(gast_degrees(jd_ut) + longitude)
}

/// Ecliptic `(lon, lat)` to equatorial `(ra, dec)`
pub fn ecliptic_to_equatorial(lon: f64, lat: f64, obliquity: f64) -> (f64, f64) {
    let ra = atan2_deg(
        sin_deg(lon) * cos_deg(obliquity) - tan_deg(lat) * sin_deg(obliquity),
        cos_deg(lon),
    );
    let dec = asin_deg(
        sin_deg(lat) * cos_deg(obliquity) + cos_deg(lat) * sin_deg(obliquity) * sin_deg(lon),
    );
    (ra, dec)
}

/// Equatorial `(ra, dec)` to ecliptic `(lon, lat)`
pub fn equatorial_to_ecliptic(ra: f64, dec: f64, obliquity: f64) -> (f64, f64) {
    let lon = atan2_deg(
        sin_deg(ra) * cos_deg(obliquity) + tan_deg(dec) * sin_deg(obliquity),
        cos_deg(ra),
    );
    let lat = asin_deg(
        sin_deg(dec) * cos_deg(obliquity) - cos_deg(dec) * sin_deg(obliquity) * sin_deg(ra),
    );
    (lon, lat)
}

/// Declination of a point on the ecliptic (zero latitude)
pub fn ecliptic_declination(lon: f64, obliquity: f64) -> f64 {
    asin_deg(sin_deg(obliquity) * sin_deg(lon))
}
