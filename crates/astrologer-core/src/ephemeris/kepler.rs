//! Heliocentric planet positions from mean Keplerian elements.
//!
//! Elements and rates are the JPL "approximate positions of the planets"
//! set (Standish), valid 1800-2050 and usable a little beyond.

use crate::astronomy::{atan2_deg, cos_deg, normalize_degrees, sin_deg};
use crate::ephemeris::types::Point;

/// Mean elements at J2000 plus rates per Julian century
struct Elements {
    a: (f64, f64),
    e: (f64, f64),
    inclination: (f64, f64),
    mean_longitude: (f64, f64),
    perihelion: (f64, f64),
    node: (f64, f64),
}

const MERCURY: Elements = Elements {
    a: (0.38709927, 0.00000037),
    e: (0.20563593, 0.00001906),
    inclination: (7.00497902, -0.00594749),
    mean_longitude: (252.25032350, 149472.67411175),
    perihelion: (77.45779628, 0.16047689),
    node: (48.33076593, -0.12534081),
};

const VENUS: Elements = Elements {
    a: (0.72333566, 0.00000390),
    e: (0.00677672, -0.00004107),
    inclination: (3.39467605, -0.00078890),
    mean_longitude: (181.97909950, 58517.81538729),
    perihelion: (131.60246718, 0.00268329),
    node: (76.67984255, -0.27769418),
};

const EARTH_MOON: Elements = Elements {
    a: (1.00000261, 0.00000562),
    e: (0.01671123, -0.00004392),
    inclination: (-0.00001531, -0.01294668),
    mean_longitude: (100.46457166, 35999.37244981),
    perihelion: (102.93768193, 0.32327364),
    node: (0.0, 0.0),
};

const MARS: Elements = Elements {
    a: (1.52371034, 0.00001847),
    e: (0.09339410, 0.00007882),
    inclination: (1.84969142, -0.00813131),
    mean_longitude: (-4.55343205, 19140.30268499),
    perihelion: (-23.94362959, 0.44441088),
    node: (49.55953891, -0.29257343),
};

const JUPITER: Elements = Elements {
    a: (5.20288700, -0.00011607),
    e: (0.04838624, -0.00013253),
    inclination: (1.30439695, -0.00183714),
    mean_longitude: (34.39644051, 3034.74612775),
    perihelion: (14.72847983, 0.21252668),
    node: (100.47390909, 0.20469106),
};

const SATURN: Elements = Elements {
    a: (9.53667594, -0.00125060),
    e: (0.05386179, -0.00050991),
    inclination: (2.48599187, 0.00193609),
    mean_longitude: (49.95424423, 1222.49362201),
    perihelion: (92.59887831, -0.41897216),
    node: (113.66242448, -0.28867794),
};

const URANUS: Elements = Elements {
    a: (19.18916464, -0.00196176),
    e: (0.04725744, -0.00004397),
    inclination: (0.77263783, -0.00242939),
    mean_longitude: (313.23810451, 428.48202785),
    perihelion: (170.95427630, 0.40805281),
    node: (74.01692503, 0.04240589),
};

const NEPTUNE: Elements = Elements {
    a: (30.06992276, 0.00026291),
    e: (0.00859048, 0.00005105),
    inclination: (1.77004347, 0.00035372),
    mean_longitude: (-55.12002969, 218.45945325),
    perihelion: (44.96476227, -0.32241464),
    node: (131.78422574, -0.00508664),
};

const PLUTO: Elements = Elements {
    a: (39.48211675, -0.00031596),
    e: (0.24882730, 0.00005170),
    inclination: (17.14001206, 0.00004818),
    mean_longitude: (238.92903833, 145.20780515),
    perihelion: (224.06891629, -0.04062942),
    node: (110.30393684, -0.01183482),
};

fn elements_for(body: Point) -> Option<&'static Elements> {
    match body {
        Point::Mercury => Some(&MERCURY),
        Point::Venus => Some(&VENUS),
        Point::Mars => Some(&MARS),
        Point::Jupiter => Some(&JUPITER),
        Point::Saturn => Some(&SATURN),
        Point::Uranus => Some(&URANUS),
        Point::Neptune => Some(&NEPTUNE),
        Point::Pluto => Some(&PLUTO),
        _ => None,
    }
}

/// Whether the Keplerian tables cover this body
pub fn has_elements(body: Point) -> bool {
    elements_for(body).is_some()
}

/// Rectangular heliocentric ecliptic coordinates (AU, mean equinox J2000)
pub fn heliocentric_j2000(body: Point, t: f64) -> Option<[f64; 3]> {
    elements_for(body).map(|el| rectangular(el, t))
}

/// Earth-Moon barycentre, standing in for the Earth
pub fn earth_j2000(t: f64) -> [f64; 3] {
    rectangular(&EARTH_MOON, t)
}

/// Spherical `(lon, lat, radius)` from rectangular coordinates
pub fn spherical(v: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = v;
    let r = (x * x + y * y + z * z).sqrt();
    let lon = atan2_deg(y, x);
    let lat = z.atan2((x * x + y * y).sqrt()).to_degrees();
    (lon, lat, r)
}

fn rectangular(el: &Elements, t: f64) -> [f64; 3] {
    let at = |(v0, rate): (f64, f64)| v0 + rate * t;
    let a = at(el.a);
    let e = at(el.e);
    let i = at(el.inclination);
    let l = at(el.mean_longitude);
    let peri = at(el.perihelion);
    let node = at(el.node);

    let omega = peri - node;
    let mut m = normalize_degrees(l - peri);
    if m > 180.0 {
        m -= 360.0;
    }
    let ecc_anomaly = solve_kepler(m.to_radians(), e);

    let xp = a * (ecc_anomaly.cos() - e);
    let yp = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();

    let (co, so) = (cos_deg(omega), sin_deg(omega));
    let (cn, sn) = (cos_deg(node), sin_deg(node));
    let (ci, si) = (cos_deg(i), sin_deg(i));

    [
        (co * cn - so * sn * ci) * xp + (-so * cn - co * sn * ci) * yp,
        (co * sn + so * cn * ci) * xp + (-so * sn + co * cn * ci) * yp,
        (so * si) * xp + (co * si) * yp,
    ]
}

/// Newton iteration for `E - e sin E = M` (radians)
fn solve_kepler(m: f64, e: f64) -> f64 {
    let mut ecc = if e < 0.8 { m } else { std::f64::consts::PI.copysign(m) };
    for _ in 0..30 {
        let delta = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc
}
