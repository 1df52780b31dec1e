//! House division algorithms.
//!
//! Every function is a pure mapping of (RAMC, geographic latitude, obliquity)
//! to twelve tropical cusp longitudes, cusp 1 first. Failures carry a short
//! reason; the caller attaches the system and latitude.

use crate::astronomy::{
    acos_deg, asin_deg, atan2_deg, cos_deg, ecliptic_declination, normalize_degrees, signed_delta,
    sin_deg, tan_deg,
};

pub(crate) type Cusps = [f64; 12];

const PLACIDUS_MAX_ITERATIONS: usize = 100;
const PLACIDUS_TOLERANCE: f64 = 1e-9;

/// Midheaven: the ecliptic point on the upper meridian
pub fn midheaven(ramc: f64, obliquity: f64) -> f64 {
    meridian_projection(ramc, obliquity)
}

/// Ascendant: the ecliptic point rising on the eastern horizon
pub fn ascendant(ramc: f64, latitude: f64, obliquity: f64) -> f64 {
    let asc = rising_point(ramc, latitude, obliquity);
    let mc = midheaven(ramc, obliquity);
    // must lie within the half circle east of the MC
    if signed_delta(mc, asc) < 0.0 {
        normalize_degrees(asc + 180.0)
    } else {
        asc
    }
}

/// Ecliptic point on the horizon of a place at latitude `pole` whose RAMC is `ramc`
fn rising_point(ramc: f64, pole: f64, obliquity: f64) -> f64 {
    atan2_deg(
        cos_deg(ramc),
        -(sin_deg(ramc) * cos_deg(obliquity) + tan_deg(pole) * sin_deg(obliquity)),
    )
}

/// Cusp whose oblique ascension is `oblique_ascension` under pole `pole`
fn oblique_cusp(oblique_ascension: f64, pole: f64, obliquity: f64) -> f64 {
    rising_point(oblique_ascension - 90.0, pole, obliquity)
}

/// Ecliptic longitude sharing a meridian (hour circle) with right ascension `ra`
fn meridian_projection(ra: f64, obliquity: f64) -> f64 {
    atan2_deg(sin_deg(ra), cos_deg(ra) * cos_deg(obliquity))
}

/// Forward arc from `a` to `b`, in [0, 360)
pub fn arc_forward(a: f64, b: f64) -> f64 {
    normalize_degrees(b - a)
}

/// Diurnal semi-arc of a declination, or `None` when the point is circumpolar
fn diurnal_semi_arc(declination: f64, latitude: f64) -> Option<f64> {
    let x = -tan_deg(latitude) * tan_deg(declination);
    if x.abs() > 1.0 {
        None
    } else {
        Some(acos_deg(x))
    }
}

/// Fill the six cusps opposite 1, 2, 3, 10, 11, 12
fn with_opposites(cusps: &mut Cusps) {
    for i in 0..6 {
        let (src, dst) = if i < 3 { (i, i + 6) } else { (i + 6, i) };
        cusps[dst] = normalize_degrees(cusps[src] + 180.0);
    }
}

/// Assemble a quadrant chart from the angles and the four intermediate cusps
fn quadrant(asc: f64, mc: f64, c11: f64, c12: f64, c2: f64, c3: f64) -> Cusps {
    let mut cusps = [0.0; 12];
    cusps[0] = asc;
    cusps[1] = c2;
    cusps[2] = c3;
    cusps[9] = mc;
    cusps[10] = c11;
    cusps[11] = c12;
    with_opposites(&mut cusps);
    cusps
}

pub fn equal(asc: f64) -> Cusps {
    let mut cusps = [0.0; 12];
    for (i, cusp) in cusps.iter_mut().enumerate() {
        *cusp = normalize_degrees(asc + 30.0 * i as f64);
    }
    cusps
}

pub fn vehlow(asc: f64) -> Cusps {
    equal(asc - 15.0)
}

pub fn whole_sign(asc: f64) -> Cusps {
    equal((normalize_degrees(asc) / 30.0).floor() * 30.0)
}

/// Trisect each quadrant between the angles
pub fn porphyry(asc: f64, mc: f64) -> Cusps {
    let ic = normalize_degrees(mc + 180.0);
    let arc_asc_ic = arc_forward(asc, ic);
    let arc_mc_asc = arc_forward(mc, asc);
    quadrant(
        asc,
        mc,
        normalize_degrees(mc + arc_mc_asc / 3.0),
        normalize_degrees(mc + 2.0 * arc_mc_asc / 3.0),
        normalize_degrees(asc + arc_asc_ic / 3.0),
        normalize_degrees(asc + 2.0 * arc_asc_ic / 3.0),
    )
}

/// Equal arcs of the equator from the east point, poles from the horizon
pub fn regiomontanus(ramc: f64, latitude: f64, obliquity: f64) -> Cusps {
    let cusp = |h: f64| {
        let pole = (tan_deg(latitude) * sin_deg(h)).atan().to_degrees();
        oblique_cusp(ramc + h, pole, obliquity)
    };
    quadrant(
        ascendant(ramc, latitude, obliquity),
        midheaven(ramc, obliquity),
        cusp(30.0),
        cusp(60.0),
        cusp(120.0),
        cusp(150.0),
    )
}

/// Equal arcs of the prime vertical
pub fn campanus(ramc: f64, latitude: f64, obliquity: f64) -> Cusps {
    let cusp = |a: f64| {
        let h = atan2_deg(cos_deg(latitude) * sin_deg(a), cos_deg(a));
        let pole = asin_deg(sin_deg(latitude) * sin_deg(a));
        oblique_cusp(ramc + h, pole, obliquity)
    };
    quadrant(
        ascendant(ramc, latitude, obliquity),
        midheaven(ramc, obliquity),
        cusp(30.0),
        cusp(60.0),
        cusp(120.0),
        cusp(150.0),
    )
}

/// Trisection of the semi-arcs traced by each cusp degree
pub fn placidus(ramc: f64, latitude: f64, obliquity: f64) -> Result<Cusps, &'static str> {
    // (fraction, above horizon)
    let c11 = placidus_cusp(ramc, latitude, obliquity, 1.0 / 3.0, true)?;
    let c12 = placidus_cusp(ramc, latitude, obliquity, 2.0 / 3.0, true)?;
    let c2 = placidus_cusp(ramc, latitude, obliquity, 2.0 / 3.0, false)?;
    let c3 = placidus_cusp(ramc, latitude, obliquity, 1.0 / 3.0, false)?;
    Ok(quadrant(
        ascendant(ramc, latitude, obliquity),
        midheaven(ramc, obliquity),
        c11,
        c12,
        c2,
        c3,
    ))
}

/// Above the horizon the cusp's meridian distance is `fraction` of its
/// diurnal semi-arc east of the MC; below it, `fraction` of the nocturnal
/// semi-arc west of the IC.
fn placidus_cusp(
    ramc: f64,
    latitude: f64,
    obliquity: f64,
    fraction: f64,
    above: bool,
) -> Result<f64, &'static str> {
    let target = |dsa: f64| {
        if above {
            ramc + fraction * dsa
        } else {
            ramc + 180.0 - fraction * (180.0 - dsa)
        }
    };

    let mut ra = target(90.0);
    for _ in 0..PLACIDUS_MAX_ITERATIONS {
        let lon = meridian_projection(ra, obliquity);
        let dsa = diurnal_semi_arc(ecliptic_declination(lon, obliquity), latitude)
            .ok_or("a cusp degree never crosses the horizon")?;
        let next = target(dsa);
        if signed_delta(ra, next).abs() < PLACIDUS_TOLERANCE {
            return Ok(meridian_projection(next, obliquity));
        }
        ra = next;
    }
    Err("semi-arc iteration did not converge")
}

/// Trisection of the MC degree's ascensional difference (birthplace system)
pub fn koch(ramc: f64, latitude: f64, obliquity: f64) -> Result<Cusps, &'static str> {
    let mc = midheaven(ramc, obliquity);
    let x = tan_deg(latitude) * tan_deg(ecliptic_declination(mc, obliquity));
    if x.abs() > 1.0 {
        return Err("the MC degree is circumpolar");
    }
    let ad3 = asin_deg(x) / 3.0;
    Ok(quadrant(
        ascendant(ramc, latitude, obliquity),
        mc,
        oblique_cusp(ramc + 30.0 - 2.0 * ad3, latitude, obliquity),
        oblique_cusp(ramc + 60.0 - ad3, latitude, obliquity),
        oblique_cusp(ramc + 120.0 + ad3, latitude, obliquity),
        oblique_cusp(ramc + 150.0 + 2.0 * ad3, latitude, obliquity),
    ))
}

/// Trisection of the Ascendant's semi-arcs on the equator
pub fn alcabitius(ramc: f64, latitude: f64, obliquity: f64) -> Result<Cusps, &'static str> {
    let asc = ascendant(ramc, latitude, obliquity);
    let dsa = diurnal_semi_arc(ecliptic_declination(asc, obliquity), latitude)
        .ok_or("the Ascendant degree is circumpolar")?;
    let nsa = 180.0 - dsa;
    Ok(quadrant(
        asc,
        midheaven(ramc, obliquity),
        meridian_projection(ramc + dsa / 3.0, obliquity),
        meridian_projection(ramc + 2.0 * dsa / 3.0, obliquity),
        meridian_projection(ramc + 180.0 - 2.0 * nsa / 3.0, obliquity),
        meridian_projection(ramc + 180.0 - nsa / 3.0, obliquity),
    ))
}

/// Polich-Page: poles whose tangents step by thirds of the latitude's tangent
pub fn topocentric(ramc: f64, latitude: f64, obliquity: f64) -> Cusps {
    let pole1 = (tan_deg(latitude) / 3.0).atan().to_degrees();
    let pole2 = (2.0 * tan_deg(latitude) / 3.0).atan().to_degrees();
    quadrant(
        ascendant(ramc, latitude, obliquity),
        midheaven(ramc, obliquity),
        oblique_cusp(ramc + 30.0, pole1, obliquity),
        oblique_cusp(ramc + 60.0, pole2, obliquity),
        oblique_cusp(ramc + 120.0, pole2, obliquity),
        oblique_cusp(ramc + 150.0, pole1, obliquity),
    )
}

/// Equal arcs of right ascension from the RAMC, projected along hour circles
pub fn meridian(ramc: f64, obliquity: f64) -> Cusps {
    from_tenth(|ra| meridian_projection(ra, obliquity), ramc)
}

/// Equal arcs of right ascension from the RAMC, projected along circles of
/// ecliptic latitude
pub fn morinus(ramc: f64, obliquity: f64) -> Cusps {
    from_tenth(
        |ra| atan2_deg(sin_deg(ra) * cos_deg(obliquity), cos_deg(ra)),
        ramc,
    )
}

fn from_tenth(project: impl Fn(f64) -> f64, ramc: f64) -> Cusps {
    let mut cusps = [0.0; 12];
    for k in 0..12 {
        // house 10 sits at the RAMC
        let house_index = (9 + k) % 12;
        cusps[house_index] = project(ramc + 30.0 * k as f64);
    }
    cusps
}

/// Whether consecutive cusps advance once around the zodiac
pub fn is_cyclic(cusps: &Cusps) -> bool {
    let total: f64 = (0..12)
        .map(|i| arc_forward(cusps[i], cusps[(i + 1) % 12]))
        .sum();
    (total - 360.0).abs() < 1e-6
}
