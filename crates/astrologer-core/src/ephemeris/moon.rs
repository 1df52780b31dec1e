//! Lunar theory: truncated ELP-2000/82 periodic terms (Meeus ch. 47), the
//! lunar nodes and the mean lunar apogee.

use crate::astronomy::{normalize_degrees, sin_deg};

/// Kilometres per astronomical unit
pub const KM_PER_AU: f64 = 149_597_870.7;

// D, M, M', F multipliers with sine (longitude, 1e-6 deg) and cosine (distance, 1e-3 km) coefficients
const LONGITUDE_DISTANCE_TERMS: [(i8, i8, i8, i8, f64, f64); 60] = [
    (0, 0, 1, 0, 6_288_774.0, -20_905_355.0),
    (2, 0, -1, 0, 1_274_027.0, -3_699_111.0),
    (2, 0, 0, 0, 658_314.0, -2_955_968.0),
    (0, 0, 2, 0, 213_618.0, -569_925.0),
    (0, 1, 0, 0, -185_116.0, 48_888.0),
    (0, 0, 0, 2, -114_332.0, -3_149.0),
    (2, 0, -2, 0, 58_793.0, 246_158.0),
    (2, -1, -1, 0, 57_066.0, -152_138.0),
    (2, 0, 1, 0, 53_322.0, -170_733.0),
    (2, -1, 0, 0, 45_758.0, -204_586.0),
    (0, 1, -1, 0, -40_923.0, -129_620.0),
    (1, 0, 0, 0, -34_720.0, 108_743.0),
    (0, 1, 1, 0, -30_383.0, 104_755.0),
    (2, 0, 0, -2, 15_327.0, 10_321.0),
    (0, 0, 1, 2, -12_528.0, 0.0),
    (0, 0, 1, -2, 10_980.0, 79_661.0),
    (4, 0, -1, 0, 10_675.0, -34_782.0),
    (0, 0, 3, 0, 10_034.0, -23_210.0),
    (4, 0, -2, 0, 8_548.0, -21_636.0),
    (2, 1, -1, 0, -7_888.0, 24_208.0),
    (2, 1, 0, 0, -6_766.0, 30_824.0),
    (1, 0, -1, 0, -5_163.0, -8_379.0),
    (1, 1, 0, 0, 4_987.0, -16_675.0),
    (2, -1, 1, 0, 4_036.0, -12_831.0),
    (2, 0, 2, 0, 3_994.0, -10_445.0),
    (4, 0, 0, 0, 3_861.0, -11_650.0),
    (2, 0, -3, 0, 3_665.0, 14_403.0),
    (0, 1, -2, 0, -2_689.0, -7_003.0),
    (2, 0, -1, 2, -2_602.0, 0.0),
    (2, -1, -2, 0, 2_390.0, 10_056.0),
    (1, 0, 1, 0, -2_348.0, 6_322.0),
    (2, -2, 0, 0, 2_236.0, -9_884.0),
    (0, 1, 2, 0, -2_120.0, 5_751.0),
    (0, 2, 0, 0, -2_069.0, 0.0),
    (2, -2, -1, 0, 2_048.0, -4_950.0),
    (2, 0, 1, -2, -1_773.0, 4_130.0),
    (2, 0, 0, 2, -1_595.0, 0.0),
    (4, -1, -1, 0, 1_215.0, -3_958.0),
    (0, 0, 2, 2, -1_110.0, 0.0),
    (3, 0, -1, 0, -892.0, 3_258.0),
    (2, 1, 1, 0, -810.0, 2_616.0),
    (4, -1, -2, 0, 759.0, -1_897.0),
    (0, 2, -1, 0, -713.0, -2_117.0),
    (2, 2, -1, 0, -700.0, 2_354.0),
    (2, 1, -2, 0, 691.0, 0.0),
    (2, -1, 0, -2, 596.0, 0.0),
    (4, 0, 1, 0, 549.0, -1_423.0),
    (0, 0, 4, 0, 537.0, -1_117.0),
    (4, -1, 0, 0, 520.0, -1_571.0),
    (1, 0, -2, 0, -487.0, -1_739.0),
    (2, 1, 0, -2, -399.0, 0.0),
    (0, 0, 2, -2, -381.0, -4_421.0),
    (1, 1, 1, 0, 351.0, 0.0),
    (3, 0, -2, 0, -340.0, 0.0),
    (4, 0, -3, 0, 330.0, 0.0),
    (2, -1, 2, 0, 327.0, 0.0),
    (0, 2, 1, 0, -323.0, 1_165.0),
    (1, 1, -1, 0, 299.0, 0.0),
    (2, 0, 3, 0, 294.0, 0.0),
    (2, 0, -1, -2, 0.0, 8_752.0),
];

// D, M, M', F multipliers with sine coefficient for latitude, 1e-6 deg
const LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 30] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
    (0, 0, 2, 1, 17_198.0),
    (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0),
    (2, -1, 0, -1, 8_216.0),
    (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0),
    (2, 1, 0, -1, -3_359.0),
    (2, -1, -1, 1, 2_463.0),
    (2, -1, 0, 1, 2_211.0),
    (2, -1, -1, -1, 2_065.0),
    (0, 1, -1, -1, -1_870.0),
    (4, 0, -1, -1, 1_828.0),
    (0, 1, 0, 1, -1_794.0),
    (0, 0, 0, 3, -1_749.0),
    (0, 1, -1, 1, -1_565.0),
    (1, 0, 0, 1, -1_491.0),
    (0, 1, 1, 1, -1_475.0),
    (0, 1, 1, -1, -1_410.0),
    (0, 1, 0, -1, -1_344.0),
    (1, 0, 0, -1, -1_335.0),
    (0, 0, 3, 1, 1_107.0),
    (4, 0, 0, -1, 1_021.0),
    (4, 0, -1, 1, 833.0),
];

/// Fundamental lunar arguments, degrees
struct Arguments {
    mean_longitude: f64,
    elongation: f64,
    sun_anomaly: f64,
    moon_anomaly: f64,
    latitude_argument: f64,
}

impl Arguments {
    fn at(t: f64) -> Self {
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;
        Self {
            mean_longitude: 218.3164477 + 481_267.88123421 * t - 0.0015786 * t2 + t3 / 538_841.0
                - t4 / 65_194_000.0,
            elongation: 297.8501921 + 445_267.1114034 * t - 0.0018819 * t2 + t3 / 545_868.0
                - t4 / 113_065_000.0,
            sun_anomaly: 357.5291092 + 35_999.0502909 * t - 0.0001536 * t2 + t3 / 24_490_000.0,
            moon_anomaly: 134.9633964 + 477_198.8675055 * t + 0.0087414 * t2 + t3 / 69_699.0
                - t4 / 14_712_000.0,
            latitude_argument: 93.2720950 + 483_202.0175233 * t - 0.0036539 * t2
                - t3 / 3_526_000.0
                + t4 / 863_310_000.0,
        }
    }

    fn combine(&self, d: i8, m: i8, mp: i8, f: i8) -> f64 {
        f64::from(d) * self.elongation
            + f64::from(m) * self.sun_anomaly
            + f64::from(mp) * self.moon_anomaly
            + f64::from(f) * self.latitude_argument
    }
}

/// Eccentricity factor for terms involving the solar anomaly
fn eccentricity_factor(t: f64, m: i8) -> f64 {
    let e = 1.0 - 0.002516 * t - 0.0000074 * t * t;
    match m.abs() {
        0 => 1.0,
        1 => e,
        _ => e * e,
    }
}

/// Geometric lunar `(longitude, latitude, distance_km)` referred to the mean
/// equinox of date. `t` is Julian centuries TT since J2000.
pub fn moon_position(t: f64) -> (f64, f64, f64) {
    let args = Arguments::at(t);
    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479_264.290 * t;
    let a3 = 313.45 + 481_266.484 * t;

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(d, m, mp, f, l, r) in LONGITUDE_DISTANCE_TERMS.iter() {
        let arg = args.combine(d, m, mp, f).to_radians();
        let e = eccentricity_factor(t, m);
        sum_l += l * e * arg.sin();
        sum_r += r * e * arg.cos();
    }

    let mut sum_b = 0.0;
    for &(d, m, mp, f, b) in LATITUDE_TERMS.iter() {
        sum_b += b * eccentricity_factor(t, m) * sin_deg(args.combine(d, m, mp, f));
    }

    let lp = args.mean_longitude;
    sum_l += 3958.0 * sin_deg(a1) + 1962.0 * sin_deg(lp - args.latitude_argument) + 318.0 * sin_deg(a2);
    sum_b += -2235.0 * sin_deg(lp)
        + 382.0 * sin_deg(a3)
        + 175.0 * sin_deg(a1 - args.latitude_argument)
        + 175.0 * sin_deg(a1 + args.latitude_argument)
        + 127.0 * sin_deg(lp - args.moon_anomaly)
        - 115.0 * sin_deg(lp + args.moon_anomaly);

    (
        normalize_degrees(lp + sum_l / 1_000_000.0),
        sum_b / 1_000_000.0,
        385_000.56 + sum_r / 1000.0,
    )
}

/// Mean ascending node of the lunar orbit
pub fn mean_node(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    normalize_degrees(
        125.0445479 - 1934.1362891 * t + 0.0020754 * t2 + t3 / 467_441.0
            - t3 * t / 60_616_000.0,
    )
}

/// True ascending node: mean node plus the principal periodic corrections
pub fn true_node(t: f64) -> f64 {
    let args = Arguments::at(t);
    let d = args.elongation;
    let f = args.latitude_argument;
    normalize_degrees(
        mean_node(t) - 1.4979 * sin_deg(2.0 * (d - f)) - 0.1500 * sin_deg(args.sun_anomaly)
            - 0.1226 * sin_deg(2.0 * d)
            + 0.1176 * sin_deg(2.0 * f)
            - 0.0801 * sin_deg(2.0 * (args.moon_anomaly - f)),
    )
}

/// Mean lunar apogee ("Black Moon Lilith")
pub fn mean_lilith(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let perigee = 83.3532465 + 4069.0137287 * t - 0.0103200 * t2 - t3 / 80_053.0
        + t3 * t / 18_999_000.0;
    normalize_degrees(perigee + 180.0)
}
