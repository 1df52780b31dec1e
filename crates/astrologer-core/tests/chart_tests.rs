use astrologer_core::aspects::{AspectKind, AspectMotion};
use astrologer_core::chart::{ChartEngine, ChartOptions, ChartRequest, ChartType, CompositeHouseMode, SubjectSpec};
use astrologer_core::ephemeris::{
    AnalyticEphemeris, BodyPosition, EphemerisError, EphemerisProvider, Perspective, Point,
};
use astrologer_core::error::{AstroError, ErrorKind};
use astrologer_core::houses::HouseSystem;
use astrologer_core::instant::{BirthData, Instant};
use astrologer_core::placement::ZodiacSign;
use astrologer_core::settings::EngineSettings;
use astrologer_core::zodiac::{SiderealMode, ZodiacType};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn utc_subject(name: &str, year: i32, month: u32, day: u32, hour: u32, latitude: f64, longitude: f64) -> SubjectSpec {
    SubjectSpec::new(
        name,
        BirthData {
            year,
            month,
            day,
            hour,
            minute: 0,
            second: 0,
            timezone: Some("UTC".to_string()),
            utc_offset_minutes: None,
            latitude,
            longitude,
            altitude: 0.0,
        },
    )
}

fn new_year_1990() -> SubjectSpec {
    utc_subject("Subject", 1990, 1, 1, 0, 0.0, 0.0)
}

fn natal(subject: SubjectSpec, options: ChartOptions) -> Result<astrologer_core::Chart, AstroError> {
    ChartEngine::default().compute_chart(&[subject], ChartType::Natal, &options)
}

#[test]
fn test_new_year_1990_sun_in_capricorn() {
    let chart = natal(
        new_year_1990(),
        ChartOptions::default().with_house_system(HouseSystem::Placidus),
    )
    .unwrap();
    let sun = chart.subjects[0].placement(Point::Sun).unwrap();
    assert!((270.0..300.0).contains(&sun.longitude), "{}", sun.longitude);
    assert_eq!(sun.sign, ZodiacSign::Capricorn);
    assert_eq!(chart.subjects[0].ayanamsha, 0.0);
}

#[test]
fn test_lahiri_shifts_sun_by_ayanamsha() {
    let tropical = natal(new_year_1990(), ChartOptions::default()).unwrap();
    let sidereal = natal(new_year_1990(), ChartOptions::sidereal(SiderealMode::Lahiri)).unwrap();

    let ayanamsha = sidereal.subjects[0].ayanamsha;
    assert!((ayanamsha - 23.8).abs() < 0.2, "{ayanamsha}");

    let t_sun = tropical.subjects[0].placement(Point::Sun).unwrap();
    let s_sun = sidereal.subjects[0].placement(Point::Sun).unwrap();
    assert!((t_sun.longitude - s_sun.longitude - ayanamsha).abs() < 1e-9);
    assert_eq!(s_sun.sign, ZodiacSign::Sagittarius);
    assert_eq!(sidereal.subjects[0].zodiac_type, ZodiacType::Sidereal);
}

#[test]
fn test_sidereal_without_mode_fails() {
    let options = ChartOptions {
        zodiac_type: ZodiacType::Sidereal,
        ..ChartOptions::default()
    };
    let err = natal(new_year_1990(), options).unwrap_err();
    assert_eq!(err, AstroError::MissingAyanamsha);
    assert!(!err.is_retryable());
}

#[test]
fn test_spring_forward_gap_fails() {
    let mut subject = utc_subject("Gap", 2021, 3, 14, 2, 40.7, -74.0);
    subject.birth.minute = 30;
    subject.birth.timezone = Some("America/New_York".to_string());
    let err = natal(subject, ChartOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTime);
}

#[test]
fn test_identical_synastry_is_all_exact_conjunctions() {
    let a = utc_subject("A", 1985, 6, 2, 14, 41.9, 12.5);
    let chart = ChartEngine::default()
        .compute_chart(&[a.clone(), a], ChartType::Synastry, &ChartOptions::default())
        .unwrap();

    for placement in &chart.subjects[0].placements {
        let conjunction = chart
            .aspects
            .iter()
            .find(|x| x.first.point == placement.point && x.second.point == placement.point)
            .unwrap_or_else(|| panic!("no self conjunction for {}", placement.point));
        assert_eq!(conjunction.kind, AspectKind::Conjunction);
        assert_eq!(conjunction.orb, 0.0);
        assert_eq!(conjunction.motion, AspectMotion::Exact);
    }
    let relationship = chart.relationship.unwrap();
    assert!(relationship.is_destiny_sign);
}

#[test]
fn test_synastry_is_symmetric() {
    let a = utc_subject("A", 1985, 6, 2, 14, 41.9, 12.5);
    let b = utc_subject("B", 1992, 11, 20, 8, -33.9, 151.2);
    let engine = ChartEngine::default();
    let ab = engine
        .compute_chart(&[a.clone(), b.clone()], ChartType::Synastry, &ChartOptions::default())
        .unwrap();
    let ba = engine
        .compute_chart(&[b, a], ChartType::Synastry, &ChartOptions::default())
        .unwrap();

    let key = |first: Point, second: Point| (first, second);
    let forward: BTreeMap<_, _> = ab
        .aspects
        .iter()
        .map(|x| (key(x.first.point, x.second.point), x))
        .collect();
    let backward: BTreeMap<_, _> = ba
        .aspects
        .iter()
        .map(|x| (key(x.second.point, x.first.point), x))
        .collect();

    assert_eq!(forward.len(), backward.len());
    for (pair, x) in &forward {
        let y = backward[pair];
        assert_eq!(x.kind, y.kind);
        assert_eq!(x.angle, y.angle);
        assert_eq!(x.orb, y.orb);
        assert_eq!(x.motion, y.motion);
        assert_eq!(x.relative_speed, -y.relative_speed);
    }
    assert_eq!(
        ab.relationship.as_ref().map(|r| r.score),
        ba.relationship.as_ref().map(|r| r.score)
    );
}

#[test]
fn test_synastry_house_overlays_both_ways() {
    let a = utc_subject("A", 1985, 6, 2, 14, 41.9, 12.5);
    let b = utc_subject("B", 1992, 11, 20, 8, -33.9, 151.2);
    let chart = ChartEngine::default()
        .compute_chart(&[a, b], ChartType::Synastry, &ChartOptions::default())
        .unwrap();
    let into_first = chart.house_overlays.iter().filter(|o| o.houses_of == 0).count();
    let into_second = chart.house_overlays.iter().filter(|o| o.houses_of == 1).count();
    assert_eq!(into_first, chart.subjects[1].placements.len());
    assert_eq!(into_second, chart.subjects[0].placements.len());

    let first_houses = chart.subjects[0].houses.as_ref().unwrap();
    for overlay in chart.house_overlays.iter().filter(|o| o.houses_of == 0) {
        let placement = chart.subjects[1].placement(overlay.point).unwrap();
        assert_eq!(overlay.house, first_houses.house_of(placement.longitude));
    }
}

#[test]
fn test_transit_uses_natal_houses() {
    let natal_subject = utc_subject("Natal", 1990, 1, 1, 0, 45.0, 9.0);
    let moment = utc_subject("Transit", 2024, 5, 1, 12, -20.0, 100.0);
    let chart = ChartEngine::default()
        .compute_chart(&[natal_subject, moment], ChartType::Transit, &ChartOptions::default())
        .unwrap();

    let natal_houses = chart.subjects[0].houses.clone().unwrap();
    let transit = &chart.subjects[1];
    assert_eq!(transit.houses.as_ref(), Some(&natal_houses));
    for placement in &transit.placements {
        assert_eq!(placement.house, Some(natal_houses.house_of(placement.longitude)));
    }
    assert!(!chart.aspects.is_empty());
    assert!(chart
        .aspects
        .iter()
        .all(|x| x.first.subject == 1 && x.second.subject == 0));
}

#[test]
fn test_polar_transit_moment_borrows_natal_houses() {
    let natal_subject = utc_subject("Natal", 1990, 1, 1, 0, 45.0, 9.0);
    let moment = utc_subject("Svalbard", 2024, 5, 1, 12, 80.0, 15.0);
    let bodies_only = ChartOptions {
        active_points: Some(vec![Point::Sun, Point::Moon]),
        ..ChartOptions::default()
    };
    let engine = ChartEngine::default();
    let chart = engine
        .compute_chart(&[natal_subject.clone(), moment.clone()], ChartType::Transit, &bodies_only)
        .unwrap();
    let natal_houses = chart.subjects[0].houses.clone().unwrap();
    let transit = &chart.subjects[1];
    assert_eq!(transit.houses.as_ref(), Some(&natal_houses));
    assert!(transit.placements.iter().all(|p| p.house.is_some()));

    // The moment's own angles still need its own cusps
    let with_angles = ChartOptions {
        active_points: Some(vec![Point::Sun, Point::Ascendant]),
        ..ChartOptions::default()
    };
    let err = engine
        .compute_chart(&[natal_subject, moment], ChartType::Transit, &with_angles)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HouseSystemUndefined);
}

#[test]
fn test_composite_midpoints() {
    let a = utc_subject("A", 1985, 6, 2, 14, 41.9, 12.5);
    let b = utc_subject("B", 1992, 11, 20, 8, -33.9, 151.2);
    let chart = ChartEngine::default()
        .compute_chart(&[a, b], ChartType::Composite, &ChartOptions::default())
        .unwrap();
    assert_eq!(chart.subjects.len(), 3);
    let composite = chart.primary().unwrap();
    assert_eq!(composite.name, "A & B");

    let sun_a = chart.subjects[0].placement(Point::Sun).unwrap().longitude;
    let sun_b = chart.subjects[1].placement(Point::Sun).unwrap().longitude;
    let sun_c = composite.placement(Point::Sun).unwrap().longitude;
    let to_a = astrologer_core::astronomy::separation(sun_c, sun_a);
    let to_b = astrologer_core::astronomy::separation(sun_c, sun_b);
    assert!((to_a - to_b).abs() < 1e-9);
    assert!(to_a <= 90.0);

    assert!(composite.houses.is_some());
    assert!(composite.placements.iter().all(|p| p.house.is_some()));
    assert!(chart.aspects.iter().all(|x| x.first.subject == 2));
}

#[test]
fn test_composite_angles_sit_on_composite_cusps() {
    let a = utc_subject("Rome", 1985, 6, 2, 14, 41.9, 12.5);
    let b = utc_subject("Sydney", 1992, 11, 20, 8, -33.9, 151.2);
    let options = ChartOptions {
        active_points: Some(vec![Point::Sun, Point::Moon, Point::Ascendant, Point::Midheaven]),
        ..ChartOptions::default()
    };
    let chart = ChartEngine::default()
        .compute_chart(&[a, b], ChartType::Composite, &options)
        .unwrap();
    let composite = chart.primary().unwrap();
    let houses = composite.houses.as_ref().unwrap();

    let asc = composite.placement(Point::Ascendant).unwrap();
    assert!((asc.longitude - houses.ascendant).abs() < 1e-9, "{} vs {}", asc.longitude, houses.ascendant);
    assert_eq!(asc.house, Some(1));
    let mc = composite.placement(Point::Midheaven).unwrap();
    assert!((mc.longitude - houses.midheaven).abs() < 1e-9);
    assert_eq!(mc.house, Some(10));
}

#[test]
fn test_composite_houses_can_be_unavailable() {
    let a = utc_subject("A", 1985, 6, 2, 14, 41.9, 12.5);
    let b = utc_subject("B", 1992, 11, 20, 8, -33.9, 151.2);
    let options = ChartOptions {
        composite_houses: Some(CompositeHouseMode::Unavailable),
        ..ChartOptions::default()
    };
    let chart = ChartEngine::default()
        .compute_chart(&[a, b], ChartType::Composite, &options)
        .unwrap();
    let composite = chart.primary().unwrap();
    assert!(composite.houses.is_none());
    assert!(composite.placements.iter().all(|p| p.house.is_none()));
}

#[test]
fn test_natal_skips_fixed_pairs() {
    let chart = natal(
        new_year_1990(),
        ChartOptions::default().with_active_points(Point::ALL.iter().copied().filter(|p| *p != Point::Chiron)),
    )
    .unwrap();
    assert!(!chart
        .aspects
        .iter()
        .any(|x| x.first.point.is_angle() && x.second.point.is_angle()));
    assert!(!chart.aspects.iter().any(|x| x.connects(Point::TrueNode, Point::TrueSouthNode)));
    assert!(chart
        .aspects
        .iter()
        .all(|x| x.first.subject == 0 && x.first.point < x.second.point));
}

#[test]
fn test_polar_latitude_policy() {
    let arctic = utc_subject("Arctic", 1990, 1, 1, 0, 80.0, 20.0);
    let err = natal(arctic.clone(), ChartOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HouseSystemUndefined);

    let chart = natal(arctic, ChartOptions::default().with_house_system(HouseSystem::WholeSign)).unwrap();
    let houses = chart.subjects[0].houses.as_ref().unwrap();
    assert_eq!(houses.system, HouseSystem::WholeSign);
}

#[test]
fn test_heliocentric_points() {
    let chart = natal(
        new_year_1990(),
        ChartOptions::default().with_perspective(Perspective::Heliocentric),
    )
    .unwrap();
    let subject = &chart.subjects[0];
    assert!(subject.placement(Point::Sun).is_none());
    assert!(subject.placement(Point::Moon).is_none());
    assert!(subject.placement(Point::MeanNode).is_none());
    assert!(subject.placement(Point::Mars).is_some());
    assert!(subject.lunar_phase.is_none());

    let err = natal(
        new_year_1990(),
        ChartOptions::default()
            .with_perspective(Perspective::Heliocentric)
            .with_active_points([Point::Moon]),
    )
    .unwrap_err();
    assert_eq!(err.field(), Some("active_points"));
}

#[test]
fn test_ephemeris_failures_are_not_retryable() {
    let chiron = natal(
        new_year_1990(),
        ChartOptions::default().with_active_points([Point::Chiron]),
    )
    .unwrap_err();
    assert_eq!(chiron.kind(), ErrorKind::EphemerisUnavailable);
    assert!(!chiron.is_retryable());

    let ancient = natal(utc_subject("Old", 1700, 1, 1, 0, 0.0, 0.0), ChartOptions::default()).unwrap_err();
    assert_eq!(ancient.kind(), ErrorKind::EphemerisUnavailable);
    assert!(!ancient.is_retryable());
}

#[test]
fn test_unknown_orb_override_fails() {
    let err = natal(new_year_1990(), ChartOptions::default().with_orb("novile", 2.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedConfiguration);
}

#[test]
fn test_invalid_coordinates_fail() {
    let err = natal(utc_subject("X", 1990, 1, 1, 0, 95.0, 0.0), ChartOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCoordinate);
    assert_eq!(err.field(), Some("latitude"));
}

#[test]
fn test_chart_serializes() {
    let chart = natal(new_year_1990(), ChartOptions::default()).unwrap();
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json["chart_type"], "natal");
    assert_eq!(json["subjects"][0]["placements"][0]["point"], "sun");
    assert_eq!(json["subjects"][0]["placements"][0]["sign"], "capricorn");
    assert!(json.get("relationship").is_none());
}

#[test]
fn test_request_round_trip_through_engine() {
    let request = ChartRequest::natal(new_year_1990(), ChartOptions::default());
    let text = serde_json::to_string(&request).unwrap();
    let parsed: ChartRequest = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, request);
    assert!(ChartEngine::default().compute_request(&parsed).is_ok());
}

/// Provider that takes longer than any sensible timeout
struct SlowProvider {
    inner: AnalyticEphemeris,
    delay: Duration,
}

impl EphemerisProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    fn position(
        &self,
        body: Point,
        instant: &Instant,
        perspective: Perspective,
    ) -> Result<BodyPosition, EphemerisError> {
        std::thread::sleep(self.delay);
        self.inner.position(body, instant, perspective)
    }
}

#[tokio::test]
async fn test_async_chart() {
    let request = ChartRequest::natal(new_year_1990(), ChartOptions::default());
    let chart = ChartEngine::default().compute_chart_async(request).await.unwrap();
    assert_eq!(chart.subjects.len(), 1);
}

#[tokio::test]
async fn test_async_timeout_is_retryable() {
    let settings = EngineSettings {
        ephemeris_timeout_ms: 20,
        ..EngineSettings::default()
    };
    let provider = SlowProvider {
        inner: AnalyticEphemeris::new(),
        delay: Duration::from_millis(200),
    };
    let engine = ChartEngine::new(Arc::new(provider), settings);
    let request = ChartRequest::natal(
        new_year_1990(),
        ChartOptions::default().with_active_points([Point::Sun]),
    );
    let err = engine.compute_chart_async(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EphemerisUnavailable);
    assert!(err.is_retryable());
}
