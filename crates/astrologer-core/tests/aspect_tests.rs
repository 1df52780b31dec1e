use astrologer_core::aspects::{AspectDetector, AspectEnd, AspectKind, AspectMotion, OrbPolicy};
use astrologer_core::ephemeris::{BodyPosition, Point};
use astrologer_core::error::ErrorKind;
use astrologer_core::placement::{Placement, PlacementAssembler};
use std::collections::HashMap;

fn end(subject: usize, point: Point, longitude: f64, speed: f64) -> AspectEnd {
    AspectEnd {
        subject,
        point,
        longitude,
        speed,
    }
}

fn placement(point: Point, longitude: f64, speed: f64) -> Placement {
    PlacementAssembler::default().place(
        point,
        &BodyPosition {
            longitude,
            latitude: 0.0,
            distance: 1.0,
            speed,
        },
        None,
    )
}

#[test]
fn test_conjunction_within_orb() {
    let detector = AspectDetector::default();
    let aspect = detector
        .aspect_between(end(0, Point::Sun, 100.0, 1.0), end(0, Point::Mercury, 102.0, 1.2))
        .unwrap();
    assert_eq!(aspect.kind, AspectKind::Conjunction);
    assert_eq!(aspect.angle, 0.0);
    assert!((aspect.orb - 2.0).abs() < 1e-9);
    // Mercury is ahead and faster: the gap widens
    assert_eq!(aspect.motion, AspectMotion::Separating);
}

#[test]
fn test_opposition_inside_exact_angle() {
    let detector = AspectDetector::default();
    let aspect = detector
        .aspect_between(end(0, Point::Sun, 100.0, 1.0), end(0, Point::Saturn, 278.0, 0.1))
        .unwrap();
    assert_eq!(aspect.kind, AspectKind::Opposition);
    assert!((aspect.separation - 178.0).abs() < 1e-9);
    assert!((aspect.orb + 2.0).abs() < 1e-9);
    // The Sun gains on Saturn, so the gap shrinks away from 180
    assert_eq!(aspect.motion, AspectMotion::Separating);

    let closing = detector
        .aspect_between(end(0, Point::Sun, 100.0, 1.0), end(0, Point::Saturn, 278.0, 1.5))
        .unwrap();
    assert_eq!(closing.motion, AspectMotion::Applying);
}

#[test]
fn test_no_aspect_outside_orb() {
    let detector = AspectDetector::default();
    assert!(detector
        .aspect_between(end(0, Point::Sun, 0.0, 1.0), end(0, Point::Mars, 100.0, 0.5))
        .is_none());
}

#[test]
fn test_minor_aspects_need_enabling() {
    let first = end(0, Point::Venus, 10.0, 1.2);
    let second = end(0, Point::Jupiter, 160.5, 0.1);
    assert!(AspectDetector::default().aspect_between(first, second).is_none());

    let mut overrides = HashMap::new();
    overrides.insert("quincunx".to_string(), 2.0);
    let policy = OrbPolicy::default().with_overrides(&overrides).unwrap();
    let aspect = AspectDetector::new(policy).aspect_between(first, second).unwrap();
    assert_eq!(aspect.kind, AspectKind::Quincunx);
}

#[test]
fn test_zero_orb_requires_exact_angle() {
    let mut overrides = HashMap::new();
    overrides.insert("square".to_string(), 0.0);
    let detector = AspectDetector::new(OrbPolicy::default().with_overrides(&overrides).unwrap());

    let exact = detector
        .aspect_between(end(0, Point::Mars, 15.0, 0.5), end(0, Point::Pluto, 105.0, 0.01))
        .unwrap();
    assert_eq!(exact.kind, AspectKind::Square);
    assert_eq!(exact.motion, AspectMotion::Exact);
    assert!(detector
        .aspect_between(end(0, Point::Mars, 15.0, 0.5), end(0, Point::Pluto, 105.5, 0.01))
        .is_none());
}

#[test]
fn test_bad_overrides_are_rejected() {
    let mut overrides = HashMap::new();
    overrides.insert("trine".to_string(), -1.0);
    let err = OrbPolicy::default().with_overrides(&overrides).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedConfiguration);
    assert_eq!(err.field(), Some("orb_overrides.trine"));
}

#[test]
fn test_stationary_pair() {
    let detector = AspectDetector::default();
    let aspect = detector
        .aspect_between(end(0, Point::Jupiter, 50.0, 0.08), end(0, Point::Saturn, 172.0, 0.0805))
        .unwrap();
    assert_eq!(aspect.kind, AspectKind::Trine);
    assert_eq!(aspect.motion, AspectMotion::Stationary);
}

#[test]
fn test_swapping_ends_keeps_the_aspect() {
    let detector = AspectDetector::default();
    let a = end(0, Point::Moon, 359.3, 13.1);
    let b = end(1, Point::Venus, 62.7, 1.1);
    let forward = detector.aspect_between(a, b).unwrap();
    let backward = detector.aspect_between(b, a).unwrap();

    assert_eq!(forward.kind, AspectKind::Sextile);
    assert_eq!(forward.kind, backward.kind);
    assert_eq!(forward.orb, backward.orb);
    assert_eq!(forward.separation, backward.separation);
    assert_eq!(forward.motion, backward.motion);
    assert_eq!(forward.relative_speed, -backward.relative_speed);
}

#[test]
fn test_within_skips_fixed_pairs_and_orders_points() {
    let placements = vec![
        placement(Point::Ascendant, 10.0, 360.0),
        placement(Point::Midheaven, 280.0, 360.0),
        placement(Point::MeanNode, 40.0, -0.05),
        placement(Point::MeanSouthNode, 220.0, -0.05),
        placement(Point::Moon, 12.0, 13.0),
        placement(Point::Sun, 40.5, 1.0),
    ];
    let aspects = AspectDetector::default().within(0, &placements);

    assert!(!aspects.iter().any(|a| a.connects(Point::Ascendant, Point::Midheaven)));
    assert!(!aspects.iter().any(|a| a.connects(Point::MeanNode, Point::MeanSouthNode)));
    assert!(aspects.iter().all(|a| a.first.point < a.second.point));
    assert!(aspects.iter().any(|a| a.connects(Point::Sun, Point::MeanNode)));
    assert!(aspects.iter().any(|a| a.connects(Point::Moon, Point::Ascendant)));

    let keys: Vec<_> = aspects.iter().map(|a| (a.first.point, a.second.point)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_between_includes_same_point() {
    let first = vec![placement(Point::Sun, 100.0, 1.0), placement(Point::Moon, 200.0, 13.0)];
    let second = vec![placement(Point::Sun, 101.0, 1.0), placement(Point::Moon, 20.0, 13.0)];
    let aspects = AspectDetector::default().between((0, &first), (1, &second));

    assert!(aspects
        .iter()
        .any(|a| a.first.point == Point::Sun && a.second.point == Point::Sun));
    let moons = aspects
        .iter()
        .find(|a| a.first.point == Point::Moon && a.second.point == Point::Moon)
        .unwrap();
    assert_eq!(moons.kind, AspectKind::Opposition);
    assert!(aspects.iter().all(|a| a.first.subject == 0 && a.second.subject == 1));
}
