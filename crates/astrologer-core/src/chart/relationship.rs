//! Synastry compatibility score after Ciro Discepolo.

use serde::{Deserialize, Serialize};

use crate::aspects::{Aspect, AspectKind};
use crate::ephemeris::Point;
use crate::placement::Placement;

/// Orb (degrees) within which the strongest contacts score their top value
const TIGHT_ORB: f64 = 2.0;
const DESTINY_SIGN_POINTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Minimal,
    Medium,
    Important,
    VeryImportant,
    Exceptional,
    RareExceptional,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=4 => ScoreBand::Minimal,
            5..=9 => ScoreBand::Medium,
            10..=14 => ScoreBand::Important,
            15..=19 => ScoreBand::VeryImportant,
            20..=29 => ScoreBand::Exceptional,
            _ => ScoreBand::RareExceptional,
        }
    }
}

/// One aspect that counted toward the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAspect {
    pub first: Point,
    pub second: Point,
    pub kind: AspectKind,
    pub orb: f64,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipScore {
    pub score: u32,
    pub band: ScoreBand,
    /// Both Sun signs share a quality
    pub is_destiny_sign: bool,
    pub aspects: Vec<ScoredAspect>,
}

impl RelationshipScore {
    /// Score the cross aspects of a synastry between subjects `a` and `b`
    pub fn evaluate(a: &[Placement], b: &[Placement], aspects: &[Aspect]) -> Self {
        let sun = |set: &[Placement]| set.iter().find(|p| p.point == Point::Sun).map(|p| p.quality);
        let is_destiny_sign = matches!((sun(a), sun(b)), (Some(qa), Some(qb)) if qa == qb);

        let scored: Vec<ScoredAspect> = aspects
            .iter()
            .filter_map(|aspect| {
                aspect_points(aspect).map(|points| ScoredAspect {
                    first: aspect.first.point,
                    second: aspect.second.point,
                    kind: aspect.kind,
                    orb: aspect.orb,
                    points,
                })
            })
            .collect();

        let score = scored.iter().map(|s| s.points).sum::<u32>()
            + if is_destiny_sign { DESTINY_SIGN_POINTS } else { 0 };

        Self {
            score,
            band: ScoreBand::from_score(score),
            is_destiny_sign,
            aspects: scored,
        }
    }
}

fn aspect_points(aspect: &Aspect) -> Option<u32> {
    use AspectKind::*;
    use Point::*;

    let tight = if aspect.abs_orb() <= TIGHT_ORB { 11 } else { 8 };
    let major = aspect.kind.is_major();

    if aspect.connects(Sun, Sun) {
        return match aspect.kind {
            Conjunction | Opposition | Square => Some(tight),
            _ if major => Some(4),
            _ => None,
        };
    }
    if aspect.connects(Sun, Moon) {
        return match aspect.kind {
            Conjunction => Some(tight),
            _ if major => Some(4),
            _ => None,
        };
    }
    if (aspect.connects(Sun, Ascendant) || aspect.connects(Moon, Ascendant)) && major {
        return Some(4);
    }
    if aspect.connects(Venus, Mars) {
        return Some(4);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::AspectDetector;
    use crate::ephemeris::BodyPosition;
    use crate::placement::PlacementAssembler;

    fn set(points: &[(Point, f64)]) -> Vec<Placement> {
        points
            .iter()
            .map(|&(point, longitude)| {
                PlacementAssembler::default().place(
                    point,
                    &BodyPosition {
                        longitude,
                        latitude: 0.0,
                        distance: 1.0,
                        speed: 1.0,
                    },
                    None,
                )
            })
            .collect()
    }

    #[test]
    fn test_bands() {
        assert_eq!(ScoreBand::from_score(0), ScoreBand::Minimal);
        assert_eq!(ScoreBand::from_score(5), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_score(14), ScoreBand::Important);
        assert_eq!(ScoreBand::from_score(19), ScoreBand::VeryImportant);
        assert_eq!(ScoreBand::from_score(29), ScoreBand::Exceptional);
        assert_eq!(ScoreBand::from_score(30), ScoreBand::RareExceptional);
    }

    #[test]
    fn test_sun_conjunctions_and_destiny_sign() {
        // Suns in Aries and Libra (both cardinal), 1 degree from opposition
        let a = set(&[(Point::Sun, 10.0), (Point::Venus, 100.0)]);
        let b = set(&[(Point::Sun, 191.0), (Point::Mars, 160.0)]);
        let aspects = AspectDetector::default().between((0, &a), (1, &b));
        let score = RelationshipScore::evaluate(&a, &b, &aspects);

        assert!(score.is_destiny_sign);
        let sun_sun = score.aspects.iter().find(|s| s.first == Point::Sun && s.second == Point::Sun).unwrap();
        assert_eq!(sun_sun.kind, AspectKind::Opposition);
        assert_eq!(sun_sun.points, 11);
        // Venus 100 / Mars 160 is a sextile
        assert!(score.aspects.iter().any(|s| s.first == Point::Venus && s.points == 4));
        assert_eq!(score.score, 11 + 4 + 5);
        assert_eq!(score.band, ScoreBand::Exceptional);
    }

    #[test]
    fn test_unrelated_aspects_do_not_count() {
        let a = set(&[(Point::Jupiter, 10.0)]);
        let b = set(&[(Point::Saturn, 10.0)]);
        let aspects = AspectDetector::default().between((0, &a), (1, &b));
        assert_eq!(aspects.len(), 1);
        let score = RelationshipScore::evaluate(&a, &b, &aspects);
        assert_eq!(score.score, 0);
        assert!(!score.is_destiny_sign);
        assert_eq!(score.band, ScoreBand::Minimal);
    }
}
