use log::debug;
use rayon::prelude::*;

use crate::aspects::orbs::OrbPolicy;
use crate::aspects::types::{Aspect, AspectEnd, AspectMotion};
use crate::astronomy::signed_delta;
use crate::placement::{Placement, DEFAULT_STATIONARY_EPSILON};

/// Deviation (degrees) below which an aspect is reported as exact
const EXACT_TOLERANCE: f64 = 1e-9;

/// Finds aspects within one placement set or across two
#[derive(Debug, Clone)]
pub struct AspectDetector {
    policy: OrbPolicy,
    stationary_epsilon: f64,
}

impl Default for AspectDetector {
    fn default() -> Self {
        Self::new(OrbPolicy::default())
    }
}

impl AspectDetector {
    pub fn new(policy: OrbPolicy) -> Self {
        Self {
            policy,
            stationary_epsilon: DEFAULT_STATIONARY_EPSILON,
        }
    }

    /// Relative speed (deg/day) below which a pair counts as stationary
    pub fn with_stationary_epsilon(mut self, epsilon: f64) -> Self {
        self.stationary_epsilon = epsilon;
        self
    }

    pub fn policy(&self) -> &OrbPolicy {
        &self.policy
    }

    /// Aspect between two points, if their separation is within an enabled orb
    pub fn aspect_between(&self, first: AspectEnd, second: AspectEnd) -> Option<Aspect> {
        // Exactly symmetric in the two longitudes
        let raw = (first.longitude - second.longitude).abs();
        let separation = if raw > 180.0 { 360.0 - raw } else { raw };
        let delta = signed_delta(first.longitude, second.longitude);
        let kind = self.policy.nearest(separation)?;
        let angle = kind.angle();
        let orb = separation - angle;
        let relative_speed = second.speed - first.speed;

        Some(Aspect {
            first,
            second,
            kind,
            angle,
            separation,
            orb,
            motion: self.classify(orb, delta, relative_speed),
            relative_speed,
        })
    }

    /// Rate of change of the separation is `sign(delta) * relative_speed`;
    /// the aspect applies while that rate moves the orb toward zero.
    fn classify(&self, orb: f64, delta: f64, relative_speed: f64) -> AspectMotion {
        if orb.abs() <= EXACT_TOLERANCE {
            return AspectMotion::Exact;
        }
        if relative_speed.abs() < self.stationary_epsilon {
            return AspectMotion::Stationary;
        }
        let separation_rate = delta.signum() * relative_speed;
        if orb.signum() * separation_rate < 0.0 {
            AspectMotion::Applying
        } else {
            AspectMotion::Separating
        }
    }

    /// Aspects among the placements of one subject.
    ///
    /// Pairs of two angles and a node with its own opposite node are fixed
    /// by construction and skipped. Each aspect lists the earlier point first.
    pub fn within(&self, subject: usize, placements: &[Placement]) -> Vec<Aspect> {
        let n = placements.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let mut aspects: Vec<Aspect> = pairs
            .par_iter()
            .filter_map(|&(i, j)| {
                let (a, b) = if placements[i].point <= placements[j].point {
                    (&placements[i], &placements[j])
                } else {
                    (&placements[j], &placements[i])
                };
                if a.point == b.point
                    || (a.point.is_angle() && b.point.is_angle())
                    || a.point.paired_node() == Some(b.point)
                {
                    return None;
                }
                self.aspect_between(end(subject, a), end(subject, b))
            })
            .collect();

        sort_aspects(&mut aspects);
        debug!("{} aspects within subject {}", aspects.len(), subject);
        aspects
    }

    /// Aspects across two subjects: the full product of both sets, with the
    /// first subject's point always first.
    pub fn between(
        &self,
        (subject_a, a): (usize, &[Placement]),
        (subject_b, b): (usize, &[Placement]),
    ) -> Vec<Aspect> {
        let mut aspects: Vec<Aspect> = a
            .par_iter()
            .flat_map_iter(|pa| {
                b.iter()
                    .filter_map(move |pb| self.aspect_between(end(subject_a, pa), end(subject_b, pb)))
            })
            .collect();

        sort_aspects(&mut aspects);
        debug!(
            "{} aspects between subjects {} and {}",
            aspects.len(),
            subject_a,
            subject_b
        );
        aspects
    }
}

fn end(subject: usize, placement: &Placement) -> AspectEnd {
    AspectEnd {
        subject,
        point: placement.point,
        longitude: placement.longitude,
        speed: placement.speed,
    }
}

fn sort_aspects(aspects: &mut [Aspect]) {
    aspects.sort_by_key(|a| (a.first.subject, a.first.point, a.second.subject, a.second.point));
}
