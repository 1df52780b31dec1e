use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::ephemeris::types::{BodyPosition, EphemerisError, Perspective, Point};
use crate::instant::Instant;

/// Source of raw body positions.
///
/// Implementations must be stateless per call so that lookups for distinct
/// bodies can run concurrently.
pub trait EphemerisProvider: Send + Sync {
    /// Short identifier, used in logs and error messages
    fn name(&self) -> &str;

    /// Position of a single body at an instant
    fn position(
        &self,
        body: Point,
        instant: &Instant,
        perspective: Perspective,
    ) -> Result<BodyPosition, EphemerisError>;

    /// Positions for a set of bodies. Fans out across bodies and fails on the
    /// first error.
    fn positions(
        &self,
        instant: &Instant,
        bodies: &[Point],
        perspective: Perspective,
    ) -> Result<BTreeMap<Point, BodyPosition>, EphemerisError> {
        bodies
            .par_iter()
            .map(|&body| {
                self.position(body, instant, perspective)
                    .map(|position| (body, position))
            })
            .collect()
    }
}
