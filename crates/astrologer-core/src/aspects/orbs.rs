//! Orb policy: which aspects are looked for and how far from exact each may be.

use std::collections::{BTreeMap, HashMap};

use crate::aspects::types::AspectKind;
use crate::error::AstroError;

/// Default maximum deviation for an aspect kind, degrees
pub fn default_orb(kind: AspectKind) -> f64 {
    match kind {
        AspectKind::Conjunction | AspectKind::Opposition => 10.0,
        AspectKind::Trine => 8.0,
        AspectKind::Sextile => 6.0,
        AspectKind::Square => 5.0,
        _ => 1.0,
    }
}

/// The default orb table for every aspect kind
pub fn default_orb_table() -> BTreeMap<AspectKind, f64> {
    AspectKind::ALL.iter().map(|&k| (k, default_orb(k))).collect()
}

/// Enabled aspect kinds with their allowed orbs
#[derive(Debug, Clone, PartialEq)]
pub struct OrbPolicy {
    orbs: BTreeMap<AspectKind, f64>,
}

impl Default for OrbPolicy {
    fn default() -> Self {
        Self::from_table(&default_orb_table(), false)
    }
}

impl OrbPolicy {
    /// Majors from `table` (falling back to the defaults), plus minors when asked
    pub fn from_table(table: &BTreeMap<AspectKind, f64>, include_minor: bool) -> Self {
        let orbs = AspectKind::ALL
            .iter()
            .filter(|k| include_minor || k.is_major())
            .map(|&k| (k, table.get(&k).copied().unwrap_or_else(|| default_orb(k))))
            .collect();
        Self { orbs }
    }

    /// Apply per-request overrides keyed by aspect name. Naming an aspect
    /// enables it even when it is a minor one.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self, AstroError> {
        for (name, &orb) in overrides {
            let kind: AspectKind = name.parse()?;
            validate_orb(name, orb)?;
            self.orbs.insert(kind, orb);
        }
        Ok(self)
    }

    pub fn orb(&self, kind: AspectKind) -> Option<f64> {
        self.orbs.get(&kind).copied()
    }

    /// Enabled kinds in ascending angle order
    pub fn enabled(&self) -> impl Iterator<Item = (AspectKind, f64)> + '_ {
        self.orbs.iter().map(|(k, o)| (*k, *o))
    }

    pub fn max_orb(&self) -> f64 {
        self.orbs.values().copied().fold(0.0, f64::max)
    }

    /// Nearest enabled aspect within orb for a separation in [0, 180].
    ///
    /// An exact tie in deviation goes to the lower angle.
    pub fn nearest(&self, separation: f64) -> Option<AspectKind> {
        let mut best: Option<(AspectKind, f64)> = None;
        for (kind, orb) in self.enabled() {
            let deviation = (separation - kind.angle()).abs();
            if deviation > orb {
                continue;
            }
            match best {
                Some((_, d)) if deviation >= d => {}
                _ => best = Some((kind, deviation)),
            }
        }
        best.map(|(kind, _)| kind)
    }
}

pub(crate) fn validate_orb(name: &str, orb: f64) -> Result<(), AstroError> {
    if orb.is_finite() && orb >= 0.0 {
        Ok(())
    } else {
        Err(AstroError::UnsupportedConfiguration {
            field: format!("orb_overrides.{name}"),
            value: orb.to_string(),
            valid: vec!["a non-negative number of degrees".to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_has_only_majors() {
        let policy = OrbPolicy::default();
        assert_eq!(policy.orb(AspectKind::Conjunction), Some(10.0));
        assert_eq!(policy.orb(AspectKind::Square), Some(5.0));
        assert_eq!(policy.orb(AspectKind::Quincunx), Some(1.0));
        assert_eq!(policy.orb(AspectKind::Quintile), None);
        assert_eq!(policy.max_orb(), 10.0);
    }

    #[test]
    fn test_override_enables_minor() {
        let overrides = HashMap::from([("quintile".to_string(), 2.0), ("trine".to_string(), 3.0)]);
        let policy = OrbPolicy::default().with_overrides(&overrides).unwrap();
        assert_eq!(policy.orb(AspectKind::Quintile), Some(2.0));
        assert_eq!(policy.orb(AspectKind::Trine), Some(3.0));
    }

    #[test]
    fn test_bad_overrides_rejected() {
        let unknown = HashMap::from([("novile".to_string(), 2.0)]);
        assert!(OrbPolicy::default().with_overrides(&unknown).is_err());
        let negative = HashMap::from([("square".to_string(), -1.0)]);
        let err = OrbPolicy::default().with_overrides(&negative).unwrap_err();
        assert_eq!(err.field(), Some("orb_overrides.square"));
    }

    #[test]
    fn test_nearest_prefers_closer_then_lower() {
        let wide = HashMap::from([("sextile".to_string(), 20.0), ("square".to_string(), 20.0)]);
        let policy = OrbPolicy::default().with_overrides(&wide).unwrap();
        assert_eq!(policy.nearest(80.0), Some(AspectKind::Square));
        assert_eq!(policy.nearest(70.0), Some(AspectKind::Sextile));
        // 75 is 15 from both
        assert_eq!(policy.nearest(75.0), Some(AspectKind::Sextile));
        assert_eq!(OrbPolicy::default().nearest(45.0), None);
    }
}
