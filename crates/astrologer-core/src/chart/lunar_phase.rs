use serde::{Deserialize, Serialize};

use crate::astronomy::{cos_deg, normalize_degrees};

const PHASE_STEPS: f64 = 28.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhaseName {
    const ORDER: [MoonPhaseName; 8] = [
        MoonPhaseName::NewMoon,
        MoonPhaseName::WaxingCrescent,
        MoonPhaseName::FirstQuarter,
        MoonPhaseName::WaxingGibbous,
        MoonPhaseName::FullMoon,
        MoonPhaseName::WaningGibbous,
        MoonPhaseName::LastQuarter,
        MoonPhaseName::WaningCrescent,
    ];

    /// Octant centred on each principal phase
    pub fn from_angle(angle: f64) -> Self {
        let octant = ((normalize_degrees(angle) + 22.5) / 45.0).floor() as usize % 8;
        Self::ORDER[octant]
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "🌑",
            MoonPhaseName::WaxingCrescent => "🌒",
            MoonPhaseName::FirstQuarter => "🌓",
            MoonPhaseName::WaxingGibbous => "🌔",
            MoonPhaseName::FullMoon => "🌕",
            MoonPhaseName::WaningGibbous => "🌖",
            MoonPhaseName::LastQuarter => "🌗",
            MoonPhaseName::WaningCrescent => "🌘",
        }
    }
}

/// Sun-Moon phase relationship of a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LunarPhase {
    /// Elongation of the Moon east of the Sun, [0, 360)
    pub angle: f64,
    /// 1-28
    pub phase: u8,
    pub name: MoonPhaseName,
    /// Illuminated fraction of the disc, 0-1
    pub illumination: f64,
}

impl LunarPhase {
    pub fn from_longitudes(sun: f64, moon: f64) -> Self {
        let angle = normalize_degrees(moon - sun);
        let phase = ((angle * PHASE_STEPS / 360.0).floor() as u8).min(PHASE_STEPS as u8 - 1) + 1;
        Self {
            angle,
            phase,
            name: MoonPhaseName::from_angle(angle),
            illumination: (1.0 - cos_deg(angle)) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_full() {
        let new = LunarPhase::from_longitudes(100.0, 101.0);
        assert_eq!(new.phase, 1);
        assert_eq!(new.name, MoonPhaseName::NewMoon);
        assert!(new.illumination < 0.001);

        let full = LunarPhase::from_longitudes(100.0, 280.0);
        assert_eq!(full.phase, 15);
        assert_eq!(full.name, MoonPhaseName::FullMoon);
        assert!((full.illumination - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_quarters_wrap_through_aries() {
        let first = LunarPhase::from_longitudes(350.0, 80.0);
        assert!((first.angle - 90.0).abs() < 1e-9);
        assert_eq!(first.name, MoonPhaseName::FirstQuarter);
        assert!((first.illumination - 0.5).abs() < 1e-9);

        let last = LunarPhase::from_longitudes(10.0, 280.0);
        assert_eq!(last.name, MoonPhaseName::LastQuarter);
        assert_eq!(last.phase, 22);
    }

    #[test]
    fn test_late_waning_crescent_is_last_step() {
        let phase = LunarPhase::from_longitudes(0.0, 359.9);
        assert_eq!(phase.phase, 28);
        assert_eq!(phase.name, MoonPhaseName::NewMoon);
    }
}
