//! Astrological chart computation engine.
//!
//! Resolves birth data to an instant, looks up body positions, applies the
//! tropical or sidereal zodiac, divides the sky into houses and finds the
//! aspects within one subject or between two.

pub mod aspects;
pub mod astronomy;
pub mod chart;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod instant;
pub mod placement;
pub mod settings;
pub mod zodiac;

pub use aspects::{Aspect, AspectDetector, AspectKind, AspectMotion, OrbPolicy};
pub use chart::{
    Chart, ChartEngine, ChartOptions, ChartRequest, ChartType, CompositeHouseMode, SubjectChart,
    SubjectSpec,
};
pub use ephemeris::{AnalyticEphemeris, BodyPosition, EphemerisError, EphemerisProvider, Perspective, Point};
pub use error::{AstroError, ErrorKind};
pub use houses::{HouseCalculator, HouseCusps, HouseSystem};
pub use instant::{AmbiguousTimePolicy, BirthData, GeoPosition, Instant, InstantResolver};
pub use placement::{MotionState, Placement, ZodiacSign};
pub use settings::{EngineSettings, SettingsError};
pub use zodiac::{AyanamshaTable, SiderealMode, ZodiacFrame, ZodiacType};

#[cfg(feature = "swisseph")]
pub use ephemeris::SwissEphemerisAdapter;

/// Compute a chart with the built-in ephemeris and default settings
pub fn compute_chart(
    subjects: &[SubjectSpec],
    chart_type: ChartType,
    options: &ChartOptions,
) -> Result<Chart, AstroError> {
    ChartEngine::default().compute_chart(subjects, chart_type, options)
}
