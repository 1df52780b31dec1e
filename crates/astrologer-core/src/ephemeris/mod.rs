pub mod analytic;
mod kepler;
mod moon;
pub mod provider;
pub mod types;

#[cfg(feature = "swisseph")]
pub mod adapter;

pub use analytic::AnalyticEphemeris;
pub use provider::EphemerisProvider;
pub use types::{BodyPosition, EphemerisError, Perspective, Point, PointKind};

#[cfg(feature = "swisseph")]
pub use adapter::SwissEphemerisAdapter;
