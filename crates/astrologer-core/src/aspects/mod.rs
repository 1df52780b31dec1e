//! Aspect Detector.

pub mod calculator;
pub mod orbs;
pub mod types;

pub use calculator::AspectDetector;
pub use orbs::{default_orb, default_orb_table, OrbPolicy};
pub use types::{Aspect, AspectEnd, AspectKind, AspectMotion};
