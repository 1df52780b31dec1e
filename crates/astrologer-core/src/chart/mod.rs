//! Chart Composer and the chart data model.

pub mod composer;
pub mod composite;
pub mod lunar_phase;
pub mod options;
pub mod relationship;
pub mod subject;
pub mod types;

pub use composer::ChartEngine;
pub use lunar_phase::{LunarPhase, MoonPhaseName};
pub use options::{ChartOptions, ChartType, CompositeHouseMode};
pub use relationship::{RelationshipScore, ScoreBand, ScoredAspect};
pub use subject::{ChartRequest, SubjectSpec};
pub use types::{Chart, HouseOverlay, SubjectChart};
