use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chart::options::{ChartOptions, ChartType};
use crate::instant::BirthData;

/// A named person or event to chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSpec {
    pub name: String,
    #[serde(flatten)]
    pub birth: BirthData,
}

impl SubjectSpec {
    pub fn new(name: impl Into<String>, birth: BirthData) -> Self {
        Self {
            name: name.into(),
            birth,
        }
    }

    /// The current moment, in UTC, at a place
    pub fn now(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self::new(name, BirthData::from_utc(Utc::now(), latitude, longitude))
    }
}

/// Everything needed for one chart computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    pub chart_type: ChartType,
    pub subjects: Vec<SubjectSpec>,
    #[serde(default)]
    pub options: ChartOptions,
}

impl ChartRequest {
    pub fn natal(subject: SubjectSpec, options: ChartOptions) -> Self {
        Self {
            chart_type: ChartType::Natal,
            subjects: vec![subject],
            options,
        }
    }

    pub fn pair(chart_type: ChartType, first: SubjectSpec, second: SubjectSpec, options: ChartOptions) -> Self {
        Self {
            chart_type,
            subjects: vec![first, second],
            options,
        }
    }
}
