//! Error taxonomy surfaced by chart computation.
//!
//! Every validation failure names the offending field so callers can report it
//! back to the requester. Only ephemeris failures can be retryable.

use thiserror::Error;

use crate::ephemeris::EphemerisError;
use crate::houses::HouseSystem;

/// Errors that can occur while computing a chart
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstroError {
    #[error("Invalid time in `{field}`: {reason}")]
    InvalidTime { field: String, reason: String },

    #[error("Invalid coordinate `{field}` = {value}: {reason}")]
    InvalidCoordinate {
        field: String,
        value: f64,
        reason: String,
    },

    #[error("Sidereal zodiac requested without a sidereal mode (`sidereal_mode` is required)")]
    MissingAyanamsha,

    #[error("House system {system} is undefined at latitude {latitude}: {reason}")]
    HouseSystemUndefined {
        system: HouseSystem,
        latitude: f64,
        reason: String,
    },

    #[error("Ephemeris unavailable{}: {reason}", for_body(.body))]
    EphemerisUnavailable {
        body: Option<String>,
        reason: String,
        retryable: bool,
    },

    #[error("Unsupported configuration `{field}` = {value:?}. Valid values: {valid:?}")]
    UnsupportedConfiguration {
        field: String,
        value: String,
        valid: Vec<String>,
    },
}

fn for_body(body: &Option<String>) -> String {
    body.as_ref().map(|b| format!(" for {b}")).unwrap_or_default()
}

/// Coarse classification of [`AstroError`], useful for mapping onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidTime,
    InvalidCoordinate,
    MissingAyanamsha,
    HouseSystemUndefined,
    EphemerisUnavailable,
    UnsupportedConfiguration,
}

impl AstroError {
    pub fn invalid_time(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_coordinate(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    pub fn unsupported<I, S>(field: impl Into<String>, value: impl Into<String>, valid: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::UnsupportedConfiguration {
            field: field.into(),
            value: value.into(),
            valid: valid.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTime { .. } => ErrorKind::InvalidTime,
            Self::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
            Self::MissingAyanamsha => ErrorKind::MissingAyanamsha,
            Self::HouseSystemUndefined { .. } => ErrorKind::HouseSystemUndefined,
            Self::EphemerisUnavailable { .. } => ErrorKind::EphemerisUnavailable,
            Self::UnsupportedConfiguration { .. } => ErrorKind::UnsupportedConfiguration,
        }
    }

    /// Name of the request field that caused the failure, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidTime { field, .. }
            | Self::InvalidCoordinate { field, .. }
            | Self::UnsupportedConfiguration { field, .. } => Some(field),
            Self::MissingAyanamsha => Some("sidereal_mode"),
            Self::HouseSystemUndefined { .. } => Some("house_system"),
            Self::EphemerisUnavailable { .. } => None,
        }
    }

    /// Whether the serving layer may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::EphemerisUnavailable { retryable: true, .. })
    }
}

impl From<EphemerisError> for AstroError {
    fn from(err: EphemerisError) -> Self {
        let retryable = err.is_retryable();
        let body = err.body().map(|b| b.to_string());
        Self::EphemerisUnavailable {
            body,
            reason: err.to_string(),
            retryable,
        }
    }
}
