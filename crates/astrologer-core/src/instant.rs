//! Instant Resolver: civil date/time plus place to a single astronomical instant.

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::astronomy::{decimal_year, delta_t_seconds, julian_day};
use crate::error::AstroError;

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Civil birth (or event) data as supplied by a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthData {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub second: u32,
    /// IANA zone name such as `Europe/Rome`
    #[serde(default)]
    pub timezone: Option<String>,
    /// Explicit offset from UTC in minutes, east positive
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level
    #[serde(default)]
    pub altitude: f64,
}

impl BirthData {
    /// Birth data for a UTC moment at a place
    pub fn from_utc(utc: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            year: utc.year(),
            month: utc.month(),
            day: utc.day(),
            hour: utc.hour(),
            minute: utc.minute(),
            second: utc.second(),
            timezone: Some("UTC".to_string()),
            utc_offset_minutes: None,
            latitude,
            longitude,
            altitude: 0.0,
        }
    }
}

/// Validated geodetic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPositionRecord")]
pub struct GeoPosition {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    /// Metres
    pub altitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Result<Self, AstroError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AstroError::invalid_coordinate(
                "latitude",
                latitude,
                "must be within [-90, 90]",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AstroError::invalid_coordinate(
                "longitude",
                longitude,
                "must be within [-180, 180]",
            ));
        }
        if !altitude.is_finite() {
            return Err(AstroError::invalid_coordinate(
                "altitude",
                altitude,
                "must be a finite number of metres",
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            altitude,
        })
    }
}

#[derive(Deserialize)]
struct GeoPositionRecord {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    altitude: f64,
}

impl TryFrom<GeoPositionRecord> for GeoPosition {
    type Error = AstroError;

    fn try_from(record: GeoPositionRecord) -> Result<Self, Self::Error> {
        Self::new(record.latitude, record.longitude, record.altitude)
    }
}

/// How to resolve a local time that occurs twice (DST fall-back)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AmbiguousTimePolicy {
    /// The first occurrence (the offset in force before the transition)
    #[default]
    Earliest,
    /// The second occurrence
    Latest,
    Reject,
}

impl AmbiguousTimePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            AmbiguousTimePolicy::Earliest => "earliest",
            AmbiguousTimePolicy::Latest => "latest",
            AmbiguousTimePolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for AmbiguousTimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AmbiguousTimePolicy {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "earliest" => Ok(AmbiguousTimePolicy::Earliest),
            "latest" => Ok(AmbiguousTimePolicy::Latest),
            "reject" => Ok(AmbiguousTimePolicy::Reject),
            _ => Err(AstroError::unsupported(
                "ambiguous_time",
                s,
                ["earliest", "latest", "reject"],
            )),
        }
    }
}

impl From<AmbiguousTimePolicy> for String {
    fn from(p: AmbiguousTimePolicy) -> Self {
        p.name().to_string()
    }
}

impl TryFrom<String> for AmbiguousTimePolicy {
    type Error = AstroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A fully resolved moment and place. Immutable once built.
///
/// Deserialization re-derives the Julian days from `utc`; stored values that
/// disagree are rejected along with offsets that do not match the zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstantRecord")]
pub struct Instant {
    utc: DateTime<Utc>,
    local: DateTime<FixedOffset>,
    timezone: Option<String>,
    location: GeoPosition,
    julian_day_ut: f64,
    delta_t_seconds: f64,
    julian_day_tt: f64,
}

impl Instant {
    /// Build an instant directly from a UTC timestamp
    pub fn from_utc(utc: DateTime<Utc>, location: GeoPosition) -> Self {
        Self::build(utc, utc.fixed_offset(), None, location)
    }

    fn build(
        utc: DateTime<Utc>,
        local: DateTime<FixedOffset>,
        timezone: Option<String>,
        location: GeoPosition,
    ) -> Self {
        let julian_day_ut = julian_day(utc);
        let delta_t_seconds = delta_t_seconds(decimal_year(utc));
        Self {
            utc,
            local,
            timezone,
            location,
            julian_day_ut,
            delta_t_seconds,
            julian_day_tt: julian_day_ut + delta_t_seconds / 86_400.0,
        }
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    /// Civil time with the offset that was in force
    pub fn local(&self) -> DateTime<FixedOffset> {
        self.local
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.local.offset().local_minus_utc() / 60
    }

    pub fn location(&self) -> GeoPosition {
        self.location
    }

    pub fn julian_day_ut(&self) -> f64 {
        self.julian_day_ut
    }

    pub fn delta_t_seconds(&self) -> f64 {
        self.delta_t_seconds
    }

    pub fn julian_day_tt(&self) -> f64 {
        self.julian_day_tt
    }

    /// The same place shifted by `days` (used for finite differences)
    pub fn shifted(&self, days: f64) -> Result<Self, AstroError> {
        let millis = days * 86_400_000.0;
        let utc = chrono::Duration::try_milliseconds(millis.round() as i64)
            .filter(|_| millis.is_finite())
            .and_then(|step| self.utc.checked_add_signed(step))
            .ok_or_else(|| {
                AstroError::invalid_time(
                    "datetime",
                    format!("shifting {} by {days} days leaves the supported range", self.utc),
                )
            })?;
        Ok(Self::build(
            utc,
            utc.with_timezone(self.local.offset()),
            self.timezone.clone(),
            self.location,
        ))
    }
}

/// Serialized form of [`Instant`]; the derived fields are optional and checked
#[derive(Deserialize)]
struct InstantRecord {
    utc: DateTime<Utc>,
    local: DateTime<FixedOffset>,
    #[serde(default)]
    timezone: Option<String>,
    location: GeoPosition,
    #[serde(default)]
    julian_day_ut: Option<f64>,
    #[serde(default)]
    delta_t_seconds: Option<f64>,
    #[serde(default)]
    julian_day_tt: Option<f64>,
}

/// Stored Julian days may lose the last digit in text form
const JD_TOLERANCE: f64 = 1e-6;

impl TryFrom<InstantRecord> for Instant {
    type Error = AstroError;

    fn try_from(record: InstantRecord) -> Result<Self, Self::Error> {
        if record.local != record.utc {
            return Err(AstroError::invalid_time(
                "local",
                format!("{} is not the same moment as {}", record.local, record.utc),
            ));
        }
        if let Some(name) = &record.timezone {
            let tz: Tz = name.parse().map_err(|_| {
                AstroError::unsupported("timezone", name.as_str(), ["an IANA time zone name"])
            })?;
            let expected = record.utc.with_timezone(&tz).offset().fix();
            if expected != *record.local.offset() {
                return Err(AstroError::invalid_time(
                    "utc_offset_minutes",
                    format!("{name} is {expected} at {}, not {}", record.utc, record.local.offset()),
                ));
            }
        }

        let instant = Self::build(record.utc, record.local, record.timezone, record.location);
        let stored = [
            ("julian_day_ut", record.julian_day_ut, instant.julian_day_ut),
            ("delta_t_seconds", record.delta_t_seconds, instant.delta_t_seconds),
            ("julian_day_tt", record.julian_day_tt, instant.julian_day_tt),
        ];
        for (field, value, derived) in stored {
            if let Some(value) = value {
                if !value.is_finite() || (value - derived).abs() > JD_TOLERANCE {
                    return Err(AstroError::invalid_time(
                        field,
                        format!("{value} does not match {derived} derived from {}", instant.utc),
                    ));
                }
            }
        }
        Ok(instant)
    }
}

/// Resolves [`BirthData`] into an [`Instant`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantResolver {
    pub ambiguous: AmbiguousTimePolicy,
}

impl InstantResolver {
    pub fn new(ambiguous: AmbiguousTimePolicy) -> Self {
        Self { ambiguous }
    }

    pub fn resolve(&self, birth: &BirthData) -> Result<Instant, AstroError> {
        let location = GeoPosition::new(birth.latitude, birth.longitude, birth.altitude)?;
        let naive = civil_datetime(birth)?;

        let (local, timezone) = match (&birth.timezone, birth.utc_offset_minutes) {
            (Some(name), offset) => {
                let tz: Tz = name.parse().map_err(|_| {
                    AstroError::unsupported("timezone", name.as_str(), ["an IANA time zone name"])
                })?;
                let local = self.pick(tz.from_local_datetime(&naive), name)?;
                let fixed = local.with_timezone(&local.offset().fix());
                if let Some(minutes) = offset {
                    let actual = fixed.offset().local_minus_utc() / 60;
                    if actual != minutes {
                        return Err(AstroError::invalid_time(
                            "utc_offset_minutes",
                            format!(
                                "offset {minutes} min disagrees with {name}, which is {actual} min at that time"
                            ),
                        ));
                    }
                }
                (fixed, Some(tz.name().to_string()))
            }
            (None, Some(minutes)) => {
                let offset = fixed_offset(minutes)?;
                let local = offset.from_local_datetime(&naive).single().ok_or_else(|| {
                    AstroError::invalid_time("utc_offset_minutes", "local time cannot be mapped")
                })?;
                (local, None)
            }
            (None, None) => {
                warn!("No timezone or UTC offset supplied; treating local time as UTC");
                (Utc.from_utc_datetime(&naive).fixed_offset(), None)
            }
        };

        let instant = Instant::build(local.with_timezone(&Utc), local, timezone, location);
        debug!(
            "Resolved {} to {} (JD UT {:.6}, dT {:.1}s)",
            local, instant.utc, instant.julian_day_ut, instant.delta_t_seconds
        );
        Ok(instant)
    }

    fn pick(&self, result: LocalResult<DateTime<Tz>>, zone: &str) -> Result<DateTime<Tz>, AstroError> {
        match result {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::None => Err(AstroError::invalid_time(
                "hour",
                format!("local time does not exist in {zone} (skipped by a clock change)"),
            )),
            LocalResult::Ambiguous(earliest, latest) => match self.ambiguous {
                AmbiguousTimePolicy::Earliest => {
                    warn!("Ambiguous local time in {zone}; using the earlier occurrence");
                    Ok(earliest)
                }
                AmbiguousTimePolicy::Latest => {
                    warn!("Ambiguous local time in {zone}; using the later occurrence");
                    Ok(latest)
                }
                AmbiguousTimePolicy::Reject => Err(AstroError::invalid_time(
                    "hour",
                    format!("local time occurs twice in {zone} (repeated by a clock change)"),
                )),
            },
        }
    }
}

fn civil_datetime(birth: &BirthData) -> Result<NaiveDateTime, AstroError> {
    if !(1..=12).contains(&birth.month) {
        return Err(AstroError::invalid_time("month", format!("{} is not in 1-12", birth.month)));
    }
    let date = NaiveDate::from_ymd_opt(birth.year, birth.month, birth.day).ok_or_else(|| {
        AstroError::invalid_time(
            "day",
            format!("{}-{:02} has no day {}", birth.year, birth.month, birth.day),
        )
    })?;
    if birth.hour > 23 {
        return Err(AstroError::invalid_time("hour", format!("{} is not in 0-23", birth.hour)));
    }
    if birth.minute > 59 {
        return Err(AstroError::invalid_time("minute", format!("{} is not in 0-59", birth.minute)));
    }
    if birth.second > 59 {
        return Err(AstroError::invalid_time("second", format!("{} is not in 0-59", birth.second)));
    }
    let time = NaiveTime::from_hms_opt(birth.hour, birth.minute, birth.second)
        .ok_or_else(|| AstroError::invalid_time("hour", "invalid time of day"))?;
    Ok(date.and_time(time))
}

fn fixed_offset(minutes: i32) -> Result<FixedOffset, AstroError> {
    if minutes.abs() > MAX_OFFSET_MINUTES {
        return Err(AstroError::invalid_time(
            "utc_offset_minutes",
            format!("{minutes} is beyond +/-{MAX_OFFSET_MINUTES} minutes"),
        ));
    }
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| AstroError::invalid_time("utc_offset_minutes", "offset out of range"))
}
