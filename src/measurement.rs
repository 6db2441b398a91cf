//! Inbound measurement parsing: bounds validation and timestamp
//! normalization.
//!
//! Sensors in the field report over flaky links with drifting clocks, so the
//! `entry_timestamp` field is best-effort: it may be epoch seconds, an ISO
//! datetime with or without an offset, missing, or garbage. The parser
//! resolves all of that into a canonical UTC instant and classifies the
//! reading as plain or plant-bound. It has no database dependency; its
//! output is the sole input to [`Repository::add_data_entry`].
//!
//! [`Repository::add_data_entry`]: crate::repository::Repository::add_data_entry

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

// ---

/// Accepted temperature range in degrees Celsius.
const TEMPERATURE_RANGE: (f64, f64) = (-40.0, 70.0);

/// Wire format of a reading submission.
///
/// Required: `sensor_id`, `temperature`, `humidity`. Optional:
/// `entry_timestamp`, `wetness`. Only plant sensors report wetness; its
/// presence alone decides which entry table the reading lands in.
#[derive(Debug, Deserialize)]
pub struct MeasurementIn {
    // ---
    pub sensor_id: i64,
    pub entry_timestamp: Option<TimestampIn>,
    pub temperature: f64,
    pub humidity: f64,
    pub wetness: Option<f64>,
}

/// Raw `entry_timestamp` value before normalization.
///
/// Untagged: a JSON integer or float is epoch seconds, a string is a
/// datetime; anything else falls through to `Other` and is treated as
/// unparseable rather than rejecting the whole reading.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TimestampIn {
    EpochSeconds(i64),
    EpochSecondsFloat(f64),
    Text(String),
    Other(serde_json::Value),
}

/// A normalized reading, classified by its owning sensor class.
///
/// `Plain` readings belong to room sensors and land in
/// `humidity_temperature_entry`; `Wet` readings belong to plant sensors and
/// land in `plant_sensor_entry`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Plain {
        sensor_id: i64,
        timestamp: DateTime<Utc>,
        temperature: f64,
        humidity: f64,
    },
    Wet {
        sensor_id: i64,
        timestamp: DateTime<Utc>,
        temperature: f64,
        humidity: f64,
        wetness: f64,
    },
}

impl Reading {
    pub fn sensor_id(&self) -> i64 {
        match *self {
            Reading::Plain { sensor_id, .. } => sensor_id,
            Reading::Wet { sensor_id, .. } => sensor_id,
        }
    }
}

// ---

/// Validate a reading submission and normalize its timestamp to UTC.
///
/// Bounds: temperature ∈ [-40, 70] °C, humidity ∈ [0, 1], and wetness
/// ∈ [0, 1] when present; any violation is a [`Error::Validation`].
///
/// Timestamp resolution, in priority order:
/// 1. epoch numeric value → UTC seconds since epoch
/// 2. datetime text with an offset → converted to UTC
/// 3. datetime text without an offset → UTC attached, clock value unshifted
/// 4. absent or unparseable → current processing time in UTC (logged)
pub fn parse_measurement(measurement: &MeasurementIn) -> Result<Reading> {
    // ---
    let (temp_min, temp_max) = TEMPERATURE_RANGE;
    if !(temp_min..=temp_max).contains(&measurement.temperature) {
        return Err(Error::Validation(format!(
            "temperature {} outside [{}, {}]",
            measurement.temperature, temp_min, temp_max
        )));
    }
    if !(0.0..=1.0).contains(&measurement.humidity) {
        return Err(Error::Validation(format!(
            "humidity {} outside [0, 1]",
            measurement.humidity
        )));
    }
    if let Some(wetness) = measurement.wetness {
        if !(0.0..=1.0).contains(&wetness) {
            return Err(Error::Validation(format!(
                "wetness {wetness} outside [0, 1]"
            )));
        }
    }

    let timestamp = resolve_timestamp(measurement.entry_timestamp.as_ref());

    Ok(match measurement.wetness {
        Some(wetness) => Reading::Wet {
            sensor_id: measurement.sensor_id,
            timestamp,
            temperature: measurement.temperature,
            humidity: measurement.humidity,
            wetness,
        },
        None => Reading::Plain {
            sensor_id: measurement.sensor_id,
            timestamp,
            temperature: measurement.temperature,
            humidity: measurement.humidity,
        },
    })
}

/// Resolve a raw timestamp to a UTC instant, falling back to the current
/// processing time when the value is absent or unparseable.
fn resolve_timestamp(raw: Option<&TimestampIn>) -> DateTime<Utc> {
    // ---
    let parsed = match raw {
        None => None,
        Some(TimestampIn::EpochSeconds(secs)) => DateTime::from_timestamp(*secs, 0),
        Some(TimestampIn::EpochSecondsFloat(secs)) => from_epoch_float(*secs),
        Some(TimestampIn::Text(text)) => parse_datetime_text(text),
        Some(TimestampIn::Other(value)) => {
            warn!("entry_timestamp has unsupported shape: {value}");
            None
        }
    };

    match parsed {
        Some(ts) => ts,
        None => {
            let now = Utc::now();
            if raw.is_some() {
                warn!("could not parse entry_timestamp, stamping reading at {now}");
            } else {
                warn!("entry_timestamp missing, stamping reading at {now}");
            }
            now
        }
    }
}

fn from_epoch_float(secs: f64) -> Option<DateTime<Utc>> {
    // ---
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

/// Parse a datetime string; an explicit offset is honored, a naive value is
/// interpreted as UTC without shifting the clock value.
fn parse_datetime_text(text: &str) -> Option<DateTime<Utc>> {
    // ---
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
