//! Parsing of `DD:HH:MM:SS` duration strings
//!
//! Increments and durations are written as up to four colon-separated numbers:
//! days, hours, minutes and seconds. Trailing fields may be omitted and fields
//! are not constrained to two digits, so `"0:1:30"`, `"2"` and `"0:0:0:90"` are
//! all valid.

use thiserror::Error;

use crate::constants::{DAY_S, HOUR_S, MINUTE_S};

/// Weight in seconds of each field, in order
const FIELD_WEIGHTS: [f64; 4] = [DAY_S, HOUR_S, MINUTE_S, 1.0];

/// Value returned by [`parse_timeseries`] when either string is malformed
pub const SENTINEL: (i64, f64) = (-1, -1.0);

/// Error type for duration parsing
#[derive(Debug, Error, PartialEq)]
pub enum DurationError {
    #[error("Empty duration string")]
    Empty,

    #[error("Too many fields in {0:?}: expected at most DD:HH:MM:SS")]
    TooManyFields(String),

    #[error("Invalid field {field:?} in {input:?}")]
    InvalidField { input: String, field: String },

    #[error("Duration {0:?} is not a finite number of seconds")]
    NotFinite(String),

    #[error("Increment must be greater than zero seconds")]
    ZeroIncrement,

    #[error("Duration {0:?} is negative")]
    NegativeDuration(String),
}

/// Result type for duration parsing
pub type Result<T> = std::result::Result<T, DurationError>;

/// Parse a `DD:HH:MM:SS` string into a length in seconds
pub fn parse_duration(text: &str) -> Result<f64> {
    if text.trim().is_empty() {
        return Err(DurationError::Empty);
    }

    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() > FIELD_WEIGHTS.len() {
        return Err(DurationError::TooManyFields(text.to_string()));
    }

    let mut seconds = 0.0;
    for (field, weight) in fields.iter().zip(FIELD_WEIGHTS.iter()) {
        let value: f64 = field
            .trim()
            .parse()
            .map_err(|_| DurationError::InvalidField {
                input: text.to_string(),
                field: field.to_string(),
            })?;
        seconds += value * weight;
    }

    if !seconds.is_finite() {
        return Err(DurationError::NotFinite(text.to_string()));
    }
    Ok(seconds)
}

/// A parsed increment/duration pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeries {
    /// Number of whole increments that fit in the duration
    pub samples: i64,
    /// Length of one increment in seconds
    pub increment_seconds: f64,
}

impl TimeSeries {
    /// Parse an increment and a duration, both formatted as `DD:HH:MM:SS`
    pub fn parse(increment: &str, duration: &str) -> Result<Self> {
        let increment_seconds = parse_duration(increment)?;
        let duration_seconds = parse_duration(duration)?;

        if increment_seconds <= 0.0 {
            return Err(DurationError::ZeroIncrement);
        }
        if duration_seconds < 0.0 {
            return Err(DurationError::NegativeDuration(duration.to_string()));
        }

        let samples = (duration_seconds / increment_seconds).floor();
        if !samples.is_finite() {
            return Err(DurationError::NotFinite(duration.to_string()));
        }

        Ok(Self {
            samples: samples as i64,
            increment_seconds,
        })
    }

    /// Increment length in hours
    pub fn increment_hours(&self) -> f64 {
        self.increment_seconds / HOUR_S
    }

    /// Total covered length in hours (`samples` whole increments)
    pub fn duration_hours(&self) -> f64 {
        self.samples as f64 * self.increment_hours()
    }
}

/// Parse an increment and duration into `(sample_count, increment_seconds)`
///
/// Any parse failure, including a zero increment, yields [`SENTINEL`]
/// (`(-1, -1.0)`) instead of an error.
pub fn parse_timeseries(increment: &str, duration: &str) -> (i64, f64) {
    match TimeSeries::parse(increment, duration) {
        Ok(series) => (series.samples, series.increment_seconds),
        Err(e) => {
            log::debug!("Rejected time series {increment:?}/{duration:?}: {e}");
            SENTINEL
        }
    }
}
