//! Time-series sampling of body sub-points
//!
//! A `PositionSampler` turns (start, increment, duration) into evenly spaced
//! UTC timestamps and, for each one, projects a body's geocentric position
//! onto the WGS84 ellipsoid.

use chrono::{DateTime, Duration, Utc};
use nalgebra::Vector3;
use thiserror::Error;

use crate::celestial::CelestialBody;
use crate::constants::HOUR_S;
use crate::export::{ExportError, PositionTable};
use crate::jplephem::{JplephemError, SpiceKernel};
use crate::time::{Time, Timescale};
use crate::timeseries::TimeSeries;
use crate::toposlib::{geographic_position_of, SubPoint, WGS84};

/// Nanoseconds in one hour
const HOUR_NS: f64 = HOUR_S * 1e9;

/// Largest offset handed to chrono, in seconds
const MAX_OFFSET_S: f64 = (i64::MAX / 1_000) as f64;

/// Relative slack when counting whole increments in a duration
const RATIO_SLACK: f64 = 1e-12;

/// Error type for sampling
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("{0} has no sub-point")]
    NotPositional(CelestialBody),

    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] JplephemError),

    #[error("Table error: {0}")]
    Table(#[from] ExportError),

    #[error("Timestamp {index} lies outside the representable date range")]
    OutOfRange { index: usize },
}

/// Result type for sampling
pub type Result<T> = std::result::Result<T, SamplerError>;

/// Source of barycentric body positions
pub trait EphemerisProvider {
    /// Barycentric ICRF position of `body` in km at `time`
    fn barycentric_position(&self, body: CelestialBody, time: &Time) -> Result<Vector3<f64>>;
}

impl EphemerisProvider for SpiceKernel {
    fn barycentric_position(&self, body: CelestialBody, time: &Time) -> Result<Vector3<f64>> {
        let ids = body.naif_ids();
        let id = ids
            .iter()
            .copied()
            .find(|&id| self.contains(id))
            .or_else(|| ids.first().copied())
            .ok_or(SamplerError::NotPositional(body))?;
        Ok(self.barycentric_km(id, time.tdb_seconds_from_j2000())?)
    }
}

/// Evenly spaced sampling of a body's sub-point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSampler {
    /// First timestamp
    pub start: DateTime<Utc>,
    /// Spacing between timestamps in hours
    pub increment_hours: f64,
    /// Length of the series in hours
    pub duration_hours: f64,
}

impl PositionSampler {
    pub fn new(start: DateTime<Utc>, increment_hours: f64, duration_hours: f64) -> Self {
        Self {
            start,
            increment_hours,
            duration_hours,
        }
    }

    /// Sampler for a parsed `DD:HH:MM:SS` increment/duration pair
    pub fn from_timeseries(start: DateTime<Utc>, series: &TimeSeries) -> Self {
        Self::new(start, series.increment_hours(), series.duration_hours())
    }

    /// Number of timestamps, `floor(duration / increment)`
    ///
    /// Zero for non-finite input, an increment below one nanosecond, or a
    /// duration shorter than one increment.
    pub fn sample_count(&self) -> usize {
        let (inc, dur) = (self.increment_hours, self.duration_hours);
        if !inc.is_finite() || !dur.is_finite() || inc * HOUR_NS < 1.0 || dur < inc {
            return 0;
        }
        // A duration built from whole increments can land a hair below the
        // exact multiple.
        let ratio = dur / inc;
        (ratio * (1.0 + RATIO_SLACK)).floor() as usize
    }

    /// Timestamp `i`, computed from the start to avoid accumulated rounding
    ///
    /// The offset is split into whole seconds and a nanosecond remainder so
    /// that spans beyond the reach of an `i64` nanosecond count stay exact.
    pub fn timestamp(&self, i: usize) -> Result<DateTime<Utc>> {
        let seconds = i as f64 * self.increment_hours * HOUR_S;
        let whole = seconds.floor();
        let sub_ns = ((seconds - whole) * 1e9).round() as i64;

        let offset = if whole.abs() < MAX_OFFSET_S {
            Duration::try_seconds(whole as i64)
                .and_then(|d| d.checked_add(&Duration::nanoseconds(sub_ns)))
        } else {
            None
        };
        offset
            .and_then(|d| self.start.checked_add_signed(d))
            .ok_or(SamplerError::OutOfRange { index: i })
    }

    /// All `sample_count()` timestamps in increasing order
    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        (0..self.sample_count()).map(|i| self.timestamp(i)).collect()
    }

    /// Sub-point of `body` at every timestamp
    pub fn compute<P>(&self, provider: &P, body: CelestialBody) -> Result<PositionTable>
    where
        P: EphemerisProvider + ?Sized,
    {
        self.compute_with(provider, &Timescale::default(), body)
    }

    /// Sub-point of `body` at every timestamp, using the given timescale
    pub fn compute_with<P>(
        &self,
        provider: &P,
        timescale: &Timescale,
        body: CelestialBody,
    ) -> Result<PositionTable>
    where
        P: EphemerisProvider + ?Sized,
    {
        if !body.is_positional() || body == CelestialBody::Earth {
            return Err(SamplerError::NotPositional(body));
        }

        let timestamps = self.timestamps()?;
        log::debug!(
            "Sampling {} at {} timestamps from {}",
            body,
            timestamps.len(),
            self.start
        );

        let mut table = PositionTable::with_capacity(timestamps.len());
        for timestamp in timestamps {
            let time = timescale.from_datetime(timestamp);
            let point = sub_point(provider, body, &time)?;
            table.push(timestamp, point)?;
        }
        Ok(table)
    }
}

/// Sub-point of `body` at a single instant
pub fn sub_point<P>(provider: &P, body: CelestialBody, time: &Time) -> Result<SubPoint>
where
    P: EphemerisProvider + ?Sized,
{
    let target = provider.barycentric_position(body, time)?;
    let earth = provider.barycentric_position(CelestialBody::Earth, time)?;
    let geocentric_m = (target - earth) * 1000.0;
    Ok(geographic_position_of(&WGS84, time, &geocentric_m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    /// Earth at the origin and every other body at a fixed ICRF direction
    struct FixedDirection(Vector3<f64>);

    impl EphemerisProvider for FixedDirection {
        fn barycentric_position(&self, body: CelestialBody, _time: &Time) -> Result<Vector3<f64>> {
            match body {
                CelestialBody::Earth => Ok(Vector3::zeros()),
                _ => Ok(self.0),
            }
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_default_series_has_twenty_samples() {
        let sampler = PositionSampler::new(start(), 0.1, 2.0);
        let stamps = sampler.timestamps().unwrap();
        assert_eq!(stamps.len(), 20);
        assert_eq!(stamps[0], start());
        assert_eq!(stamps[1], start() + Duration::minutes(6));
        assert_eq!(stamps[19], start() + Duration::minutes(114));
        for pair in stamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::minutes(6));
        }
    }

    #[rstest]
    #[case(0.0, 2.0)]
    #[case(-1.0, 2.0)]
    #[case(1.0, 0.5)]
    #[case(f64::NAN, 2.0)]
    #[case(1.0, f64::INFINITY)]
    #[case(1e-14, 1e-13)]
    fn test_degenerate_input_is_empty(#[case] increment: f64, #[case] duration: f64) {
        let sampler = PositionSampler::new(start(), increment, duration);
        assert_eq!(sampler.sample_count(), 0);
        assert!(sampler.timestamps().unwrap().is_empty());
    }

    #[test]
    fn test_centuries_long_series_keeps_every_sample() {
        let start = Utc.with_ymd_and_hms(1600, 1, 1, 0, 0, 0).unwrap();
        let sampler = PositionSampler::new(start, 1000.0, 10_000_000.0);
        let stamps = sampler.timestamps().unwrap();
        assert_eq!(stamps.len(), sampler.sample_count());
        assert_eq!(stamps.len(), 10_000);
        assert_eq!(stamps[9_999], start + Duration::hours(9_999_000));
        for pair in stamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::hours(1000));
        }
    }

    #[test]
    fn test_unrepresentable_timestamp_is_an_error() {
        // Ten samples a million years apart run past chrono's calendar
        let sampler = PositionSampler::new(start(), 8.766e9, 8.766e10);
        assert_eq!(sampler.sample_count(), 10);
        assert!(sampler.timestamp(0).is_ok());
        assert!(matches!(
            sampler.timestamps(),
            Err(SamplerError::OutOfRange { .. })
        ));
        let provider = FixedDirection(Vector3::x());
        assert!(sampler.compute(&provider, CelestialBody::Sun).is_err());
    }

    #[test]
    fn test_count_rounds_down() {
        assert_eq!(PositionSampler::new(start(), 1.0, 2.9).sample_count(), 2);
        assert_eq!(PositionSampler::new(start(), 0.25, 1.0).sample_count(), 4);
    }

    #[test]
    fn test_from_timeseries() {
        let series = TimeSeries::parse("0:0:6", "0:2").unwrap();
        let sampler = PositionSampler::from_timeseries(start(), &series);
        assert_eq!(sampler.sample_count(), 20);
    }

    #[test]
    fn test_non_positional_bodies_rejected() {
        let provider = FixedDirection(Vector3::x());
        let sampler = PositionSampler::new(start(), 1.0, 2.0);
        for body in [CelestialBody::Earth, CelestialBody::Night, CelestialBody::DayNight] {
            assert!(matches!(
                sampler.compute(&provider, body),
                Err(SamplerError::NotPositional(b)) if b == body
            ));
        }
    }

    #[test]
    fn test_celestial_pole_maps_to_north_pole() {
        let provider = FixedDirection(Vector3::new(0.0, 0.0, 1.5e8));
        let sampler = PositionSampler::new(start(), 1.0, 3.0);
        let table = sampler.compute(&provider, CelestialBody::Sun).unwrap();
        assert_eq!(table.len(), 3);
        for (_, point) in table.iter() {
            assert_relative_eq!(point.latitude, 90.0, epsilon = 0.2);
        }
    }

    #[test]
    fn test_fixed_direction_drifts_west_with_earth_rotation() {
        // A body fixed on the celestial equator moves ~15.04 degrees west per hour
        let provider = FixedDirection(Vector3::new(1.5e8, 0.0, 0.0));
        let sampler = PositionSampler::new(start(), 1.0, 2.0);
        let table = sampler.compute(&provider, CelestialBody::Sun).unwrap();
        let points: Vec<_> = table.iter().map(|(_, p)| *p).collect();
        let step = (points[0].longitude - points[1].longitude).rem_euclid(360.0);
        assert_relative_eq!(step, 15.041, epsilon = 0.01);
        assert!(points[0].latitude.abs() < 0.2);
    }
}
