//! Sub-point time series for a body, end to end
//!
//! Ties the sampler to the active ephemeris and the exporter. The default
//! sun and moon algorithms cover two hours from 2024-04-01 00:00 UTC in
//! 0.1 hour steps.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};

use crate::celestial::CelestialBody;
use crate::export::{self, OutputFormat, PositionTable};
use crate::sampler::PositionSampler;
use crate::settings::EphemerisSettings;
use crate::Result;

/// Default spacing between samples in hours
pub const DEFAULT_INCREMENT_HOURS: f64 = 0.1;

/// Default length of the series in hours
pub const DEFAULT_DURATION_HOURS: f64 = 2.0;

/// 2024-04-01 00:00:00 UTC
pub fn default_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A body and the sampling to apply to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionAlgorithm {
    pub body: CelestialBody,
    pub sampler: PositionSampler,
}

impl PositionAlgorithm {
    pub fn new(body: CelestialBody, sampler: PositionSampler) -> Self {
        Self { body, sampler }
    }

    /// Default sampling for `body`
    pub fn for_body(body: CelestialBody) -> Self {
        Self::new(
            body,
            PositionSampler::new(default_start(), DEFAULT_INCREMENT_HOURS, DEFAULT_DURATION_HOURS),
        )
    }

    pub fn sun() -> Self {
        Self::for_body(CelestialBody::Sun)
    }

    pub fn moon() -> Self {
        Self::for_body(CelestialBody::Moon)
    }

    /// Output stem, e.g. `sunposition`
    pub fn name(&self) -> String {
        format!("{}position", self.body.name().replace('_', ""))
    }

    /// Sample the body against the active ephemeris
    pub fn process(&self, settings: &mut EphemerisSettings) -> Result<PositionTable> {
        let timescale = settings.timescale().clone();
        let kernel = settings.ephemeris()?;
        let table = self.sampler.compute_with(kernel, &timescale, self.body)?;
        log::debug!("{}: {} positions", self.name(), table.len());
        Ok(table)
    }

    /// Write `table` as `<dir>/<name>.<ext>`
    pub fn write(&self, table: &PositionTable, format: OutputFormat, dir: &Path) -> Result<PathBuf> {
        Ok(export::write(table, &self.name(), format, dir)?)
    }

    /// Process then write
    pub fn run(
        &self,
        settings: &mut EphemerisSettings,
        format: OutputFormat,
        dir: &Path,
    ) -> Result<PathBuf> {
        let table = self.process(settings)?;
        self.write(&table, format, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CelestialBody::Sun, "sunposition")]
    #[case(CelestialBody::Moon, "moonposition")]
    #[case(CelestialBody::Jupiter, "jupiterposition")]
    fn test_names(#[case] body: CelestialBody, #[case] name: &str) {
        assert_eq!(PositionAlgorithm::for_body(body).name(), name);
    }

    #[test]
    fn test_defaults() {
        let sun = PositionAlgorithm::sun();
        assert_eq!(sun.sampler.start, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(sun.sampler.increment_hours, 0.1);
        assert_eq!(sun.sampler.duration_hours, 2.0);
        assert_eq!(sun.sampler.sample_count(), 20);
        assert_eq!(PositionAlgorithm::moon().body, CelestialBody::Moon);
    }
}
