//! EarthSunMoon: where on Earth the Sun, Moon and planets are overhead
//!
//! Reads JPL SPK ephemerides, projects a body's geocentric position onto the
//! WGS84 ellipsoid over a span of time, and writes the resulting sub-points as
//! a FlatGeobuf or GeoJSON point layer.

use thiserror::Error;

pub mod algorithm;
pub mod celestial;
pub mod config;
pub mod constants;
pub mod earthlib;
pub mod export;
pub mod jplephem;
pub mod sampler;
pub mod settings;
pub mod time;
pub mod timeseries;
pub mod toposlib;

// Re-export commonly used types
pub use algorithm::PositionAlgorithm;
pub use celestial::CelestialBody;
pub use config::Config;
pub use export::{OutputFormat, PositionTable};
pub use sampler::{EphemerisProvider, PositionSampler};
pub use settings::EphemerisSettings;
pub use time::{Time, Timescale};
pub use timeseries::{parse_timeseries, TimeSeries};
pub use toposlib::SubPoint;

/// Main error type for the earthsunmoon library
#[derive(Debug, Error)]
pub enum EarthSunMoonError {
    #[error(transparent)]
    Duration(#[from] timeseries::DurationError),

    #[error(transparent)]
    Body(#[from] celestial::UnknownBody),

    #[error(transparent)]
    Ephemeris(#[from] jplephem::JplephemError),

    #[error(transparent)]
    Sampler(#[from] sampler::SamplerError),

    #[error(transparent)]
    Export(#[from] export::ExportError),

    #[error(transparent)]
    Settings(#[from] settings::SettingsError),

    #[error(transparent)]
    Install(#[from] settings::InstallError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for earthsunmoon operations
pub type Result<T> = std::result::Result<T, EarthSunMoonError>;
