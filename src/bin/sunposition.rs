//! Sun sub-point for two hours from 2024-04-01 00:00 UTC, written to
//! `sunposition.fgb` in the current directory

use std::path::Path;

use earthsunmoon::{Config, OutputFormat, PositionAlgorithm};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut settings = Config::from_env().open_settings()?;
    PositionAlgorithm::sun().run(&mut settings, OutputFormat::FlatGeobuf, Path::new("."))?;
    Ok(())
}
