//! Sampling and export end to end against a generated kernel

mod common;

use approx::assert_relative_eq;
use chrono::Duration;
use earthsunmoon::algorithm::{default_start, PositionAlgorithm};
use earthsunmoon::export::{self, OutputFormat};
use earthsunmoon::sampler::{PositionSampler, SamplerError};
use earthsunmoon::settings::{EphemerisSettings, MemorySettings};
use earthsunmoon::{CelestialBody, EarthSunMoonError};
use rstest::rstest;

fn settings_with_fixture() -> (tempfile::TempDir, EphemerisSettings) {
    let dir = tempfile::tempdir().unwrap();
    common::write_sun_moon(dir.path(), "fixture.bsp");
    let mut settings = EphemerisSettings::new(dir.path(), MemorySettings::new()).unwrap();
    assert!(settings.select_file("fixture.bsp").unwrap());
    (dir, settings)
}

#[test]
fn test_sun_defaults() {
    let (_dir, mut settings) = settings_with_fixture();
    let table = PositionAlgorithm::sun().process(&mut settings).unwrap();

    assert_eq!(table.len(), 20);
    assert_eq!(table.crs(), 4326);
    let rows = table.rows();
    assert_eq!(rows[0].0, default_start());
    assert_eq!(rows[19].0, default_start() + Duration::minutes(114));

    // A body fixed at ICRF +X sits at right ascension ~0.31 deg of date
    let first = rows[0].1;
    assert_relative_eq!(first.longitude, 170.464, epsilon = 0.02);
    assert!(first.latitude.abs() < 0.2);

    // and drifts west at the sidereal rate
    let second = rows[1].1;
    assert_relative_eq!(first.longitude - second.longitude, 1.504, epsilon = 0.005);
}

#[test]
fn test_moon_over_pole() {
    let (_dir, mut settings) = settings_with_fixture();
    let table = PositionAlgorithm::moon().process(&mut settings).unwrap();
    assert_eq!(table.len(), 20);
    for (_, point) in table.iter() {
        assert!(point.latitude > 89.7, "{point:?}");
    }
}

#[rstest]
#[case(OutputFormat::FlatGeobuf, "sunposition.fgb")]
#[case(OutputFormat::GeoJson, "sunposition.geojson")]
fn test_run_writes_readable_file(#[case] format: OutputFormat, #[case] file: &str) {
    let (_dir, mut settings) = settings_with_fixture();
    let out = tempfile::tempdir().unwrap();

    let algorithm = PositionAlgorithm::sun();
    let path = algorithm.run(&mut settings, format, out.path()).unwrap();
    assert_eq!(path, out.path().join(file));

    let expected = algorithm.process(&mut settings).unwrap();
    let table = export::read_table(&path).unwrap();
    assert_eq!(table.len(), expected.len());
    for ((t1, p1), (t2, p2)) in table.iter().zip(expected.iter()) {
        assert_eq!(t1, t2);
        assert_relative_eq!(p1.longitude, p2.longitude, epsilon = 1e-12);
        assert_relative_eq!(p1.latitude, p2.latitude, epsilon = 1e-12);
    }
}

#[test]
fn test_body_missing_from_kernel() {
    let (_dir, mut settings) = settings_with_fixture();
    let algorithm = PositionAlgorithm::for_body(CelestialBody::Mars);
    assert!(matches!(
        algorithm.process(&mut settings),
        Err(EarthSunMoonError::Sampler(SamplerError::Ephemeris(_)))
    ));
}

#[test]
fn test_outside_coverage_fails() {
    let (_dir, mut settings) = settings_with_fixture();
    let start = chrono::DateTime::parse_from_rfc3339("2100-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let algorithm = PositionAlgorithm::new(
        CelestialBody::Sun,
        PositionSampler::new(start, 1.0, 2.0),
    );
    assert!(algorithm.process(&mut settings).is_err());
}

#[rstest]
#[case(OutputFormat::FlatGeobuf)]
#[case(OutputFormat::GeoJson)]
fn test_empty_series_writes_empty_layer(#[case] format: OutputFormat) {
    let (_dir, mut settings) = settings_with_fixture();
    let out = tempfile::tempdir().unwrap();
    let algorithm = PositionAlgorithm::new(
        CelestialBody::Moon,
        PositionSampler::new(default_start(), 3.0, 2.0),
    );
    let path = algorithm
        .run(&mut settings, format, out.path())
        .unwrap();
    assert!(export::read_table(&path).unwrap().is_empty());
}
