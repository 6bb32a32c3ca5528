//! Settings store against real files on disk

mod common;

use approx::assert_relative_eq;
use common::{FixtureSegment, Order};
use earthsunmoon::settings::{
    EphemerisSettings, IniSettings, InstallError, MemorySettings, SettingsBackend, DEFAULT_EPHEM,
    EPHEM_FILE_KEY,
};
use earthsunmoon::Config;

#[test]
fn test_describe_known_file_includes_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_sun_moon(dir.path(), "de421.bsp");
    let settings = EphemerisSettings::new(dir.path(), MemorySettings::new()).unwrap();

    let text = settings.describe_file("de421.bsp");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], path.display().to_string());
    assert_eq!(lines[1], "1900 to 2050");
    assert_eq!(lines[2], "File type DAF/SPK and format LTL-IEEE with 4 segments:");
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_describe_unknown_file_skips_range() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sun_moon(dir.path(), "custom.bsp");
    let mut settings = EphemerisSettings::new(dir.path(), MemorySettings::new()).unwrap();
    assert!(settings.select_file("custom.bsp").unwrap());

    let text = settings.describe_active();
    let lines: Vec<_> = text.lines().collect();
    assert!(lines[0].ends_with("custom.bsp"));
    assert!(lines[1].starts_with("File type DAF/SPK"));
    assert_eq!(settings.describe_file("absent.bsp"), "");
}

#[test]
fn test_describe_corrupt_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_sun_moon(dir.path(), "bad.bsp");
    common::set_next_summary(&path, 1e300);
    let settings = EphemerisSettings::new(dir.path(), MemorySettings::new()).unwrap();
    assert_eq!(settings.describe_file("bad.bsp"), "");
}

#[test]
fn test_default_file_is_used_when_present() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sun_moon(dir.path(), DEFAULT_EPHEM);
    let mut settings = EphemerisSettings::new(dir.path(), MemorySettings::new()).unwrap();
    assert_eq!(settings.ephem_file(), DEFAULT_EPHEM);
    assert!(settings.ephemeris().unwrap().contains(301));
}

#[test]
fn test_selection_reloads_ephemeris() {
    let dir = tempfile::tempdir().unwrap();
    common::write_sun_moon(dir.path(), "a.bsp");
    common::write_spk(
        &dir.path().join("b.bsp"),
        &[
            FixtureSegment::fixed(0, 10, [0.0, common::AU_KM, 0.0]),
            FixtureSegment::fixed(0, 399, [0.0, 0.0, 0.0]),
        ],
        Order::Little,
        None,
    );

    let mut settings = EphemerisSettings::new(dir.path(), MemorySettings::new()).unwrap();
    assert!(settings.select_file("a.bsp").unwrap());
    let sun = settings.ephemeris().unwrap().barycentric_km(10, 0.0).unwrap();
    assert_relative_eq!(sun.x, common::AU_KM);
    // Cached handle is reused until the selection changes
    assert!(settings.ephemeris().unwrap().contains(301));

    assert!(settings.select_file("b.bsp").unwrap());
    let kernel = settings.ephemeris().unwrap();
    assert!(!kernel.contains(301));
    assert_relative_eq!(kernel.barycentric_km(10, 0.0).unwrap().y, common::AU_KM);

    // A failed selection falls back to the default and drops the cache
    assert!(!settings.select_file("c.bsp").unwrap());
    assert_eq!(settings.ephem_file(), DEFAULT_EPHEM);
    assert!(settings.ephemeris().is_err());
}

#[test]
fn test_selection_persists_through_ini() {
    let dir = tempfile::tempdir().unwrap();
    let ini_path = dir.path().join("settings.ini");
    common::write_sun_moon(dir.path(), "de440s.bsp");

    {
        let backend = IniSettings::open(&ini_path).unwrap();
        let mut settings = EphemerisSettings::new(dir.path(), backend).unwrap();
        assert!(settings.select_file("de440s.bsp").unwrap());
    }

    let backend = IniSettings::open(&ini_path).unwrap();
    assert_eq!(backend.value(EPHEM_FILE_KEY).as_deref(), Some("de440s.bsp"));
    let settings = EphemerisSettings::new(dir.path(), backend).unwrap();
    assert_eq!(settings.ephem_file(), "de440s.bsp");

    // Removing the file makes the next start fall back and persist the default
    std::fs::remove_file(dir.path().join("de440s.bsp")).unwrap();
    let settings = EphemerisSettings::new(dir.path(), IniSettings::open(&ini_path).unwrap()).unwrap();
    assert_eq!(settings.ephem_file(), DEFAULT_EPHEM);
    let reread = IniSettings::open(&ini_path).unwrap();
    assert_eq!(reread.value(EPHEM_FILE_KEY).as_deref(), Some(DEFAULT_EPHEM));
}

#[test]
fn test_install_then_select() {
    let home = tempfile::tempdir().unwrap();
    let downloads = tempfile::tempdir().unwrap();
    let source = common::write_sun_moon(downloads.path(), "de440.bsp");

    let config = Config::with_base(home.path().join("EarthSunMoon"));
    let mut settings = config.open_settings().unwrap();
    assert!(settings.list_available().is_empty());

    assert_eq!(settings.install_file(&source).unwrap(), "de440.bsp");
    assert_eq!(settings.list_available(), vec!["de440.bsp".to_string()]);
    assert!(matches!(
        settings.install_file(&source),
        Err(InstallError::AlreadyExists(_))
    ));
    assert!(matches!(
        settings.install_file(downloads.path()),
        Err(InstallError::NotAFile(_))
    ));

    assert!(settings.select_file("de440.bsp").unwrap());
    assert!(settings.describe_active().contains("1550 to 2650"));
}
