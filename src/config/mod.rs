//! Where ephemerides and settings live on disk

use std::env;
use std::path::PathBuf;

use crate::settings::{EphemerisSettings, IniSettings, Result};

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "EARTHSUNMOON_HOME";

/// Application directory name under the platform config dir
pub const APP_DIR: &str = "EarthSunMoon";

/// Settings file name inside the base directory
pub const SETTINGS_FILE: &str = "settings.ini";

/// Resolved locations for the settings store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the `.bsp` files
    pub ephem_dir: PathBuf,
    /// INI file persisting the selection
    pub settings_path: PathBuf,
}

impl Config {
    /// Both paths rooted at `base`
    pub fn with_base<P: Into<PathBuf>>(base: P) -> Self {
        let base = base.into();
        Self {
            settings_path: base.join(SETTINGS_FILE),
            ephem_dir: base,
        }
    }

    /// `$EARTHSUNMOON_HOME`, else `<config dir>/EarthSunMoon`, else `./EarthSunMoon`
    pub fn from_env() -> Self {
        let base = env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(APP_DIR)
            });
        Self::with_base(base)
    }

    /// Replace the ephemeris directory, if given
    pub fn ephem_dir_override(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.ephem_dir = dir;
        }
        self
    }

    /// Replace the settings file, if given
    pub fn settings_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.settings_path = path;
        }
        self
    }

    /// Settings store backed by the INI file
    pub fn open_settings(&self) -> Result<EphemerisSettings> {
        let backend = IniSettings::open(&self.settings_path)?;
        EphemerisSettings::new(self.ephem_dir.clone(), backend)
    }
}
