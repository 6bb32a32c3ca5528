//! Ephemeris settings store
//!
//! Tracks the ephemeris directory and the selected `.bsp` file, persists the
//! selection through a [`SettingsBackend`], and hands out a lazily opened
//! [`SpiceKernel`] for the active file.

pub mod backend;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::jplephem::{JplephemError, SpiceKernel, SPK};
use crate::time::Timescale;

pub use backend::{IniSettings, MemorySettings, SettingsBackend};

/// Ephemeris used when nothing valid is selected
pub const DEFAULT_EPHEM: &str = "de440s_1990_2040.bsp";

/// Persisted key holding the selected file name
pub const EPHEM_FILE_KEY: &str = "/EarthSunMoon/EphemFile";

/// Extension of installable ephemeris files
pub const EPHEM_EXTENSION: &str = "bsp";

/// Year ranges of the JPL reference ephemerides
pub const KNOWN_EPHEMERIDES: [(&str, &str); 11] = [
    ("de405.bsp", "1600 to 2200"),
    ("de406.bsp", "\u{2212}3000 to 3000"),
    ("de421.bsp", "1900 to 2050"),
    ("de422.bsp", "\u{2212}3000 to 3000"),
    ("de430_1850-2150.bsp", "1850 to 2150"),
    ("de430t.bsp", "1550 to 2650"),
    ("de431t.bsp", "\u{2013}13200 to 17191"),
    ("de440s.bsp", "1849 to 2150"),
    ("de440.bsp", "1550 to 2650"),
    ("de441.bsp", "\u{2212}13200 to 17191"),
    ("de440s_1990_2040.bsp", "1990 to 2040"),
];

/// Coverage range of a known reference ephemeris
pub fn known_range(file: &str) -> Option<&'static str> {
    KNOWN_EPHEMERIDES
        .iter()
        .find(|(name, _)| *name == file)
        .map(|(_, range)| *range)
}

/// Error type for the settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file {path}: {message}")]
    Backend { path: PathBuf, message: String },

    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] JplephemError),
}

/// Result type for the settings store
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Reasons an ephemeris install is refused
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Not a valid file")]
    NotAFile(PathBuf),

    #[error("This ephemeris file already exists")]
    AlreadyExists(String),

    #[error("Install failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The active kernel, tagged with the selection generation it was opened for
type EphemerisSlot = Option<(u64, SpiceKernel)>;

/// Ephemeris directory, active file, and cached handles
pub struct EphemerisSettings {
    ephem_dir: PathBuf,
    ephem_file: String,
    backend: Box<dyn SettingsBackend>,
    generation: u64,
    ephemeris: EphemerisSlot,
    timescale: Option<Timescale>,
}

impl std::fmt::Debug for EphemerisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemerisSettings")
            .field("ephem_dir", &self.ephem_dir)
            .field("ephem_file", &self.ephem_file)
            .field("generation", &self.generation)
            .field("loaded", &self.ephemeris.is_some())
            .finish()
    }
}

impl EphemerisSettings {
    /// Build the store, reading the persisted selection
    ///
    /// A persisted file that is no longer present is replaced by the default
    /// and the fallback is written back.
    pub fn new<P, B>(ephem_dir: P, backend: B) -> Result<Self>
    where
        P: Into<PathBuf>,
        B: SettingsBackend + 'static,
    {
        let mut settings = Self {
            ephem_dir: ephem_dir.into(),
            ephem_file: DEFAULT_EPHEM.to_string(),
            backend: Box::new(backend),
            generation: 0,
            ephemeris: None,
            timescale: None,
        };
        settings.read_settings()?;
        Ok(settings)
    }

    fn read_settings(&mut self) -> Result<()> {
        self.ephem_file = self
            .backend
            .value(EPHEM_FILE_KEY)
            .unwrap_or_else(|| DEFAULT_EPHEM.to_string());
        if !self.ephem_path().is_file() {
            if self.ephem_file != DEFAULT_EPHEM {
                log::warn!(
                    "Ephemeris {} not found in {}, using {}",
                    self.ephem_file,
                    self.ephem_dir.display(),
                    DEFAULT_EPHEM
                );
            }
            self.ephem_file = DEFAULT_EPHEM.to_string();
            self.backend.set_value(EPHEM_FILE_KEY, &self.ephem_file)?;
        }
        Ok(())
    }

    /// Directory holding the ephemeris files
    pub fn ephem_dir(&self) -> &Path {
        &self.ephem_dir
    }

    /// Name of the selected file
    pub fn ephem_file(&self) -> &str {
        &self.ephem_file
    }

    /// Path of the selected file
    pub fn ephem_path(&self) -> PathBuf {
        self.ephem_dir.join(&self.ephem_file)
    }

    pub fn default_ephem_file(&self) -> &'static str {
        DEFAULT_EPHEM
    }

    pub fn default_ephem_path(&self) -> PathBuf {
        self.ephem_dir.join(DEFAULT_EPHEM)
    }

    /// Select `file` as the active ephemeris
    ///
    /// Returns `false` and reverts to the default when the file is not in the
    /// ephemeris directory. Either way the cached kernel is dropped.
    pub fn select_file(&mut self, file: &str) -> Result<bool> {
        self.invalidate();
        self.ephem_file = file.to_string();
        if file.is_empty() || !self.ephem_path().is_file() {
            log::warn!(
                "Ephemeris {:?} not found in {}, reverting to {}",
                file,
                self.ephem_dir.display(),
                DEFAULT_EPHEM
            );
            self.ephem_file = DEFAULT_EPHEM.to_string();
            return Ok(false);
        }
        self.backend.set_value(EPHEM_FILE_KEY, &self.ephem_file)?;
        log::debug!("Selected ephemeris {}", self.ephem_file);
        Ok(true)
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        if self.ephemeris.take().is_some() {
            log::debug!("Dropped cached ephemeris (generation {})", self.generation);
        }
    }

    /// Summary of `file`: its path, the known range if any, then the segment
    /// listing; empty if the file cannot be read as an SPK
    pub fn describe_file(&self, file: &str) -> String {
        let path = self.ephem_dir.join(file);
        let spk = match SPK::open(&path) {
            Ok(spk) => spk,
            Err(e) => {
                log::debug!("Cannot describe {}: {}", path.display(), e);
                return String::new();
            }
        };
        match known_range(file) {
            Some(range) => format!("{}\n{}\n{}", path.display(), range, spk),
            None => format!("{}\n{}", path.display(), spk),
        }
    }

    /// Summary of the active file
    pub fn describe_active(&self) -> String {
        self.describe_file(&self.ephem_file)
    }

    /// `.bsp` files present in the ephemeris directory
    pub fn list_available(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.ephem_dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map_or(false, |ext| ext == EPHEM_EXTENSION)
            })
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            })
            .collect()
    }

    /// Copy an external ephemeris into the directory, returning its file name
    ///
    /// The selection is left unchanged.
    pub fn install_file<P: AsRef<Path>>(&self, source: P) -> std::result::Result<String, InstallError> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(InstallError::NotAFile(source.to_path_buf()));
        }
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| InstallError::NotAFile(source.to_path_buf()))?
            .to_string();

        let target = self.ephem_dir.join(&name);
        if target.exists() {
            return Err(InstallError::AlreadyExists(name));
        }

        fs::create_dir_all(&self.ephem_dir)?;
        fs::copy(source, &target)?;
        log::info!("Installed {} into {}", name, self.ephem_dir.display());
        Ok(name)
    }

    /// Kernel for the active file, opened on first use after each selection
    pub fn ephemeris(&mut self) -> Result<&SpiceKernel> {
        let kernel = match self.ephemeris.take() {
            Some((generation, kernel)) if generation == self.generation => kernel,
            _ => {
                log::debug!(
                    "Opening ephemeris {} (generation {})",
                    self.ephem_path().display(),
                    self.generation
                );
                SpiceKernel::open(self.ephem_path())?
            }
        };
        let (_, kernel) = self.ephemeris.insert((self.generation, kernel));
        Ok(kernel)
    }

    /// Shared timescale, built once
    pub fn timescale(&mut self) -> &Timescale {
        self.timescale.get_or_insert_with(Timescale::default)
    }
}
