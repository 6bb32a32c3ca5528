//! Persistent key/value storage for settings
//!
//! Keys are slash-separated paths such as `/EarthSunMoon/EphemFile`. The INI
//! backend stores everything before the last segment as the section name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ini::Ini;

use super::{Result, SettingsError};

/// String settings addressed by path-like keys
pub trait SettingsBackend {
    /// Stored value for `key`, if any
    fn value(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, persisting it if the backend is durable
    fn set_value(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Split `/Section/Name` into (`Section`, `Name`); keys without a section
/// land in the general section
fn split_key(key: &str) -> (Option<String>, String) {
    let trimmed = key.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((section, name)) => (Some(section.replace('/', ".")), name.to_string()),
        None => (None, trimmed.to_string()),
    }
}

/// Settings persisted to an INI file
///
/// The file is re-written on every `set_value`. A missing file is treated as
/// empty and created on the first write.
#[derive(Debug)]
pub struct IniSettings {
    path: PathBuf,
    ini: Ini,
}

impl IniSettings {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ini = if path.exists() {
            Ini::load_from_file(&path).map_err(|e| SettingsError::Backend {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            Ini::new()
        };
        log::debug!("Settings file {}", path.display());
        Ok(Self { path, ini })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for IniSettings {
    fn value(&self, key: &str) -> Option<String> {
        let (section, name) = split_key(key);
        self.ini.get_from(section, &name).map(str::to_string)
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, name) = split_key(key);
        self.ini.with_section(section).set(name, value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.ini.write_to_file(&self.path)?;
        Ok(())
    }
}

/// In-process settings, never persisted
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemorySettings {
    fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
