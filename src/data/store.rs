//! Settings Store
//!
//! Durable key-value access to [`Settings`], backed by a TOML file.
//! Every `set` is written through to disk immediately.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::{SettingKey, SettingValue, Settings};

const APP_DIR: &str = "simple-timer";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot create settings directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot write settings file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings store with defaults for every key.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    settings: Settings,
}

impl SettingsStore {
    /// Default settings file location.
    ///
    /// Uses the platform config directory, falling back to the directory of
    /// the running executable.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join(SETTINGS_FILE)
    }

    /// Load settings from `path`.
    ///
    /// Never fails: keys that are missing or hold the wrong type take their
    /// defaults, a file that is not TOML at all yields defaults, and a
    /// missing file is created from defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let settings = match fs::read_to_string(&path) {
            Ok(content) => match content.parse::<toml::Table>() {
                Ok(table) => Settings::from_table(&table),
                Err(e) => {
                    tracing::warn!("Malformed settings in {}, using defaults: {}", path.display(), e);
                    Settings::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let store = Self {
                    path: Some(path),
                    settings: Settings::default(),
                };
                if let Err(e) = store.save() {
                    tracing::warn!("Failed to write default settings: {}", e);
                }
                return store;
            }
            Err(e) => {
                tracing::warn!("Cannot read {}, using defaults: {}", path.display(), e);
                Settings::default()
            }
        };

        Self {
            path: Some(path),
            settings,
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            settings,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.settings.get(key)
    }

    /// Store one field and persist the whole blob.
    pub fn set(&mut self, value: SettingValue) -> Result<(), SettingsError> {
        self.settings.apply(value);
        self.save()
    }

    /// Write the current settings to disk.
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| SettingsError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(&self.settings)?;
        fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }
}
