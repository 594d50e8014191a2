//! Application settings and well-known file locations.
//!
//! Everything lives under `~/.config/booktrove/`:
//! `settings.toml` (catalogue locations), `preferences.toml` (user
//! preferences store), `credentials.toml` (search API keys) and `styles/`
//! (user booklist styles). The catalogue database and covers default to
//! the platform data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::util::atomic_write;

/// `~/.config/booktrove`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("booktrove")
}

/// `~/.local/share/booktrove` (or the platform equivalent).
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("booktrove")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.toml")
}

pub fn credentials_path() -> PathBuf {
    config_dir().join("credentials.toml")
}

pub fn styles_dir() -> PathBuf {
    config_dir().join("styles")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`. A missing file gives defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::io(path, e)),
        };
        toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))
    }

    /// Load the shared settings file, falling back to defaults (with a
    /// warning) if it is unreadable.
    pub fn load() -> Self {
        let path = settings_path();
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring settings file: {e}");
            Self::default()
        })
    }

    /// Catalogue database path: CLI override, then settings, then the data
    /// directory.
    pub fn resolve_db_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.catalog.db_path.clone())
            .unwrap_or_else(|| data_dir().join("catalog.db"))
    }

    /// Cover image directory: CLI override, then settings, then the data
    /// directory.
    pub fn resolve_covers_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.catalog.covers_dir.clone())
            .unwrap_or_else(|| data_dir().join("covers"))
    }
}

/// Set (or clear) one `[catalog]` key in the settings file at `path`.
///
/// Edits the TOML document in place so unknown sections survive.
pub fn save_catalog_setting(path: &Path, key: &str, value: Option<&Path>) -> Result<(), ConfigError> {
    if !matches!(key, "db_path" | "covers_dir") {
        return Err(ConfigError::invalid(format!("Unknown catalog setting '{key}'")));
    }

    let mut doc: toml::Value = match std::fs::read_to_string(path) {
        Ok(contents) => contents.parse().map_err(|e| ConfigError::parse(path, e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            toml::Value::Table(Default::default())
        }
        Err(e) => return Err(ConfigError::io(path, e)),
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| ConfigError::invalid("settings.toml root is not a table"))?;
    let catalog = table
        .entry("catalog")
        .or_insert_with(|| toml::Value::Table(Default::default()))
        .as_table_mut()
        .ok_or_else(|| ConfigError::invalid("[catalog] is not a table"))?;

    match value {
        Some(p) => {
            catalog.insert(
                key.to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            catalog.remove(key);
        }
    }

    let serialized = toml::to_string_pretty(&doc)?;
    atomic_write(path, serialized.as_bytes()).map_err(|e| ConfigError::io(path, e))
}

/// The settings file pretty-printed, for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
