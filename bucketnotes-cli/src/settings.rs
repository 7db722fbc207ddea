//! Persisted defaults for the command-line front end.
//!
//! Stores the default store file and bucket in a JSON file at an
//! OS-appropriate location.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name used for the store when no path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "my.db";

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Store file used when `--db` is not given.
    pub database_path: String,
    /// Bucket used when `-b` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path().to_string_lossy().to_string(),
            default_namespace: None,
        }
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/bucketnotes/settings.json`
/// - Windows: `%APPDATA%/Bucketnotes/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("Bucketnotes").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("bucketnotes").join("settings.json")
    }
}

/// Returns the default store file: `<data dir>/bucketnotes/my.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("bucketnotes"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DATABASE_FILE)
}

/// Loads settings from disk; returns defaults if the file is missing or corrupt.
pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_file_path())
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => AppSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to(settings: &AppSettings, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create settings directory: {e}"))?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write settings: {e}"))?;
    Ok(())
}
