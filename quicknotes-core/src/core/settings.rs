//! Application settings persistence for QuickNotes.
//!
//! Stores user preferences (data directory, default sort order) in a JSON file
//! at an OS-appropriate location.

use crate::{Result, SortMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "quicknotes.db";
/// File name of the pre-SQLite preferences file inside the data directory.
pub const LEGACY_STORE_FILE: &str = "quicknotes_prefs.json";

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Directory holding the note database and any legacy preferences file.
    pub data_directory: String,
    /// Ordering applied when the note list is first shown.
    pub default_sort_mode: SortMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory().to_string_lossy().to_string(),
            default_sort_mode: SortMode::default(),
        }
    }
}

impl AppSettings {
    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.data_directory).join(DATABASE_FILE)
    }

    pub fn legacy_store_path(&self) -> PathBuf {
        Path::new(&self.data_directory).join(LEGACY_STORE_FILE)
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/quicknotes/settings.json`
/// - Windows: `%APPDATA%/QuickNotes/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("QuickNotes").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("quicknotes").join("settings.json")
    }
}

/// Returns the default data directory, e.g. `~/.local/share/QuickNotes`.
pub fn default_data_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("QuickNotes")
}

/// Loads settings from the default location.
pub fn load_settings() -> AppSettings {
    load_settings_from(settings_file_path())
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings_from<P: AsRef<Path>>(path: P) -> AppSettings {
    match fs::read_to_string(path.as_ref()) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings file: {e}");
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

/// Saves settings to the default location.
pub fn save_settings(settings: &AppSettings) -> Result<()> {
    save_settings_to(settings_file_path(), settings)
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to<P: AsRef<Path>>(path: P, settings: &AppSettings) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings_from(dir.path().join("settings.json"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.default_sort_mode, SortMode::Modified);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            data_directory: "/tmp/notes".to_string(),
            default_sort_mode: SortMode::TitleDesc,
        };

        save_settings_to(&path, &settings).unwrap();
        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"defaultSortMode\": \"title_desc\""));
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_corrupt_or_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, "{ nope").unwrap();
        assert_eq!(load_settings_from(&path), AppSettings::default());

        fs::write(&path, r#"{"defaultSortMode":"created"}"#).unwrap();
        let settings = load_settings_from(&path);
        assert_eq!(settings.default_sort_mode, SortMode::Created);
        assert_eq!(settings.data_directory, AppSettings::default().data_directory);
    }

    #[test]
    fn test_store_paths() {
        let settings = AppSettings {
            data_directory: "/data".to_string(),
            default_sort_mode: SortMode::Modified,
        };
        assert_eq!(settings.database_path(), PathBuf::from("/data/quicknotes.db"));
        assert_eq!(
            settings.legacy_store_path(),
            PathBuf::from("/data/quicknotes_prefs.json")
        );
    }
}
