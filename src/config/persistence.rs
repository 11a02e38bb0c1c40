//! Settings file persistence for Tandem
//!
//! This module handles loading and saving the settings file to
//! platform-specific directories with robust error handling and
//! graceful fallback to defaults.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "tandem";

/// Settings file name
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Backup settings file name (used during atomic writes)
const SETTINGS_BACKUP_NAME: &str = "settings.json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// Returns the appropriate directory based on the operating system:
/// - **Windows**: `%APPDATA%\tandem\`
/// - **macOS**: `~/Library/Application Support/tandem/`
/// - **Linux**: `~/.config/tandem/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the settings file.
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined.
pub fn get_settings_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(SETTINGS_FILE_NAME))
}

/// Ensure the configuration directory exists, creating it if necessary.
fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;

    if !config_dir.exists() {
        debug!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(&config_dir).map_err(|e| Error::ConfigSave {
            path: config_dir.clone(),
            source: Box::new(e),
        })?;
    }

    Ok(config_dir)
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from the default settings file location.
///
/// # Behavior
///
/// 1. If the settings file exists and is valid JSON, load and sanitize it
/// 2. If the settings file doesn't exist, return default settings
/// 3. If the settings file is corrupted/invalid, log a warning and return defaults
pub fn load_settings() -> Settings {
    load_settings_internal()
        .unwrap_or_warn_default(Settings::default(), "Failed to load settings")
}

/// Internal implementation of settings loading.
fn load_settings_internal() -> Result<Settings> {
    let settings_path = get_settings_file_path()?;

    // Check if the settings file exists
    if !settings_path.exists() {
        debug!(
            "Settings file not found at {}, using defaults",
            settings_path.display()
        );
        return Ok(Settings::default());
    }

    debug!("Loading settings from: {}", settings_path.display());

    // Read the file contents
    let contents = fs::read_to_string(&settings_path).map_err(|e| Error::ConfigLoad {
        path: settings_path.clone(),
        source: Box::new(e),
    })?;

    // Handle empty file
    if contents.trim().is_empty() {
        debug!("Settings file is empty, using defaults");
        return Ok(Settings::default());
    }

    // Parse and sanitize
    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Settings file at {} contains invalid JSON: {}",
            settings_path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse settings file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!(
        "Settings loaded successfully from {}",
        settings_path.display()
    );
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Save settings to the default settings file location.
///
/// This function performs an atomic write by:
/// 1. Writing to a temporary backup file
/// 2. Replacing the original file with the backup
///
/// # Errors
///
/// - `Error::ConfigDirNotFound`: Config directory cannot be determined
/// - `Error::ConfigSave`: Failed to write the settings file
pub fn save_settings(settings: &Settings) -> Result<()> {
    let config_dir = ensure_config_dir()?;
    let settings_path = config_dir.join(SETTINGS_FILE_NAME);
    let backup_path = config_dir.join(SETTINGS_BACKUP_NAME);

    debug!("Saving settings to: {}", settings_path.display());

    // Serialize to pretty JSON
    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: settings_path.clone(),
        source: Box::new(e),
    })?;

    // Write to backup file first (atomic write pattern)
    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    // Replace original with backup
    fs::rename(&backup_path, &settings_path).map_err(|e| Error::ConfigSave {
        path: settings_path.clone(),
        source: Box::new(e),
    })?;

    info!(
        "Settings saved successfully to {}",
        settings_path.display()
    );
    Ok(())
}

/// Save settings, ignoring errors.
///
/// This is useful for "best effort" saves where failure shouldn't
/// interrupt the application flow (e.g., saving on exit).
///
/// # Returns
///
/// Returns `true` if the save was successful, `false` otherwise.
pub fn save_settings_silent(settings: &Settings) -> bool {
    match save_settings(settings) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save settings: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a test environment with a temporary config directory.
    struct TestEnv {
        _temp_dir: TempDir,
        settings_file: PathBuf,
    }

    impl TestEnv {
        fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let config_dir = temp_dir.path().join(APP_NAME);
            let settings_file = config_dir.join(SETTINGS_FILE_NAME);
            fs::create_dir_all(&config_dir).expect("Failed to create config dir");
            Self {
                _temp_dir: temp_dir,
                settings_file,
            }
        }

        fn write_settings(&self, content: &str) {
            fs::write(&self.settings_file, content).expect("Failed to write settings");
        }

        fn read_settings(&self) -> String {
            fs::read_to_string(&self.settings_file).expect("Failed to read settings")
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Platform directory tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_get_config_dir_returns_path() {
        let result = get_config_dir();
        assert!(result.is_ok());

        let path = result.unwrap();
        assert!(path.to_string_lossy().contains(APP_NAME));
    }

    #[test]
    fn test_get_settings_file_path() {
        let result = get_settings_file_path();
        assert!(result.is_ok());

        let path = result.unwrap();
        assert!(path.to_string_lossy().contains(SETTINGS_FILE_NAME));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load tests with temp directory
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_valid_settings() {
        let env = TestEnv::new();
        let settings = Settings {
            font_size: 16.0,
            sync_scroll_enabled: false,
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        env.write_settings(&json);

        let contents = fs::read_to_string(&env.settings_file).unwrap();
        let loaded = Settings::from_json_sanitized(&contents).unwrap();

        assert_eq!(loaded.font_size, 16.0);
        assert!(!loaded.sync_scroll_enabled);
    }

    #[test]
    fn test_load_partial_settings_uses_defaults_for_missing() {
        let env = TestEnv::new();
        env.write_settings(r#"{"split_ratio": 0.3}"#);

        let contents = fs::read_to_string(&env.settings_file).unwrap();
        let settings: Settings = serde_json::from_str(&contents).unwrap();

        assert_eq!(settings.split_ratio, 0.3);
        // Missing fields should have defaults
        assert_eq!(settings.font_size, 14.0);
        assert!(settings.sync_scroll_enabled);
    }

    #[test]
    fn test_load_corrupted_settings_returns_error() {
        let env = TestEnv::new();
        env.write_settings("{ invalid json }");

        let contents = fs::read_to_string(&env.settings_file).unwrap();
        let result: std::result::Result<Settings, _> = serde_json::from_str(&contents);

        assert!(result.is_err());
    }

    #[test]
    fn test_load_settings_sanitizes_values() {
        let env = TestEnv::new();
        // Invalid font size that should be clamped
        env.write_settings(r#"{"font_size": 4.0, "split_ratio": 3.0}"#);

        let contents = fs::read_to_string(&env.settings_file).unwrap();
        let settings = Settings::from_json_sanitized(&contents).unwrap();

        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);
        assert_eq!(settings.split_ratio, Settings::MAX_SPLIT_RATIO);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save tests with temp directory
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_save_and_load_roundtrip() {
        let env = TestEnv::new();
        let original = Settings {
            font_size: 20.0,
            word_wrap: false,
            sync_scroll_enabled: false,
            split_ratio: 0.6,
            last_file: Some(PathBuf::from("/notes/todo.md")),
            ..Settings::default()
        };

        // Save
        let json = serde_json::to_string_pretty(&original).unwrap();
        fs::write(&env.settings_file, &json).unwrap();

        // Load
        let contents = env.read_settings();
        let loaded: Settings = serde_json::from_str(&contents).unwrap();

        assert_eq!(original, loaded);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edge case tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_with_unknown_fields_ignored() {
        let env = TestEnv::new();
        env.write_settings(r#"{"font_size": 18.0, "unknown_field": "value", "future_feature": true}"#);

        let contents = fs::read_to_string(&env.settings_file).unwrap();
        let result: std::result::Result<Settings, _> = serde_json::from_str(&contents);

        // Should succeed, ignoring unknown fields
        assert!(result.is_ok());
        assert_eq!(result.unwrap().font_size, 18.0);
    }

    #[test]
    fn test_settings_with_wrong_types() {
        let env = TestEnv::new();
        env.write_settings(r#"{"font_size": "not a number"}"#);

        let contents = fs::read_to_string(&env.settings_file).unwrap();
        let result: std::result::Result<Settings, _> = serde_json::from_str(&contents);

        assert!(result.is_err());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Integration tests (use actual config directory)
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_settings_graceful_fallback() {
        // The public API gracefully falls back to defaults
        let settings = load_settings();

        // Should always return valid settings, even if the file doesn't exist
        assert!(settings.font_size >= Settings::MIN_FONT_SIZE);
        assert!(settings.font_size <= Settings::MAX_FONT_SIZE);
    }
}
