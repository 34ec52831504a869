//! Settings parser for .dartbridge/config.toml

use super::types::Settings;
use dartbridge_core::prelude::*;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.toml";
pub const CONFIG_DIR: &str = ".dartbridge";

/// Path of the config file for a working directory
pub fn config_path(workdir: &Path) -> PathBuf {
    workdir.join(CONFIG_DIR).join(CONFIG_FILENAME)
}

/// Load settings from .dartbridge/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(workdir: &Path) -> Settings {
    let config_path = config_path(workdir);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create the default config file in .dartbridge/
///
/// An existing config file is left untouched.
pub fn init_config_dir(workdir: &Path) -> Result<PathBuf> {
    let config_dir = workdir.join(CONFIG_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .map_err(|e| Error::config(format!("Failed to create {} dir: {}", CONFIG_DIR, e)))?;
    }

    let config_path = config_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# Dart Bridge Configuration

[bridge]
poll_interval_ms = 500          # How often the producer reads the dart display
heartbeat_interval_ms = 5000    # Producer heartbeat period
liveness_window_ms = 10000      # Heartbeat age beyond which the producer is gone
confirm_delay_ms = 400          # Re-read the scoreboard this long after entry

[store]
dir = ".dartbridge/store"       # Shared by producer and consumer processes
debounce_ms = 100

[source]
file = "source.txt"             # Producer: currently displayed darts

[sink]
dir = "sink"                    # Consumer: remaining.txt, active.txt, score-input

[notify]
enabled = true
timeout_ms = 3000
error_timeout_ms = 8000
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write {}: {}", CONFIG_FILENAME, e)))?;
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());

        assert_eq!(settings.bridge.poll_interval_ms, 500);
        assert_eq!(settings.bridge.heartbeat_interval_ms, 5_000);
        assert_eq!(settings.bridge.liveness_window_ms, 10_000);
        assert!(settings.notify.enabled);
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let config_dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();

        let config = r#"
[bridge]
poll_interval_ms = 200

[sink]
dir = "board"

[notify]
enabled = false
"#;
        std::fs::write(config_dir.join(CONFIG_FILENAME), config).unwrap();

        let settings = load_settings(temp.path());

        assert_eq!(settings.bridge.poll_interval_ms, 200);
        assert_eq!(settings.sink.dir, PathBuf::from("board"));
        assert!(!settings.notify.enabled);
        assert_eq!(settings.bridge.heartbeat_interval_ms, 5_000);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        let config_dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();

        std::fs::write(config_dir.join(CONFIG_FILENAME), "not valid toml {{{{").unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings.bridge.poll_interval_ms, 500);
    }

    #[test]
    fn test_init_config_dir() {
        let temp = tempdir().unwrap();

        let path = init_config_dir(temp.path()).unwrap();

        assert_eq!(path, config_path(temp.path()));
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let _: Settings = toml::from_str(&content).expect("Default config should be valid TOML");
    }

    #[test]
    fn test_init_config_dir_idempotent() {
        let temp = tempdir().unwrap();

        init_config_dir(temp.path()).unwrap();

        let path = config_path(temp.path());
        std::fs::write(&path, "[bridge]\npoll_interval_ms = 100\n").unwrap();

        init_config_dir(temp.path()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("poll_interval_ms = 100"));
    }
}
