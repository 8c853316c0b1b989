//! Service settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `drowsiness.{toml,yaml,json}` file, then `DROWSY_*` environment variables
//! (`__` separates nested keys, e.g. `DROWSY_TRACKER__DEBOUNCE_SECONDS=5`).

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use drowsiness::TrackerConfig;
use monitor::ScoreLayout;
use serde::{Deserialize, Serialize};

/// Default settings file stem
pub const SETTINGS_FILE: &str = "drowsiness";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,

    /// Debounce and threshold, fixed for the lifetime of a session
    pub tracker: TrackerConfig,

    /// Layout of raw classifier scores posted to `/api/v1/frames`
    pub score_layout: ScoreLayout,

    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics: bool,

    /// Replay this sample file and exit instead of serving
    pub replay_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            tracker: TrackerConfig::default(),
            score_layout: ScoreLayout::default(),
            log_level: "info".to_string(),
            metrics: true,
            replay_file: None,
        }
    }
}

impl Settings {
    /// Load from `drowsiness.*` in the working directory and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(SETTINGS_FILE)
    }

    /// Load from the given settings file stem and the environment
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("DROWSY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_file() {
        let settings = Settings::load_from("/nonexistent/drowsiness-settings").unwrap();
        assert_eq!(settings.tracker, TrackerConfig::default());
        assert_eq!(settings.server.addr, "0.0.0.0:8080");
        assert_eq!(settings.score_layout, ScoreLayout::default());
        assert!(settings.replay_file.is_none());
    }

    #[test]
    fn test_file_overrides() {
        let path = std::env::temp_dir().join(format!("drowsiness-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
log_level = "debug"

[tracker]
debounce_seconds = 5.0

[score_layout]
kind = "softmax"
drowsy_index = 0
"#,
        )
        .unwrap();

        let stem = path.with_extension("");
        let settings = Settings::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.tracker.debounce_seconds, 5.0);
        // Unset keys keep their defaults
        assert_eq!(settings.tracker.drowsy_confidence_threshold, 0.5);
        assert_eq!(settings.score_layout, ScoreLayout::Softmax { drowsy_index: 0 });

        let _ = std::fs::remove_file(path);
    }
}
