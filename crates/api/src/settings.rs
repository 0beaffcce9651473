//! Service settings
//!
//! Layered with the `config` crate: an optional TOML file, then `FATIGUE_*`
//! environment variables (`__` separates nested keys, e.g.
//! `FATIGUE_DETECTION__EYE_AR_THRESHOLD=0.2`).

use config::{Config, ConfigError, Environment, File};
use dms::DmsConfig;
use serde::Deserialize;

/// Config file used when `FATIGUE_CONFIG` is not set (any supported extension)
pub const DEFAULT_CONFIG_FILE: &str = "fatigue";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub detection: DmsConfig,
    pub source: SourceSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Landmark source settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// JSON-lines landmark recording to replay
    pub replay_path: String,
    /// Rewind when the recording ends
    pub looped: bool,
    /// Start detection as soon as the server is up
    pub autostart: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            replay_path: "landmarks.jsonl".to_string(),
            looped: true,
            autostart: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load from `$FATIGUE_CONFIG` (or `fatigue.*`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FATIGUE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_file(&path)
    }

    /// Load from an optional file at `path` and the environment
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FATIGUE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings
            .detection
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::from_file("/nonexistent/fatigue").unwrap();
        assert_eq!(settings.server.addr, "0.0.0.0:8080");
        assert_eq!(settings.detection.microsleep_threshold_ms, 3000);
        assert!(!settings.source.autostart);
    }

    #[test]
    fn test_file_then_environment() {
        let path = std::env::temp_dir().join(format!("fatigue-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[detection]
eye_ar_threshold = 0.19
tilt_cooldown_ms = 1500

[source]
replay_path = "/data/session.jsonl"
autostart = true
"#,
        )
        .unwrap();

        std::env::set_var("FATIGUE_DETECTION__TILT_COOLDOWN_MS", "2500");
        let settings = Settings::from_file(path.to_str().unwrap()).unwrap();
        std::env::remove_var("FATIGUE_DETECTION__TILT_COOLDOWN_MS");
        let _ = std::fs::remove_file(&path);

        assert_eq!(settings.detection.eye_ar_threshold, 0.19);
        assert_eq!(settings.detection.tilt_cooldown_ms, 2500);
        assert_eq!(settings.detection.yawn_cooldown_ms, 3000);
        assert_eq!(settings.source.replay_path, "/data/session.jsonl");
        assert!(settings.source.autostart);
    }

    #[test]
    fn test_invalid_detection_settings_rejected() {
        let path = std::env::temp_dir().join(format!("fatigue-invalid-{}.toml", std::process::id()));
        std::fs::write(&path, "[detection]\npoll_interval_ms = 0\n").unwrap();
        let result = Settings::from_file(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
