//! DMS configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DmsError;

/// Fatigue detection configuration. Built once and shared by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Average eye aspect ratio below which the eyes count as closed
    pub eye_ar_threshold: f32,

    /// Mouth aspect ratio above which the driver counts as yawning
    pub mouth_ar_threshold: f32,

    /// Roll or pitch magnitude (degrees) above which the head counts as tilted
    pub head_tilt_deg: f32,

    /// Minimum spacing between blink events (milliseconds)
    pub blink_cooldown_ms: u64,

    /// Minimum spacing between yawn events (milliseconds)
    pub yawn_cooldown_ms: u64,

    /// Minimum spacing between head tilt events (milliseconds)
    pub tilt_cooldown_ms: u64,

    /// Continuous eye closure needed for a microsleep (milliseconds)
    pub microsleep_threshold_ms: u64,

    /// Firing window after the microsleep threshold (milliseconds)
    pub microsleep_window_ms: u64,

    /// Detection cadence (milliseconds)
    pub poll_interval_ms: u64,

    /// Events kept in the in-memory log; the oldest are evicted first
    pub event_history_limit: usize,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            eye_ar_threshold: 0.21,
            mouth_ar_threshold: 0.60,
            head_tilt_deg: 20.0,
            blink_cooldown_ms: 300,
            yawn_cooldown_ms: 3000,
            tilt_cooldown_ms: 2000,
            microsleep_threshold_ms: 3000,
            microsleep_window_ms: 200,
            poll_interval_ms: 100,
            event_history_limit: 10_000,
        }
    }
}

impl DmsConfig {
    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), DmsError> {
        for (name, value) in [
            ("eye_ar_threshold", self.eye_ar_threshold),
            ("mouth_ar_threshold", self.mouth_ar_threshold),
            ("head_tilt_deg", self.head_tilt_deg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DmsError::Config(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(DmsError::Config("poll_interval_ms must be positive".into()));
        }
        if self.microsleep_window_ms == 0 {
            return Err(DmsError::Config("microsleep_window_ms must be positive".into()));
        }
        if self.event_history_limit == 0 {
            return Err(DmsError::Config("event_history_limit must be positive".into()));
        }
        Ok(())
    }

    /// Whether every microsleep window is guaranteed to contain a tick.
    ///
    /// With `poll_interval_ms >= microsleep_window_ms` a tick can step over
    /// the window and the episode produces no microsleep event.
    pub fn cadence_covers_window(&self) -> bool {
        self.poll_interval_ms < self.microsleep_window_ms
    }

    pub fn blink_cooldown(&self) -> Duration {
        Duration::from_millis(self.blink_cooldown_ms)
    }

    pub fn yawn_cooldown(&self) -> Duration {
        Duration::from_millis(self.yawn_cooldown_ms)
    }

    pub fn tilt_cooldown(&self) -> Duration {
        Duration::from_millis(self.tilt_cooldown_ms)
    }

    pub fn microsleep_threshold(&self) -> Duration {
        Duration::from_millis(self.microsleep_threshold_ms)
    }

    pub fn microsleep_window(&self) -> Duration {
        Duration::from_millis(self.microsleep_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DmsConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.cadence_covers_window());
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let config = DmsConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let config = DmsConfig {
            eye_ar_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_event_history() {
        let config = DmsConfig {
            event_history_limit: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_slow_cadence_flagged() {
        let config = DmsConfig {
            poll_interval_ms: 200,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.cadence_covers_window());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: DmsConfig = serde_json::from_str(r#"{"yawn_cooldown_ms": 5000}"#).unwrap();
        assert_eq!(config.yawn_cooldown_ms, 5000);
        assert_eq!(config.eye_ar_threshold, 0.21);
    }
}
