//! Fatigue event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Kind of fatigue event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Blink,
    Yawn,
    Microsleep,
    Tilt,
    /// Lifecycle and bookkeeping notices; never counted
    Info,
}

impl EventKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Blink => "blink",
            EventKind::Yawn => "yawn",
            EventKind::Microsleep => "microsleep",
            EventKind::Tilt => "tilt",
            EventKind::Info => "info",
        }
    }

    /// Severity attached to events of this kind
    pub fn default_severity(&self) -> Severity {
        match self {
            EventKind::Blink | EventKind::Info => Severity::Low,
            EventKind::Yawn => Severity::Medium,
            EventKind::Tilt => Severity::High,
            EventKind::Microsleep => Severity::Critical,
        }
    }
}

/// A classified fatigue event. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueEvent {
    /// Position in the event log, assigned on emit
    pub seq: u64,
    pub kind: EventKind,
    pub description: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl FatigueEvent {
    /// Create an event stamped with the current wall-clock time
    pub fn new(kind: EventKind, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            seq: 0,
            kind,
            description: description.into(),
            severity,
            timestamp: Utc::now(),
        }
    }

    pub fn blink() -> Self {
        Self::new(EventKind::Blink, "Blink detected", EventKind::Blink.default_severity())
    }

    pub fn yawn() -> Self {
        Self::new(
            EventKind::Yawn,
            "Yawn detected - possible fatigue",
            EventKind::Yawn.default_severity(),
        )
    }

    pub fn tilt() -> Self {
        Self::new(
            EventKind::Tilt,
            "Excessive head tilt detected",
            EventKind::Tilt.default_severity(),
        )
    }

    /// Microsleep event reporting how long the eyes had been closed
    pub fn microsleep(closed_ms: u64) -> Self {
        Self::new(
            EventKind::Microsleep,
            format!("ALERT! Microsleep detected ({:.1}s)", closed_ms as f64 / 1000.0),
            EventKind::Microsleep.default_severity(),
        )
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self::new(EventKind::Info, description, Severity::Low)
    }
}
