//! Per-tick DMS analysis results

use alerting::{EventKind, Severity};
use serde::{Deserialize, Serialize};

use crate::classifier::FaceState;
use crate::features::FeatureVector;

/// Result of one detection tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmsAnalysis {
    /// Whether a face was tracked this tick
    pub face_detected: bool,

    /// Extracted features (no-face defaults when `face_detected` is false)
    pub features: FeatureVector,

    /// Classified channel states
    pub state: FaceState,

    /// Events emitted this tick, in emission order
    pub emitted: Vec<EventKind>,

    /// Length of the eye closure in progress (milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closure_ms: Option<u64>,
}

impl DmsAnalysis {
    /// Analysis for a tick without a face
    pub fn no_face() -> Self {
        Self {
            face_detected: false,
            features: FeatureVector::no_face(),
            state: FaceState::default(),
            emitted: Vec::new(),
            closure_ms: None,
        }
    }

    /// Check if any event fired this tick
    pub fn has_events(&self) -> bool {
        !self.emitted.is_empty()
    }

    /// Get highest severity among the events fired this tick
    pub fn highest_severity(&self) -> Option<Severity> {
        self.emitted.iter().map(|k| k.default_severity()).max()
    }
}

impl Default for DmsAnalysis {
    fn default() -> Self {
        Self::no_face()
    }
}
