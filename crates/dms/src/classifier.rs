//! Threshold classification of feature vectors

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::DmsConfig;

/// Boolean per-channel face state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceState {
    pub eyes_closed: bool,
    pub yawning: bool,
    pub head_tilted: bool,
}

/// Stateless classifier with fixed thresholds.
///
/// Every comparison is strict: a value equal to its threshold stays on the
/// open / not-triggered side.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdClassifier {
    eye_ar_threshold: f32,
    mouth_ar_threshold: f32,
    head_tilt_deg: f32,
}

impl ThresholdClassifier {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            eye_ar_threshold: config.eye_ar_threshold,
            mouth_ar_threshold: config.mouth_ar_threshold,
            head_tilt_deg: config.head_tilt_deg,
        }
    }

    pub fn classify(&self, features: &FeatureVector) -> FaceState {
        let pose = &features.head_pose;
        FaceState {
            eyes_closed: features.avg_ear < self.eye_ar_threshold,
            yawning: features.mouth_ar > self.mouth_ar_threshold,
            head_tilted: pose.roll.abs() > self.head_tilt_deg
                || pose.pitch.abs() > self.head_tilt_deg,
        }
    }
}
