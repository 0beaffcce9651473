//! Geometric fatigue features from facial landmarks

use landmark_capture::topology::{self, EyeLandmarks, LEFT_EYE, RIGHT_EYE};
use landmark_capture::{Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::DmsError;

/// Eye aspect ratio assumed when it cannot be measured (eyes open)
pub const OPEN_EYE_EAR: f32 = 0.25;

/// Mouth aspect ratio assumed when it cannot be measured (mouth closed)
pub const CLOSED_MOUTH_MAR: f32 = 0.0;

/// Keeps ratios finite when the horizontal span collapses
const RATIO_EPSILON: f32 = 1e-4;

/// Rescales the pitch and yaw ratios into a degree-like range
const POSE_SCALE: f32 = 50.0;

/// Approximate head pose.
///
/// Signed 2D heuristics, not calibrated Euler angles. Roll is a real angle;
/// pitch and yaw are rescaled landmark ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Up-down nod
    pub pitch: f32,
    /// Left-right turn
    pub yaw: f32,
    /// Side tilt of the eye line (degrees)
    pub roll: f32,
}

/// Per-tick feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub left_ear: f32,
    pub right_ear: f32,
    pub avg_ear: f32,
    pub mouth_ar: f32,
    pub head_pose: HeadPose,
}

impl FeatureVector {
    /// Features reported when no face is in view
    pub fn no_face() -> Self {
        Self {
            left_ear: OPEN_EYE_EAR,
            right_ear: OPEN_EYE_EAR,
            avg_ear: OPEN_EYE_EAR,
            mouth_ar: CLOSED_MOUTH_MAR,
            head_pose: HeadPose::default(),
        }
    }

    fn ensure_finite(&self) -> Result<(), DmsError> {
        let checks = [
            ("left_ear", self.left_ear),
            ("right_ear", self.right_ear),
            ("mouth_ar", self.mouth_ar),
            ("pitch", self.head_pose.pitch),
            ("yaw", self.head_pose.yaw),
            ("roll", self.head_pose.roll),
        ];
        match checks.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, _)) => Err(DmsError::NonFiniteFeature(name)),
            None => Ok(()),
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::no_face()
    }
}

/// Converts landmark frames into feature vectors
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from one frame.
    ///
    /// A landmark missing from the frame only degrades the sub-feature that
    /// needs it to its safe default. A feature that comes out NaN or infinite
    /// fails the whole extraction.
    pub fn extract(&self, frame: &LandmarkFrame) -> Result<FeatureVector, DmsError> {
        let left_ear = recover(eye_aspect_ratio(frame, &LEFT_EYE, "left_ear"), OPEN_EYE_EAR);
        let right_ear = recover(eye_aspect_ratio(frame, &RIGHT_EYE, "right_ear"), OPEN_EYE_EAR);
        let mouth_ar = recover(mouth_aspect_ratio(frame), CLOSED_MOUTH_MAR);
        let head_pose = recover(head_pose(frame), HeadPose::default());

        let features = FeatureVector {
            left_ear,
            right_ear,
            avg_ear: (left_ear + right_ear) / 2.0,
            mouth_ar,
            head_pose,
        };
        features.ensure_finite()?;
        Ok(features)
    }
}

fn recover<T>(result: Result<T, DmsError>, default: T) -> T {
    result.unwrap_or_else(|e| {
        warn!("{}; substituting default", e);
        default
    })
}

fn landmark<'a>(
    frame: &'a LandmarkFrame,
    index: usize,
    feature: &'static str,
) -> Result<&'a Landmark, DmsError> {
    frame
        .point(index)
        .ok_or(DmsError::FeatureAnomaly { feature, index })
}

/// Eye aspect ratio: lid separation over corner-to-corner width
pub fn eye_aspect_ratio(
    frame: &LandmarkFrame,
    eye: &EyeLandmarks,
    feature: &'static str,
) -> Result<f32, DmsError> {
    let upper = landmark(frame, eye.upper_lid, feature)?;
    let lower = landmark(frame, eye.lower_lid, feature)?;
    let corner_a = landmark(frame, eye.corner_a, feature)?;
    let corner_b = landmark(frame, eye.corner_b, feature)?;

    Ok(upper.distance(lower) / (corner_a.distance(corner_b) + RATIO_EPSILON))
}

/// Mouth aspect ratio: lip separation over corner-to-corner width
pub fn mouth_aspect_ratio(frame: &LandmarkFrame) -> Result<f32, DmsError> {
    let upper = landmark(frame, topology::UPPER_LIP, "mouth_ar")?;
    let lower = landmark(frame, topology::LOWER_LIP, "mouth_ar")?;
    let left = landmark(frame, topology::MOUTH_LEFT, "mouth_ar")?;
    let right = landmark(frame, topology::MOUTH_RIGHT, "mouth_ar")?;

    Ok(upper.distance(lower) / (left.distance(right) + RATIO_EPSILON))
}

/// Heuristic head pose from the eye line, nose tip and mouth corners
pub fn head_pose(frame: &LandmarkFrame) -> Result<HeadPose, DmsError> {
    let nose = landmark(frame, topology::NOSE_TIP, "head_pose")?;
    let left_eye = landmark(frame, topology::EYE_LINE_LEFT, "head_pose")?;
    let right_eye = landmark(frame, topology::EYE_LINE_RIGHT, "head_pose")?;
    let left_mouth = landmark(frame, topology::MOUTH_LEFT, "head_pose")?;
    let right_mouth = landmark(frame, topology::MOUTH_RIGHT, "head_pose")?;

    let eye_center = left_eye.planar_midpoint(right_eye);
    let mouth_center = left_mouth.planar_midpoint(right_mouth);

    let roll = (right_eye.y - left_eye.y)
        .atan2(right_eye.x - left_eye.x)
        .to_degrees();

    let face_height = eye_center.distance(&mouth_center);
    let nose_to_mouth = nose.distance(&mouth_center);
    let pitch = (nose_to_mouth / face_height - 1.0) * POSE_SCALE;

    let face_width = left_eye.distance(right_eye);
    let yaw = (nose.x - eye_center.x) / face_width * POSE_SCALE;

    Ok(HeadPose { pitch, yaw, roll })
}
