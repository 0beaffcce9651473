//! Landmark frame types

use serde::{Deserialize, Serialize};

/// A single facial landmark in image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth; models that only report 2D points leave this at 0
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Create a landmark on the image plane
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Create a landmark with depth
    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in 3D
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Image-plane point halfway between two landmarks; depth is dropped
    pub fn planar_midpoint(&self, other: &Landmark) -> Landmark {
        Landmark::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Landmarks for one tracked face in one sampled video frame.
///
/// Indices follow the face-mesh topology in [`crate::topology`]. A frame is
/// consumed by a single detection cycle and never retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub points: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Create a frame from model output
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Get landmark at `index`, `None` if the model did not report it
    pub fn point(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Number of landmarks in the frame
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replace the landmark at `index`, growing the frame if needed
    pub fn set(&mut self, index: usize, landmark: Landmark) {
        if index >= self.points.len() {
            self.points.resize(index + 1, Landmark::default());
        }
        self.points[index] = landmark;
    }
}
