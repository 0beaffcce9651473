//! Landmark Capture Library for Driver Monitoring
//!
//! Boundary between the fatigue engine and the external face-landmark model:
//! - Landmark frames in MediaPipe Face Mesh topology (468/478 points)
//! - The `LandmarkSource` capability the detection loop polls
//! - An in-memory scripted source and a JSON-lines replay source
//! - Synthetic faces with known geometry

pub mod frame;
pub mod replay;
pub mod source;
pub mod synthetic;
pub mod topology;

pub use frame::{Landmark, LandmarkFrame};
pub use replay::ReplaySource;
pub use source::{LandmarkSource, ScriptedSource};
pub use synthetic::SyntheticFace;

use thiserror::Error;

/// Landmark source error types
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The landmark model could not be made ready; detection cannot start
    #[error("Landmark model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single detection call failed
    #[error("Detection failed: {0}")]
    Detection(String),

    /// Detection requested before the model was loaded
    #[error("Landmark model not loaded")]
    NotLoaded,

    #[error("Malformed landmark record on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
