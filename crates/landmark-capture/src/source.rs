//! Landmark source capability

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{CaptureError, LandmarkFrame};

/// The external landmark model as seen by the detection loop.
///
/// `detect` returns `Ok(None)` when no face is in view. The detection loop
/// never issues a second `detect` while one is outstanding.
#[async_trait]
pub trait LandmarkSource: Send {
    /// Make the model ready. Failure is reported as `ModelUnavailable`.
    async fn load(&mut self) -> Result<(), CaptureError>;

    /// Whether `load` has completed successfully
    fn is_loaded(&self) -> bool;

    /// Sample the current video frame and return the tracked face, if any
    async fn detect(&mut self) -> Result<Option<LandmarkFrame>, CaptureError>;
}

/// In-memory source replaying a fixed script of detection results.
///
/// Once the script is exhausted every call reports no face.
pub struct ScriptedSource {
    script: VecDeque<Result<Option<LandmarkFrame>, String>>,
    latency: Duration,
    fail_load: bool,
    loaded: bool,
    calls: usize,
}

impl ScriptedSource {
    /// Create a source from a sequence of frames (`None` = no face)
    pub fn new(frames: impl IntoIterator<Item = Option<LandmarkFrame>>) -> Self {
        Self {
            script: frames.into_iter().map(Ok).collect(),
            latency: Duration::ZERO,
            fail_load: false,
            loaded: false,
            calls: 0,
        }
    }

    /// Repeat the same result `count` times
    pub fn repeat(frame: Option<LandmarkFrame>, count: usize) -> Self {
        Self::new(std::iter::repeat(frame).take(count))
    }

    /// Simulate inference latency on every `detect` call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make `load` fail as if the model could not be fetched
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Append a failed detection to the script
    pub fn push_failure(&mut self, reason: &str) {
        self.script.push_back(Err(reason.to_string()));
    }

    /// Append a detection result to the script
    pub fn push(&mut self, frame: Option<LandmarkFrame>) {
        self.script.push_back(Ok(frame));
    }

    /// Number of `detect` calls served so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

#[async_trait]
impl LandmarkSource for ScriptedSource {
    async fn load(&mut self) -> Result<(), CaptureError> {
        if self.fail_load {
            return Err(CaptureError::ModelUnavailable(
                "scripted load failure".to_string(),
            ));
        }
        info!("Scripted landmark source ready ({} results)", self.script.len());
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    async fn detect(&mut self) -> Result<Option<LandmarkFrame>, CaptureError> {
        if !self.loaded {
            return Err(CaptureError::NotLoaded);
        }
        self.calls += 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.script.pop_front() {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(reason)) => Err(CaptureError::Detection(reason)),
            None => {
                debug!("Script exhausted, reporting no face");
                Ok(None)
            }
        }
    }
}
