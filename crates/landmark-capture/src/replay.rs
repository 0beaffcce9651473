//! JSON-lines landmark replay
//!
//! Each line holds one detection result: `null` for no face, otherwise a
//! serialized [`LandmarkFrame`]. Blank lines are ignored.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{CaptureError, LandmarkFrame, LandmarkSource};

/// Landmark source that replays a recorded session from disk
pub struct ReplaySource {
    path: PathBuf,
    looped: bool,
    frames: Vec<Option<LandmarkFrame>>,
    cursor: usize,
    loaded: bool,
}

impl ReplaySource {
    /// Create a replay source; the file is read on `load`
    pub fn new(path: impl Into<PathBuf>, looped: bool) -> Self {
        Self {
            path: path.into(),
            looped,
            frames: Vec::new(),
            cursor: 0,
            loaded: false,
        }
    }

    /// Number of recorded results
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Parse a JSON-lines recording
pub fn parse_recording(contents: &str) -> Result<Vec<Option<LandmarkFrame>>, CaptureError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Option<LandmarkFrame>>(line).map_err(|e| CaptureError::Parse {
                line: idx + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl LandmarkSource for ReplaySource {
    async fn load(&mut self) -> Result<(), CaptureError> {
        info!("Loading landmark recording from {}", self.path.display());
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CaptureError::ModelUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        self.frames = parse_recording(&contents)
            .map_err(|e| CaptureError::ModelUnavailable(e.to_string()))?;
        self.cursor = 0;
        self.loaded = true;
        info!("Loaded {} recorded frames", self.frames.len());
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    async fn detect(&mut self) -> Result<Option<LandmarkFrame>, CaptureError> {
        if !self.loaded {
            return Err(CaptureError::NotLoaded);
        }
        if self.cursor >= self.frames.len() {
            if self.looped && !self.frames.is_empty() {
                debug!("Recording finished, rewinding");
                self.cursor = 0;
            } else {
                return Ok(None);
            }
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        if self.cursor == self.frames.len() && !self.looped {
            warn!("Landmark recording exhausted; further ticks report no face");
        }
        Ok(frame)
    }
}
