//! Detection control routes

use axum::{extract::State, Json};
use dms::DmsAnalysis;
use serde::Serialize;

use crate::{ApiError, SharedState};

/// Detection loop status
#[derive(Debug, Serialize)]
pub struct DetectionStatus {
    pub running: bool,
    pub poll_interval_ms: u64,
    pub ticks: u64,
    pub last_analysis: Option<DmsAnalysis>,
}

async fn snapshot(state: &SharedState) -> DetectionStatus {
    let state = state.read().await;
    let detection = &state.detection;
    DetectionStatus {
        running: detection.is_running(),
        poll_interval_ms: detection.poll_interval().as_millis() as u64,
        ticks: detection.tick_count().await,
        last_analysis: detection.last_analysis().await,
    }
}

/// Start detection. Fails with 503 when the landmark model cannot be loaded.
pub async fn start(State(state): State<SharedState>) -> Result<Json<DetectionStatus>, ApiError> {
    state.write().await.detection.start().await?;
    Ok(Json(snapshot(&state).await))
}

/// Stop detection; stopping an idle loop is not an error
pub async fn stop(State(state): State<SharedState>) -> Json<DetectionStatus> {
    state.write().await.detection.stop().await;
    Json(snapshot(&state).await)
}

pub async fn status(State(state): State<SharedState>) -> Json<DetectionStatus> {
    Json(snapshot(&state).await)
}
