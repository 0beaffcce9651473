//! Event feed and counter routes

use alerting::{Counters, FatigueEvent};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, SharedState};

/// Query parameters for events endpoint
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    /// Only events with a sequence number greater than this
    pub after: Option<u64>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Response for events endpoint
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub data: Vec<FatigueEvent>,
    pub count: usize,
    /// Cursor for the next page, `None` when the page is empty
    pub next_after: Option<u64>,
}

/// Get logged events, oldest first
pub async fn get_events(
    State(state): State<SharedState>,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params.limit.min(1000);
    let events = state.read().await.detection.events(params.after, limit).await;

    Ok(Json(EventResponse {
        count: events.len(),
        next_after: events.last().map(|e| e.seq),
        data: events,
    }))
}

/// Get current counters
pub async fn get_counters(State(state): State<SharedState>) -> Json<Counters> {
    Json(state.read().await.detection.counters().await)
}

/// Zero the counters
pub async fn reset_counters(State(state): State<SharedState>) -> Json<Counters> {
    let counters = state.read().await.detection.reset().await;
    info!("Counters reset over API");
    Json(counters)
}
