//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use detection_scheduler::SchedulerError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Scheduler(SchedulerError::ModelUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "model_unavailable")
            }
            ApiError::Scheduler(SchedulerError::Engine(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "engine_error")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: self.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
