use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use hirecast_infra::HistoryError;
use hirecast_predictions::PredictionError;

/// Failures surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    tracing::error!(error = %err, "request failed");
    match err {
        ServiceError::History(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "history_unavailable", e.to_string())
        }
        ServiceError::Prediction(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "prediction_failed", e.to_string())
        }
        ServiceError::Join(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
