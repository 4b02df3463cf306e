//! HTTP request handlers.
//!
//! Handles POST /predict and GET /health.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::server::AppState;
use crate::domain::model::Ticket;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub classes: Vec<String>,
    pub history_enabled: bool,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// POST /predict
///
/// Classifies the ticket. Pipeline failures surface as a generic 500;
/// history write failures never reach the caller.
///
/// The body is parsed as JSON whatever its `Content-Type`, so a bare
/// `curl -d '{...}'` works; anything that does not parse is a 422.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    let ticket = match Json::<Ticket>::from_bytes(&body) {
        Ok(Json(ticket)) => ticket,
        Err(rejection) => {
            tracing::warn!("Rejected /predict body: {}", rejection.body_text());
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    match state.predictor.predict(&ticket).await {
        Ok(prediction) => Json(prediction).into_response(),
        Err(e) => {
            tracing::error!("Prediction failure: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed")
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classes: state.predictor.classes().to_vec(),
        history_enabled: state.predictor.history_enabled(),
    })
}
