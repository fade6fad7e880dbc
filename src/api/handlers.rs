//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::ErrorResponse;
use crate::api::types::HealthResponse;
use crate::api::types::ProcessRequest;
use crate::errors::EstateRagError;
use crate::models::SearchOutcome;
use crate::rag::PropertySearch;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<PropertySearch>,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Process one natural-language property query.
///
/// Validation rejections map to 400 with a user-facing advisory; internal
/// failures map to 500 with a generic message so provider errors never leak
/// to the client.
pub async fn process_request(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<SearchOutcome>, (StatusCode, Json<ErrorResponse>)> {
    info!("POST /process_request/");

    match state.search.answer(&request.user_input).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(EstateRagError::Validation(failure)) => {
            info!("Query rejected: {failure}");
            let message = state
                .search
                .rejection_message(failure, &request.user_input)
                .await;
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))))
        }
        Err(e) => {
            error!("Request processing failed: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "An internal error occurred while processing your request. Please try again.",
                )),
            ))
        }
    }
}
