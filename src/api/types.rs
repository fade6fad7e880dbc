//! API request and response types

use serde::Deserialize;
use serde::Serialize;

/// Free-text query submission
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub user_input: String,
}

/// Error envelope for rejected or failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
