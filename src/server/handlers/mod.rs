pub mod health;
pub mod open_data;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::errors::ExportError;

/// Error body returned by the API: `{"error": "...", "code": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidUuid(String),
    InvalidQuery(String),
    Export(ExportError),
    Internal(String),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Export(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidUuid(raw) => (
                StatusCode::BAD_REQUEST,
                "INVALID_UUID",
                format!("Invalid open data uuid: {}", raw),
            ),
            ApiError::InvalidQuery(reason) => (
                StatusCode::BAD_REQUEST,
                "INVALID_QUERY",
                format!("Invalid query parameters: {}", reason),
            ),
            ApiError::Export(err) if err.is_not_found() => {
                (StatusCode::NOT_FOUND, err.error_code(), err.to_string())
            }
            ApiError::Export(err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, err.error_code(), err.to_string())
            }
            ApiError::Export(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.error_code(),
                err.to_string(),
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                message.clone(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }
        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
