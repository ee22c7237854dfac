//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request named something the catalog does not have.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
        };

        tracing::debug!(status = status.as_u16(), detail = %detail, "Request rejected");
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
