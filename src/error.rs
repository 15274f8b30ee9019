//! API error taxonomy.
//!
//! Two response classes: client-correctable conditions render as
//! `"status": "fail"` with a 4xx code and are never logged as failures;
//! store faults render as `"status": "error"` with a 5xx code and are
//! logged with detail. The detail reaches the caller only in debug builds.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateNumber(number) => {
                ApiError::Conflict(format!("phone number already registered: {number}"))
            }
            other => ApiError::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (kind, message) = match &self {
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                if cfg!(debug_assertions) {
                    ("error", err.to_string())
                } else {
                    ("error", "internal server error".to_string())
                }
            }
            fail => ("fail", fail.to_string()),
        };
        (status, Json(json!({ "status": kind, "message": message }))).into_response()
    }
}
