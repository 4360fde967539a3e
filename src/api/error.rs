//! API error envelope
//!
//! Every failure leaves the API as `{"error": {"code", "message"}}` with the
//! HTTP status derived from the code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::BlogServiceError;

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(err: BlogServiceError) -> Self {
        match err {
            BlogServiceError::InvalidTagLabel(label) => ApiError::with_details(
                "VALIDATION_ERROR",
                format!("Invalid tag label: '{}'", label),
                serde_json::json!({ "field": "tags", "label": label }),
            ),
            BlogServiceError::InvalidPageRequest(msg) => ApiError::with_details(
                "VALIDATION_ERROR",
                msg,
                serde_json::json!({ "field": "page" }),
            ),
            BlogServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BlogServiceError::NotFound(what) => ApiError::not_found(format!("Not found: {}", what)),
            BlogServiceError::PersistenceFailure(e) => {
                tracing::error!("Persistence failure: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}
