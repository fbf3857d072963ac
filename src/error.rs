// HTTP API Error Types
use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::store::StoreError;

/// Message rendered for every 500-class failure. The real cause is logged
/// server-side and never reaches the caller.
pub const GENERIC_SERVER_ERROR: &str = "An error has occurred on the server";

/// Classified API error: the closed set of failures this service can
/// answer with, each carrying its HTTP status and a client-safe message.
///
/// Errors are constructed at the failure site and propagated unchanged
/// (via `?`) until the `IntoResponse` impl at the bottom renders exactly
/// one error response per request.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request; validation failures carry one message per field
    BadRequest {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// HTTP status for this kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Response body for this error. Server errors always render the
    /// generic message; validation errors include their per-field detail.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::InternalServerError(_) => json!({ "message": GENERIC_SERVER_ERROR }),
            ApiError::BadRequest {
                message,
                field_errors: Some(field_errors),
            } => json!({ "message": message, "field_errors": field_errors }),
            other => json!({ "message": other.message() }),
        }
    }
}

// One translation step for raw store failures: uniqueness violations are
// client conflicts, everything else is an unclassified server error.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                ApiError::conflict(format!("A record with this {} already exists", field))
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Terminal responder: every classified (or store-translated) error ends
// here. Full detail is logged before the client body is rendered.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::BadRequest {
                message,
                field_errors: Some(field_errors),
            } => {
                tracing::error!(%status, %message, ?field_errors, "request failed");
            }
            other => {
                tracing::error!(%status, message = %other.message(), "request failed");
            }
        }

        (status, Json(self.to_json())).into_response()
    }
}
