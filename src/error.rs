//! Application error type shared by services, repositories and handlers.
//!
//! Every failure the service can report maps onto one [`AppError`] variant,
//! which renders as a JSON body of the form:
//!
//! ```json
//! { "error": { "code": "alias_taken", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Error taxonomy of the service.
///
/// - [`AppError::Validation`] - bad input, rejected before any mutation
/// - [`AppError::Conflict`] - alias or code already exists
/// - [`AppError::NotFound`] - unknown or expired code (never distinguished)
/// - [`AppError::TooManyRequests`] - rate limit exceeded
/// - [`AppError::Unavailable`] - durable store temporarily unreachable
/// - [`AppError::Internal`] - anything else
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    TooManyRequests { message: String, details: Value },
    #[error("{message}")]
    Unavailable { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: "validation_error",
            message: message.into(),
            details,
        }
    }

    /// Target URL is empty, unparsable, or lacks a scheme or host.
    pub fn invalid_url(message: impl Into<String>, url: &str) -> Self {
        Self::Validation {
            code: "invalid_url",
            message: message.into(),
            details: json!({ "url": url }),
        }
    }

    /// Custom alias has the wrong length, characters, or is reserved.
    pub fn invalid_alias(message: impl Into<String>, alias: &str) -> Self {
        Self::Validation {
            code: "invalid_alias",
            message: message.into(),
            details: json!({ "alias": alias }),
        }
    }

    pub fn invalid_ttl(ttl_days: i64, max_days: i64) -> Self {
        Self::Validation {
            code: "invalid_ttl",
            message: format!("ttl_days must not exceed {max_days}"),
            details: json!({ "ttl_days": ttl_days }),
        }
    }

    pub fn alias_taken(alias: &str) -> Self {
        Self::Conflict {
            code: "alias_taken",
            message: "Custom alias already exists".to_string(),
            details: json!({ "alias": alias }),
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            code: "code_taken",
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    /// Lookup miss for a short code. Expired and unknown codes look the same.
    pub fn link_not_found(code: &str) -> Self {
        Self::not_found("Short link not found", json!({ "code": code }))
    }

    pub fn too_many_requests(message: impl Into<String>, details: Value) -> Self {
        Self::TooManyRequests {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns the stable error code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. } | Self::Conflict { code, .. } => *code,
            Self::NotFound { .. } => "not_found",
            Self::TooManyRequests { .. } => "rate_limited",
            Self::Unavailable { .. } => "unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(self) -> ErrorInfo {
        let code = self.code();
        let (message, details) = match self {
            Self::Validation {
                message, details, ..
            }
            | Self::Conflict {
                message, details, ..
            }
            | Self::NotFound { message, details }
            | Self::TooManyRequests { message, details }
            | Self::Unavailable { message, details }
            | Self::Internal { message, details } => (message, details),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        AppError::bad_request(
            "Request validation failed",
            json!({ "fields": fields, "reason": errors.to_string() }),
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                tracing::warn!(error = %e, "database unavailable");
                AppError::unavailable("Database unavailable", json!({}))
            }
            other => {
                tracing::error!(error = %other, "database error");
                AppError::internal("Database error", json!({}))
            }
        }
    }
}
