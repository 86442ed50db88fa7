// API error taxonomy
// Every variant is turned into a response at the handler boundary

use hyper::StatusCode;

use crate::logger;

/// Shown instead of backend error text when details are not exposed
const REDACTED_DETAIL: &str = "internal error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required `X-User-Id` header missing or empty
    #[error("User ID required")]
    MissingUserId,

    /// Endpoint needs a storage backend but none is configured
    #[error("Database not configured")]
    DatabaseNotConfigured,

    /// Storage call (or the body feeding it) failed
    #[error("Failed to {op}: {message}")]
    Storage { op: &'static str, message: String },

    /// Request body is not valid JSON
    #[error("{0}")]
    MalformedBody(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// Wrap a storage-side failure, logging the full cause
    pub fn storage(op: &'static str, cause: &dyn std::fmt::Display, expose: bool) -> Self {
        logger::log_error(&format!("{op} error: {cause}"));
        let message = if expose {
            cause.to_string()
        } else {
            REDACTED_DETAIL.to_string()
        };
        Self::Storage { op, message }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingUserId => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::DatabaseNotConfigured | Self::Storage { .. } | Self::MalformedBody(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
