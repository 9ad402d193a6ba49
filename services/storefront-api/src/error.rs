//! Error types for the Storefront API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use restock_lifecycle::LifecycleError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Database error")]
    Database(#[from] restock_db::DbError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SubscriptionNotFound => StatusCode::NOT_FOUND,
            Self::Lifecycle(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            Self::Lifecycle(e) => e.error_code(),
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server-side failures; customer-facing token errors are normal
        // traffic and stay at debug
        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal API error");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
