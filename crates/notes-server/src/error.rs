//! API error types with JSON responses.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use notes_store::StoreError;
use serde::Serialize;

use crate::urls::{RouteName, RouteTable};

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Login required; answered with a redirect to `location`.
    #[error("authentication required")]
    Unauthenticated { location: String },

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "UNAUTHENTICATED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(e) if e.is_not_found() => "NOT_FOUND",
            Self::Store(StoreError::DuplicateSlug(_) | StoreError::UsernameTaken(_)) => "CONFLICT",
            Self::Store(StoreError::Unauthenticated) => "UNAUTHENTICATED",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated { .. } => StatusCode::FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                StoreError::NoteNotFound(_)
                | StoreError::NoteIdNotFound(_)
                | StoreError::UserNotFound(_)
                | StoreError::InvalidPage(_) => StatusCode::NOT_FOUND,
                StoreError::DuplicateSlug(_) | StoreError::UsernameTaken(_) => StatusCode::CONFLICT,
                StoreError::Unauthenticated => StatusCode::FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let location = match &self {
            Self::Unauthenticated { location } => Some(location.clone()),
            // No request path at this point, so the login page gets no `next`.
            Self::Store(StoreError::Unauthenticated) => {
                Some(RouteTable::default().reverse(RouteName::Login, &[]))
            }
            _ => None,
        };
        if let Some(location) = location {
            return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
        }

        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
