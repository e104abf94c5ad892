//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Conflict-class failures, reported as HTTP 409.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("You have already registered for this conference")]
    AlreadyRegistered,

    #[error("There are no seats available.")]
    SoldOut,

    #[error("Session is already in your wishlist")]
    AlreadyInWishlist,
}

impl Conflict {
    /// Short label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            Conflict::AlreadyRegistered => "already_registered",
            Conflict::SoldOut => "sold_out",
            Conflict::AlreadyInWishlist => "already_in_wishlist",
        }
    }
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("{0}")]
    UnsupportedFilterCombination(String),

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Shorthand for the missing-credentials case.
    pub fn authorization_required() -> Self {
        AppError::Unauthorized("Authorization required".to_string())
    }

    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::InvalidFilter(_)
            | AppError::UnsupportedFilterCombination(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Infrastructure failures are logged, never echoed to the caller.
        let error = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        for conflict in [
            Conflict::AlreadyRegistered,
            Conflict::SoldOut,
            Conflict::AlreadyInWishlist,
        ] {
            assert_eq!(AppError::from(conflict).status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn filter_errors_are_bad_requests() {
        assert_eq!(
            AppError::InvalidFilter("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedFilterCombination("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.to_string(), "internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn conflict_message_is_passed_through() {
        let err = AppError::from(Conflict::SoldOut);
        assert_eq!(err.to_string(), "There are no seats available.");
    }
}
