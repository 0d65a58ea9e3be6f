use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorBody;

/// StoreError
///
/// Failures raised by the persistence layer. None of these are retried; they end the
/// request that hit them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("username already taken")]
    DuplicateUsername,
    // A schema-level rejection (e.g. the `name <> ''` check).
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classifies a raw sqlx error, lifting check violations out of the opaque
    /// `Database` bucket.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_check_violation() {
                return StoreError::Constraint(db.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// ApiError
///
/// The error taxonomy seen at the HTTP boundary. Every variant maps to exactly one
/// status code and a fixed, minimal message: no identifiers or store detail leak out.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenient result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Constraint(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::DuplicateUsername) => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Unauthorized".to_string(),
            ApiError::Forbidden => "Forbidden".to_string(),
            ApiError::NotFound => "Resource not found".to_string(),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Store(StoreError::Constraint(_)) => "Validation failed".to_string(),
            ApiError::Store(StoreError::DuplicateUsername) => "Username already taken".to_string(),
            ApiError::Store(_) | ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = Json(ErrorBody {
            message: self.public_message(),
        });

        match self {
            ApiError::Unauthenticated => (
                status,
                [(header::WWW_AUTHENTICATE, r#"Basic realm="Users""#)],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
