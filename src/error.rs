//! Error types shared by the store, the link service and the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::codec::CodecError;

/// Failures coming out of the embedded database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("identifier sequence exhausted")]
    SequenceExhausted,
}

// redb reports a separate error type per operation; funnel them all through
// `redb::Error` so `?` works on any of them.
macro_rules! from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Database(err.into())
                }
            }
        )*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Invalid environment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Gone(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid or missing authorization header")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A key that cannot be decoded cannot name any stored link
impl From<CodecError> for AppError {
    fn from(_: CodecError) -> Self {
        AppError::NotFound("URL not found".to_string())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Gone(_) => (StatusCode::GONE, "expired"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Store(err) => {
                tracing::error!(error = %err, "storage failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
