//! Shared API plumbing: the error type returned by every handler and the
//! helper that runs database work off the async executor.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quizhub_db::DbPool;
use quizhub_forms::FormError;
use rusqlite::Connection;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unprocessable: {0}")]
    UnprocessableEntity(String),
    /// An extractor refused the request; carries the extractor's own status.
    #[error("rejected: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Rejected { status, message } => (status, message),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<FormError> for ApiError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::Invalid(_) => ApiError::UnprocessableEntity(e.to_string()),
            FormError::NotFound(_) => ApiError::NotFound(e.to_string()),
            FormError::AlreadyPublished(_) => ApiError::Conflict(e.to_string()),
            FormError::Database(ref err) => {
                tracing::error!(error = %err, "form database operation failed");
                ApiError::InternalServerError("database error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Checks out a pooled connection and runs `f` on the blocking thread pool.
///
/// The connection returns to the pool when `f` finishes, whether it
/// succeeded or not.
pub(crate) async fn with_conn<T, F>(pool: &DbPool, op: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, op, "failed to get db connection");
            ApiError::InternalServerError("db connection failed".to_string())
        })?;
        f(&mut *conn)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, op, "task join error");
        ApiError::InternalServerError("task join error".to_string())
    })?
}
