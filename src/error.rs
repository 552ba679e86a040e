// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Postgres SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Global Application Error Enum.
/// Every failure is scoped to the request that hit it; nothing here is fatal.
#[derive(Debug)]
pub enum AppError {
    // 400: unrecognized question type, malformed payload, bad paging params
    Validation(String),

    // 400: payload could not be encoded or decoded
    Serialization(String),

    // 404
    NotFound(String),

    // 500: connection failure, constraint violation, failed statement
    Storage(String),

    // 504: the scoped transaction ran past its budget and was rolled back
    Timeout(String),

    // 500: missing or malformed environment
    Config(String),

    // 401
    AuthError(String),

    // 403
    Forbidden(String),

    // 409 (e.g., duplicate email)
    Conflict(String),

    // 500: hashing or token signing failed
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Serialization(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Config(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

/// Converts the error into a JSON response with appropriate HTTP status code.
/// Storage and config details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::Storage(msg) | AppError::Config(msg) | AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::Timeout(msg) => {
                tracing::error!("Query timed out: {}", msg);
                "Request timed out".to_string()
            }
            AppError::Validation(msg)
            | AppError::Serialization(msg)
            | AppError::NotFound(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg,
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Lets `?` work on database calls. Unique violations become `Conflict`,
/// everything else is a storage failure.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return AppError::Conflict("Record already exists".to_string());
            }
        }
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
