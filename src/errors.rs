use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level failures raised by services and workflows. The HTTP
/// boundary maps each kind to a status; infrastructure variants collapse to
/// a generic body so store or signer internals never cross the boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Unsupported grant type")]
    UnsupportedGrantType,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashing(#[from] crate::auth::password::PasswordError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg.clone()),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable entity",
                msg.clone(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg.clone()),
            AppError::UnsupportedGrantType => (
                StatusCode::BAD_REQUEST,
                "Bad request",
                "unsupported grant type".to_string(),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "token expired".to_string(),
            ),
            AppError::MissingAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "missing authorization header".to_string(),
            ),
            AppError::InvalidAuthHeaderFormat => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "invalid authorization header format".to_string(),
            ),
            AppError::Jwt(_) => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "token error".to_string(),
            ),
            AppError::Database(_) | AppError::PasswordHashing(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "internal server error".to_string(),
            ),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}
