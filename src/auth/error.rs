//! Failures of the signup, login and authorization-gate flows.
//!
//! Every variant maps to one HTTP status and one public message. Internal
//! detail stays in the logs; response bodies only ever carry the public message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::dto::MessageResponse;
use super::repo::StoreError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required fields")]
    Validation,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("user not found")]
    UserNotFound,

    #[error("password mismatch")]
    InvalidCredentials,

    #[error("authorization header missing")]
    MissingToken,

    #[error("token rejected")]
    InvalidToken,

    /// Persistence, hashing or signing failed.
    #[error("store failure: {0:#}")]
    StoreFailure(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation | AuthError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::FORBIDDEN,
            AuthError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Validation => "All fields are required",
            AuthError::DuplicateEmail => "Email already exists",
            AuthError::UserNotFound => "User not found. Please sign up first.",
            AuthError::InvalidCredentials => "Incorrect password",
            AuthError::MissingToken => "No token provided",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::StoreFailure(_) => "Internal server error",
        }
    }

    pub(crate) fn log(&self) {
        match self {
            AuthError::StoreFailure(_) => {
                tracing::error!(error = %self, "auth store failure");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("invalid login attempt");
            }
            AuthError::InvalidToken => {
                tracing::warn!("invalid or expired token");
            }
            _ => {
                tracing::debug!(error = %self, "auth error");
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey => AuthError::DuplicateEmail,
            StoreError::Database(e) => AuthError::StoreFailure(anyhow::Error::new(e)),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let body = MessageResponse {
            message: self.public_message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
