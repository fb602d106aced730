//! Error types shared across the crate.
//!
//! Library code returns the typed errors below. Binaries use
//! `anyhow::Result`, and failures that no layer knows how to handle are
//! carried as `anyhow::Error` until they reach [`AppError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a single persistence statement.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The statement matched no row.
    #[error("invoice {0} not found")]
    NotFound(Uuid),

    /// The database rejected the statement or could not be reached.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A non-database backend failed (used by in-process stores).
    #[error("{0}")]
    Backend(String),
}

/// Category of a recognized authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The credentials were malformed or did not match an account.
    CredentialsSignin,
    /// Credential verification itself failed.
    CallbackRouteError,
    /// The identity subsystem is misconfigured.
    Configuration,
    /// The requested sign-in strategy does not exist.
    InvalidProvider,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::CredentialsSignin => "CredentialsSignin",
            AuthErrorKind::CallbackRouteError => "CallbackRouteError",
            AuthErrorKind::Configuration => "Configuration",
            AuthErrorKind::InvalidProvider => "InvalidProvider",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized authentication failure raised by the identity subsystem.
#[derive(Debug, Error)]
#[error("{kind}: {detail}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub detail: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, detail: impl Into<String>) -> Self {
        AuthError {
            kind,
            detail: detail.into(),
        }
    }
}

/// Everything a sign-in attempt can fail with.
#[derive(Debug, Error)]
pub enum SignInError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Not an authentication failure. Never turned into a form message.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Invalid or missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Error body for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            AppError::Store(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            // Internals stay in the logs.
            AppError::Store(StoreError::Database(_))
            | AppError::Store(StoreError::Backend(_))
            | AppError::Internal(_) => "Something went wrong.".to_string(),
            other => other.to_string(),
        };
        ErrorResponse {
            code: self.error_code(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}
