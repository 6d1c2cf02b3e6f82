//! Error types for the campus portal

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Reasons a request failed to authenticate.
///
/// Clients only ever see a uniform 401 for these; the specific kind is kept
/// for the logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("no authorization token presented")]
    Unauthenticated,

    #[error("authorization header is not a bearer credential")]
    MalformedCredential,

    #[error("token is not a well-formed JWT")]
    InvalidStructure,

    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not active yet")]
    NotActive,

    #[error("token claims do not carry a valid identity")]
    InvalidClaim,
}

impl AuthError {
    /// Stable name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::InvalidStructure => "invalid_structure",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::NotActive => "not_active",
            AuthError::InvalidClaim => "invalid_claim",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'campus-portal init' first.")]
    ConfigNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token issuance failed: {0}")]
    Token(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("Server misconfigured: {0}")]
    ServerMisconfigured(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Other(format!("background task failed: {}", err))
    }
}

impl Error {
    /// Maps an error kind to the status and message a client is allowed to see.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::Auth(_) => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Error::ServerMisconfigured(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
            Error::DuplicateKey(msg) | Error::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }

    fn log(&self) {
        match self {
            Error::Auth(kind) => {
                tracing::warn!(kind = kind.kind(), "Rejected request: {}", kind);
            }
            Error::InvalidCredentials | Error::Forbidden(_) => {
                tracing::info!("Rejected request: {}", self);
            }
            Error::ServerMisconfigured(detail) => {
                tracing::error!(alarm = "server_misconfigured", "{}", detail);
            }
            Error::DuplicateKey(_) | Error::NotFound(_) | Error::Validation(_) => {
                tracing::debug!("Client error: {}", self);
            }
            _ => tracing::error!("Internal error: {}", self),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
