use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Account store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found")]
    NotFound,

    #[error("duplicate account: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Token and access-control failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid token")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("wrong token kind")]
    WrongTokenKind,

    #[error("token is no longer current")]
    Superseded,

    #[error("not permitted")]
    Forbidden,

    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error("token persistence failed: {0}")]
    Persistence(#[source] StoreError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::WrongTokenKind
            | AuthError::Superseded
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Persistence(_) | AuthError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to callers. Internal causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Persistence(_) => "failed to store issued tokens".to_string(),
            AuthError::Configuration(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::WrongTokenKind => "wrong_token_kind",
            AuthError::Superseded => "superseded",
            AuthError::Forbidden => "forbidden",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Persistence(_) => "persistence_error",
            AuthError::Configuration(_) => "configuration_error",
        }
    }
}

/// Handler-level error, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("user not found")]
    NotFound,

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Duplicate(what) => ApiError::Conflict(what),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Malformed or incomplete request bodies are client errors in the usual `{"error"}` shape.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Auth(e) => (e.status(), e.public_message()),
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(m) => {
                tracing::error!("internal error: {m}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
