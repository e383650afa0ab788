//! Domain error type and its HTTP mapping.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid points amount")]
    InvalidAmount,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing Authorization header")]
    MissingCredential,

    #[error("invalid Authorization header")]
    MalformedCredential,

    #[error("token signature rejected")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    Malformed,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("storage operation timed out")]
    Timeout,

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::BadSignature
            | AppError::Expired
            | AppError::Malformed => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidAmount | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Hash(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DuplicateUsername => "DUPLICATE_USERNAME",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::InvalidAmount => "INVALID_AMOUNT",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::MissingCredential => "MISSING_CREDENTIAL",
            AppError::MalformedCredential => "MALFORMED_CREDENTIAL",
            AppError::BadSignature => "BAD_SIGNATURE",
            AppError::Expired => "TOKEN_EXPIRED",
            AppError::Malformed => "MALFORMED_TOKEN",
            AppError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            AppError::Timeout => "TIMEOUT",
            AppError::Hash(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Infrastructure failures a caller may retry. The service itself never does.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::StorageUnavailable(_) | AppError::Timeout)
    }

    /// Message sent to clients; infrastructure detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::StorageUnavailable(_) => "Service temporarily unavailable".to_string(),
            AppError::Hash(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                transient = self.is_transient(),
                "request failed"
            );
        }

        let body = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.public_message(),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => AppError::Timeout,
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateUsername,
            // 22003: numeric_value_out_of_range, raised when an increment overflows BIGINT
            sqlx::Error::Database(db)
                if db.is_check_violation() || db.code().as_deref() == Some("22003") =>
            {
                AppError::InvalidAmount
            }
            other => AppError::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.to_string())
    }
}
