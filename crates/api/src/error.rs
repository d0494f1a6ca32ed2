//! Error-to-response mapping.
//!
//! Every failure leaves the API as `{"error": CODE, "message": text}` with the
//! status hint of the underlying error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plus_core::BillingError;
use plus_core::auth::PasswordError;
use plus_core::receipt::ReceiptError;
use plus_db::RepoError;
use plus_shared::{AppError, JwtError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A business rule or repository failure.
    #[error(transparent)]
    Domain(#[from] BillingError),

    /// Authentication, tenancy or configuration failure.
    #[error(transparent)]
    App(#[from] AppError),

    /// Request body failed field validation.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Request body could not be parsed.
    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Shorthand for a 403 raised by a role check.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::App(AppError::Forbidden(msg.into()))
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Domain(e) => e.status_code(),
            Self::App(e) => e.status_code(),
            Self::Validation(_) | Self::BadRequest(_) => 400,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.error_code(),
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self::App(err.into())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<ReceiptError> for ApiError {
    fn from(err: ReceiptError) -> Self {
        Self::Domain(BillingError::Internal(err.to_string()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = if status.is_server_error() {
            error!(error = %self, code, "request failed");
            "An internal error occurred".to_string()
        } else {
            warn!(error = %self, code, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: code,
                message,
            }),
        )
            .into_response()
    }
}
