use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::repositories::RepositoryError;
use crate::infrastructure::metadata::CatalogError;

/// One failed field constraint, reported under `details`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Authorization failed: {message}")]
    Authorization { message: String },

    #[error("Validation failed: {} field error(s)", errors.len())]
    Validation { errors: Vec<FieldError> },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    #[error("External service error: {service}: {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Authorization { .. } => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            // Provider outages surface as plain internal failures
            AppError::ExternalService { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The `error` label of the response body
    pub fn error_label(&self) -> &'static str {
        match self {
            AppError::Authentication { .. } => "Unauthorized",
            AppError::Authorization { .. } => "Forbidden",
            AppError::Validation { .. } => "Validation Error",
            AppError::BadRequest { .. } => "Bad Request",
            AppError::NotFound { .. } => "Not Found",
            AppError::Conflict { .. } => "Conflict",
            AppError::RateLimit { .. } => "Too Many Requests",
            AppError::ExternalService { .. } | AppError::Internal { .. } => "Internal Server Error",
        }
    }

    /// Check if this error should be logged as an error (vs warning)
    pub fn should_log_as_error(&self) -> bool {
        matches!(self, AppError::ExternalService { .. } | AppError::Internal { .. })
    }

    /// Build the uniform wire body: `{error, message?, details?}`.
    ///
    /// Internal causes are redacted; the full error only reaches the log.
    pub fn to_error_response(&self) -> ErrorResponse {
        let (message, details) = match self {
            AppError::Validation { errors } => (None, Some(errors.clone())),
            AppError::NotFound { resource } => (Some(format!("{resource} not found")), None),
            AppError::Authentication { message }
            | AppError::Authorization { message }
            | AppError::BadRequest { message }
            | AppError::Conflict { message }
            | AppError::RateLimit { message } => (Some(message.clone()), None),
            AppError::ExternalService { .. } | AppError::Internal { .. } => {
                (Some("Something went wrong!".to_string()), None)
            }
        };

        ErrorResponse { error: self.error_label().to_string(), message, details }
    }
}

/// Uniform error body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_error_response();

        if self.should_log_as_error() {
            error!(error_label = body.error, "request failed: {}", self);
        } else {
            warn!(error_label = body.error, "request rejected: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Internal { message: err.to_string() }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => AppError::NotFound { resource: "Movie".to_string() },
            CatalogError::Upstream(message) => {
                AppError::ExternalService { service: "tmdb".to_string(), message }
            }
        }
    }
}
