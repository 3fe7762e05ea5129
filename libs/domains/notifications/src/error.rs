//! Error types for the notifications domain.

use std::time::Duration;
use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in the notifications domain.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The request named a notification type outside the closed set.
    #[error("Unknown notification type: {0}")]
    InvalidType(String),

    /// The request body is structurally valid JSON but unusable.
    #[error("Invalid notification request: {0}")]
    InvalidRequest(String),

    /// No directory record matches the lookup key.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A directory or transport call exceeded its budget.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// Email provider error.
    #[error("Email provider error: {0}")]
    ProviderError(String),

    /// Push provider error.
    #[error("Push provider error: {0}")]
    PushError(String),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    TemplateError(String),

    /// Directory backend error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotificationError {
    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NotificationError::InvalidType(_) | NotificationError::InvalidRequest(_)
        )
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::TemplateError(err.to_string())
    }
}

impl From<handlebars::TemplateError> for NotificationError {
    fn from(err: handlebars::TemplateError) -> Self {
        NotificationError::TemplateError(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<mongodb::error::Error> for NotificationError {
    fn from(err: mongodb::error::Error) -> Self {
        NotificationError::DatabaseError(err.to_string())
    }
}

impl From<database::DatabaseError> for NotificationError {
    fn from(err: database::DatabaseError) -> Self {
        NotificationError::DatabaseError(err.to_string())
    }
}

impl From<web_push::WebPushError> for NotificationError {
    fn from(err: web_push::WebPushError) -> Self {
        NotificationError::PushError(err.to_string())
    }
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::ConfigError(err.to_string())
    }
}

impl From<NotificationError> for axum_helpers::AppError {
    fn from(err: NotificationError) -> Self {
        if err.is_client_error() {
            axum_helpers::AppError::BadRequest(err.to_string())
        } else {
            axum_helpers::AppError::InternalServerError(err.to_string())
        }
    }
}
