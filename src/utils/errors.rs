//! Error handling for the dashboard
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the dashboard application
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Errors returned by the hosted backend client
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend answered with an error payload; the message is passed through verbatim
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid backend response: {0}")]
    Decode(String),

    #[error("Not authenticated")]
    NoSession,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Failure taxonomy of a mutation action
///
/// All three collapse to the same `{success: false, error}` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Backend(String),
}

impl From<BackendError> for ActionError {
    fn from(error: BackendError) -> Self {
        ActionError::Backend(error.to_string())
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Result type alias for backend client operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

impl DashboardError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::Config(_) => false,
            DashboardError::Backend(e) => e.is_transient(),
            DashboardError::Database(_) => false,
            DashboardError::Migration(_) => false,
            DashboardError::Redis(_) => true,
            DashboardError::Http(_) => true,
            DashboardError::Serialization(_) => false,
            DashboardError::Jwt(_) => false,
            DashboardError::Io(_) => true,
            DashboardError::UrlParse(_) => false,
            DashboardError::PermissionDenied(_) => false,
            DashboardError::Authentication(_) => false,
            DashboardError::NotFound { .. } => false,
            DashboardError::InvalidInput(_) => false,
            DashboardError::RateLimitExceeded => true,
            DashboardError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DashboardError::Config(_) => ErrorSeverity::Critical,
            DashboardError::Migration(_) => ErrorSeverity::Critical,
            DashboardError::Database(_) => ErrorSeverity::Critical,
            DashboardError::PermissionDenied(_) => ErrorSeverity::Warning,
            DashboardError::Authentication(_) => ErrorSeverity::Warning,
            DashboardError::RateLimitExceeded => ErrorSeverity::Warning,
            DashboardError::InvalidInput(_) => ErrorSeverity::Info,
            DashboardError::NotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            DashboardError::Authentication(_) => StatusCode::UNAUTHORIZED,
            DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
            DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DashboardError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            DashboardError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::Backend(BackendError::NoSession) => StatusCode::UNAUTHORIZED,
            DashboardError::Backend(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl BackendError {
    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Transport(e) => e.is_timeout() || e.is_connect(),
            BackendError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, severity = %self.severity(), "Request failed");
        }

        // Internal details stay in the logs
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_api_message_passes_through() {
        let error = BackendError::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
            code: Some("23505".to_string()),
        };
        let action_error: ActionError = error.into();
        assert_eq!(
            action_error.to_string(),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn test_action_error_messages() {
        assert_eq!(ActionError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            ActionError::Validation("Name and link are required".to_string()).to_string(),
            "Name and link are required"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DashboardError::PermissionDenied("admin".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DashboardError::Backend(BackendError::NoSession).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DashboardError::Config("x".to_string()).severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_transient_backend_errors() {
        let server_error = BackendError::Api {
            status: 503,
            message: "unavailable".to_string(),
            code: None,
        };
        assert!(server_error.is_transient());
        assert!(!BackendError::NoSession.is_transient());
    }
}
