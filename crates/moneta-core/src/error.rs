//! Error types for moneta-core
//!
//! Transport failures arrive as [`GatewayError`] and are classified into
//! [`CoreError`], which carries error codes, severities and suggestions for
//! the session adapter to report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized failure of a backend call
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct GatewayError {
    /// HTTP status; `None` when the request never got a response
    pub status: Option<u16>,
    /// Backend `detail` or a generic description
    pub message: String,
    /// Parsed response body (null when absent or not JSON)
    pub data: serde_json::Value,
}

impl GatewayError {
    /// Error for a non-2xx response
    pub fn http(status: u16, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            data,
        }
    }

    /// Error for a request that failed before a response arrived
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            data: serde_json::Value::Null,
        }
    }

    /// Extract the message from a response body, falling back to the status
    pub fn from_body(status: u16, data: serde_json::Value) -> Self {
        let message = data
            .get("detail")
            .and_then(|d| d.as_str())
            .map(|d| d.to_string())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));
        Self::http(status, message, data)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Client-side validation failed
    ValidationError,
    /// Wrong email or password on login
    InvalidCredentials,
    /// Token rejected on a protected call
    SessionExpired,
    /// No user is logged in
    NotAuthenticated,
    /// Referential-integrity conflict
    Conflict,
    /// Resource not found
    NotFound,
    /// Other non-2xx response
    ApiError,
    /// Request did not reach the backend
    NetworkError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            ErrorCode::SessionExpired => write!(f, "SESSION_EXPIRED"),
            ErrorCode::NotAuthenticated => write!(f, "NOT_AUTHENTICATED"),
            ErrorCode::Conflict => write!(f, "CONFLICT"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::ApiError => write!(f, "API_ERROR"),
            ErrorCode::NetworkError => write!(f, "NETWORK_ERROR"),
        }
    }
}

/// Detailed error information for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// HTTP status (if the backend answered)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            status: None,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add the HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status {})", status)?;
        }
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation rejected, state unchanged
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for moneta-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        data: serde_json::Value,
    },

    #[error("Network error: {message}")]
    Network { message: String },
}

impl CoreError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation {
            message: message.into(),
        }
    }

    /// Classify a gateway failure; `login` marks the credential check itself
    pub fn from_gateway(error: GatewayError, login: bool) -> Self {
        match error.status {
            Some(401) if login => CoreError::InvalidCredentials { message: error.message },
            Some(401) => CoreError::SessionExpired,
            Some(409) => CoreError::Conflict { message: error.message },
            Some(404) => CoreError::NotFound { message: error.message },
            Some(status) => CoreError::Api {
                status,
                message: error.message,
                data: error.data,
            },
            None => CoreError::Network { message: error.message },
        }
    }

    /// HTTP status behind the error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::InvalidCredentials { .. } | CoreError::SessionExpired => Some(401),
            CoreError::Conflict { .. } => Some(409),
            CoreError::NotFound { .. } => Some(404),
            CoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Network failures and server-side errors
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Network { .. } => true,
            CoreError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::InvalidCredentials { .. } => ErrorCode::InvalidCredentials,
            CoreError::SessionExpired => ErrorCode::SessionExpired,
            CoreError::NotAuthenticated => ErrorCode::NotAuthenticated,
            CoreError::Conflict { .. } => ErrorCode::Conflict,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Api { .. } => ErrorCode::ApiError,
            CoreError::Network { .. } => ErrorCode::NetworkError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::InvalidCredentials { .. } => ErrorSeverity::Info,
            CoreError::SessionExpired => ErrorSeverity::Warning,
            CoreError::NotAuthenticated => ErrorSeverity::Warning,
            CoreError::Conflict { .. } => ErrorSeverity::Warning,
            CoreError::NotFound { .. } => ErrorSeverity::Info,
            CoreError::Api { .. } => ErrorSeverity::Error,
            CoreError::Network { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());
        if let Some(status) = self.status() {
            details = details.with_status(status);
        }

        match self {
            CoreError::SessionExpired | CoreError::NotAuthenticated => {
                details = details.with_suggestion("Log in again with `moneta login`.".to_string());
            }
            CoreError::Conflict { .. } => {
                details = details.with_suggestion(
                    "Remove or reassign the transactions that still use this type.".to_string(),
                );
            }
            CoreError::Api { data, .. } => {
                if !data.is_null() {
                    details = details.with_detail(data.clone());
                }
            }
            CoreError::Network { .. } => {
                details = details.with_suggestion("Check that the backend is running and reachable.".to_string());
                details = details.with_suggestion("Verify `api.base_url` in your config file.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// User ID (if authenticated)
    pub user_id: Option<i64>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            user_id: None,
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add user ID
    pub fn with_user_id(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
    /// Log debug information
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => log::warn!(
                target: "moneta::error",
                "{} - Operation: {} - User: {:?}",
                error.to_details(),
                context.operation,
                context.user_id
            ),
            ErrorSeverity::Error => log::error!(
                target: "moneta::error",
                "{} - Operation: {} - User: {:?} - Data: {}",
                error.to_details(),
                context.operation,
                context.user_id,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "moneta::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "moneta::error",
            "DEBUG: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::SessionExpired.to_string(), "SESSION_EXPIRED");
        assert_eq!(ErrorCode::Conflict.to_string(), "CONFLICT");
        assert_eq!(ErrorCode::NetworkError.to_string(), "NETWORK_ERROR");
    }

    #[test]
    fn test_gateway_error_from_body() {
        let error = GatewayError::from_body(409, serde_json::json!({"detail": "Type in use"}));
        assert_eq!(error.status, Some(409));
        assert_eq!(error.message, "Type in use");

        let error = GatewayError::from_body(500, serde_json::Value::Null);
        assert_eq!(error.message, "HTTP error! status: 500");
    }

    #[test]
    fn test_unauthorized_depends_on_login() {
        let error = GatewayError::http(401, "Invalid credentials", serde_json::Value::Null);
        assert_eq!(
            CoreError::from_gateway(error.clone(), true),
            CoreError::InvalidCredentials {
                message: "Invalid credentials".to_string()
            }
        );
        assert_eq!(CoreError::from_gateway(error, false), CoreError::SessionExpired);
    }

    #[test]
    fn test_classification() {
        let conflict = CoreError::from_gateway(GatewayError::http(409, "in use", serde_json::Value::Null), false);
        assert_eq!(conflict.code(), ErrorCode::Conflict);
        assert_eq!(conflict.severity(), ErrorSeverity::Warning);
        assert!(!conflict.is_transient());

        let server = CoreError::from_gateway(GatewayError::http(503, "down", serde_json::Value::Null), false);
        assert_eq!(server.status(), Some(503));
        assert!(server.is_transient());

        let network = CoreError::from_gateway(GatewayError::network("connection refused"), false);
        assert_eq!(network.code(), ErrorCode::NetworkError);
        assert!(network.is_transient());
        assert_eq!(network.status(), None);
    }

    #[test]
    fn test_error_details() {
        let error = CoreError::Api {
            status: 422,
            message: "Invalid input".to_string(),
            data: serde_json::json!({"detail": [{"loc": ["body", "value"]}]}),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::ApiError);
        assert_eq!(details.status, Some(422));
        assert!(details.details.is_some());
        assert!(details.to_string().starts_with("[API_ERROR] Invalid input"));
    }

    #[test]
    fn test_network_details_have_suggestions() {
        let details = CoreError::Network {
            message: "refused".to_string(),
        }
        .to_details();
        assert_eq!(details.suggestions.len(), 2);
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("delete_type")
            .with_user_id(Some(4))
            .with_data("type_id", serde_json::json!(9));

        assert_eq!(context.operation, "delete_type");
        assert_eq!(context.user_id, Some(4));
        assert_eq!(context.data["type_id"], 9);
    }
}
