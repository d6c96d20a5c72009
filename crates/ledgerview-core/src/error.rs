//! Error types for ledgerview-core
//!
//! Transport failures are propagated to the caller of the controller action
//! that triggered them. Superseded responses are not errors and never reach
//! this module.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A request to a data source failed
    TransportFailure,
    /// Employee-scoped request without an employee id
    EmptyEmployeeId,
    /// Page index outside the valid range
    InvalidPage,
    /// Fixture could not be read or decoded
    FixtureError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::TransportFailure => write!(f, "TRANSPORT_FAILURE"),
            ErrorCode::EmptyEmployeeId => write!(f, "EMPTY_EMPLOYEE_ID"),
            ErrorCode::InvalidPage => write!(f, "INVALID_PAGE"),
            ErrorCode::FixtureError => write!(f, "FIXTURE_ERROR"),
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
            details: None,
            suggestions: vec![],
        }
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
    /// Warning - the action failed but the session is intact
    Warning,
    /// Error - the action failed
    Error,
    /// Critical - the session cannot continue
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for ledgerview-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Employee id cannot be empty")]
    EmptyEmployeeId,

    #[error("Invalid page index: {page}")]
    InvalidPage { page: u32 },

    #[error("Fixture error: {message}")]
    Fixture { message: String },
}

impl CoreError {
    /// Shorthand for a transport failure
    pub fn transport(message: impl Into<String>) -> Self {
        CoreError::Transport { message: message.into() }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Transport { .. } => ErrorCode::TransportFailure,
            CoreError::EmptyEmployeeId => ErrorCode::EmptyEmployeeId,
            CoreError::InvalidPage { .. } => ErrorCode::InvalidPage,
            CoreError::Fixture { .. } => ErrorCode::FixtureError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Transport { .. } => ErrorSeverity::Error,
            CoreError::EmptyEmployeeId => ErrorSeverity::Warning,
            CoreError::InvalidPage { .. } => ErrorSeverity::Warning,
            CoreError::Fixture { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Transport { message } => {
                details = details.with_detail(serde_json::json!({ "transport_message": message }));
                details = details.with_suggestion(
                    "The previously displayed transactions are unchanged; retry the action.".to_string()
                );
            }
            CoreError::EmptyEmployeeId => {
                details = details.with_suggestion(
                    "Select an employee, or clear the filter to load all transactions.".to_string()
                );
            }
            CoreError::InvalidPage { page } => {
                details = details.with_detail(serde_json::json!({ "page": page }));
                details = details.with_suggestion("Pages are numbered from 1.".to_string());
            }
            CoreError::Fixture { .. } => {
                details = details.with_suggestion(
                    "Check data.fixture_path in the configuration file.".to_string()
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log debug information
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "ledgerview::error",
            "ERROR [{}] ({}) {} - Operation: {} - Context: {}",
            error.code(),
            error.severity(),
            error,
            context.operation,
            context.data
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "ledgerview::error",
            "DEBUG: {} - Operation: {} - Context: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::TransportFailure.to_string(), "TRANSPORT_FAILURE");
        assert_eq!(ErrorCode::EmptyEmployeeId.to_string(), "EMPTY_EMPLOYEE_ID");
        assert_eq!(ErrorCode::InvalidPage.to_string(), "INVALID_PAGE");
    }

    #[test]
    fn test_core_error_code_and_severity() {
        let error = CoreError::transport("connection reset");
        assert_eq!(error.code(), ErrorCode::TransportFailure);
        assert_eq!(error.severity(), ErrorSeverity::Error);

        let error = CoreError::Fixture { message: "bad json".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_transport_details() {
        let details = CoreError::transport("timeout").to_details();
        assert_eq!(details.code, ErrorCode::TransportFailure);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("timeout"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("select_employee")
            .with_data("employee_id", serde_json::json!("e1"));

        assert_eq!(context.operation, "select_employee");
        assert_eq!(context.data["employee_id"], "e1");
    }
}
