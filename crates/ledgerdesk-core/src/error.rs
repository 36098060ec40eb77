//! Error types for ledgerdesk-core
//!
//! Three families of failure reach the user: validation errors raised
//! before anything is sent, backend errors from the REST API, and partial
//! load errors that mark one project on the dashboard without failing the
//! others. `CoreError` wraps them all and carries codes, severities and
//! suggestions for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required draft field is blank
    MissingRequiredField,
    /// Debits and credits differ
    UnbalancedEntry,
    /// Entry would have no lines
    MinimumLinesViolation,
    /// Negative debit or credit
    NegativeAmount,
    /// Line index does not exist
    LineOutOfRange,
    /// Transport failure talking to the backend
    NetworkError,
    /// Backend answered with a failure status
    ServerError,
    /// Backend rejected the request payload
    BackendValidation,
    /// One project's reports failed to load
    PartialLoad,
    /// Resource not found
    NotFound,
    /// Operation not allowed in the current state
    InvalidState,
    /// Workbook export failed
    ExportError,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MissingRequiredField => write!(f, "MISSING_REQUIRED_FIELD"),
            ErrorCode::UnbalancedEntry => write!(f, "UNBALANCED_ENTRY"),
            ErrorCode::MinimumLinesViolation => write!(f, "MINIMUM_LINES_VIOLATION"),
            ErrorCode::NegativeAmount => write!(f, "NEGATIVE_AMOUNT"),
            ErrorCode::LineOutOfRange => write!(f, "LINE_OUT_OF_RANGE"),
            ErrorCode::NetworkError => write!(f, "NETWORK_ERROR"),
            ErrorCode::ServerError => write!(f, "SERVER_ERROR"),
            ErrorCode::BackendValidation => write!(f, "BACKEND_VALIDATION"),
            ErrorCode::PartialLoad => write!(f, "PARTIAL_LOAD"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::InvalidState => write!(f, "INVALID_STATE"),
            ErrorCode::ExportError => write!(f, "EXPORT_ERROR"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for display
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
    /// Informational
    Info,
    /// Warning - the action was blocked but nothing is broken
    Warning,
    /// Error - the operation failed
    Error,
    /// Critical - the program cannot continue
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

// ==================== Validation Errors ====================

/// What a journal draft got wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationKind {
    MissingRequiredField,
    UnbalancedEntry,
    MinimumLinesViolation,
    NegativeAmount,
    LineOutOfRange,
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationKind::MissingRequiredField => write!(f, "missing required field"),
            ValidationKind::UnbalancedEntry => write!(f, "unbalanced entry"),
            ValidationKind::MinimumLinesViolation => write!(f, "minimum lines violation"),
            ValidationKind::NegativeAmount => write!(f, "negative amount"),
            ValidationKind::LineOutOfRange => write!(f, "line out of range"),
        }
    }
}

/// Client-side rejection of a journal draft
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub message: String,
    /// Offending field, e.g. `description` or `lines[2].accountId`
    pub field: Option<String>,
}

impl ValidationError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            kind: ValidationKind::MissingRequiredField,
            message: format!("{} is required", field),
            field: Some(field),
        }
    }

    pub fn unbalanced(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            kind: ValidationKind::UnbalancedEntry,
            message: format!(
                "total debit {} does not equal total credit {}",
                total_debit, total_credit
            ),
            field: None,
        }
    }

    pub fn minimum_lines() -> Self {
        Self {
            kind: ValidationKind::MinimumLinesViolation,
            message: "a journal entry needs at least one line".to_string(),
            field: Some("lines".to_string()),
        }
    }

    pub fn negative_amount(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            kind: ValidationKind::NegativeAmount,
            message: format!("{} must not be negative", field),
            field: Some(field),
        }
    }

    pub fn line_out_of_range(index: usize, len: usize) -> Self {
        Self {
            kind: ValidationKind::LineOutOfRange,
            message: format!("line {} does not exist (entry has {} lines)", index, len),
            field: Some(format!("lines[{}]", index)),
        }
    }
}

// ==================== Backend Errors ====================

/// Category of a backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendErrorKind {
    /// Connection, TLS, timeout or undecodable body
    Network,
    /// Non-success status other than a validation rejection
    Server,
    /// 400/422: the backend rejected the payload
    Validation,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendErrorKind::Network => write!(f, "network"),
            BackendErrorKind::Server => write!(f, "server"),
            BackendErrorKind::Validation => write!(f, "validation"),
        }
    }
}

/// Failure of one backend request
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind} error: {detail}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
    pub detail: String,
}

impl BackendError {
    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Network,
            status: None,
            detail: detail.into(),
        }
    }

    pub fn server(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Server,
            status,
            detail: detail.into(),
        }
    }

    pub fn validation(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Validation,
            status: Some(status),
            detail: detail.into(),
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        match status {
            400 | 422 => Self::validation(status, detail),
            _ => Self::server(Some(status), detail),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// One dashboard member failed while its siblings loaded
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("reports for project '{project}' failed to load: {source}")]
pub struct PartialLoadError {
    pub project: String,
    #[source]
    pub source: BackendError,
}

// ==================== Core Error ====================

/// Main error type for ledgerdesk-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    PartialLoad(#[from] PartialLoadError),

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Export failed: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ledgerdesk_config::ConfigError> for CoreError {
    fn from(error: ledgerdesk_config::ConfigError) -> Self {
        CoreError::Config {
            message: error.to_string(),
        }
    }
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation(e) => match e.kind {
                ValidationKind::MissingRequiredField => ErrorCode::MissingRequiredField,
                ValidationKind::UnbalancedEntry => ErrorCode::UnbalancedEntry,
                ValidationKind::MinimumLinesViolation => ErrorCode::MinimumLinesViolation,
                ValidationKind::NegativeAmount => ErrorCode::NegativeAmount,
                ValidationKind::LineOutOfRange => ErrorCode::LineOutOfRange,
            },
            CoreError::Backend(e) => match e.kind {
                _ if e.is_not_found() => ErrorCode::NotFound,
                BackendErrorKind::Network => ErrorCode::NetworkError,
                BackendErrorKind::Server => ErrorCode::ServerError,
                BackendErrorKind::Validation => ErrorCode::BackendValidation,
            },
            CoreError::PartialLoad(_) => ErrorCode::PartialLoad,
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::Export { .. } => ErrorCode::ExportError,
            CoreError::Config { .. } => ErrorCode::ConfigError,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Validation(_) => ErrorSeverity::Warning,
            CoreError::Backend(e) => match e.kind {
                _ if e.is_not_found() => ErrorSeverity::Info,
                BackendErrorKind::Validation => ErrorSeverity::Warning,
                _ => ErrorSeverity::Error,
            },
            CoreError::PartialLoad(_) => ErrorSeverity::Warning,
            CoreError::InvalidState { .. } => ErrorSeverity::Warning,
            CoreError::Export { .. } => ErrorSeverity::Error,
            CoreError::Config { .. } => ErrorSeverity::Critical,
            CoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Validation(e) => {
                if let Some(ref field) = e.field {
                    details = details.with_detail(serde_json::json!({ "field": field }));
                }
                let hint = match e.kind {
                    ValidationKind::MissingRequiredField => "Fill in entry number, date, description and every line's account.",
                    ValidationKind::UnbalancedEntry => "Adjust the lines until total debit equals total credit.",
                    ValidationKind::MinimumLinesViolation => "Keep at least one line on the entry.",
                    ValidationKind::NegativeAmount => "Enter debit and credit amounts as zero or positive numbers.",
                    ValidationKind::LineOutOfRange => "Check the line number against the entry's lines.",
                };
                details = details.with_suggestion(hint.to_string());
            }
            CoreError::Backend(e) => {
                details = details.with_detail(serde_json::json!({
                    "kind": e.kind,
                    "status": e.status,
                }));
                match e.kind {
                    BackendErrorKind::Network => {
                        details = details.with_suggestion("Check that api.base_url is reachable.".to_string());
                    }
                    BackendErrorKind::Server if e.status == Some(401) => {
                        details = details.with_suggestion("Run `ledgerdesk login` to refresh the token.".to_string());
                    }
                    BackendErrorKind::Server => {
                        details = details.with_suggestion("Reload to try again.".to_string());
                    }
                    BackendErrorKind::Validation => {
                        details = details.with_suggestion("Review the backend message and correct the request.".to_string());
                    }
                }
            }
            CoreError::PartialLoad(e) => {
                details = details.with_detail(serde_json::json!({ "project": e.project }));
                details = details.with_suggestion("Other projects were loaded; reload to retry this one.".to_string());
            }
            CoreError::InvalidState { .. } => {
                details = details.with_suggestion(
                    "Posted entries must be unposted before they can be edited.".to_string(),
                );
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
    /// Project the operation ran against
    pub project: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            project: None,
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add project name
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
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
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let message = format!(
            "[{}] {} - Operation: {} - Project: {:?}",
            error.code(),
            error,
            context.operation,
            context.project
        );
        match error.severity() {
            ErrorSeverity::Info => log::info!(target: "ledgerdesk::error", "{}", message),
            ErrorSeverity::Warning => log::warn!(target: "ledgerdesk::error", "{}", message),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                log::error!(target: "ledgerdesk::error", "{}", message)
            }
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "ledgerdesk::error",
            "WARNING: {} - Operation: {} - Project: {:?}",
            message,
            context.operation,
            context.project
        );
    }
}

// ==================== Tests ====================
