/// Error Handling Module
///
/// One error type, `AppError`, crosses every module boundary. It is built from
/// domain-specific enums so each layer can say precisely what went wrong, and
/// it maps itself onto the HTTP status and body shape each endpoint promises.
///
/// Store and crypto failures are logged with full detail under a request id,
/// but the client only ever sees a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    SuspiciousContent(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooShort(field, min) => {
                write!(f, "{} should be at least {} characters", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} should be at most {} characters", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} should be valid", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Credential store failures
#[derive(Debug)]
pub enum StoreError {
    /// A unique key (email) is already taken
    Conflict,
    /// The backing store could not be reached
    Unavailable(String),
    /// The store was reached but the operation failed
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "Duplicate entry"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            StoreError::Query(msg) => write!(f, "Store query error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login body lacks an email or a password
    MissingCredentials,
    /// Unknown email or wrong password, deliberately indistinguishable
    InvalidCredentials,
    /// Login could not be completed after the credentials checked out
    LoginFailed,
    /// No access token or session cookie was presented
    MissingToken,
    /// Token signature, issuer or expiry check failed
    TokenInvalid,
    /// Valid identity without a required role, or a session that does not match
    Forbidden,
    /// Refresh could not be completed; reported by status alone
    RefreshFailed,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Email and password are required."),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::LoginFailed => write!(f, "Unable to complete login"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::TokenInvalid => write!(f, "Invalid or expired token"),
            AuthError::Forbidden => write!(f, "Forbidden"),
            AuthError::RefreshFailed => write!(f, "Unable to refresh session"),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Conflict(String),
    Auth(AuthError),
    NotFound(String),
    Store(StoreError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::Conflict("User already exist".to_string()),
            other => AppError::Store(other),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// JSON key the client reads the message from, if the response has a body at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBody {
    Error,
    Message,
    Errors,
    Empty,
}

impl AppError {
    /// Status code, body key and client-facing message for this error.
    ///
    /// The message is never the underlying store or crypto detail.
    pub fn client_view(&self) -> (StatusCode, ErrorBody, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, ErrorBody::Error, e.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::Error, msg.clone()),
            AppError::Auth(e) => match e {
                AuthError::MissingCredentials => {
                    (StatusCode::BAD_REQUEST, ErrorBody::Message, e.to_string())
                }
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::Errors, e.to_string())
                }
                AuthError::LoginFailed => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::Message,
                    e.to_string(),
                ),
                AuthError::MissingToken | AuthError::TokenInvalid => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::Empty, String::new())
                }
                AuthError::Forbidden => (StatusCode::FORBIDDEN, ErrorBody::Empty, String::new()),
                AuthError::RefreshFailed => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::Empty,
                    String::new(),
                ),
            },
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::Message, msg.clone()),
            AppError::Store(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::Error,
                "Internal server error".to_string(),
            ),
        }
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Conflict(_) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::NotFound(msg) => {
                tracing::debug!(request_id = request_id, error = %msg, "Resource not found");
            }
            AppError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "Credential store error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, body, message) = self.client_view();
        let mut response = HttpResponse::build(status);
        match body {
            ErrorBody::Error => response.json(serde_json::json!({ "error": message })),
            ErrorBody::Message => response.json(serde_json::json!({ "message": message })),
            ErrorBody::Errors => response.json(serde_json::json!({ "errors": message })),
            ErrorBody::Empty => response.finish(),
        }
    }

    fn status_code(&self) -> StatusCode {
        self.client_view().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context attached to log lines
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub account_id: Option<String>,
    pub operation: &'static str,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            account_id: None,
            operation,
        }
    }

    pub fn with_account_id(mut self, account_id: impl ToString) -> Self {
        self.account_id = Some(account_id.to_string());
        self
    }

    /// Logs the full error detail; the client gets `AppError::client_view` only.
    pub fn log_error(&self, error: &dyn fmt::Display) {
        tracing::error!(
            request_id = %self.request_id,
            operation = self.operation,
            account_id = ?self.account_id,
            error = %error,
            "Operation failed"
        );
    }
}
