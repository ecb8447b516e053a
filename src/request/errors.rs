//! Request parsing errors

use thiserror::Error;

/// Result type for request parsing
pub type RequestResult<T> = Result<T, RequestError>;

/// Malformed directive bundle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Request root is not a JSON object
    #[error("Fetch request must be a JSON object")]
    NotAnObject,

    /// A directive has the wrong JSON type
    #[error("Invalid '{key}' directive: expected {expected}")]
    InvalidDirective { key: String, expected: &'static str },
}

impl RequestError {
    pub(crate) fn invalid(key: impl Into<String>, expected: &'static str) -> Self {
        RequestError::InvalidDirective {
            key: key.into(),
            expected,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::NotAnObject => "FETCHA_REQUEST_NOT_AN_OBJECT",
            RequestError::InvalidDirective { .. } => "FETCHA_REQUEST_INVALID_DIRECTIVE",
        }
    }
}
