//! Backing store errors

use thiserror::Error;

/// Result type for executing a composed query
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised by a backing store while loading or executing a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Query named a scope the store never defined
    #[error("Scope not defined on collection: {0}")]
    UndefinedScope(String),

    /// Collection document could not be parsed
    #[error("Malformed collection: {0}")]
    MalformedCollection(String),
}

impl SourceError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::UndefinedScope(_) => "FETCHA_SOURCE_UNDEFINED_SCOPE",
            SourceError::MalformedCollection(_) => "FETCHA_SOURCE_MALFORMED_COLLECTION",
        }
    }
}
