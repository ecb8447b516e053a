//! # Policy Errors
//!
//! Error types for field policy construction and loading.
//!
//! Error codes:
//! - FETCHA_POLICY_INVALID_PAGINATION
//! - FETCHA_POLICY_CONFIG_UNREADABLE
//! - FETCHA_POLICY_CONFIG_MALFORMED
//! - FETCHA_POLICY_DUPLICATE_RESOURCE

use thiserror::Error;

/// Result type for policy operations
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Policy configuration errors.
///
/// These are raised at setup time, never while serving a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// Pagination bounds can never admit a request
    #[error("Invalid pagination bounds: default_size {default_size}, max_size {max_size}")]
    InvalidPagination { default_size: i64, max_size: i64 },

    /// Config file could not be read
    #[error("Cannot read policy config {path}: {reason}")]
    ConfigUnreadable { path: String, reason: String },

    /// Config file is not valid policy JSON
    #[error("Malformed policy config {path}: {reason}")]
    ConfigMalformed { path: String, reason: String },

    /// Same resource declared twice
    #[error("Resource already registered: {0}")]
    DuplicateResource(String),
}

impl PolicyError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::InvalidPagination { .. } => "FETCHA_POLICY_INVALID_PAGINATION",
            PolicyError::ConfigUnreadable { .. } => "FETCHA_POLICY_CONFIG_UNREADABLE",
            PolicyError::ConfigMalformed { .. } => "FETCHA_POLICY_CONFIG_MALFORMED",
            PolicyError::DuplicateResource(_) => "FETCHA_POLICY_DUPLICATE_RESOURCE",
        }
    }
}
