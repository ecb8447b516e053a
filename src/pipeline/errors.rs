//! # Fetch Errors
//!
//! `PolicyViolation` is the only way a well-formed request gets rejected.
//! Unknown filter fields, sort fields and scopes never reach here; they are
//! dropped by the stages that see them.
//!
//! Error codes:
//! - FETCHA_FORBIDDEN_PAGE_SIZE (size above max)
//! - FETCHA_FORBIDDEN_PAGE_SIZE_TOO_SMALL
//! - FETCHA_FORBIDDEN_PAGE_NUMBER
//! - FETCHA_FORBIDDEN_OPERATOR
//! - FETCHA_UNKNOWN_RESOURCE

use thiserror::Error;

/// HTTP status a boundary layer should map a violation to
pub const FORBIDDEN_STATUS: u16 = 403;

/// Result type for pipeline stages
pub type FetchResult<T> = Result<T, PolicyViolation>;

/// A request the resource's policy forbids
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("Page size {size} exceeds maximum {max}")]
    PageSizeExceeded { size: i64, max: i64 },

    #[error("Page size {size} is below 1")]
    PageSizeTooSmall { size: i64 },

    #[error("Page number {number} is below 1")]
    PageNumberTooSmall { number: i64 },

    /// Operator name outside the closed operator set
    #[error("Filter operator '{operator}' is not allowed on '{field}'")]
    UnknownOperator { field: String, operator: String },
}

impl PolicyViolation {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PolicyViolation::PageSizeExceeded { .. } => "FETCHA_FORBIDDEN_PAGE_SIZE",
            PolicyViolation::PageSizeTooSmall { .. } => "FETCHA_FORBIDDEN_PAGE_SIZE_TOO_SMALL",
            PolicyViolation::PageNumberTooSmall { .. } => "FETCHA_FORBIDDEN_PAGE_NUMBER",
            PolicyViolation::UnknownOperator { .. } => "FETCHA_FORBIDDEN_OPERATOR",
        }
    }

    /// Every violation is a Forbidden rejection
    pub fn status_code(&self) -> u16 {
        FORBIDDEN_STATUS
    }
}

/// Errors from the name-based entry point
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Forbidden(#[from] PolicyViolation),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

impl FetchError {
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Forbidden(v) => v.code(),
            FetchError::UnknownResource(_) => "FETCHA_UNKNOWN_RESOURCE",
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, FetchError::Forbidden(_))
    }
}
