//! # Query Sources
//!
//! The capability surface the pipeline composes against. A source is a
//! lazy, queryable view of one collection; every capability consumes the
//! view and returns a narrowed, ordered or windowed one.
//!
//! Implementations:
//! - [`QueryDescription`]: records the composed query without executing it
//! - [`MemoryQuery`]: in-memory JSON documents, executed on demand
//!
//! Relational or document stores plug in by implementing [`QuerySource`].

mod description;
mod errors;
mod memory;

use serde_json::Value;

use crate::policy::SearchConfig;
use crate::sort::SortSpec;

pub use description::{QueryDescription, QueryStep};
pub use errors::{SourceError, SourceResult};
pub use memory::{MemoryCollection, MemoryQuery};

/// Queryable collection capabilities consumed by the fetch pipeline
pub trait QuerySource: Sized {
    /// Applies a named, pre-declared restriction
    fn apply_scope(self, name: &str) -> Self;

    /// Rows where `field == value`
    fn filter_equals(self, field: &str, value: &Value) -> Self;

    /// Rows where `field` is not null
    fn filter_not_null(self, field: &str) -> Self;

    /// Rows where `field` is null
    fn filter_null(self, field: &str) -> Self;

    /// Rows where `field` matches a LIKE pattern
    fn filter_pattern(self, field: &str, pattern: &str, case_insensitive: bool) -> Self;

    /// Eager-loads the named relations
    fn with_includes(self, relations: &[String]) -> Self;

    /// Orders by the given fields, first entry most significant
    fn order_by(self, spec: &SortSpec) -> Self;

    fn offset_limit(self, offset: u64, limit: u64) -> Self;

    /// Full-text search over the configured search fields
    fn fulltext_search(self, term: &str, config: &SearchConfig) -> Self;
}
