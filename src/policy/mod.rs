//! # Field Policy Registry
//!
//! Per-resource whitelists of filterable, sortable and scopable names,
//! pagination bounds and full-text search fields.
//!
//! Policies are write-once: built at setup (programmatically or from JSON
//! config) and read concurrently by requests without locking.

mod errors;
mod loader;
mod registry;
mod types;

pub use errors::{PolicyError, PolicyResult};
pub use loader::PolicyLoader;
pub use registry::PolicyRegistry;
pub use types::{
    FieldPolicy, FieldPolicyBuilder, PaginationConfig, PaginationSettings, SearchConfig,
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_TRIGRAM_THRESHOLD,
};
