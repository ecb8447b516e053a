//! Field policy types
//!
//! A [`FieldPolicy`] is the immutable whitelist for one resource type. It is
//! assembled once through [`FieldPolicyBuilder`] and then shared read-only by
//! every request against that resource.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::{PolicyError, PolicyResult};

/// Page size used when a request omits `size`
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size accepted unless overridden
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 50;

/// Minimum trigram similarity for full-text matches
pub const DEFAULT_TRIGRAM_THRESHOLD: f64 = 0.1;

/// Pagination bounds for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_size: i64,
    pub max_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    /// Overwrites only the keys present in `settings`
    pub fn merge(&mut self, settings: PaginationSettings) {
        if let Some(default_size) = settings.default_size {
            self.default_size = default_size;
        }
        if let Some(max_size) = settings.max_size {
            self.max_size = max_size;
        }
    }

    fn validate(&self) -> PolicyResult<()> {
        if self.default_size < 1 || self.max_size < self.default_size {
            return Err(PolicyError::InvalidPagination {
                default_size: self.default_size,
                max_size: self.max_size,
            });
        }
        Ok(())
    }
}

/// Partial pagination settings passed to `paginatable`.
///
/// Keys left as `None` keep their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationSettings {
    #[serde(default)]
    pub default_size: Option<i64>,
    #[serde(default)]
    pub max_size: Option<i64>,
}

impl PaginationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_size(mut self, size: i64) -> Self {
        self.default_size = Some(size);
        self
    }

    pub fn max_size(mut self, size: i64) -> Self {
        self.max_size = Some(size);
        self
    }
}

/// Full-text search declaration.
///
/// `fields` are baked into the backing store's search capability; the
/// trigram threshold and prefix flag tune how it ranks candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchConfig {
    pub fields: Vec<String>,
    pub trigram_threshold: f64,
    pub prefix: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            trigram_threshold: DEFAULT_TRIGRAM_THRESHOLD,
            prefix: true,
        }
    }
}

impl SearchConfig {
    pub fn is_enabled(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// Immutable per-resource whitelist of query operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPolicy {
    filter_fields: HashSet<String>,
    sort_fields: HashSet<String>,
    scope_names: HashSet<String>,
    pagination: PaginationConfig,
    search: SearchConfig,
}

impl FieldPolicy {
    pub fn builder() -> FieldPolicyBuilder {
        FieldPolicyBuilder::default()
    }

    pub fn is_filterable(&self, field: &str) -> bool {
        self.filter_fields.contains(field)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sort_fields.contains(field)
    }

    pub fn is_scope(&self, name: &str) -> bool {
        self.scope_names.contains(name)
    }

    pub fn pagination_config(&self) -> PaginationConfig {
        self.pagination
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search.fields
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    pub fn filter_fields(&self) -> &HashSet<String> {
        &self.filter_fields
    }

    pub fn sort_fields(&self) -> &HashSet<String> {
        &self.sort_fields
    }

    pub fn scope_names(&self) -> &HashSet<String> {
        &self.scope_names
    }
}

/// Collects the setup-time registration calls for one resource type.
///
/// Each registration replaces what an earlier call of the same kind set,
/// except [`FieldPolicyBuilder::paginatable`] which merges.
#[derive(Debug, Clone, Default)]
pub struct FieldPolicyBuilder {
    policy: FieldPolicy,
}

impl FieldPolicyBuilder {
    pub fn filterable_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.filter_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn sortable_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.sort_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn scopable_with<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.scope_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn paginatable(mut self, settings: PaginationSettings) -> Self {
        self.policy.pagination.merge(settings);
        self
    }

    /// Declares the full-text search fields, in ranking order.
    pub fn fulltext_search_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.search.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Freezes the policy, rejecting pagination bounds no request could meet.
    pub fn build(self) -> PolicyResult<FieldPolicy> {
        self.policy.pagination.validate()?;
        Ok(self.policy)
    }
}
