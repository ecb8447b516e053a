//! Stage composer
//!
//! Stages run in a fixed order, each only when its directive is present:
//!
//! ```text
//! scope -> filter (+ includes) -> sort -> paginate -> search
//! ```
//!
//! Each stage receives the view the previous one produced. The result is
//! still lazy; executing it is up to the caller.

use std::collections::BTreeMap;

use super::errors::FetchResult;
use crate::filter::FilterPlan;
use crate::pagination::PageBounds;
use crate::policy::FieldPolicy;
use crate::request::{FetchRequest, FilterValue, PageParams};
use crate::sort::parse_sort;
use crate::source::QuerySource;

/// Composes fetch requests for one resource policy
#[derive(Debug, Clone, Copy)]
pub struct Fetcher<'p> {
    policy: &'p FieldPolicy,
}

impl<'p> Fetcher<'p> {
    pub fn new(policy: &'p FieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FieldPolicy {
        self.policy
    }

    /// Runs every stage whose directive is present in `request`.
    ///
    /// A rejected request yields no partial query.
    pub fn fetch<S: QuerySource>(&self, source: S, request: &FetchRequest) -> FetchResult<S> {
        let mut source = source;

        if let Some(scope) = &request.scope {
            source = self.apply_scope(source, scope);
        }
        if let Some(filters) = &request.filters {
            source = self.apply_filters(source, filters)?;
        }
        if let Some(sort) = &request.sort {
            source = self.apply_sort(source, sort);
        }
        if let Some(page) = &request.page {
            source = self.apply_pagination(source, page)?;
        }
        if let Some(term) = &request.search {
            source = self.apply_search(source, term);
        }

        Ok(source)
    }

    /// Unknown scope names leave the source untouched.
    pub fn apply_scope<S: QuerySource>(&self, source: S, scope: &str) -> S {
        if !self.policy.is_scope(scope) {
            tracing::debug!(scope, "ignoring unknown scope");
            return source;
        }

        tracing::trace!(stage = "scope", scope);
        source.apply_scope(scope)
    }

    pub fn apply_filters<S: QuerySource>(
        &self,
        source: S,
        filters: &BTreeMap<String, FilterValue>,
    ) -> FetchResult<S> {
        let plan = FilterPlan::compile(filters, self.policy).map_err(|violation| {
            tracing::warn!(code = violation.code(), %violation, "rejected filter");
            violation
        })?;

        tracing::trace!(
            stage = "filter",
            clauses = plan.clauses().len(),
            includes = plan.includes().len()
        );
        Ok(plan.apply(source))
    }

    /// Sorting on nothing sortable leaves the source untouched.
    pub fn apply_sort<S: QuerySource>(&self, source: S, sort: &str) -> S {
        match parse_sort(sort, self.policy.sort_fields()) {
            Some(spec) => {
                tracing::trace!(stage = "sort", fields = spec.len());
                source.order_by(&spec)
            }
            None => source,
        }
    }

    pub fn apply_pagination<S: QuerySource>(&self, source: S, page: &PageParams) -> FetchResult<S> {
        let window = PageBounds::new(self.policy.pagination_config())
            .resolve(page)
            .map_err(|violation| {
                tracing::warn!(code = violation.code(), %violation, "rejected page");
                violation
            })?;

        tracing::trace!(stage = "paginate", offset = window.offset, limit = window.limit);
        Ok(source.offset_limit(window.offset, window.limit))
    }

    /// The term is passed through as-is; search fields were fixed at
    /// registration. A resource without search fields has no search
    /// capability, so the stage does nothing.
    pub fn apply_search<S: QuerySource>(&self, source: S, term: &str) -> S {
        let config = self.policy.search_config();
        if !config.is_enabled() {
            tracing::debug!("ignoring search on resource without search fields");
            return source;
        }

        tracing::trace!(stage = "search", fields = config.fields.len());
        source.fulltext_search(term, config)
    }
}
