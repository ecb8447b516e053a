//! Recorded query descriptions
//!
//! [`QueryDescription`] implements [`QuerySource`] by appending each
//! requested capability as a [`QueryStep`]. Nothing is executed; the result is
//! a deferred, comparable, serializable description of the composed query.

use serde::Serialize;
use serde_json::Value;

use super::QuerySource;
use crate::policy::SearchConfig;
use crate::sort::SortSpec;

/// One data-source capability invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueryStep {
    Scope {
        name: String,
    },
    Equals {
        field: String,
        value: Value,
    },
    NotNull {
        field: String,
    },
    IsNull {
        field: String,
    },
    Pattern {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    Include {
        relations: Vec<String>,
    },
    Order {
        fields: SortSpec,
    },
    OffsetLimit {
        offset: u64,
        limit: u64,
    },
    Search {
        term: String,
        fields: Vec<String>,
        trigram_threshold: f64,
        prefix: bool,
    },
}

impl QueryStep {
    /// Short name used in logs
    pub fn op_name(&self) -> &'static str {
        match self {
            QueryStep::Scope { .. } => "scope",
            QueryStep::Equals { .. } => "equals",
            QueryStep::NotNull { .. } => "not_null",
            QueryStep::IsNull { .. } => "is_null",
            QueryStep::Pattern { .. } => "pattern",
            QueryStep::Include { .. } => "include",
            QueryStep::Order { .. } => "order",
            QueryStep::OffsetLimit { .. } => "offset_limit",
            QueryStep::Search { .. } => "search",
        }
    }
}

/// Deferred query over one resource collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescription {
    resource: String,
    steps: Vec<QueryStep>,
}

impl QueryDescription {
    /// The unrestricted collection
    pub fn all(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            steps: Vec::new(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn steps(&self) -> &[QueryStep] {
        &self.steps
    }

    /// True if no restriction has been applied
    pub fn is_unrestricted(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(mut self, step: QueryStep) -> Self {
        self.steps.push(step);
        self
    }
}

impl QuerySource for QueryDescription {
    fn apply_scope(self, name: &str) -> Self {
        self.push(QueryStep::Scope {
            name: name.to_string(),
        })
    }

    fn filter_equals(self, field: &str, value: &Value) -> Self {
        self.push(QueryStep::Equals {
            field: field.to_string(),
            value: value.clone(),
        })
    }

    fn filter_not_null(self, field: &str) -> Self {
        self.push(QueryStep::NotNull {
            field: field.to_string(),
        })
    }

    fn filter_null(self, field: &str) -> Self {
        self.push(QueryStep::IsNull {
            field: field.to_string(),
        })
    }

    fn filter_pattern(self, field: &str, pattern: &str, case_insensitive: bool) -> Self {
        self.push(QueryStep::Pattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            case_insensitive,
        })
    }

    fn with_includes(self, relations: &[String]) -> Self {
        self.push(QueryStep::Include {
            relations: relations.to_vec(),
        })
    }

    fn order_by(self, spec: &SortSpec) -> Self {
        self.push(QueryStep::Order {
            fields: spec.clone(),
        })
    }

    fn offset_limit(self, offset: u64, limit: u64) -> Self {
        self.push(QueryStep::OffsetLimit { offset, limit })
    }

    fn fulltext_search(self, term: &str, config: &SearchConfig) -> Self {
        self.push(QueryStep::Search {
            term: term.to_string(),
            fields: config.fields.clone(),
            trigram_threshold: config.trigram_threshold,
            prefix: config.prefix,
        })
    }
}
