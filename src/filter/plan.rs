//! Filter plan compilation
//!
//! Compiling a request's filter map happens in two passes:
//! 1. Drop every key the policy does not list as filterable.
//! 2. Resolve the survivors into typed clauses, rejecting unknown operator
//!    names.
//!
//! Applying the plan first includes the required relations, then narrows
//! the source clause by clause. All clauses combine with AND.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::inclusion::required_includes;
use super::operator::FilterOperator;
use crate::pipeline::{FetchResult, PolicyViolation};
use crate::policy::FieldPolicy;
use crate::request::FilterValue;
use crate::source::QuerySource;

/// One resolved restriction on a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterClause {
    Equals {
        field: String,
        value: Value,
    },
    Operator {
        field: String,
        operator: FilterOperator,
        operand: Value,
    },
}

impl FilterClause {
    pub fn field(&self) -> &str {
        match self {
            FilterClause::Equals { field, .. } | FilterClause::Operator { field, .. } => field,
        }
    }

    fn apply<S: QuerySource>(&self, source: S) -> S {
        match self {
            FilterClause::Equals { field, value } => source.filter_equals(field, value),
            FilterClause::Operator {
                field,
                operator,
                operand,
            } => operator.apply(source, field, operand),
        }
    }
}

/// Whitelisted, resolved filters ready to apply
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterPlan {
    includes: Vec<String>,
    clauses: Vec<FilterClause>,
}

impl FilterPlan {
    /// Compiles a request filter map against a policy.
    pub fn compile(
        filters: &BTreeMap<String, FilterValue>,
        policy: &FieldPolicy,
    ) -> FetchResult<Self> {
        let allowed: Vec<(&str, &FilterValue)> = filters
            .iter()
            .filter(|(field, _)| {
                let keep = policy.is_filterable(field);
                if !keep {
                    tracing::debug!(field = %field, "dropping non-filterable field");
                }
                keep
            })
            .map(|(field, value)| (field.as_str(), value))
            .collect();

        let includes = required_includes(allowed.iter().map(|(field, _)| *field));

        let mut clauses = Vec::new();
        for (field, value) in allowed {
            match value {
                FilterValue::Scalar(v) => clauses.push(FilterClause::Equals {
                    field: field.to_string(),
                    value: v.clone(),
                }),
                FilterValue::Operations(ops) => {
                    for (name, operand) in ops {
                        let operator = FilterOperator::from_name(name).ok_or_else(|| {
                            PolicyViolation::UnknownOperator {
                                field: field.to_string(),
                                operator: name.clone(),
                            }
                        })?;
                        clauses.push(FilterClause::Operator {
                            field: field.to_string(),
                            operator,
                            operand: operand.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { includes, clauses })
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.clauses.is_empty()
    }

    /// Narrows `source`: includes first, then each clause in order.
    pub fn apply<S: QuerySource>(&self, source: S) -> S {
        let source = if self.includes.is_empty() {
            source
        } else {
            source.with_includes(&self.includes)
        };

        self.clauses
            .iter()
            .fold(source, |source, clause| clause.apply(source))
    }
}
