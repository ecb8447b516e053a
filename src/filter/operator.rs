//! Closed filter operator set
//!
//! Operator names from a request are looked up in a fixed table. Only the
//! four operators below are reachable; any other name is a policy violation,
//! never a dispatch to some other data-source capability.

use serde::Serialize;
use serde_json::Value;

use crate::source::QuerySource;

/// Filter operators available inside an operation map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Null / not-null check, chosen by operand truthiness
    Presence,
    /// Case-insensitive substring (`%value%`)
    Contains,
    /// Case-insensitive prefix (`value%`)
    StartsWith,
    /// Case-insensitive suffix (`%value`)
    EndsWith,
}

impl FilterOperator {
    /// Every operator, in declaration order
    pub const ALL: [FilterOperator; 4] = [
        FilterOperator::Presence,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
    ];

    /// Resolves a request operator name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "presence" => Some(FilterOperator::Presence),
            "contains" => Some(FilterOperator::Contains),
            "starts_with" => Some(FilterOperator::StartsWith),
            "ends_with" => Some(FilterOperator::EndsWith),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Presence => "presence",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
        }
    }

    /// Applies this operator on `field` to the source.
    pub fn apply<S: QuerySource>(self, source: S, field: &str, operand: &Value) -> S {
        match self {
            FilterOperator::Presence => {
                if is_truthy(operand) {
                    source.filter_not_null(field)
                } else {
                    source.filter_null(field)
                }
            }
            FilterOperator::Contains => {
                source.filter_pattern(field, &format!("%{}%", operand_text(operand)), true)
            }
            FilterOperator::StartsWith => {
                source.filter_pattern(field, &format!("{}%", operand_text(operand)), true)
            }
            FilterOperator::EndsWith => {
                source.filter_pattern(field, &format!("%{}", operand_text(operand)), true)
            }
        }
    }
}

/// Only `null` and `false` are falsy. Strings are truthy whatever their
/// text, so `"false"` and `""` still ask for a present field.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Pattern text for an operand; non-strings use their JSON rendering
fn operand_text(operand: &Value) -> String {
    match operand {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
