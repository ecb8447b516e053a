//! # Filter Operator Engine
//!
//! Resolves request filters against a resource's filterable fields and the
//! closed operator set, and derives the relations that must be included
//! before any filter is applied.

mod inclusion;
mod operator;
mod plan;

pub use inclusion::{relation_of, required_includes};
pub use operator::{is_truthy, FilterOperator};
pub use plan::{FilterClause, FilterPlan};
