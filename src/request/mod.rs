//! # Fetch Requests
//!
//! The inbound directive bundle: `scope`, `filter`, `sort`, `page` and
//! `search`. A request is transient and owned by the pipeline call that
//! processes it.

mod errors;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

pub use errors::{RequestError, RequestResult};

/// Top-level directive keys
pub const SCOPE_KEY: &str = "scope";
pub const FILTER_KEY: &str = "filter";
pub const SORT_KEY: &str = "sort";
pub const PAGE_KEY: &str = "page";
pub const SEARCH_KEY: &str = "search";

/// A filter directive value: a plain scalar (equality) or an operation map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Equality against the value
    Scalar(Value),
    /// Operator name to operand; names are resolved later against the
    /// closed operator set
    Operations(BTreeMap<String, Value>),
}

impl FilterValue {
    /// Classifies a raw JSON value. Objects are operation maps, everything
    /// else is an equality operand.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => FilterValue::Operations(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            ),
            other => FilterValue::Scalar(other.clone()),
        }
    }
}

/// Requested page, as raw strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageParams {
    pub size: Option<String>,
    pub number: Option<String>,
}

impl PageParams {
    pub fn new(size: Option<&str>, number: Option<&str>) -> Self {
        Self {
            size: size.map(str::to_string),
            number: number.map(str::to_string),
        }
    }
}

/// Parsed fetch request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchRequest {
    pub scope: Option<String>,
    pub filters: Option<BTreeMap<String, FilterValue>>,
    pub sort: Option<String>,
    pub page: Option<PageParams>,
    pub search: Option<String>,
}

impl FetchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON directive map. Unknown keys are ignored and `null`
    /// counts as absent.
    pub fn from_value(value: &Value) -> RequestResult<Self> {
        let root = value.as_object().ok_or(RequestError::NotAnObject)?;

        let mut request = FetchRequest::new();

        request.scope = optional_string(root.get(SCOPE_KEY), SCOPE_KEY)?;
        request.sort = optional_string(root.get(SORT_KEY), SORT_KEY)?;
        request.search = optional_string(root.get(SEARCH_KEY), SEARCH_KEY)?;

        match root.get(FILTER_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                request.filters = Some(
                    map.iter()
                        .map(|(field, v)| (field.clone(), FilterValue::from_json(v)))
                        .collect(),
                );
            }
            Some(_) => return Err(RequestError::invalid(FILTER_KEY, "an object")),
        }

        match root.get(PAGE_KEY) {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                request.page = Some(PageParams {
                    size: page_component(map.get("size"), "page.size")?,
                    number: page_component(map.get("number"), "page.number")?,
                });
            }
            Some(_) => return Err(RequestError::invalid(PAGE_KEY, "an object")),
        }

        Ok(request)
    }

    pub fn scope(mut self, name: impl Into<String>) -> Self {
        self.scope = Some(name.into());
        self
    }

    /// Adds an equality filter
    pub fn filter(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), FilterValue::Scalar(value));
        self
    }

    /// Adds one operator to a field's operation map.
    ///
    /// Replaces an equality filter previously set on the same field.
    pub fn filter_op(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        operand: Value,
    ) -> Self {
        let slot = self
            .filters
            .get_or_insert_with(BTreeMap::new)
            .entry(field.into())
            .or_insert_with(|| FilterValue::Operations(BTreeMap::new()));

        if let FilterValue::Scalar(_) = slot {
            *slot = FilterValue::Operations(BTreeMap::new());
        }
        if let FilterValue::Operations(ops) = slot {
            ops.insert(operator.into(), operand);
        }
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn page(mut self, size: Option<&str>, number: Option<&str>) -> Self {
        self.page = Some(PageParams::new(size, number));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// True if no directive is present
    pub fn is_empty(&self) -> bool {
        self.scope.is_none()
            && self.filters.is_none()
            && self.sort.is_none()
            && self.page.is_none()
            && self.search.is_none()
    }
}

impl TryFrom<&Value> for FetchRequest {
    type Error = RequestError;

    fn try_from(value: &Value) -> RequestResult<Self> {
        FetchRequest::from_value(value)
    }
}

fn optional_string(value: Option<&Value>, key: &str) -> RequestResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RequestError::invalid(key, "a string")),
    }
}

/// Page components arrive as query-string text but JSON numbers are accepted too.
fn page_component(value: Option<&Value>, key: &str) -> RequestResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(RequestError::invalid(key, "a string or number")),
    }
}
