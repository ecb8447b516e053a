//! In-memory JSON document store
//!
//! [`MemoryQuery`] records steps lazily like any other source and only
//! evaluates them against the documents on [`MemoryQuery::fetch`].
//!
//! Evaluation rules:
//! - Equality is exact JSON equality, no coercion. An array operand means
//!   membership. A missing field compares as null.
//! - Patterns use SQL LIKE wildcards (`%`, `_`) and only match strings.
//! - `relation.field` paths resolve into nested objects, but only after the
//!   relation was included. Before that the path reads as missing.
//! - Ordering is stable and multi-key: null < bool < number < string.
//! - Full-text search matches when every term matches a word of one of the
//!   search fields (by prefix when prefix matching is on).
//! - The offset/limit window is taken after every condition, so a page
//!   always counts matching rows.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::description::{QueryDescription, QueryStep};
use super::errors::{SourceError, SourceResult};
use super::QuerySource;
use crate::policy::SearchConfig;
use crate::sort::{SortDirection, SortSpec};

/// Documents plus the named scopes defined over them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryCollection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    documents: Vec<Value>,
    /// Scope name to equality conditions
    #[serde(default)]
    scopes: HashMap<String, Map<String, Value>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>, documents: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            documents,
            scopes: HashMap::new(),
        }
    }

    /// Parses `{"documents": [...], "scopes": {"name": {"field": value}}}`
    pub fn from_value(name: impl Into<String>, value: Value) -> SourceResult<Self> {
        let mut collection: MemoryCollection = serde_json::from_value(value)
            .map_err(|e| SourceError::MalformedCollection(e.to_string()))?;
        collection.name = name.into();
        Ok(collection)
    }

    /// Defines a named scope as a set of equality conditions
    pub fn with_scope(mut self, name: impl Into<String>, conditions: Map<String, Value>) -> Self {
        self.scopes.insert(name.into(), conditions);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Starts an unrestricted query
    pub fn all(&self) -> MemoryQuery<'_> {
        MemoryQuery {
            collection: self,
            description: QueryDescription::all(self.name.clone()),
        }
    }
}

/// Lazy query over a [`MemoryCollection`]
#[derive(Debug, Clone)]
pub struct MemoryQuery<'a> {
    collection: &'a MemoryCollection,
    description: QueryDescription,
}

impl<'a> MemoryQuery<'a> {
    pub fn description(&self) -> &QueryDescription {
        &self.description
    }

    /// Executes the recorded steps.
    ///
    /// Row conditions and ordering run in recorded order; the offset/limit
    /// window is taken last, over the rows that matched every condition.
    pub fn fetch(&self) -> SourceResult<Vec<Value>> {
        let mut included: HashSet<String> = HashSet::new();
        let mut window: Option<(u64, u64)> = None;
        let mut rows: Vec<&Value> = self.collection.documents.iter().collect();

        for step in self.description.steps() {
            match step {
                QueryStep::Scope { name } => {
                    let conditions = self
                        .collection
                        .scopes
                        .get(name)
                        .ok_or_else(|| SourceError::UndefinedScope(name.clone()))?;
                    rows.retain(|doc| {
                        conditions
                            .iter()
                            .all(|(field, expected)| equals(lookup(doc, field, &included), expected))
                    });
                }
                QueryStep::Equals { field, value } => {
                    rows.retain(|doc| equals(lookup(doc, field, &included), value));
                }
                QueryStep::NotNull { field } => {
                    rows.retain(|doc| !is_null(lookup(doc, field, &included)));
                }
                QueryStep::IsNull { field } => {
                    rows.retain(|doc| is_null(lookup(doc, field, &included)));
                }
                QueryStep::Pattern {
                    field,
                    pattern,
                    case_insensitive,
                } => {
                    rows.retain(|doc| {
                        match lookup(doc, field, &included).and_then(Value::as_str) {
                            Some(text) => like_match(text, pattern, *case_insensitive),
                            None => false,
                        }
                    });
                }
                QueryStep::Include { relations } => {
                    included.extend(relations.iter().cloned());
                }
                QueryStep::Order { fields } => {
                    rows.sort_by(|a, b| compare_docs(a, b, fields, &included));
                }
                QueryStep::OffsetLimit { offset, limit } => {
                    window = Some(narrow_window(window, *offset, *limit));
                }
                QueryStep::Search {
                    term,
                    fields,
                    prefix,
                    ..
                } => {
                    let terms: Vec<String> =
                        term.split_whitespace().map(str::to_lowercase).collect();
                    rows.retain(|doc| search_match(doc, &terms, fields, *prefix, &included));
                }
            }
        }

        let rows = match window {
            Some((offset, limit)) => rows
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
            None => rows.into_iter().cloned().collect(),
        };
        Ok(rows)
    }
}

/// Applies a further offset/limit inside an existing window
fn narrow_window(window: Option<(u64, u64)>, offset: u64, limit: u64) -> (u64, u64) {
    match window {
        None => (offset, limit),
        Some((outer_offset, outer_limit)) => {
            let skip = offset.min(outer_limit);
            (
                outer_offset.saturating_add(skip),
                limit.min(outer_limit - skip),
            )
        }
    }
}

impl<'a> QuerySource for MemoryQuery<'a> {
    fn apply_scope(self, name: &str) -> Self {
        Self {
            description: self.description.apply_scope(name),
            ..self
        }
    }

    fn filter_equals(self, field: &str, value: &Value) -> Self {
        Self {
            description: self.description.filter_equals(field, value),
            ..self
        }
    }

    fn filter_not_null(self, field: &str) -> Self {
        Self {
            description: self.description.filter_not_null(field),
            ..self
        }
    }

    fn filter_null(self, field: &str) -> Self {
        Self {
            description: self.description.filter_null(field),
            ..self
        }
    }

    fn filter_pattern(self, field: &str, pattern: &str, case_insensitive: bool) -> Self {
        Self {
            description: self
                .description
                .filter_pattern(field, pattern, case_insensitive),
            ..self
        }
    }

    fn with_includes(self, relations: &[String]) -> Self {
        Self {
            description: self.description.with_includes(relations),
            ..self
        }
    }

    fn order_by(self, spec: &SortSpec) -> Self {
        Self {
            description: self.description.order_by(spec),
            ..self
        }
    }

    fn offset_limit(self, offset: u64, limit: u64) -> Self {
        Self {
            description: self.description.offset_limit(offset, limit),
            ..self
        }
    }

    fn fulltext_search(self, term: &str, config: &SearchConfig) -> Self {
        Self {
            description: self.description.fulltext_search(term, config),
            ..self
        }
    }
}

/// Resolves a possibly dotted field path on a document
fn lookup<'d>(doc: &'d Value, path: &str, included: &HashSet<String>) -> Option<&'d Value> {
    match path.split_once('.') {
        None => doc.get(path),
        Some((relation, rest)) => {
            if !included.contains(relation) {
                return None;
            }
            rest.split('.')
                .try_fold(doc.get(relation)?, |value, segment| value.get(segment))
        }
    }
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    let actual = actual.unwrap_or(&Value::Null);
    match expected {
        Value::Array(candidates) => candidates.contains(actual),
        other => actual == other,
    }
}

/// SQL LIKE matching with `%` and `_` wildcards
fn like_match(value: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (value, pattern) = if case_insensitive {
        (value.to_lowercase(), pattern.to_lowercase())
    } else {
        (value.to_string(), pattern.to_string())
    };

    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_chars(&value, &pattern)
}

/// Two-pointer wildcard match. On a mismatch it resumes from the last `%`,
/// letting that `%` absorb one more char. O(value * pattern).
fn like_match_chars(value: &[char], pattern: &[char]) -> bool {
    let (mut v, mut p) = (0, 0);
    // (pattern index after the last `%`, value index it was tried at)
    let mut resume: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p) {
            Some('%') => {
                p += 1;
                resume = Some((p, v));
            }
            Some('_') => {
                p += 1;
                v += 1;
            }
            Some(c) if *c == value[v] => {
                p += 1;
                v += 1;
            }
            _ => match resume {
                Some((after_wildcard, tried_at)) => {
                    p = after_wildcard;
                    v = tried_at + 1;
                    resume = Some((after_wildcard, v));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

fn search_match(
    doc: &Value,
    terms: &[String],
    fields: &[String],
    prefix: bool,
    included: &HashSet<String>,
) -> bool {
    if terms.is_empty() {
        return false;
    }

    let words: Vec<String> = fields
        .iter()
        .filter_map(|field| lookup(doc, field, included).and_then(Value::as_str))
        .flat_map(|text| {
            text.split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .collect();

    terms.iter().all(|term| {
        words.iter().any(|word| {
            if prefix {
                word.starts_with(term.as_str())
            } else {
                word == term
            }
        })
    })
}

fn compare_docs(a: &Value, b: &Value, spec: &SortSpec, included: &HashSet<String>) -> Ordering {
    for (field, direction) in spec.iter() {
        let ordering = compare_values(lookup(a, field, included), lookup(b, field, included));
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Ordering rules:
/// - missing < null < bool < number < string
/// - For same types, natural ordering
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };

    let type_order = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    let (a_type, b_type) = (type_order(a), type_order(b));
    if a_type != b_type {
        return a_type.cmp(&b_type);
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
