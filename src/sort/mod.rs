//! # Sort Token Parser
//!
//! Parses `sort` directives such as `-created_at,name` into an ordered,
//! deduplicated field to direction mapping.
//!
//! A field keeps the position of its first occurrence; later occurrences only
//! update its direction. Fields outside the allowed set are dropped silently.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Ordered field to direction mapping.
///
/// Backed by a list of pairs plus a position index, so updating an existing
/// field never moves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    entries: Vec<(String, SortDirection)>,
    positions: HashMap<String, usize>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, or updates its direction in place if already present.
    pub fn set(&mut self, field: impl Into<String>, direction: SortDirection) {
        let field = field.into();
        match self.positions.get(&field) {
            Some(&idx) => self.entries[idx].1 = direction,
            None => {
                self.positions.insert(field.clone(), self.entries.len());
                self.entries.push((field, direction));
            }
        }
    }

    /// Builder-style variant of [`SortSpec::set`]
    pub fn with(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.set(field, direction);
        self
    }

    pub fn get(&self, field: &str) -> Option<SortDirection> {
        self.positions.get(field).map(|&idx| self.entries[idx].1)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(field, direction)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.entries.iter().map(|(f, d)| (f.as_str(), *d))
    }

    /// Keeps only the fields accepted by `keep`, preserving relative order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(field, _)| keep(field));
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, (field, _))| (field.clone(), idx))
            .collect();
    }
}

impl Serialize for SortSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        #[derive(Serialize)]
        struct Entry<'a> {
            field: &'a str,
            direction: SortDirection,
        }

        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (field, direction) in self.iter() {
            seq.serialize_element(&Entry { field, direction })?;
        }
        seq.end()
    }
}

/// Splits a raw sort string into an ordered mapping without any whitelist.
///
/// Tokens are not trimmed. A leading `-` marks a descending field.
pub fn tokenize(raw: &str) -> SortSpec {
    let mut spec = SortSpec::new();
    for token in raw.split(',') {
        match token.strip_prefix('-') {
            Some(field) => spec.set(field, SortDirection::Desc),
            None => spec.set(token, SortDirection::Asc),
        }
    }
    spec
}

/// Parses a sort string against the allowed sort fields.
///
/// Returns `None` when nothing survives the whitelist.
pub fn parse_sort(raw: &str, allowed: &HashSet<String>) -> Option<SortSpec> {
    let mut spec = tokenize(raw);
    spec.retain(|field| {
        let keep = allowed.contains(field);
        if !keep {
            tracing::debug!(field, "dropping non-sortable field");
        }
        keep
    });

    if spec.is_empty() {
        None
    } else {
        Some(spec)
    }
}
