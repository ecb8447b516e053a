//! Association inclusion
//!
//! A filter key of the form `relation.field` needs `relation` eager-loaded
//! before the filter can apply. Only keys that survived the policy whitelist
//! are inspected.

/// Relation segment of a dotted key.
///
/// `author.name` → `author`. Keys without a dot, or with nothing after the
/// first dot (`author.`), name no relation.
pub fn relation_of(key: &str) -> Option<&str> {
    let mut segments = key.split('.');
    let relation = segments.next()?;
    match segments.next() {
        Some(field) if !field.is_empty() => Some(relation),
        _ => None,
    }
}

/// Minimal set of relations to include, in first-seen order
pub fn required_includes<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut includes: Vec<String> = Vec::new();
    for relation in keys.into_iter().filter_map(relation_of) {
        if !includes.iter().any(|r| r == relation) {
            includes.push(relation.to_string());
        }
    }
    includes
}
