//! Fetch Pipeline Property Tests
//!
//! End-to-end behavior of the composition pipeline:
//! - Unknown filter fields, sort fields and scopes narrow silently
//! - Out-of-range pages and unknown operators are rejected
//! - Dotted filter keys include their relation before filtering
//! - Composition is deterministic and a no-op for empty requests

use fetcha::pipeline::{Fetcher, PolicyViolation};
use fetcha::policy::{FieldPolicy, PaginationSettings};
use fetcha::request::FetchRequest;
use fetcha::sort::{SortDirection, SortSpec};
use fetcha::source::{MemoryCollection, QueryDescription, QuerySource, QueryStep};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn posts_policy() -> FieldPolicy {
    FieldPolicy::builder()
        .filterable_on(["title", "status", "author.name", "published_at"])
        .sortable_on(["created_at", "title"])
        .scopable_with(["published"])
        .paginatable(PaginationSettings::new().default_size(2).max_size(50))
        .fulltext_search_on(["title", "body"])
        .build()
        .unwrap()
}

fn posts() -> MemoryCollection {
    let mut published = Map::new();
    published.insert("status".into(), json!("published"));

    MemoryCollection::new(
        "posts",
        vec![
            json!({"_id": "p1", "title": "Intro to Rust", "body": "ownership", "status": "published",
                   "created_at": 3, "published_at": "2024-01-01", "author": {"name": "ana"}}),
            json!({"_id": "p2", "title": "Advanced Rust", "body": "lifetimes", "status": "draft",
                   "created_at": 1, "published_at": null, "author": {"name": "ben"}}),
            json!({"_id": "p3", "title": "Gardening", "body": "tomatoes", "status": "published",
                   "created_at": 2, "published_at": "2024-02-01", "author": {"name": "ana"}}),
            json!({"_id": "p4", "title": "rusty tools", "body": "sheds", "status": "published",
                   "created_at": 4, "published_at": "2024-03-01", "author": {"name": "cy"}}),
        ],
    )
    .with_scope("published", published)
}

fn describe(policy: &FieldPolicy, request: &FetchRequest) -> QueryDescription {
    Fetcher::new(policy)
        .fetch(QueryDescription::all("posts"), request)
        .unwrap()
}

fn fetch_ids(request: &FetchRequest) -> Vec<String> {
    let policy = posts_policy();
    let collection = posts();
    let query = Fetcher::new(&policy).fetch(collection.all(), request).unwrap();
    let rows = query.fetch().unwrap();
    rows.iter()
        .filter_map(|doc| doc["_id"].as_str().map(str::to_string))
        .collect()
}

fn request(value: Value) -> FetchRequest {
    FetchRequest::from_value(&value).unwrap()
}

// =============================================================================
// Silent Narrowing
// =============================================================================

/// A field never declared filterable leaves the query unrestricted by it.
#[test]
fn test_unregistered_filter_field_dropped() {
    let policy = posts_policy();
    for field in ["body", "password", "author", "author.email", "Title"] {
        let mut filter = Map::new();
        filter.insert(field.to_string(), json!("x"));
        let query = describe(&policy, &request(json!({ "filter": filter })));
        assert!(query.is_unrestricted(), "{} should be dropped", field);
    }
}

/// A non-sortable field never appears in the ordering.
#[test]
fn test_unsortable_field_never_ordered() {
    let policy = posts_policy();
    for sort in ["secret", "-secret,title", "title,secret", "-created_at,secret,-secret"] {
        let query = describe(&policy, &request(json!({"sort": sort})));
        for step in query.steps() {
            if let QueryStep::Order { fields } = step {
                assert!(!fields.contains("secret"), "{}", sort);
            }
        }
    }
}

#[test]
fn test_unknown_scope_ignored() {
    let policy = posts_policy();
    let query = describe(&policy, &request(json!({"scope": "delete_all"})));
    assert!(query.is_unrestricted());
}

// =============================================================================
// Sort Ordering
// =============================================================================

/// "-a,b,a" keeps a's first position with its last direction.
#[test]
fn test_sort_first_position_last_direction() {
    let policy = FieldPolicy::builder().sortable_on(["a", "b"]).build().unwrap();
    let query = describe(&policy, &request(json!({"sort": "-a,b,a"})));

    let expected = SortSpec::new()
        .with("a", SortDirection::Asc)
        .with("b", SortDirection::Asc);
    assert_eq!(query.steps(), &[QueryStep::Order { fields: expected }]);
}

#[test]
fn test_sorted_fetch() {
    assert_eq!(
        fetch_ids(&request(json!({"sort": "-created_at", "page": {"size": "4"}}))),
        vec!["p4", "p1", "p3", "p2"]
    );
}

// =============================================================================
// Pagination Bounds
// =============================================================================

#[test]
fn test_page_size_above_max_rejected() {
    let policy = posts_policy();
    let err = Fetcher::new(&policy)
        .fetch(
            QueryDescription::all("posts"),
            &request(json!({"page": {"size": "100"}})),
        )
        .unwrap_err();
    assert_eq!(err, PolicyViolation::PageSizeExceeded { size: 100, max: 50 });
}

#[test]
fn test_page_windows() {
    let policy = posts_policy();

    let query = describe(&policy, &request(json!({"page": {"size": "10", "number": "1"}})));
    assert_eq!(query.steps(), &[QueryStep::OffsetLimit { offset: 0, limit: 10 }]);

    let query = describe(&policy, &request(json!({"page": {"size": "10", "number": "3"}})));
    assert_eq!(query.steps(), &[QueryStep::OffsetLimit { offset: 20, limit: 10 }]);
}

#[test]
fn test_default_page_size_applies() {
    assert_eq!(
        fetch_ids(&request(json!({"sort": "created_at", "page": {"number": "2"}}))),
        vec!["p1", "p4"]
    );
}

// =============================================================================
// Filter Operators
// =============================================================================

#[test]
fn test_contains_is_case_insensitive_substring() {
    let policy = posts_policy();
    let query = describe(&policy, &request(json!({"filter": {"title": {"contains": "abc"}}})));
    assert_eq!(
        query.steps(),
        &[QueryStep::Pattern {
            field: "title".into(),
            pattern: "%abc%".into(),
            case_insensitive: true,
        }]
    );

    let mut ids = fetch_ids(&request(json!({"filter": {"title": {"contains": "RUST"}}})));
    ids.sort();
    assert_eq!(ids, vec!["p1", "p2", "p4"]);
}

#[test]
fn test_unknown_operator_rejected() {
    let policy = posts_policy();
    let err = Fetcher::new(&policy)
        .fetch(
            QueryDescription::all("posts"),
            &request(json!({"filter": {"title": {"frobnicate": "x"}}})),
        )
        .unwrap_err();
    assert_eq!(err.code(), "FETCHA_FORBIDDEN_OPERATOR");
    assert_eq!(err.status_code(), 403);
}

#[test]
fn test_presence_filters() {
    let mut ids = fetch_ids(&request(json!({"filter": {"published_at": {"presence": true}}})));
    ids.sort();
    assert_eq!(ids, vec!["p1", "p3", "p4"]);

    assert_eq!(
        fetch_ids(&request(json!({"filter": {"published_at": {"presence": false}}}))),
        vec!["p2"]
    );
    assert_eq!(
        fetch_ids(&request(json!({"filter": {"published_at": {"presence": null}}}))),
        vec!["p2"]
    );
}

/// Any string operand, even "false", asks for a present field.
#[test]
fn test_presence_string_operands_are_truthy() {
    let policy = posts_policy();
    for operand in ["false", "0", ""] {
        let query = describe(
            &policy,
            &request(json!({"filter": {"published_at": {"presence": operand}}})),
        );
        assert_eq!(
            query.steps(),
            &[QueryStep::NotNull {
                field: "published_at".into()
            }],
            "{:?}",
            operand
        );
    }

    let mut ids = fetch_ids(&request(json!({"filter": {"published_at": {"presence": "false"}}})));
    ids.sort();
    assert_eq!(ids, vec!["p1", "p3", "p4"]);
}

#[test]
fn test_filters_conjoin() {
    let ids = fetch_ids(&request(json!({
        "filter": {
            "status": "published",
            "title": {"starts_with": "intro", "ends_with": "rust"}
        }
    })));
    assert_eq!(ids, vec!["p1"]);
}

// =============================================================================
// Association Inclusion
// =============================================================================

#[test]
fn test_dotted_key_includes_relation_first() {
    let policy = posts_policy();
    let query = describe(&policy, &request(json!({"filter": {"author.name": "x"}})));
    assert_eq!(
        query.steps(),
        &[
            QueryStep::Include {
                relations: vec!["author".into()]
            },
            QueryStep::Equals {
                field: "author.name".into(),
                value: json!("x")
            },
        ]
    );

    let mut ids = fetch_ids(&request(json!({"filter": {"author.name": "ana"}})));
    ids.sort();
    assert_eq!(ids, vec!["p1", "p3"]);
}

#[test]
fn test_plain_key_no_inclusion() {
    let policy = FieldPolicy::builder().filterable_on(["plainfield"]).build().unwrap();
    let query = describe(&policy, &request(json!({"filter": {"plainfield": "x"}})));
    assert!(query
        .steps()
        .iter()
        .all(|step| !matches!(step, QueryStep::Include { .. })));
}

// =============================================================================
// Scope and Search
// =============================================================================

#[test]
fn test_scope_then_search() {
    let ids = fetch_ids(&request(json!({"scope": "published", "search": "rust"})));
    assert_eq!(ids, vec!["p1", "p4"]);
}

#[test]
fn test_page_counts_search_matches() {
    // p2, p1 and p4 mention rust; the page is taken over those three
    let first = fetch_ids(&request(json!({
        "sort": "created_at",
        "page": {"size": "2"},
        "search": "rust"
    })));
    assert_eq!(first, vec!["p2", "p1"]);

    let second = fetch_ids(&request(json!({
        "sort": "created_at",
        "page": {"size": "2", "number": "2"},
        "search": "rust"
    })));
    assert_eq!(second, vec!["p4"]);
}

// =============================================================================
// No-op and Determinism
// =============================================================================

#[test]
fn test_empty_policy_empty_request_is_noop() {
    let policy = FieldPolicy::default();
    let query = describe(&policy, &FetchRequest::new());
    assert!(query.is_unrestricted());

    let collection = posts();
    let rows = Fetcher::new(&policy)
        .fetch(collection.all(), &FetchRequest::new())
        .unwrap()
        .fetch()
        .unwrap();
    assert_eq!(rows.len(), collection.len());
}

#[test]
fn test_composition_is_idempotent() {
    let policy = posts_policy();
    let req = request(json!({
        "scope": "published",
        "filter": {"author.name": "ana", "title": {"contains": "r"}, "ignored": 1},
        "sort": "-created_at,title,-title",
        "page": {"size": "5", "number": "2"},
        "search": "rust tools"
    }));

    let first = describe(&policy, &req);
    for _ in 0..100 {
        assert_eq!(describe(&policy, &req), first);
    }
}

#[test]
fn test_rejected_request_returns_violation() {
    let policy = posts_policy();
    let source = QueryDescription::all("posts").filter_null("marker");
    let result = Fetcher::new(&policy).fetch(
        source,
        &request(json!({"scope": "published", "page": {"number": "0"}})),
    );
    assert!(matches!(result, Err(PolicyViolation::PageNumberTooSmall { number: 0 })));
}
