//! # Query Pipeline
//!
//! Entry points that turn a [`FetchRequest`] into a composed, still-lazy
//! query:
//!
//! - [`Fetcher`]: stage composer over one policy
//! - [`Fetchable`]: per-type entry point backed by a static policy
//! - [`fetch_resource`]: name-based entry point over a [`PolicyRegistry`]
//!
//! The pipeline is synchronous and stateless. It performs no I/O; the only
//! shared state is the read-only policy.

mod errors;
mod fetcher;

pub use errors::{FetchError, FetchResult, PolicyViolation, FORBIDDEN_STATUS};
pub use fetcher::Fetcher;

use crate::policy::{FieldPolicy, PolicyRegistry};
use crate::request::FetchRequest;
use crate::source::QuerySource;

/// A resource type with a statically declared field policy.
///
/// ```ignore
/// struct Article;
///
/// impl Fetchable for Article {
///     type Source = QueryDescription;
///
///     fn field_policy() -> &'static FieldPolicy {
///         static POLICY: OnceLock<FieldPolicy> = OnceLock::new();
///         POLICY.get_or_init(|| {
///             FieldPolicy::builder()
///                 .filterable_on(["title"])
///                 .build()
///                 .unwrap_or_default()
///         })
///     }
///
///     fn all() -> QueryDescription {
///         QueryDescription::all("articles")
///     }
/// }
///
/// let query = Article::fetch(&request)?;
/// ```
pub trait Fetchable {
    type Source: QuerySource;

    /// Policy shared by every request for this type
    fn field_policy() -> &'static FieldPolicy;

    /// Unrestricted collection
    fn all() -> Self::Source;

    /// Composes `request` over the unrestricted collection
    fn fetch(request: &FetchRequest) -> FetchResult<Self::Source> {
        Fetcher::new(Self::field_policy()).fetch(Self::all(), request)
    }
}

/// Composes `request` for the resource registered under `resource`.
pub fn fetch_resource<S: QuerySource>(
    registry: &PolicyRegistry,
    resource: &str,
    source: S,
    request: &FetchRequest,
) -> Result<S, FetchError> {
    let policy = registry
        .get(resource)
        .ok_or_else(|| FetchError::UnknownResource(resource.to_string()))?;

    let _span = tracing::debug_span!("fetch", resource).entered();
    Ok(Fetcher::new(&policy).fetch(source, request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::QueryDescription;
    use serde_json::json;
    use std::sync::OnceLock;

    struct Article;

    impl Fetchable for Article {
        type Source = QueryDescription;

        fn field_policy() -> &'static FieldPolicy {
            static POLICY: OnceLock<FieldPolicy> = OnceLock::new();
            POLICY.get_or_init(|| {
                FieldPolicy::builder()
                    .filterable_on(["title"])
                    .sortable_on(["title"])
                    .build()
                    .unwrap()
            })
        }

        fn all() -> QueryDescription {
            QueryDescription::all("articles")
        }
    }

    #[test]
    fn test_fetchable_uses_static_policy() {
        let query = Article::fetch(&FetchRequest::new().filter("title", json!("x")).filter("body", json!("y")))
            .unwrap();
        assert_eq!(query.resource(), "articles");
        assert_eq!(query.steps().len(), 1);
    }

    #[test]
    fn test_fetch_resource_by_name() {
        let mut registry = PolicyRegistry::new();
        registry
            .register("tags", FieldPolicy::builder().sortable_on(["name"]).build().unwrap())
            .unwrap();

        let query = fetch_resource(
            &registry,
            "tags",
            QueryDescription::all("tags"),
            &FetchRequest::new().sort("-name"),
        )
        .unwrap();
        assert_eq!(query.steps().len(), 1);

        let err = fetch_resource(
            &registry,
            "ghosts",
            QueryDescription::all("ghosts"),
            &FetchRequest::new(),
        )
        .unwrap_err();
        assert_eq!(err, FetchError::UnknownResource("ghosts".into()));
    }

    #[test]
    fn test_fetch_resource_violation_is_forbidden() {
        let mut registry = PolicyRegistry::new();
        registry.register("tags", FieldPolicy::default()).unwrap();

        let err = fetch_resource(
            &registry,
            "tags",
            QueryDescription::all("tags"),
            &FetchRequest::new().page(Some("0"), None),
        )
        .unwrap_err();
        assert!(err.is_forbidden());
    }
}
