//! fetcha - whitelisted query composition
//!
//! Given a resource's [`policy::FieldPolicy`] and a [`request::FetchRequest`],
//! composes scope, filter, sort, pagination and full-text search over any
//! [`source::QuerySource`], applying only what the policy allows.
//!
//! Unknown filter fields, sort fields and scopes are dropped. Out-of-range
//! pagination and unknown filter operators reject the request with a
//! [`pipeline::PolicyViolation`].

pub mod cli;
pub mod filter;
pub mod pagination;
pub mod pipeline;
pub mod policy;
pub mod request;
pub mod sort;
pub mod source;

pub use pipeline::{fetch_resource, FetchError, Fetchable, Fetcher, PolicyViolation};
pub use policy::{FieldPolicy, PolicyRegistry};
pub use request::FetchRequest;
pub use source::{QueryDescription, QuerySource};
