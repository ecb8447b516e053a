//! Name-indexed registry of field policies
//!
//! Policies are registered once at startup and handed out as shared
//! `Arc`s; the registry is never touched by request handling.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{PolicyError, PolicyResult};
use super::types::FieldPolicy;

/// Maps resource type names to their immutable policies
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<FieldPolicy>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy under `resource`.
    ///
    /// A resource can only be registered once.
    pub fn register(&mut self, resource: impl Into<String>, policy: FieldPolicy) -> PolicyResult<()> {
        let resource = resource.into();
        if self.policies.contains_key(&resource) {
            return Err(PolicyError::DuplicateResource(resource));
        }

        tracing::debug!(resource = %resource, "registered field policy");
        self.policies.insert(resource, Arc::new(policy));
        Ok(())
    }

    pub fn get(&self, resource: &str) -> Option<Arc<FieldPolicy>> {
        self.policies.get(resource).cloned()
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.policies.contains_key(resource)
    }

    /// Registered resource names, sorted
    pub fn resources(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
