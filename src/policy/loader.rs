//! Policy loader for declarative JSON configuration
//!
//! Config shape:
//!
//! ```json
//! {
//!   "resources": {
//!     "articles": {
//!       "filterable_on": ["title", "author.name"],
//!       "sortable_on": ["created_at"],
//!       "scopable_with": ["published"],
//!       "paginatable": {"max_size": 100},
//!       "fulltext_search_on": ["title", "body"]
//!     }
//!   }
//! }
//! ```
//!
//! Every resource is validated while loading. A bad file fails startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::errors::{PolicyError, PolicyResult};
use super::registry::PolicyRegistry;
use super::types::{FieldPolicy, PaginationSettings};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    #[serde(default)]
    resources: BTreeMap<String, ResourceDecl>,
}

/// Registration calls for one resource, as written in config
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceDecl {
    #[serde(default)]
    filterable_on: Vec<String>,
    #[serde(default)]
    sortable_on: Vec<String>,
    #[serde(default)]
    scopable_with: Vec<String>,
    #[serde(default)]
    paginatable: PaginationSettings,
    #[serde(default)]
    fulltext_search_on: Vec<String>,
}

impl ResourceDecl {
    fn into_policy(self) -> PolicyResult<FieldPolicy> {
        FieldPolicy::builder()
            .filterable_on(self.filterable_on)
            .sortable_on(self.sortable_on)
            .scopable_with(self.scopable_with)
            .paginatable(self.paginatable)
            .fulltext_search_on(self.fulltext_search_on)
            .build()
    }
}

/// Builds a [`PolicyRegistry`] from one or more config sources.
#[derive(Debug, Default)]
pub struct PolicyLoader {
    registry: PolicyRegistry,
}

impl PolicyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every resource declared in a config file.
    pub fn load_file(&mut self, path: &Path) -> PolicyResult<()> {
        let content = fs::read_to_string(path).map_err(|e| PolicyError::ConfigUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.load_str(&path.display().to_string(), &content)
    }

    /// Loads every resource declared in `content`; `origin` names it in errors.
    pub fn load_str(&mut self, origin: &str, content: &str) -> PolicyResult<()> {
        let file: PolicyFile =
            serde_json::from_str(content).map_err(|e| PolicyError::ConfigMalformed {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;

        // Nothing is registered unless every resource in the file is valid
        let mut policies = Vec::with_capacity(file.resources.len());
        for (resource, decl) in file.resources {
            if self.registry.contains(&resource) {
                return Err(PolicyError::DuplicateResource(resource));
            }
            let policy = decl.into_policy().map_err(|e| PolicyError::ConfigMalformed {
                path: origin.to_string(),
                reason: format!("resource '{}': {}", resource, e),
            })?;
            policies.push((resource, policy));
        }

        for (resource, policy) in policies {
            self.registry.register(resource, policy)?;
        }

        tracing::info!(origin, resources = self.registry.len(), "loaded field policies");
        Ok(())
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> PolicyRegistry {
        self.registry
    }
}
