//! CLI command implementations
//!
//! Each command loads the policy config, reads one request from stdin and
//! writes one response to stdout. Request-level failures (malformed request,
//! unknown resource, policy violation) become error responses; only config
//! and I/O failures abort the process.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::pipeline::fetch_resource;
use crate::policy::{PolicyLoader, PolicyRegistry};
use crate::request::FetchRequest;
use crate::source::{MemoryCollection, QueryDescription, QuerySource};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_request, write_response};

/// Parse arguments, install logging and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    setup_tracing();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Explain { config, resource } => explain(&config, &resource),
        Command::Query {
            config,
            resource,
            data,
        } => query(&config, &resource, &data),
        Command::Resources { config } => resources(&config),
    }
}

/// Logs go to stderr, filtered by `RUST_LOG`
fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print the composed query description for a request
pub fn explain(config_path: &Path, resource: &str) -> CliResult<()> {
    let registry = load_registry(config_path)?;
    let request = read_request()?;

    write_response(&explain_request(&registry, resource, &request))
}

/// Run a request against an in-memory collection
pub fn query(config_path: &Path, resource: &str, data_path: &Path) -> CliResult<()> {
    let registry = load_registry(config_path)?;
    let collection = load_collection(resource, data_path)?;
    let request = read_request()?;

    write_response(&query_request(&registry, &collection, &request))
}

/// Print every configured resource with its policy
pub fn resources(config_path: &Path) -> CliResult<()> {
    let registry = load_registry(config_path)?;
    write_response(&ok_response(describe_registry(&registry)))
}

/// Loads the policy registry from a config file
pub fn load_registry(config_path: &Path) -> CliResult<PolicyRegistry> {
    let mut loader = PolicyLoader::new();
    loader.load_file(config_path)?;
    Ok(loader.into_registry())
}

fn load_collection(resource: &str, data_path: &Path) -> CliResult<MemoryCollection> {
    let content = fs::read_to_string(data_path).map_err(|e| {
        CliError::data_error(format!("Cannot read {}: {}", data_path.display(), e))
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        CliError::data_error(format!("Invalid JSON in {}: {}", data_path.display(), e))
    })?;
    Ok(MemoryCollection::from_value(resource, value)?)
}

/// Composes `request` and returns the response envelope.
pub fn explain_request(registry: &PolicyRegistry, resource: &str, request: &Value) -> Value {
    match compose(registry, resource, QueryDescription::all(resource), request) {
        Ok(query) => match serde_json::to_value(&query) {
            Ok(data) => ok_response(data),
            Err(e) => error_response("FETCHA_CLI_IO_ERROR", &e.to_string()),
        },
        Err(response) => response,
    }
}

/// Composes `request` over `collection`, executes it and returns the
/// response envelope.
pub fn query_request(
    registry: &PolicyRegistry,
    collection: &MemoryCollection,
    request: &Value,
) -> Value {
    let query = match compose(registry, collection.name(), collection.all(), request) {
        Ok(query) => query,
        Err(response) => return response,
    };

    match query.fetch() {
        Ok(rows) => ok_response(json!({
            "count": rows.len(),
            "documents": rows,
        })),
        Err(e) => error_response(e.code(), &e.to_string()),
    }
}

fn compose<S: QuerySource>(
    registry: &PolicyRegistry,
    resource: &str,
    source: S,
    request: &Value,
) -> Result<S, Value> {
    let request =
        FetchRequest::from_value(request).map_err(|e| error_response(e.code(), &e.to_string()))?;

    fetch_resource(registry, resource, source, &request)
        .map_err(|e| error_response(e.code(), &e.to_string()))
}

fn describe_registry(registry: &PolicyRegistry) -> Value {
    let mut resources = serde_json::Map::new();
    for name in registry.resources() {
        let Some(policy) = registry.get(name) else {
            continue;
        };
        resources.insert(
            name.to_string(),
            json!({
                "filterable_on": sorted(policy.filter_fields().iter()),
                "sortable_on": sorted(policy.sort_fields().iter()),
                "scopable_with": sorted(policy.scope_names().iter()),
                "paginatable": policy.pagination_config(),
                "fulltext_search_on": policy.search_fields(),
            }),
        );
    }
    Value::Object(resources)
}

fn sorted<'a>(names: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<&str> = names.map(String::as_str).collect();
    names.sort_unstable();
    names
}
