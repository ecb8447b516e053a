//! CLI module for fetcha
//!
//! Provides command-line interface for:
//! - explain: print the composed query for a request
//! - query: run a request against a JSON collection
//! - resources: list configured resource policies

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    explain, explain_request, load_registry, query, query_request, resources, run, run_command,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, read_request, write_response};
