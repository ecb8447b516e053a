//! CLI argument definitions using clap
//!
//! Commands:
//! - fetcha explain --config <path> --resource <name>
//! - fetcha query --config <path> --resource <name> --data <path>
//! - fetcha resources --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fetcha - whitelisted query composition for declared resources
#[derive(Parser, Debug)]
#[command(name = "fetcha")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose a request from stdin and print the query description
    Explain {
        /// Path to policy configuration file
        #[arg(long, default_value = "./fetcha.json")]
        config: PathBuf,

        /// Resource to query
        #[arg(long)]
        resource: String,
    },

    /// Compose a request from stdin and run it against a JSON collection
    Query {
        /// Path to policy configuration file
        #[arg(long, default_value = "./fetcha.json")]
        config: PathBuf,

        /// Resource to query
        #[arg(long)]
        resource: String,

        /// Collection file: {"documents": [...], "scopes": {...}}
        #[arg(long)]
        data: PathBuf,
    },

    /// List the configured resources and their policies
    Resources {
        /// Path to policy configuration file
        #[arg(long, default_value = "./fetcha.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
