//! Command handlers: thin glue between the CLI and the resolution core
//!
//! Handlers never implement hierarchy logic themselves; they parse the raw
//! parameter pairs, call into the resolver/traversal/statistics core, and
//! render the structured results in the requested format.

mod nav;
mod resolve;
mod status;
mod store;

use std::path::PathBuf;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::{LocatorError, Result};
use crate::store::SqliteStore;

/// Shared context passed to all command handlers
pub struct CommandContext {
    pub format: OutputFormat,
    pub verbose: bool,
    pub db: PathBuf,
}

impl CommandContext {
    fn from_cli(cli: &Cli) -> Self {
        Self { format: cli.format, verbose: cli.verbose, db: cli.db.clone() }
    }

    /// Open the store for read commands. A missing database is a usage
    /// error, not an empty result set.
    fn open_store(&self) -> Result<SqliteStore> {
        if !self.db.exists() {
            return Err(LocatorError::Usage {
                message: format!(
                    "no entity store at {}; run `census-locator store init` first",
                    self.db.display()
                ),
            });
        }
        Ok(SqliteStore::open(&self.db)?)
    }
}

/// Dispatch the parsed CLI to its handler
pub fn run(cli: &Cli) -> Result<String> {
    let ctx = CommandContext::from_cli(cli);
    match &cli.command {
        Commands::Resolve(args) => resolve::run_resolve(args, &ctx),
        Commands::Nav(args) => nav::run_nav(args, &ctx),
        Commands::Status(args) => status::run_status(args, &ctx),
        Commands::Store(args) => store::run_store(args, &ctx),
    }
}

/// Render a serializable value as pretty JSON.
fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| LocatorError::Usage {
        message: format!("JSON serialization failed: {e}"),
    })
}

/// Shared text rendering for optional values.
fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}
