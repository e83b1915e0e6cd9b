//! CLI argument definitions using clap with subcommand architecture
//!
//! Handlers consume the same loosely-typed `key=value` parameters the
//! original web endpoints took from the query string, so the full
//! normalization path is exercised from the command line.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Census transcription locator: resolve, navigate, and report
#[derive(Parser, Debug)]
#[command(name = "census-locator")]
#[command(about = "Hierarchical locator resolution and traversal for census transcription data")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the entity store database
    #[arg(long, global = true, default_value = "census.db", env = "CENSUS_LOCATOR_DB")]
    pub db: PathBuf,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve raw parameters into a fully-qualified locator
    #[command(visible_alias = "r")]
    Resolve(ResolveArgs),

    /// Compute previous/next navigation links at a hierarchy level
    #[command(visible_alias = "n")]
    Nav(NavArgs),

    /// Report transcription completion for a scope
    #[command(visible_alias = "s")]
    Status(StatusArgs),

    /// Manage the entity store
    Store(StoreArgs),
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Request parameters, e.g. census=CA1881 district=25 subdistrict=A page=3
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

/// Hierarchy level for navigation links
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLevel {
    Page,
    Division,
    District,
    Province,
}

/// Arguments for the nav command
#[derive(Args, Debug)]
pub struct NavArgs {
    /// Level to step at
    #[arg(value_enum)]
    pub level: NavLevel,

    /// Request parameters identifying the current position
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Request parameters selecting the scope (deepest resolved level wins);
    /// empty for the national roll-up
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Include per-child breakdown rows (districts of a census, subdistricts
    /// of a district)
    #[arg(long)]
    pub breakdown: bool,
}

/// Arguments for the store command
#[derive(Args, Debug)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: StoreCommands,
}

/// Store management subcommands
#[derive(Subcommand, Debug)]
pub enum StoreCommands {
    /// Create the database schema (idempotent)
    Init,

    /// Bulk-load censuses/districts/subdistricts/pages from a JSON document
    Load {
        /// Path to the fixture JSON file
        file: PathBuf,
    },
}

/// Output format for all commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}
