//! Store command handler - schema creation and fixture loading

use std::fs;

use crate::cli::{OutputFormat, StoreArgs, StoreCommands};
use crate::commands::{to_json, CommandContext};
use crate::error::{LocatorError, Result};
use crate::store::{Fixture, SqliteStore};

pub fn run_store(args: &StoreArgs, ctx: &CommandContext) -> Result<String> {
    match &args.command {
        StoreCommands::Init => {
            let store = SqliteStore::open(&ctx.db)?;
            store.init_schema()?;
            Ok(format!("initialized entity store at {}\n", ctx.db.display()))
        }
        StoreCommands::Load { file } => {
            let text = fs::read_to_string(file)?;
            let fixture: Fixture =
                serde_json::from_str(&text).map_err(|e| LocatorError::Fixture {
                    message: format!("{}: {e}", file.display()),
                })?;
            let mut store = SqliteStore::open(&ctx.db)?;
            let stats = store.load_fixture(&fixture)?;
            match ctx.format {
                OutputFormat::Json => to_json(&stats),
                OutputFormat::Text => Ok(format!(
                    "loaded {} censuses, {} districts, {} subdistricts, {} pages\n",
                    stats.censuses, stats.districts, stats.sub_districts, stats.pages
                )),
            }
        }
    }
}
