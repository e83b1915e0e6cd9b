//! Nav command handler - previous/next links at one hierarchy level

use serde::Serialize;

use crate::cli::{NavArgs, NavLevel, OutputFormat};
use crate::commands::{to_json, CommandContext};
use crate::error::{LocatorError, Result};
use crate::params::RawParams;
use crate::resolve::HierarchyResolver;
use crate::store::EntityStore;
use crate::traverse::{prev_next_page, TraversalEngine};

/// Generic prev/next pair for serialization.
#[derive(Debug, Serialize)]
struct Neighbors<T: Serialize> {
    prev: Option<T>,
    next: Option<T>,
}

pub fn run_nav(args: &NavArgs, ctx: &CommandContext) -> Result<String> {
    let params = RawParams::from_args(&args.params)?;
    let store = ctx.open_store()?;
    let resolution = HierarchyResolver::new(&store).resolve(&params)?;

    // Navigation needs a resolved position; surface the resolution issues
    // when the prerequisite level is missing.
    let need = |missing: &str| -> LocatorError {
        let mut message = format!("nav {:?} needs a resolved {missing}", args.level);
        for issue in resolution.issues.iter() {
            message.push_str(&format!("; {}", issue.message()));
        }
        LocatorError::Usage { message }
    };

    let engine = TraversalEngine::new(&store);
    let loc = &resolution.locator;

    match args.level {
        NavLevel::Page => {
            let sub = loc.sub_district.as_ref().ok_or_else(|| need("subdistrict"))?;
            let page = loc.page.ok_or_else(|| need("page"))?;
            let neighbors = prev_next_page(sub, page);
            render(ctx, "page", Neighbors { prev: neighbors.prev, next: neighbors.next })
        }
        NavLevel::Division => {
            let sub = loc.sub_district.as_ref().ok_or_else(|| need("subdistrict"))?;
            let (prev, next) = engine.prev_next_division(sub)?;
            render(
                ctx,
                "division",
                Neighbors {
                    prev: prev.map(|s| s.key.to_string()),
                    next: next.map(|s| s.key.to_string()),
                },
            )
        }
        NavLevel::District => {
            let census = loc.census.as_ref().ok_or_else(|| need("census"))?;
            let number = loc.district_number.ok_or_else(|| need("district"))?;
            let (prev, next) = engine.prev_next_district(&census.id, number)?;
            render(
                ctx,
                "district",
                Neighbors {
                    prev: prev.map(|d| format!("{} {}", d.number, d.name)),
                    next: next.map(|d| format!("{} {}", d.number, d.name)),
                },
            )
        }
        NavLevel::Province => {
            let census = loc.census.as_ref().ok_or_else(|| need("census"))?;
            let province = loc.province.as_ref().ok_or_else(|| need("province"))?;
            // Province stepping follows the public census ordering, so use
            // the requested id when the working one was rewritten.
            let public = match &loc.requested_census {
                Some(requested) if *requested != census.id => {
                    store.census(requested)?.unwrap_or_else(|| census.clone())
                }
                _ => census.clone(),
            };
            let (prev, next) = engine.prev_next_province(&public, province)?;
            render(
                ctx,
                "province",
                Neighbors {
                    prev: prev.map(|l| format!("{} {}", l.census, l.province)),
                    next: next.map(|l| format!("{} {}", l.census, l.province)),
                },
            )
        }
    }
}

fn render<T: Serialize + std::fmt::Display>(
    ctx: &CommandContext,
    level: &str,
    neighbors: Neighbors<T>,
) -> Result<String> {
    match ctx.format {
        OutputFormat::Json => to_json(&neighbors),
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!(
                "prev {level}: {}\n",
                neighbors.prev.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
            ));
            out.push_str(&format!(
                "next {level}: {}\n",
                neighbors.next.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
            ));
            Ok(out)
        }
    }
}
