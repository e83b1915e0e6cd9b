//! Status command handler - completion report for a scope

use serde::Serialize;

use crate::cli::{OutputFormat, StatusArgs};
use crate::commands::{to_json, CommandContext};
use crate::error::{LocatorError, Result};
use crate::params::RawParams;
use crate::resolve::{HierarchyResolver, ResolvedLocator};
use crate::stats::{BreakdownRow, CompletionReport, StatisticsAggregator};
use crate::store::Scope;

#[derive(Debug, Serialize)]
struct StatusOutput {
    scope: String,
    #[serde(flatten)]
    completion: CompletionReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    breakdown: Vec<BreakdownRow>,
}

pub fn run_status(args: &StatusArgs, ctx: &CommandContext) -> Result<String> {
    let store = ctx.open_store()?;
    // An empty request is the national roll-up, not a missing-census error.
    let scope = if args.params.is_empty() {
        Scope::National
    } else {
        let params = RawParams::from_args(&args.params)?;
        let resolution = HierarchyResolver::new(&store).resolve(&params)?;
        // A scope that failed to resolve must not degrade to a wider roll-up.
        if resolution.issues.has_errors() {
            let messages: Vec<String> =
                resolution.issues.iter().map(|i| i.message()).collect();
            return Err(LocatorError::Usage { message: messages.join("; ") });
        }
        scope_of(&resolution.locator)
    };

    let aggregator = StatisticsAggregator::new(&store);
    let completion = aggregator.completion(&scope)?;
    let breakdown = if args.breakdown {
        match &scope {
            Scope::Census(_) => aggregator.census_breakdown(&scope)?,
            Scope::District(..) => aggregator.district_breakdown(&scope)?,
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let output = StatusOutput { scope: describe(&scope), completion, breakdown };
    match ctx.format {
        OutputFormat::Json => to_json(&output),
        OutputFormat::Text => Ok(render_text(&output)),
    }
}

/// Deepest resolved level wins.
fn scope_of(locator: &ResolvedLocator) -> Scope {
    if let Some(sub) = &locator.sub_district {
        if let Some(page) = locator.page {
            return Scope::Page(sub.key.clone(), page);
        }
        return Scope::SubDistrict(sub.key.clone());
    }
    if let Some(census) = &locator.census {
        if let Some(number) = locator.district_number {
            return Scope::District(census.id.clone(), number);
        }
        if let Some(province) = &locator.province {
            return Scope::Province(census.id.clone(), province.clone());
        }
        return Scope::Census(census.id.clone());
    }
    Scope::National
}

fn describe(scope: &Scope) -> String {
    match scope {
        Scope::National => "national".to_string(),
        Scope::Census(id) => format!("census {id}"),
        Scope::Province(id, province) => format!("census {id} province {province}"),
        Scope::District(id, number) => format!("census {id} district {number}"),
        Scope::SubDistrict(key) => key.to_string(),
        Scope::Page(key, page) => format!("{key} page {page}"),
    }
}

fn render_text(output: &StatusOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("scope:       {}\n", output.scope));
    out.push_str(&format!("population:  {}\n", output.completion.population));
    out.push_str(&format!(
        "transcribed: {}% ({} names, {} ages)\n",
        output.completion.transcribed_pct,
        output.completion.name_count,
        output.completion.age_count
    ));
    out.push_str(&format!(
        "linked:      {}% ({} lines)\n",
        output.completion.linked_pct, output.completion.link_count
    ));

    if !output.breakdown.is_empty() {
        out.push('\n');
        for row in &output.breakdown {
            out.push_str(&format!(
                "{:>6}  {:<48}  {:>3}%  {:>3}%\n",
                row.key, row.name, row.completion.transcribed_pct, row.completion.linked_pct
            ));
        }
    }
    out
}
