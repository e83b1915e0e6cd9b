//! Resolve command handler - raw parameters to a fully-qualified locator

use crate::cli::{OutputFormat, ResolveArgs};
use crate::commands::{opt, to_json, CommandContext};
use crate::error::Result;
use crate::locator::{truncate_name, DivisionParam, NAME_BUDGET_NARROW};
use crate::params::RawParams;
use crate::report::Severity;
use crate::resolve::{HierarchyResolver, Resolution};

pub fn run_resolve(args: &ResolveArgs, ctx: &CommandContext) -> Result<String> {
    let params = RawParams::from_args(&args.params)?;
    let store = ctx.open_store()?;
    let resolution = HierarchyResolver::new(&store).resolve(&params)?;

    match ctx.format {
        OutputFormat::Json => to_json(&resolution),
        OutputFormat::Text => Ok(render_text(&resolution, ctx.verbose)),
    }
}

fn render_text(resolution: &Resolution, verbose: bool) -> String {
    let loc = &resolution.locator;
    let mut out = String::new();

    if let Some(census) = &loc.census {
        out.push_str(&format!("census:      {}\n", census.id));
        if verbose {
            out.push_str(&format!("  lines/page: {}\n", census.lines_per_page));
        }
    } else {
        out.push_str(&format!("census:      {}\n", opt(&loc.requested_census)));
    }
    out.push_str(&format!("country:     {}\n", opt(&loc.country)));
    out.push_str(&format!("province:    {}\n", opt(&loc.province)));
    out.push_str(&format!(
        "district:    {} ({})\n",
        opt(&loc.district_number),
        loc.district_name
    ));

    match (&loc.sub_district, &loc.sub_district_id) {
        (Some(sub), _) => out.push_str(&format!(
            "subdistrict: {} ({})\n",
            sub.key.id,
            truncate_name(&sub.name, NAME_BUDGET_NARROW)
        )),
        (None, Some(id)) => out.push_str(&format!("subdistrict: {id}\n")),
        (None, None) => out.push_str("subdistrict: -\n"),
    }

    match &loc.division {
        DivisionParam::Id(id) => out.push_str(&format!("division:    {id}\n")),
        DivisionParam::Blank => out.push_str("division:    (blank)\n"),
        DivisionParam::Absent => {}
    }
    if loc.schedule != "1" {
        out.push_str(&format!("schedule:    {}\n", loc.schedule));
    }
    out.push_str(&format!("page:        {}\n", opt(&loc.page)));
    out.push_str(&format!("line:        {}\n", opt(&loc.line)));

    if !resolution.issues.is_empty() {
        out.push('\n');
        for issue in resolution.issues.iter() {
            let tag = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            out.push_str(&format!("{tag}: {}\n", issue.message()));
        }
    }
    out
}
