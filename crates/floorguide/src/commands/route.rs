use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::{RouteSettings, Router};
use crate::cli::RouteArgs;
use crate::config::Config;
use crate::locate;
use crate::route::validate_request;

/// Build and print a route between two places.
pub fn run(
    building: Option<&Path>,
    start: &str,
    end: &str,
    floor: Option<&str>,
    args: &RouteArgs,
    json: bool,
) -> Result<()> {
    let config = Config::load_or_default();
    let registry = super::load_registry(building, &config)?;
    let settings = RouteSettings::resolve(args, &config)?;

    let (start, end) = validate_request(Some(start), Some(end))?;
    let floor_id = match floor.or_else(|| locate::floor_of(Some(start))) {
        Some(f) => f,
        None => anyhow::bail!("Cannot tell which floor '{start}' is on. Pass --floor."),
    };

    let router = Router::connect(registry, &settings)?;
    tracing::info!(router = %router.describe(), floor_id, "building route");
    let route = router.builder().build(start, end, floor_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
        return Ok(());
    }

    println!(
        "{} {} {} {} {}",
        "Route".bold(),
        route.start_id.green(),
        "\u{2192}".dimmed(),
        route.end_id.green(),
        format!("on {floor_id} ({})", router.describe()).dimmed()
    );
    for (i, point) in route.points.iter().enumerate() {
        println!("  {:>2}. {point}", i + 1);
    }
    println!("{} {:.1}", "Length:".bold(), route.length());
    Ok(())
}
