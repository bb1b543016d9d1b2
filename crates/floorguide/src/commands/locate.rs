use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::config::Config;
use crate::locate;
use crate::registry::Point;

#[derive(Debug, Serialize)]
struct Location<'a> {
    loc_id: &'a str,
    floor_id: Option<&'a str>,
    floor_registered: bool,
    place: Option<PlaceSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct PlaceSummary<'a> {
    id: &'a str,
    name: &'a str,
    marker: Point,
}

/// Show how a location code resolves.
///
/// Unresolvable codes are reported, not treated as errors.
pub fn run(building: Option<&Path>, loc_id: &str, json: bool) -> Result<()> {
    let config = Config::load_or_default();
    let registry = super::load_registry(building, &config)?;

    let floor_id = locate::floor_of(Some(loc_id));
    let resolved = locate::resolve(registry, Some(loc_id));
    let location = Location {
        loc_id,
        floor_id,
        floor_registered: resolved.is_some(),
        place: resolved.and_then(|r| r.place).map(|p| PlaceSummary {
            id: &p.id,
            name: &p.name,
            marker: p.marker,
        }),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&location)?);
        return Ok(());
    }

    println!("{} {}", "Location:".bold(), loc_id);
    match (floor_id, resolved) {
        (None, _) => println!("{} {}", "Floor:".bold(), "none (empty code)".red()),
        (Some(id), None) => println!(
            "{} {} {}",
            "Floor:".bold(),
            id,
            "(not registered, would show the floor menu)".red()
        ),
        (Some(id), Some(r)) => {
            println!("{} {} ({})", "Floor:".bold(), id, r.floor.display_name());
            match r.place {
                Some(place) => println!(
                    "{} {} at {}",
                    "Place:".bold(),
                    place.name.green(),
                    place.marker
                ),
                None => println!(
                    "{} {}",
                    "Place:".bold(),
                    "not on this floor (floor shown without a marker)".yellow()
                ),
            }
        }
    }
    Ok(())
}
