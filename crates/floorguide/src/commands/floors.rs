use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

/// Print every floor (in menu order) with its places.
pub fn run(building: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default();
    let registry = super::load_registry(building, &config)?;

    if registry.is_empty() {
        println!("{}", "The building has no floors.".yellow());
        return Ok(());
    }

    for floor in registry.floors() {
        println!(
            "{}  {}  {}",
            floor.id.cyan().bold(),
            floor.display_name().bold(),
            format!(
                "({} place(s), viewBox {})",
                floor.places.len(),
                floor.viewport.view_box()
            )
            .dimmed()
        );
        for place in &floor.places {
            println!(
                "    {:<12} {:<20} marker {}",
                place.id.green(),
                place.name,
                place.marker
            );
        }
    }
    Ok(())
}
