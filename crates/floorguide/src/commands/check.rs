use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::registry::Registry;

/// Validate a building file and report non-fatal warnings.
pub fn run(file: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default();
    let path = super::building_path(file, &config);

    let owned;
    let (registry, label) = match path {
        Some(path) => {
            owned = Registry::load(path)?;
            (&owned, path.display().to_string())
        }
        None => (Registry::builtin(), "bundled building".to_string()),
    };

    let places: usize = registry.floors().map(|f| f.places.len()).sum();
    println!(
        "{} {}: {} floor(s), {} place(s)",
        "OK".green().bold(),
        label,
        registry.len(),
        places
    );

    let warnings = registry.warnings();
    if !warnings.is_empty() {
        println!("{}", format!("{} warning(s):", warnings.len()).yellow());
        for warning in warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}
