use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    println!("{} {}", "Config file:".bold(), path.display());
    println!();
    println!(
        "{} {}",
        "building:".bold(),
        config
            .building
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(bundled)".dimmed().to_string())
    );
    println!("{} {}", "defaults.theme:".bold(), config.theme());
    println!("{} {}", "route.mode:".bold(), config.route_mode());
    println!(
        "{} {}",
        "route.api_url:".bold(),
        config
            .api_url()
            .map(str::to_string)
            .unwrap_or_else(|| "(not set)".dimmed().to_string())
    );
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Set".green().bold());
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}
