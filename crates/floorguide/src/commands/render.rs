use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{RouteSettings, Router};
use crate::cli::{NavArgs, RouteArgs};
use crate::config::Config;
use crate::session::Session;
use crate::svg;

/// Render the floor a navigation request lands on, optionally with a route.
pub fn run(
    building: Option<&Path>,
    nav: &NavArgs,
    route: Option<&[String]>,
    args: &RouteArgs,
    output: Option<&Path>,
) -> Result<()> {
    let config = Config::load_or_default();
    let registry = super::load_registry(building, &config)?;

    let mut session = Session::from_params(registry, &nav.params());
    if session.floor().is_none() {
        anyhow::bail!("Nothing to render: the navigation parameters do not name a known floor.");
    }

    if let Some([start, end]) = route {
        let settings = RouteSettings::resolve(args, &config)?;
        let router = Router::connect(registry, &settings)?;
        session.select_start(Some(start.as_str()));
        session.select_end(Some(end.as_str()));
        if !session.find_route(router.builder()) {
            let message = session.message().unwrap_or("Route could not be built.");
            anyhow::bail!("{message}");
        }
    }

    let Some(document) = svg::render_session(&session) else {
        anyhow::bail!("Nothing to render.");
    };

    match output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if let Some(status) = session.status_line() {
                eprintln!("{status}");
            }
            eprintln!("{}", format!("Saved {}", path.display()).green());
        }
        None => print!("{document}"),
    }
    Ok(())
}
