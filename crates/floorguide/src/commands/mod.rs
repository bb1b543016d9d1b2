pub mod check;
pub mod completion;
pub mod config;
pub mod floors;
pub mod locate;
pub mod render;
pub mod route;

use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use crate::api::HttpPathService;
use crate::cli::RouteArgs;
use crate::config::Config;
use crate::registry::{self, Registry};
use crate::route::{DelegatedPath, DirectSegment, RouteBuilder, RouteMode};

/// The building file to load: the command-line flag, else the configured file.
/// `None` means the bundled building.
pub fn building_path<'a>(flag: Option<&'a Path>, config: &'a Config) -> Option<&'a Path> {
    flag.or(config.building.as_deref())
}

pub fn load_registry(building: Option<&Path>, config: &Config) -> anyhow::Result<&'static Registry> {
    registry::load_global(building_path(building, config))
}

/// Route mode and service URL after merging flags over config.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSettings {
    pub mode: RouteMode,
    pub api_url: Option<String>,
}

impl RouteSettings {
    pub fn resolve(args: &RouteArgs, config: &Config) -> anyhow::Result<Self> {
        let mode = args.mode.map(RouteMode::from).unwrap_or(config.route_mode());
        let api_url = args
            .api_url
            .clone()
            .or_else(|| config.api_url().map(str::to_string));
        if mode == RouteMode::Delegated && api_url.is_none() {
            anyhow::bail!(
                "Delegated routing needs a pathfinding service. Pass --api-url or run \
                 `floorguide config set route.api_url <URL>`."
            );
        }
        Ok(Self { mode, api_url })
    }
}

/// A connected route builder of either kind.
pub enum Router<'r> {
    Direct(DirectSegment<'r>),
    Delegated(DelegatedPath<HttpPathService>),
}

impl<'r> Router<'r> {
    /// Build the router; delegated mode fetches the node list once, up front.
    pub fn connect(registry: &'r Registry, settings: &RouteSettings) -> anyhow::Result<Self> {
        match (settings.mode, settings.api_url.as_deref()) {
            (RouteMode::Delegated, Some(url)) => {
                let path = DelegatedPath::connect(HttpPathService::new(url))
                    .with_context(|| format!("Failed to load nodes from {url}"))?;
                Ok(Router::Delegated(path))
            }
            _ => Ok(Router::Direct(DirectSegment::new(registry))),
        }
    }

    pub fn builder(&self) -> &dyn RouteBuilder {
        match self {
            Router::Direct(direct) => direct,
            Router::Delegated(delegated) => delegated,
        }
    }

    /// Short description for status output.
    pub fn describe(&self) -> String {
        match self {
            Router::Direct(_) => "direct".to_string(),
            Router::Delegated(d) => format!(
                "delegated via {} ({} nodes)",
                d.service().base_url(),
                d.index().len()
            ),
        }
    }
}

pub fn print_version() {
    println!(
        "{} {}",
        env!("CARGO_PKG_NAME").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION").dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ModeArg;
    use crate::config::RouteConfig;

    #[test]
    fn test_building_path_precedence() {
        let flag = Path::new("/tmp/flag.yaml");
        let configured = Config {
            building: Some("/srv/configured.yaml".into()),
            ..Config::default()
        };

        assert_eq!(building_path(Some(flag), &configured), Some(flag));
        assert_eq!(
            building_path(None, &configured),
            Some(Path::new("/srv/configured.yaml"))
        );
        assert_eq!(building_path(Some(flag), &Config::default()), Some(flag));
        assert_eq!(building_path(None, &Config::default()), None);
    }

    #[test]
    fn test_no_building_loads_bundled() {
        let registry = load_registry(None, &Config::default()).unwrap();
        assert!(std::ptr::eq(registry, Registry::builtin()));
    }

    #[test]
    fn test_settings_default_to_direct() {
        let settings = RouteSettings::resolve(&RouteArgs::default(), &Config::default()).unwrap();
        assert_eq!(settings.mode, RouteMode::Direct);
        assert_eq!(settings.api_url, None);
    }

    #[test]
    fn test_settings_flag_overrides_config() {
        let config = Config {
            route: Some(RouteConfig {
                mode: Some(RouteMode::Delegated),
                api_url: Some("http://config.example".to_string()),
            }),
            ..Config::default()
        };
        let args = RouteArgs {
            mode: Some(ModeArg::Direct),
            api_url: None,
        };
        let settings = RouteSettings::resolve(&args, &config).unwrap();
        assert_eq!(settings.mode, RouteMode::Direct);
        assert_eq!(settings.api_url.as_deref(), Some("http://config.example"));
    }

    #[test]
    fn test_settings_delegated_needs_url() {
        let args = RouteArgs {
            mode: Some(ModeArg::Delegated),
            api_url: None,
        };
        assert!(RouteSettings::resolve(&args, &Config::default()).is_err());
    }

    #[test]
    fn test_direct_router() {
        let settings = RouteSettings {
            mode: RouteMode::Direct,
            api_url: None,
        };
        let router = Router::connect(Registry::builtin(), &settings).unwrap();
        assert_eq!(router.builder().mode(), RouteMode::Direct);
        assert_eq!(router.describe(), "direct");
    }
}
