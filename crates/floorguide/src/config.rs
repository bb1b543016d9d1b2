use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::route::RouteMode;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "floorguide";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Building file to load instead of the bundled demo building.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RouteMode>,

    /// Base URL of the pathfinding service, e.g. `http://localhost:8000/api`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `floorguide config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# floorguide configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("dark")
    }

    pub fn route_mode(&self) -> RouteMode {
        self.route
            .as_ref()
            .and_then(|r| r.mode)
            .unwrap_or_default()
    }

    pub fn api_url(&self) -> Option<&str> {
        self.route.as_ref().and_then(|r| r.api_url.as_deref())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "building" => {
                self.building = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "route.mode" => {
                let Some(mode) = RouteMode::parse(value) else {
                    anyhow::bail!("Invalid route mode: {value}. Must be 'direct' or 'delegated'.");
                };
                self.route.get_or_insert_with(RouteConfig::default).mode = Some(mode);
            }
            "route.api_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!(
                        "Invalid api_url: {value}. Must start with 'http://' or 'https://'."
                    );
                }
                self.route.get_or_insert_with(RouteConfig::default).api_url =
                    Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: building, defaults.theme, route.mode, route.api_url"
            ),
        }
        Ok(())
    }
}
