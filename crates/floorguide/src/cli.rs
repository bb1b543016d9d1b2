use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::query::NavParams;
use crate::route::RouteMode;

#[derive(Parser)]
#[command(name = "floorguide")]
#[command(author, version, about)]
#[command(long_about = "Indoor wayfinding maps driven by scanned location codes.\n\n\
    Each place in a building has a location code like `1F-2` (floor `1F`, place 2).\n\
    Opening a code shows its floor with a \"you are here\" marker; two places on a\n\
    floor can be connected with a route.\n\n\
    Examples:\n  \
    floorguide                          Open the viewer on the floor menu\n  \
    floorguide --loc 1F-2               Open the viewer as if 1F-2 was scanned\n  \
    floorguide --query '?floor=3F'      Open the viewer from a QR payload\n  \
    floorguide route 1F-1 1F-3          Print a route between two places\n  \
    floorguide render --loc 2F-1 -o map.svg")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub nav: NavArgs,

    #[command(flatten)]
    pub routing: RouteArgs,

    /// Open in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Building file (YAML) to use instead of the bundled demo building
    #[arg(long, global = true, value_name = "FILE")]
    pub building: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Where a session starts. Mirrors the `loc` and `floor` URL parameters.
#[derive(Args, Debug, Clone, Default)]
pub struct NavArgs {
    /// Location code to open, as if it had been scanned (e.g. 1F-2)
    #[arg(long, value_name = "LOC_ID")]
    pub loc: Option<String>,

    /// Floor to open without a highlighted place (ignored when --loc is given)
    #[arg(long, value_name = "FLOOR_ID")]
    pub floor: Option<String>,

    /// Raw query string such as '?loc=1F-2', e.g. a scanned QR payload
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["loc", "floor"])]
    pub query: Option<String>,
}

impl NavArgs {
    pub fn params(&self) -> NavParams {
        match &self.query {
            Some(query) => NavParams::parse(query),
            None => NavParams {
                loc: self.loc.clone().filter(|s| !s.is_empty()),
                floor: self.floor.clone().filter(|s| !s.is_empty()),
            },
        }
    }
}

/// Route builder selection. Unset values come from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct RouteArgs {
    /// How routes are computed
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Base URL of the pathfinding service (delegated mode)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Straight line between the two markers
    Direct,
    /// Ask the pathfinding service for the stops
    Delegated,
}

impl From<ModeArg> for RouteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => RouteMode::Direct,
            ModeArg::Delegated => RouteMode::Delegated,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List floors and their places
    Floors,

    /// Resolve a location code to its floor and place
    Locate {
        /// Location code, e.g. 1F-2
        loc_id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Build a route between two places
    Route {
        /// Starting place id
        start: String,

        /// Destination place id
        end: String,

        /// Floor to route on (defaults to the start's floor)
        #[arg(long)]
        floor: Option<String>,

        #[command(flatten)]
        routing: RouteArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a floor map as SVG
    Render {
        #[command(flatten)]
        nav: NavArgs,

        /// Draw a route between two places on the rendered floor
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        route: Option<Vec<String>>,

        #[command(flatten)]
        routing: RouteArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a building file
    Check {
        /// Building file (defaults to the configured or bundled building)
        file: Option<PathBuf>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (building, defaults.theme, route.mode, route.api_url)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let building = self.building;
        match self.command {
            Some(Commands::Floors) => crate::commands::floors::run(building.as_deref()),
            Some(Commands::Locate { loc_id, json }) => {
                crate::commands::locate::run(building.as_deref(), &loc_id, json)
            }
            Some(Commands::Route {
                start,
                end,
                floor,
                routing,
                json,
            }) => crate::commands::route::run(
                building.as_deref(),
                &start,
                &end,
                floor.as_deref(),
                &routing,
                json,
            ),
            Some(Commands::Render {
                nav,
                route,
                routing,
                output,
            }) => crate::commands::render::run(
                building.as_deref(),
                &nav,
                route.as_deref(),
                &routing,
                output.as_deref(),
            ),
            Some(Commands::Check { file }) => {
                crate::commands::check::run(file.or(building).as_deref())
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => crate::app::run(
                building.as_deref(),
                &self.nav.params(),
                &self.routing,
                self.windowed,
            ),
        }
    }
}
