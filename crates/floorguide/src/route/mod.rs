pub mod delegated;
pub mod direct;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::PathfindError;
use crate::registry::Point;

pub use delegated::{DelegatedPath, NodeIndex};
pub use direct::DirectSegment;

/// A drawable path between two places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Polyline vertices from start to end, in map coordinates.
    pub points: Vec<Point>,
    pub start_id: String,
    pub end_id: String,
}

impl Route {
    /// Total polyline length in map units.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(pair[1]))
            .sum()
    }
}

/// Which route builder a session uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteMode {
    /// Straight segment between the two markers, computed locally.
    #[default]
    Direct,
    /// Stop list computed by the remote pathfinding service.
    Delegated,
}

impl RouteMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Delegated => "delegated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct" => Some(Self::Direct),
            "delegated" => Some(Self::Delegated),
            _ => None,
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A route request rejected before any computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteRequestError {
    #[error("Choose a starting place first.")]
    MissingStart,

    #[error("Choose a destination first.")]
    MissingEnd,

    #[error("Start and destination must be different places.")]
    SameEndpoints,
}

/// Check the user's selections; returns the two ids when they form a valid request.
pub fn validate_request<'a>(
    start: Option<&'a str>,
    end: Option<&'a str>,
) -> Result<(&'a str, &'a str), RouteRequestError> {
    let start = start
        .filter(|s| !s.is_empty())
        .ok_or(RouteRequestError::MissingStart)?;
    let end = end
        .filter(|s| !s.is_empty())
        .ok_or(RouteRequestError::MissingEnd)?;
    if start == end {
        return Err(RouteRequestError::SameEndpoints);
    }
    Ok((start, end))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("Could not place '{start}' and '{end}' on floor '{floor}'.")]
    Unresolved {
        start: String,
        end: String,
        floor: String,
    },

    #[error("No path between '{start}' and '{end}'.")]
    NoPath { start: String, end: String },

    #[error(transparent)]
    Service(#[from] PathfindError),
}

/// Turns a pair of place ids into drawable geometry.
///
/// Callers validate the request (see [`validate_request`]) before building.
pub trait RouteBuilder {
    fn mode(&self) -> RouteMode;

    fn build(&self, start_id: &str, end_id: &str, floor_id: &str) -> Result<Route, RouteError>;
}
