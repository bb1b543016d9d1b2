use super::{Route, RouteBuilder, RouteError, RouteMode};
use crate::registry::Registry;

/// Connects two markers on one floor with a straight segment.
///
/// No obstacle avoidance; a graph search can replace this behind [`RouteBuilder`].
pub struct DirectSegment<'r> {
    registry: &'r Registry,
}

impl<'r> DirectSegment<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// `[start.marker, end.marker]`, or `None` if either place is not on `floor_id`.
    pub fn build_route(&self, start_id: &str, end_id: &str, floor_id: &str) -> Option<Route> {
        let floor = self.registry.floor(floor_id)?;
        let start = floor.place(start_id)?;
        let end = floor.place(end_id)?;
        Some(Route {
            points: vec![start.marker, end.marker],
            start_id: start_id.to_string(),
            end_id: end_id.to_string(),
        })
    }
}

impl RouteBuilder for DirectSegment<'_> {
    fn mode(&self) -> RouteMode {
        RouteMode::Direct
    }

    fn build(&self, start_id: &str, end_id: &str, floor_id: &str) -> Result<Route, RouteError> {
        let route = self.build_route(start_id, end_id, floor_id);
        tracing::debug!(start_id, end_id, floor_id, found = route.is_some(), "direct route");
        route.ok_or_else(|| RouteError::Unresolved {
            start: start_id.to_string(),
            end: end_id.to_string(),
            floor: floor_id.to_string(),
        })
    }
}
