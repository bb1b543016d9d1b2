use std::collections::HashMap;

use super::{Route, RouteBuilder, RouteError, RouteMode};
use crate::api::{NodeRecord, PathService, PathfindError};
use crate::registry::Point;

/// Service nodes keyed by `node_id`, fetched once per session.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    nodes: HashMap<String, NodeRecord>,
}

impl NodeIndex {
    /// Index a node list. A repeated `node_id` keeps its last record.
    pub fn from_records(records: Vec<NodeRecord>) -> Self {
        let nodes = records
            .into_iter()
            .map(|n| (n.node_id.clone(), n))
            .collect();
        Self { nodes }
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeRecord> {
        self.nodes.get(node_id)
    }

    pub fn point(&self, node_id: &str) -> Option<Point> {
        self.get(node_id).map(|n| Point::new(n.x, n.y))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Map a stop list to polyline points, keeping its order and any repeats.
///
/// `None` if the list has fewer than two stops or any stop is unknown.
pub fn path_points(index: &NodeIndex, path: &[String]) -> Option<Vec<Point>> {
    if path.len() < 2 {
        return None;
    }
    path.iter().map(|id| index.point(id)).collect()
}

/// Route builder backed by the remote pathfinding service.
pub struct DelegatedPath<S> {
    index: NodeIndex,
    service: S,
}

impl<S: PathService> DelegatedPath<S> {
    pub fn new(index: NodeIndex, service: S) -> Self {
        Self { index, service }
    }

    /// Fetch the node list and build the index.
    pub fn connect(service: S) -> Result<Self, PathfindError> {
        let index = NodeIndex::from_records(service.nodes()?);
        if index.is_empty() {
            tracing::warn!("pathfinding service has no nodes; every route will fail");
        } else {
            tracing::info!(nodes = index.len(), "loaded pathfinding nodes");
        }
        Ok(Self::new(index, service))
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: PathService> RouteBuilder for DelegatedPath<S> {
    fn mode(&self) -> RouteMode {
        RouteMode::Delegated
    }

    fn build(&self, start_id: &str, end_id: &str, floor_id: &str) -> Result<Route, RouteError> {
        let path = self.service.pathfind(start_id, end_id).inspect_err(|e| {
            tracing::warn!(start_id, end_id, "pathfinding failed: {e}");
        })?;

        let off_floor = path
            .iter()
            .filter_map(|id| self.index.get(id))
            .filter(|n| n.floor != floor_id)
            .count();
        if off_floor > 0 {
            tracing::debug!(floor_id, off_floor, "path leaves the displayed floor");
        }

        let points = path_points(&self.index, &path).ok_or_else(|| {
            tracing::warn!(start_id, end_id, stops = path.len(), "unusable stop list");
            RouteError::NoPath {
                start: start_id.to_string(),
                end: end_id.to_string(),
            }
        })?;

        Ok(Route {
            points,
            start_id: start_id.to_string(),
            end_id: end_id.to_string(),
        })
    }
}
