mod delegated;

use std::cell::RefCell;

use super::{DelegatedPath, NodeIndex, Route, RouteBuilder, RouteError};
use crate::api::{NodeRecord, PathService, PathfindError};
use crate::registry::{Point, Registry};

/// Helper to create a NodeRecord.
fn node(id: &str, floor: &str, x: f64, y: f64) -> NodeRecord {
    NodeRecord {
        node_id: id.to_string(),
        name: id.to_string(),
        floor: floor.to_string(),
        x,
        y,
    }
}

/// Helper to create an owned stop list.
fn stops(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// In-memory stand-in for the pathfinding service.
///
/// Replies with a canned result and records every request it receives.
struct FakeService {
    nodes: Vec<NodeRecord>,
    reply: Result<Vec<String>, PathfindError>,
    requests: RefCell<Vec<(String, String)>>,
}

impl FakeService {
    fn replying(reply: Result<Vec<String>, PathfindError>) -> Self {
        Self {
            nodes: corridor(),
            reply,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl PathService for FakeService {
    fn nodes(&self) -> Result<Vec<NodeRecord>, PathfindError> {
        Ok(self.nodes.clone())
    }

    fn pathfind(&self, start: &str, end: &str) -> Result<Vec<String>, PathfindError> {
        self.requests
            .borrow_mut()
            .push((start.to_string(), end.to_string()));
        self.reply.clone()
    }
}

/// Room1 -> hall -> corner -> Room2 on the first floor, plus a stairwell on 2F.
fn corridor() -> Vec<NodeRecord> {
    vec![
        node("1F-1", "1F", 100.0, 150.0),
        node("1F-H1", "1F", 100.0, 230.0),
        node("1F-H2", "1F", 275.0, 230.0),
        node("1F-2", "1F", 275.0, 80.0),
        node("2F-S", "2F", 500.0, 40.0),
    ]
}

/// A delegated builder whose service answers every request with `reply`.
fn delegated(reply: Result<Vec<String>, PathfindError>) -> DelegatedPath<FakeService> {
    DelegatedPath::connect(FakeService::replying(reply)).unwrap()
}

/// Assert that a build succeeded and return the route.
fn expect_route(result: Result<Route, RouteError>) -> Route {
    match result {
        Ok(route) => route,
        Err(e) => panic!("route should have been built: {e}"),
    }
}

fn builtin() -> &'static Registry {
    Registry::builtin()
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}
