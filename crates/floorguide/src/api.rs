//! Client for the remote pathfinding service.
//!
//! The service owns the walkable graph. We only read its node list once and ask
//! it for ordered stop lists between two node ids:
//!
//! * `GET {base}/nodes/` returns `[{node_id, name, floor, x, y}, ...]`
//! * `GET {base}/pathfind/?start=A&end=B` returns `{"path": [...]}` on success,
//!   or `{"error": "..."}` with a non-2xx status.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure talking to the pathfinding service.
///
/// The `Display` form is what the user sees, so service messages pass through verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathfindError {
    #[error("Could not reach the pathfinding service: {0}")]
    Transport(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Malformed response from the pathfinding service: {0}")]
    Malformed(String),
}

/// A graph node as published by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub node_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "id_from_text_or_number")]
    pub floor: String,

    pub x: f64,
    pub y: f64,
}

/// The remote half of the delegated route builder.
pub trait PathService {
    /// Fetch every node the service knows about.
    fn nodes(&self) -> Result<Vec<NodeRecord>, PathfindError>;

    /// Ask for the ordered stop list from `start` to `end`, both inclusive.
    fn pathfind(&self, start: &str, end: &str) -> Result<Vec<String>, PathfindError>;
}

/// Blocking HTTP implementation of [`PathService`].
pub struct HttpPathService {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpPathService {
    pub fn new(base_url: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<(u16, String), PathfindError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, ?query, "pathfinding service request");

        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let mut response = request
            .call()
            .map_err(|e| PathfindError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| PathfindError::Transport(e.to_string()))?;
        tracing::debug!(status, bytes = body.len(), "pathfinding service response");
        Ok((status, body))
    }
}

impl PathService for HttpPathService {
    fn nodes(&self) -> Result<Vec<NodeRecord>, PathfindError> {
        let (status, body) = self.get("/nodes/", &[])?;
        interpret_nodes(status, &body)
    }

    fn pathfind(&self, start: &str, end: &str) -> Result<Vec<String>, PathfindError> {
        let (status, body) = self.get("/pathfind/", &[("start", start), ("end", end)])?;
        interpret_pathfind(status, &body)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct PathBody {
    #[serde(deserialize_with = "ids_from_text_or_number")]
    path: Vec<String>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Turn a non-2xx response into an error, preferring the server's own message.
fn status_error(status: u16, body: &str) -> PathfindError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => err.error,
        Err(_) => format!("Pathfinding service returned HTTP {status}"),
    };
    PathfindError::Status { status, message }
}

/// Interpret a `/pathfind/` response.
///
/// Non-2xx is always a failure, whatever the body says; a 2xx body without a
/// well-formed `path` array is malformed rather than partially used.
pub fn interpret_pathfind(status: u16, body: &str) -> Result<Vec<String>, PathfindError> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    serde_json::from_str::<PathBody>(body)
        .map(|b| b.path)
        .map_err(|e| PathfindError::Malformed(e.to_string()))
}

/// Interpret a `/nodes/` response.
pub fn interpret_nodes(status: u16, body: &str) -> Result<Vec<NodeRecord>, PathfindError> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    serde_json::from_str(body).map_err(|e| PathfindError::Malformed(e.to_string()))
}

/// Node ids arrive as strings from some backends and as integers from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn id_from_text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    RawId::deserialize(d).map(String::from)
}

fn ids_from_text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Vec::<RawId>::deserialize(d).map(|ids| ids.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathfind_success() {
        let path = interpret_pathfind(200, r#"{"path": ["A", "B", "C"]}"#).unwrap();
        assert_eq!(path, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_pathfind_numeric_ids() {
        let path = interpret_pathfind(200, r#"{"path": [1, 7, 3]}"#).unwrap();
        assert_eq!(path, vec!["1", "7", "3"]);
    }

    #[test]
    fn test_pathfind_error_message_verbatim() {
        let err = interpret_pathfind(404, r#"{"error": "no route"}"#).unwrap_err();
        assert_eq!(
            err,
            PathfindError::Status {
                status: 404,
                message: "no route".to_string(),
            }
        );
        assert_eq!(err.to_string(), "no route");
    }

    #[test]
    fn test_pathfind_error_without_body() {
        let err = interpret_pathfind(500, "Internal Server Error").unwrap_err();
        assert_eq!(err.to_string(), "Pathfinding service returned HTTP 500");
    }

    #[test]
    fn test_pathfind_non_2xx_ignores_path_in_body() {
        let err = interpret_pathfind(400, r#"{"path": ["A", "B"]}"#).unwrap_err();
        assert!(matches!(err, PathfindError::Status { status: 400, .. }));
    }

    #[test]
    fn test_pathfind_malformed_success_body() {
        let err = interpret_pathfind(200, r#"{"route": ["A", "B"]}"#).unwrap_err();
        assert!(matches!(err, PathfindError::Malformed(_)));

        let err = interpret_pathfind(200, r#"{"path": ["A", null]}"#).unwrap_err();
        assert!(matches!(err, PathfindError::Malformed(_)));
    }

    #[test]
    fn test_nodes_success() {
        let body = r#"[
            {"node_id": "1F-1", "name": "Room1", "floor": "1F", "x": 100, "y": 150},
            {"node_id": 42, "name": "Hall", "floor": 1, "x": 12.5, "y": 80}
        ]"#;
        let nodes = interpret_nodes(200, body).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].node_id, "1F-1");
        assert_eq!(nodes[1].node_id, "42");
        assert_eq!(nodes[1].floor, "1");
        assert_eq!(nodes[1].x, 12.5);
    }

    #[test]
    fn test_nodes_failure() {
        let err = interpret_nodes(503, r#"{"error": "maintenance"}"#).unwrap_err();
        assert_eq!(err.to_string(), "maintenance");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let service = HttpPathService::new("http://localhost:8000/api/");
        assert_eq!(service.base_url(), "http://localhost:8000/api");
    }
}
