use super::*;
use crate::route::RouteMode;
use crate::route::delegated::path_points;

#[test]
fn polyline_follows_service_order() {
    let builder = delegated(Ok(stops(&["1F-1", "1F-H1", "1F-H2", "1F-2"])));
    assert_eq!(builder.mode(), RouteMode::Delegated);
    let route = expect_route(builder.build("1F-1", "1F-2", "1F"));
    assert_eq!(
        route.points,
        vec![
            pt(100.0, 150.0),
            pt(100.0, 230.0),
            pt(275.0, 230.0),
            pt(275.0, 80.0),
        ]
    );
    assert_eq!(route.start_id, "1F-1");
    assert_eq!(route.end_id, "1F-2");
}

#[test]
fn order_is_not_corrected() {
    // A nonsensical order is still drawn as received.
    let builder = delegated(Ok(stops(&["1F-2", "1F-H1", "1F-1"])));
    let route = expect_route(builder.build("1F-1", "1F-2", "1F"));
    assert_eq!(
        route.points,
        vec![pt(275.0, 80.0), pt(100.0, 230.0), pt(100.0, 150.0)]
    );
}

#[test]
fn repeated_stops_are_kept() {
    let builder = delegated(Ok(stops(&["1F-1", "1F-H1", "1F-H1", "1F-2"])));
    let route = expect_route(builder.build("1F-1", "1F-2", "1F"));
    assert_eq!(route.points.len(), 4);
    assert_eq!(route.points[1], route.points[2]);
}

#[test]
fn off_floor_stops_are_still_drawn() {
    let builder = delegated(Ok(stops(&["1F-1", "2F-S"])));
    let route = expect_route(builder.build("1F-1", "2F-S", "1F"));
    assert_eq!(route.points, vec![pt(100.0, 150.0), pt(500.0, 40.0)]);
}

#[test]
fn single_stop_is_no_path() {
    let builder = delegated(Ok(stops(&["1F-1"])));
    let err = builder.build("1F-1", "1F-2", "1F").unwrap_err();
    assert!(matches!(err, RouteError::NoPath { .. }));
}

#[test]
fn empty_path_is_no_path() {
    let builder = delegated(Ok(Vec::new()));
    let err = builder.build("1F-1", "1F-2", "1F").unwrap_err();
    assert!(matches!(err, RouteError::NoPath { .. }));
}

#[test]
fn unknown_stop_discards_whole_path() {
    let builder = delegated(Ok(stops(&["1F-1", "1F-GHOST", "1F-2"])));
    let err = builder.build("1F-1", "1F-2", "1F").unwrap_err();
    assert_eq!(
        err,
        RouteError::NoPath {
            start: "1F-1".to_string(),
            end: "1F-2".to_string(),
        }
    );
}

#[test]
fn service_error_is_surfaced_verbatim() {
    let builder = delegated(Err(PathfindError::Status {
        status: 404,
        message: "no route".to_string(),
    }));
    let err = builder.build("1F-1", "1F-2", "1F").unwrap_err();
    assert_eq!(err.to_string(), "no route");
}

#[test]
fn failures_are_not_retried() {
    let builder = delegated(Err(PathfindError::Transport("connection refused".to_string())));
    assert!(builder.build("1F-1", "1F-2", "1F").is_err());
    assert_eq!(builder_service_requests(&builder), 1);
}

#[test]
fn connect_indexes_nodes() {
    let builder = delegated(Ok(Vec::new()));
    assert_eq!(builder.index().len(), 5);
    assert_eq!(builder.index().point("1F-H2"), Some(pt(275.0, 230.0)));
    assert!(builder.index().get("9F-1").is_none());
}

#[test]
fn service_without_nodes_connects_but_finds_nothing() {
    let mut service = FakeService::replying(Ok(stops(&["1F-1", "1F-2"])));
    service.nodes.clear();
    let builder = DelegatedPath::connect(service).unwrap();
    assert!(builder.index().is_empty());
    assert!(matches!(
        builder.build("1F-1", "1F-2", "1F"),
        Err(RouteError::NoPath { .. })
    ));
}

#[test]
fn index_keeps_last_duplicate() {
    let index = NodeIndex::from_records(vec![
        node("A", "1F", 1.0, 1.0),
        node("A", "1F", 2.0, 2.0),
    ]);
    assert_eq!(index.len(), 1);
    assert_eq!(index.point("A"), Some(pt(2.0, 2.0)));
}

#[test]
fn path_points_requires_two_stops() {
    let index = NodeIndex::from_records(corridor());
    assert!(path_points(&index, &stops(&["1F-1"])).is_none());
    assert_eq!(
        path_points(&index, &stops(&["1F-1", "1F-2"])),
        Some(vec![pt(100.0, 150.0), pt(275.0, 80.0)])
    );
}

fn builder_service_requests(builder: &DelegatedPath<FakeService>) -> usize {
    builder.service().request_count()
}
