use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use osmbound_server::{
    cache::TtlCache,
    config::HttpConfig,
    overpass::{ElementSource, FetchError},
    pool::{FetchPool, RetryPolicy},
    routes::router,
    service::BoundaryService,
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

const VIEWPORT: &str = "minLat=42.0&maxLat=42.2&minLng=-72.7&maxLng=-72.4";

/// In-memory Overpass stand-in returning a fixed response
struct StubOverpass {
    response: Result<Value, FetchError>,
    queries: std::sync::Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StubOverpass {
    fn new(response: Result<Value, FetchError>) -> Self {
        Self {
            response,
            queries: std::sync::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ElementSource for StubOverpass {
    async fn fetch(&self, query: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        self.response.clone()
    }
}

fn town_response() -> Value {
    json!({
        "version": 0.6,
        "elements": [
            {"type": "way", "id": 10, "nodes": [1, 2, 3],
             "tags": {"boundary": "administrative", "name": "Test Town"}},
            {"type": "node", "id": 1, "lon": -72.6, "lat": 42.1},
            {"type": "node", "id": 2, "lon": -72.5, "lat": 42.1},
            {"type": "node", "id": 3, "lon": -72.5, "lat": 42.0}
        ]
    })
}

fn setup(stub: StubOverpass) -> (Router, Arc<BoundaryService<StubOverpass>>) {
    let pool = FetchPool::new(
        stub,
        5,
        RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(1),
        },
    );
    let service = Arc::new(BoundaryService::new(
        pool,
        TtlCache::new(Duration::from_secs(60)),
    ));
    (router(Arc::clone(&service), &HttpConfig::default()), service)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup(StubOverpass::new(Ok(json!({}))));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_bounds_are_rejected() {
    let (app, service) = setup(StubOverpass::new(Ok(town_response())));

    let (status, body) = get(
        &app,
        "/api/boundaries/neighborhoods?minLat=42.0&maxLat=42.2&minLng=-72.7",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameters");
    assert_eq!(
        body["required"],
        json!(["minLat", "maxLat", "minLng", "maxLng"])
    );
    assert_eq!(service.pool().source().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_numeric_or_inverted_bounds_are_rejected() {
    let (app, _) = setup(StubOverpass::new(Ok(town_response())));

    let (status, body) = get(
        &app,
        "/api/boundaries/zipcodes?minLat=north&maxLat=42.2&minLng=-72.7&maxLng=-72.4",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("minLat"));

    let (status, _) = get(
        &app,
        "/api/boundaries/zipcodes?minLat=42.2&maxLat=42.0&minLng=-72.7&maxLng=-72.4",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn neighborhoods_are_assembled_and_cached() {
    let (app, service) = setup(StubOverpass::new(Ok(town_response())));
    let uri = format!("/api/boundaries/neighborhoods?{VIEWPORT}");

    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "FeatureCollection");
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["name"], "Test Town");
    assert_eq!(features[0]["properties"]["type"], "neighborhood");

    let (status, cached) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached, body);

    let stub = service.pool().source();
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    let queries = stub.queries.lock().unwrap();
    assert!(queries[0].contains(r#"relation["boundary"="administrative"](42,-72.7,42.2,-72.4);"#));
}

#[tokio::test]
async fn zipcodes_use_postal_code_query_and_properties() {
    let response = json!({
        "elements": [
            {"type": "relation", "id": 77, "members": [{"type": "way", "ref": 10, "role": "outer"}],
             "tags": {"boundary": "postal_code", "postal_code": "01103"}},
            {"type": "way", "id": 10, "nodes": [1, 2, 3, 1]},
            {"type": "node", "id": 1, "lon": -72.6, "lat": 42.1},
            {"type": "node", "id": 2, "lon": -72.5, "lat": 42.1},
            {"type": "node", "id": 3, "lon": -72.5, "lat": 42.0}
        ]
    });
    let (app, service) = setup(StubOverpass::new(Ok(response)));

    let (status, body) = get(&app, &format!("/api/boundaries/zipcodes?{VIEWPORT}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"][0]["properties"]["zipcode"], "01103");
    assert_eq!(body["features"][0]["properties"]["type"], "zipcode");

    let queries = service.pool().source().queries.lock().unwrap();
    assert!(queries[0].contains(r#"way["boundary"="postal_code"]"#));
}

#[tokio::test]
async fn empty_results_are_not_cached() {
    let (app, service) = setup(StubOverpass::new(Ok(json!({"elements": []}))));
    let uri = format!("/api/boundaries/neighborhoods?{VIEWPORT}");

    for _ in 0..2 {
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["features"], json!([]));
    }

    assert_eq!(service.pool().source().calls.load(Ordering::SeqCst), 2);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_reported_after_retries() {
    let (app, service) = setup(StubOverpass::new(Err(FetchError::Status(504))));

    let (status, body) = get(&app, &format!("/api/boundaries/zipcodes?{VIEWPORT}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch ZIP code boundaries"}));
    assert_eq!(service.pool().source().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn malformed_upstream_body_is_a_server_error() {
    let (app, _) = setup(StubOverpass::new(Ok(json!({"elements": {"not": "an array"}}))));

    let (status, body) = get(&app, &format!("/api/boundaries/neighborhoods?{VIEWPORT}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch neighborhood boundaries");
}

#[tokio::test(start_paused = true)]
async fn expired_viewports_are_purged_in_the_background() {
    let (app, service) = setup(StubOverpass::new(Ok(town_response())));
    let purge = service.spawn_cache_purge(Duration::from_secs(30));

    for min_lat in ["41.7", "41.8", "41.9"] {
        let uri = format!(
            "/api/boundaries/neighborhoods?minLat={min_lat}&maxLat=42.2&minLng=-72.7&maxLng=-72.4"
        );
        let (status, _) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(service.cache().len(), 3);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(service.cache().is_empty());

    drop(app);
    drop(service);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(purge.is_finished());
}
