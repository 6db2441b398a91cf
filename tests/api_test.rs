//! Route-level tests driving the axum router directly with `tower::oneshot`.

use std::net::SocketAddr;
use std::str::FromStr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::middleware;
use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use home_monitor::ip_filter::{self, AllowList};
use home_monitor::{routes, schema, Repository};

// ---

async fn test_app() -> Router {
    // ---
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    schema::create_schema(&pool).await.unwrap();
    routes::router(Repository::new(pool))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    // ---
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    // ---
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ---

#[tokio::test]
async fn room_creation_and_conflict() {
    // ---
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/room", serde_json::json!({"name": "Bedroom"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert!(body["id"].is_i64());

    // Differing case is still the same logical room
    let response = app
        .oneshot(post_json("/api/room", serde_json::json!({"name": "bedroom"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn sensor_auto_creates_room_and_plant() {
    // ---
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/sensor",
            serde_json::json!({"serial_number": 200, "room": "Kitchen", "plant": "Pothos"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The room came into existence as part of sensor registration
    let response = app
        .clone()
        .oneshot(post_json("/api/room", serde_json::json!({"name": "Kitchen"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A wetness-bearing measurement lands in the plant store, so the
    // plain-sensor average still has no data
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/measurement",
            serde_json::json!({
                "sensor_id": 200,
                "temperature": 18.0,
                "humidity": 0.4,
                "wetness": 0.6
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/api/average")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn measurement_and_average_flow() {
    // ---
    let app = test_app().await;

    app.clone()
        .oneshot(post_json(
            "/api/sensor",
            serde_json::json!({"serial_number": 100, "room": "Bedroom"}),
        ))
        .await
        .unwrap();

    for (timestamp, temperature) in [("2026-03-01T08:00:00", 20.0), ("2026-03-01T09:00:00", 22.0)]
    {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/measurement",
                serde_json::json!({
                    "sensor_id": 100,
                    "entry_timestamp": timestamp,
                    "temperature": temperature,
                    "humidity": 0.5
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Query with a different case than the room was created with
    let response = app.clone().oneshot(get("/api/average/bedroom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["average"], serde_json::json!(21.0));

    let response = app.clone().oneshot(get("/api/average/attic")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["entry_count"], serde_json::json!(2));
}

#[tokio::test]
async fn out_of_range_measurement_is_rejected_before_storage() {
    // ---
    let app = test_app().await;

    // No sensor exists at all; an in-range reading would be a 404, but the
    // bounds check fires first with a 400
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/measurement",
            serde_json::json!({"sensor_id": 1, "temperature": 80.0, "humidity": 0.5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/measurement",
            serde_json::json!({"sensor_id": 1, "temperature": 20.0, "humidity": 0.5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ip_filter_guards_the_router() {
    // ---
    let allow = AllowList::new(vec!["10.0.0.0/8".parse().unwrap()]);
    let app = test_app().await.layer(middleware::from_fn_with_state(
        allow,
        ip_filter::require_allowed_ip,
    ));

    let mut request = get("/health");
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 5], 40000))));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut request = get("/health");
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 40000))));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Loopback is always admitted
    let mut request = get("/health");
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
