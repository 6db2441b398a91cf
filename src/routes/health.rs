// src/routes/health.rs
//! Welcome and health-check endpoints.
//!
//! `/` greets whoever points a browser at the server; `/health` is for
//! container orchestrators and CI pipelines to verify the service responds.
//! Both are deliberately lightweight and do not touch the database, so they
//! stay generic over the application state and merge cleanly into the
//! gateway router.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON response body for the `/` endpoint.
#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

async fn index() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to your home monitoring server",
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create a subrouter containing the `/` and `/health` routes.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}
