//! Monitoring statistics endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::Result;
use crate::Repository;

// ---

pub fn router() -> Router<Repository> {
    // ---
    Router::new().route("/api/stats", get(stats))
}

#[derive(Serialize)]
struct StatsOut {
    entry_count: i64,
}

/// Handle `GET /api/stats`: how many plain-sensor readings have been
/// recorded so far.
async fn stats(State(repo): State<Repository>) -> Result<Json<StatsOut>> {
    // ---
    let entry_count = repo.count_entries().await?;
    Ok(Json(StatsOut { entry_count }))
}
