//! Average-temperature query endpoint.

use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::Repository;

// ---

pub fn router() -> Router<Repository> {
    // ---
    Router::new()
        .route("/api/average", get(average_all))
        .route("/api/average/{room_name}", get(average_for_room))
}

#[derive(Serialize)]
struct AverageOut {
    average: f64,
}

/// Handle `GET /api/average`: mean temperature over all plain-sensor
/// readings. 404 when no readings exist; an average of exactly 0 is a
/// valid 200.
async fn average_all(State(repo): State<Repository>) -> Result<Json<AverageOut>> {
    // ---
    info!("GET /api/average - all rooms");

    let average = repo.get_average_temperature(None).await?;
    Ok(Json(AverageOut {
        average: round2(average),
    }))
}

/// Handle `GET /api/average/{room_name}`: mean temperature restricted to
/// one room, matched case-insensitively.
async fn average_for_room(
    State(repo): State<Repository>,
    Path(room_name): Path<String>,
) -> Result<Json<AverageOut>> {
    // ---
    info!("GET /api/average - room {room_name}");

    let room = repo
        .get_room(&room_name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("room {room_name}")))?;

    let average = repo.get_average_temperature(Some(&room)).await?;
    Ok(Json(AverageOut {
        average: round2(average),
    }))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
