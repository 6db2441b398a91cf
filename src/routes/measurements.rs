//! Measurement ingestion endpoint.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::measurement::{parse_measurement, MeasurementIn};
use crate::Repository;

// ---

pub fn router() -> Router<Repository> {
    // ---
    Router::new().route("/api/measurement", post(add_measurement))
}

#[derive(Serialize)]
struct MeasurementRecorded {
    message: String,
}

/// Handle `POST /api/measurement`.
///
/// Required fields: `sensor_id`, `temperature`, `humidity`. Optional:
/// `entry_timestamp` (epoch seconds or ISO datetime; the reading is stamped
/// at receipt time when missing or unparseable) and `wetness` (only plant
/// sensors report it; its presence routes the reading to the plant entry
/// table).
async fn add_measurement(
    State(repo): State<Repository>,
    Json(body): Json<MeasurementIn>,
) -> Result<(StatusCode, Json<MeasurementRecorded>)> {
    // ---
    debug!("POST /api/measurement - sensor {}", body.sensor_id);

    // Bounds and timestamp are checked before any storage call
    let reading = parse_measurement(&body)?;
    let sensor_id = repo.add_data_entry(&reading).await?;

    Ok((
        StatusCode::CREATED,
        Json(MeasurementRecorded {
            message: format!("Measurement recorded for sensor {sensor_id}"),
        }),
    ))
}
