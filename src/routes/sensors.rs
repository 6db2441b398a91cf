//! Sensor registration endpoint.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::NewSensor;
use crate::Repository;

// ---

pub fn router() -> Router<Repository> {
    // ---
    Router::new().route("/api/sensor", post(create_sensor))
}

/// Request body for `POST /api/sensor`.
///
/// A sensor must carry a serial number and a room name; `plant` is
/// optional. Its presence decides the sensor class: with a plant name the
/// sensor is registered as a plant sensor, otherwise as a plain room
/// sensor.
#[derive(Debug, Deserialize)]
struct SensorIn {
    serial_number: i64,
    room: String,
    plant: Option<String>,
}

#[derive(Serialize)]
struct SensorCreated {
    id: i64,
    message: String,
}

/// Handle `POST /api/sensor`.
///
/// An unknown room is created on the fly; so is an unknown plant, under
/// that room. The serial number must be unique within the sensor class.
async fn create_sensor(
    State(repo): State<Repository>,
    Json(body): Json<SensorIn>,
) -> Result<(StatusCode, Json<SensorCreated>)> {
    // ---
    info!(
        "POST /api/sensor - serial {} in room {}",
        body.serial_number, body.room
    );

    let room = match repo.get_room(&body.room).await? {
        Some(room) => room,
        None => repo.add_room(&body.room).await?,
    };

    let serial = match &body.plant {
        Some(plant_name) => {
            let plant = match repo.get_plant(plant_name).await? {
                Some(plant) => plant,
                None => repo.add_plant(plant_name, room.id).await?,
            };
            repo.add_sensor(NewSensor::Plant {
                serial_number: body.serial_number,
                plant_id: plant.id,
            })
            .await?
        }
        None => {
            repo.add_sensor(NewSensor::Room {
                serial_number: body.serial_number,
                room_id: room.id,
            })
            .await?
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(SensorCreated {
            id: serial,
            message: format!("Sensor {serial} was created."),
        }),
    ))
}
