//! Room creation endpoint.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::Repository;

// ---

pub fn router() -> Router<Repository> {
    // ---
    Router::new().route("/api/room", post(create_room))
}

/// Request body for `POST /api/room`; a room only needs a name.
#[derive(Debug, Deserialize)]
struct RoomIn {
    name: String,
}

#[derive(Serialize)]
struct RoomCreated {
    id: i64,
    message: String,
}

/// Handle `POST /api/room`.
///
/// The room name must be unique, case-insensitively: once `Living-Room`
/// exists, `living-room` is rejected with 409.
async fn create_room(
    State(repo): State<Repository>,
    Json(body): Json<RoomIn>,
) -> Result<(StatusCode, Json<RoomCreated>)> {
    // ---
    info!("POST /api/room - {}", body.name);

    let room = repo.add_room(&body.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(RoomCreated {
            id: room.id,
            message: format!("Room {} created.", room.name),
        }),
    ))
}
