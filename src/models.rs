//! Entity rows and the closed sensor variant types.

use serde::Serialize;

// ---

/// A room as persisted in the `room` table.
///
/// Room names are unique under case-insensitive comparison; `Bedroom` and
/// `bedroom` are the same logical room.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Room {
    // ---
    pub id: i64,
    pub name: String,
}

/// A plant as persisted in the `plant` table.
///
/// Plant names are unique system-wide (not per room), again under
/// case-insensitive comparison.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Plant {
    // ---
    pub id: i64,
    pub room_id: i64,
    pub name: String,
}

/// A sensor to register, as a closed two-variant union.
///
/// A plain sensor is attached to exactly one room; a plant sensor is
/// attached to exactly one plant, never to a room directly. The two live in
/// separate tables with independently unique serial numbers, so every
/// access site names the namespace explicitly through this enum.
#[derive(Debug, Clone, Copy)]
pub enum NewSensor {
    /// Temperature/humidity sensor bound to a room.
    Room { serial_number: i64, room_id: i64 },
    /// Soil sensor bound to a plant, additionally reporting wetness.
    Plant { serial_number: i64, plant_id: i64 },
}

impl NewSensor {
    pub fn serial_number(&self) -> i64 {
        match *self {
            NewSensor::Room { serial_number, .. } => serial_number,
            NewSensor::Plant { serial_number, .. } => serial_number,
        }
    }
}

/// Table selector for sensor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Room,
    Plant,
}
