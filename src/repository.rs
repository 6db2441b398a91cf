//! The repository: every database read and write in the service goes
//! through here.
//!
//! The pool handle is constructor-injected and owned by the process entry
//! point; nothing in this module reaches for global state. Each write
//! method opens one explicit transaction, performs its reads and writes,
//! and commits on success — on any failure path the transaction guard is
//! dropped and rolls back.
//!
//! Name lookups fold both the stored and the queried value to lower case,
//! so `get_room("BEDROOM")` finds a room created as `Bedroom`. The
//! application-level pre-check in `add_room`/`add_plant` is not race-free:
//! two concurrent creations can both pass it, in which case the
//! case-insensitive unique constraint fires and is reported as the same
//! [`Error::Duplicate`] kind.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{Error, Result};
use crate::measurement::Reading;
use crate::models::{NewSensor, Plant, Room, SensorKind};

// ---

#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // --- rooms ---

    /// Case-insensitive room lookup. Absence is `Ok(None)`, not an error.
    pub async fn get_room(&self, name: &str) -> Result<Option<Room>> {
        // ---
        let room = sqlx::query_as::<_, Room>(
            "SELECT id, name FROM room WHERE lower(name) = lower(?1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    /// Create a room, enforcing case-insensitive name uniqueness.
    ///
    /// Returns the persisted row with its assigned id.
    pub async fn add_room(&self, name: &str) -> Result<Room> {
        // ---
        require_name(name, "room")?;

        if self.get_room(name).await?.is_some() {
            return Err(Error::Duplicate(format!("room with name {name}")));
        }

        let mut tx = self.pool.begin().await?;

        let room = sqlx::query_as::<_, Room>(
            "INSERT INTO room (name) VALUES (?1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| on_unique(e, format!("room with name {name}")))?;

        tx.commit().await?;
        debug!(room = %room.name, id = room.id, "room created");
        Ok(room)
    }

    // --- plants ---

    /// Case-insensitive plant lookup; plant names are unique system-wide.
    pub async fn get_plant(&self, name: &str) -> Result<Option<Plant>> {
        // ---
        let plant = sqlx::query_as::<_, Plant>(
            "SELECT id, room_id, name FROM plant WHERE lower(name) = lower(?1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plant)
    }

    /// Create a plant under an existing room.
    pub async fn add_plant(&self, name: &str, room_id: i64) -> Result<Plant> {
        // ---
        require_name(name, "plant")?;

        if self.get_plant(name).await?.is_some() {
            return Err(Error::Duplicate(format!("plant with name {name}")));
        }

        let mut tx = self.pool.begin().await?;

        let plant = sqlx::query_as::<_, Plant>(
            "INSERT INTO plant (name, room_id) VALUES (?1, ?2) RETURNING id, room_id, name",
        )
        .bind(name)
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            on_unique_or_missing(
                e,
                format!("plant with name {name}"),
                format!("room {room_id}"),
            )
        })?;

        tx.commit().await?;
        debug!(plant = %plant.name, id = plant.id, "plant created");
        Ok(plant)
    }

    // --- sensors ---

    /// Register a sensor, dispatching on the variant to the matching table.
    ///
    /// Serial numbers are unique within a variant's table only; a plain
    /// sensor and a plant sensor may coincidentally share one.
    pub async fn add_sensor(&self, sensor: NewSensor) -> Result<i64> {
        // ---
        let serial = sensor.serial_number();
        let mut tx = self.pool.begin().await?;

        let result = match sensor {
            NewSensor::Room {
                serial_number,
                room_id,
            } => {
                sqlx::query("INSERT INTO sensor (serial_number, room_id) VALUES (?1, ?2)")
                    .bind(serial_number)
                    .bind(room_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        on_unique_or_missing(
                            e,
                            format!("sensor {serial_number}"),
                            format!("room {room_id}"),
                        )
                    })?
            }
            NewSensor::Plant {
                serial_number,
                plant_id,
            } => {
                sqlx::query("INSERT INTO plant_sensor (serial_number, plant_id) VALUES (?1, ?2)")
                    .bind(serial_number)
                    .bind(plant_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        on_unique_or_missing(
                            e,
                            format!("plant sensor {serial_number}"),
                            format!("plant {plant_id}"),
                        )
                    })?
            }
        };
        debug_assert_eq!(result.rows_affected(), 1);

        tx.commit().await?;
        debug!(serial, "sensor registered");
        Ok(serial)
    }

    /// Exact serial-number lookup in the table selected by the kind hint.
    pub async fn get_sensor(&self, serial_number: i64, kind: SensorKind) -> Result<Option<i64>> {
        // ---
        let query = match kind {
            SensorKind::Room => "SELECT serial_number FROM sensor WHERE serial_number = ?1",
            SensorKind::Plant => {
                "SELECT serial_number FROM plant_sensor WHERE serial_number = ?1"
            }
        };

        let serial = sqlx::query_scalar::<_, i64>(query)
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(serial)
    }

    // --- readings ---

    /// Persist a normalized reading into the entry table matching its
    /// variant.
    ///
    /// The owning sensor must already exist in that variant's table,
    /// otherwise `NotFound`; a reading never lands with an unresolved
    /// foreign key. Resending an entry with the same `(sensor, timestamp)`
    /// pair is `Duplicate`, never a silent overwrite.
    ///
    /// Returns the sensor id the entry was recorded for.
    pub async fn add_data_entry(&self, reading: &Reading) -> Result<i64> {
        // ---
        let mut tx = self.pool.begin().await?;

        match *reading {
            Reading::Plain {
                sensor_id,
                timestamp,
                temperature,
                humidity,
            } => {
                let known: Option<i64> =
                    sqlx::query_scalar("SELECT serial_number FROM sensor WHERE serial_number = ?1")
                        .bind(sensor_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if known.is_none() {
                    return Err(Error::NotFound(format!("sensor {sensor_id}")));
                }

                sqlx::query(
                    "INSERT INTO humidity_temperature_entry \
                     (sensor_id, entry_timestamp, temperature, humidity) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(sensor_id)
                .bind(timestamp)
                .bind(temperature)
                .bind(humidity)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    on_unique(e, format!("entry for sensor {sensor_id} at {timestamp}"))
                })?;
            }
            Reading::Wet {
                sensor_id,
                timestamp,
                temperature,
                humidity,
                wetness,
            } => {
                let known: Option<i64> = sqlx::query_scalar(
                    "SELECT serial_number FROM plant_sensor WHERE serial_number = ?1",
                )
                .bind(sensor_id)
                .fetch_optional(&mut *tx)
                .await?;
                if known.is_none() {
                    return Err(Error::NotFound(format!("plant sensor {sensor_id}")));
                }

                sqlx::query(
                    "INSERT INTO plant_sensor_entry \
                     (sensor_id, entry_timestamp, temperature, humidity, wetness) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(sensor_id)
                .bind(timestamp)
                .bind(temperature)
                .bind(humidity)
                .bind(wetness)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    on_unique(e, format!("entry for plant sensor {sensor_id} at {timestamp}"))
                })?;
            }
        }

        tx.commit().await?;
        Ok(reading.sensor_id())
    }

    // --- aggregation ---

    /// Arithmetic mean of temperature over plain-sensor readings, optionally
    /// filtered to one room.
    ///
    /// Plant-sensor temperatures are deliberately excluded. Zero matching
    /// rows is `Error::NoData` so the caller can tell "no data" apart from
    /// an average of exactly 0.
    pub async fn get_average_temperature(&self, room: Option<&Room>) -> Result<f64> {
        // ---
        let average: Option<f64> = match room {
            Some(room) => {
                sqlx::query_scalar(
                    "SELECT AVG(h.temperature) \
                     FROM humidity_temperature_entry h \
                     JOIN sensor s ON h.sensor_id = s.serial_number \
                     WHERE s.room_id = ?1",
                )
                .bind(room.id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT AVG(h.temperature) \
                     FROM humidity_temperature_entry h \
                     JOIN sensor s ON h.sensor_id = s.serial_number",
                )
                .fetch_one(&self.pool)
                .await?
            }
        };

        average.ok_or(Error::NoData)
    }

    /// Total number of plain-sensor readings recorded so far.
    pub async fn count_entries(&self) -> Result<i64> {
        // ---
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM humidity_temperature_entry")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// ---

/// Entity names must be non-blank text.
fn require_name(name: &str, entity: &str) -> Result<()> {
    // ---
    if name.trim().is_empty() {
        return Err(Error::TypeMismatch(format!(
            "{entity} name must be non-empty text"
        )));
    }
    Ok(())
}

/// Map a unique-constraint violation to `Duplicate`, pass everything else
/// through as a storage failure.
fn on_unique(err: sqlx::Error, what: String) -> Error {
    // ---
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Duplicate(what),
        _ => Error::Storage(err),
    }
}

/// Like [`on_unique`], but additionally maps a foreign-key failure to
/// `NotFound` for the referenced parent entity.
fn on_unique_or_missing(err: sqlx::Error, duplicate: String, missing: String) -> Error {
    // ---
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Duplicate(duplicate),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => Error::NotFound(missing),
        _ => Error::Storage(err),
    }
}
