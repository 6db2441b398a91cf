//! Database schema management for `home-monitor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::SqlitePool;

// ---

/// Create the database schema (idempotent).
///
/// Five entity tables plus the two reading tables described in the data
/// model. Safe to call on every startup; no-op if objects already exist.
///
/// Uniqueness rules that matter here:
/// - `room.name` and `plant.name` carry a case-insensitive unique
///   constraint (`COLLATE NOCASE`). The repository also pre-checks with a
///   case-folded lookup, but two concurrent creations can both pass that
///   check, so the constraint is the backstop.
/// - the reading tables use a composite `(sensor_id, entry_timestamp)`
///   primary key: at most one reading per sensor per instant.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS room (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plant (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            room_id INTEGER NOT NULL REFERENCES room (id),
            name    TEXT NOT NULL COLLATE NOCASE UNIQUE
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Plain room sensors and plant sensors are distinct entity types with
    // independently unique serial numbers, not one table with a subtype.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor (
            serial_number INTEGER PRIMARY KEY,
            room_id       INTEGER NOT NULL REFERENCES room (id)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plant_sensor (
            serial_number INTEGER PRIMARY KEY,
            plant_id      INTEGER NOT NULL REFERENCES plant (id)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS humidity_temperature_entry (
            sensor_id       INTEGER NOT NULL REFERENCES sensor (serial_number),
            entry_timestamp TEXT    NOT NULL,
            temperature     REAL    NOT NULL,
            humidity        REAL    NOT NULL,
            PRIMARY KEY (sensor_id, entry_timestamp)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plant_sensor_entry (
            sensor_id       INTEGER NOT NULL REFERENCES plant_sensor (serial_number),
            entry_timestamp TEXT    NOT NULL,
            temperature     REAL    NOT NULL,
            humidity        REAL    NOT NULL,
            wetness         REAL    NOT NULL,
            PRIMARY KEY (sensor_id, entry_timestamp)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Index for the average-temperature join filtered by room
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_room_id
            ON sensor (room_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_plant_room_id
            ON plant (room_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
