//! Library crate for the `home-monitor` backend service.
//!
//! The interesting part of this service is the data-ingestion and repository
//! layer: entity identity rules (case-insensitive uniqueness of room and
//! plant names), the two-variant sensor/measurement model (plain room
//! sensors vs. plant sensors reporting soil wetness), and timestamp
//! normalization of inbound readings. The HTTP surface in `routes` is thin
//! plumbing that translates requests into repository calls and error kinds
//! into status codes.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP):
//! - `config`      – environment-variable configuration snapshot
//! - `error`       – service error taxonomy and its HTTP status mapping
//! - `measurement` – inbound reading validation and timestamp normalization
//! - `models`      – entity rows and the closed sensor variant types
//! - `repository`  – all database reads/writes, one transaction per call
//! - `schema`      – idempotent schema bootstrap, applied once on startup
//! - `ip_filter`   – allow-list middleware guarding every route
//! - `routes`      – route gateway merging one subrouter per endpoint

pub mod config;
pub mod error;
pub mod ip_filter;
pub mod measurement;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;

pub use config::Config;
pub use error::Error;
pub use measurement::{parse_measurement, MeasurementIn, Reading};
pub use models::{NewSensor, Plant, Room, SensorKind};
pub use repository::Repository;
