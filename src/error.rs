//! Error taxonomy for the `home-monitor` service.
//!
//! The repository surfaces a specific kind for every failure path so the
//! route layer can map it to a status code; a write failure is never
//! swallowed into a silent no-op success.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// A specialized `Result` type for repository and parser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the monitoring core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or out-of-range input, rejected before touching storage
    #[error("validation failed: {0}")]
    Validation(String),

    /// Uniqueness violation on a name, serial number, or (sensor, timestamp) pair
    #[error("{0} already exists")]
    Duplicate(String),

    /// A referenced room, plant, or sensor does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A field has the wrong shape, e.g. a blank entity name
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An aggregation matched zero rows; distinct from an average of 0.0
    #[error("no readings matched the query")]
    NoData,

    /// Transient connectivity or operational failure in the storage engine
    #[error("storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),
}

/// JSON body returned for every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    // ---
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) | Error::TypeMismatch(_) => StatusCode::BAD_REQUEST,
            Error::Duplicate(_) => StatusCode::CONFLICT,
            Error::NotFound(_) | Error::NoData => StatusCode::NOT_FOUND,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
