use axum::Router;

use crate::Repository;

mod average;
mod health;
mod measurements;
mod rooms;
mod sensors;
mod stats;

// ---

pub fn router(repo: Repository) -> Router {
    // ---
    Router::new()
        .merge(health::router())
        .merge(rooms::router())
        .merge(sensors::router())
        .merge(measurements::router())
        .merge(average::router())
        .merge(stats::router())
        .with_state(repo)
}
