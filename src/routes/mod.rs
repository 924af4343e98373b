use std::sync::Arc;

use axum::Router;

use crate::OccupancyEngine;

mod health;
mod occupancy;

// ---

pub fn router(engine: Arc<OccupancyEngine>) -> Router {
    // ---
    Router::new()
        .merge(occupancy::router())
        .merge(health::router())
        .with_state(engine)
}
