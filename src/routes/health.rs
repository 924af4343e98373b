// src/routes/health.rs
//! Liveness endpoint for the occupancy service.
//!
//! `/health` is polled by container orchestrators and CI pipelines. It
//! reports the loaded section table and strategy threshold so a deploy can
//! be checked at a glance, and never touches the reading store: a slow or
//! down database must not make the process look dead.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::OccupancyEngine;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    sections: usize,
    bulk_threshold: usize,
}

/// Handle `GET /health`.
async fn health(State(engine): State<Arc<OccupancyEngine>>) -> Json<HealthResponse> {
    // ---
    Json(HealthResponse {
        status: "ok",
        sections: engine.sections().names().len(),
        bulk_threshold: engine.settings().bulk_threshold,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<Arc<OccupancyEngine>> {
    Router::new().route("/health", get(health))
}
