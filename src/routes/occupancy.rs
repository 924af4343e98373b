//! Occupancy reporting endpoints.
//!
//! Thin adapters between HTTP and the engine: they parse the optional date
//! bounds, call the engine, and map [`EngineError`] onto status codes.
//! Unknown sections and bad ranges are client errors; store failures are
//! reported as 503 and never as partial data.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{EngineError, OccupancyEngine};

// ---

pub fn router() -> Router<Arc<OccupancyEngine>> {
    // ---
    Router::new()
        .route("/occupancy/sections", get(list_sections))
        .route("/occupancy/sections/{name}", get(section_handler))
        .route("/occupancy/sensors/{sensor_id}", get(sensor_handler))
}

/// Optional inclusive date bounds, e.g. `?start_date=2025-03-24&end_date=2025-03-28`.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            EngineError::UnknownSection(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!("Occupancy request failed: {}", self);
        } else {
            warn!("Occupancy request rejected: {}", self);
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

async fn list_sections(State(engine): State<Arc<OccupancyEngine>>) -> impl IntoResponse {
    // ---
    let names: Vec<String> = engine
        .sections()
        .names()
        .into_iter()
        .map(String::from)
        .collect();
    Json(names)
}

async fn section_handler(
    Path(name): Path<String>,
    Query(params): Query<PeriodQuery>,
    State(engine): State<Arc<OccupancyEngine>>,
) -> Result<impl IntoResponse, EngineError> {
    // ---
    info!("GET /occupancy/sections/{} {:?}", name, params);

    let result = engine
        .get_section_occupancy(&name, params.start_date, params.end_date)
        .await?;
    Ok((StatusCode::OK, Json(result)))
}

async fn sensor_handler(
    Path(sensor_id): Path<String>,
    Query(params): Query<PeriodQuery>,
    State(engine): State<Arc<OccupancyEngine>>,
) -> Result<impl IntoResponse, EngineError> {
    // ---
    info!("GET /occupancy/sensors/{} {:?}", sensor_id, params);

    let result = engine
        .get_sensor_occupancy(&sensor_id, params.start_date, params.end_date)
        .await?;
    Ok((StatusCode::OK, Json(result)))
}
