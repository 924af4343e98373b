//! Application entry point for the `sensorflow-occupancy` service.
//!
//! This binary orchestrates the full startup sequence for the occupancy
//! reporting API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Establishing a PostgreSQL connection pool for the reading store
//! - Creating the reading log schema if it does not exist
//! - Loading the static section table once
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `DB_POOL_MAX`, `BULK_THRESHOLD`, `QUERY_TIMEOUT_SECS`,
//!   `READINGS_UTC_OFFSET_MINUTES`, `SECTIONS_FILE`, `HTTP_PORT` – see `config`
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use sensorflow_occupancy::{config, routes, schema, OccupancyEngine, PgReadingStore};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let settings = cfg.engine_settings()?;
    let sections = cfg.section_registry()?;
    tracing::info!("Sections configured: {:?}", sections.names());

    tracing::info!("Attempting to connect to database: {}", cfg.masked_db_url());

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", cfg.masked_db_url()))?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    let store = Arc::new(PgReadingStore::new(pool));
    let engine = Arc::new(OccupancyEngine::new(store, sections, settings));

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Install the global tracing subscriber.
///
/// - `AXUM_SPAN_EVENTS`: `full` (enter, exit, close), `enter_exit`, or
///   close-only by default. Engine entry points are instrumented, so close
///   events carry per-request timing.
/// - `FORCE_COLOR`: `1|true|yes` / `0|false|no`, TTY detection otherwise.
/// - `RUST_LOG` wins when set; else `AXUM_LOG_LEVEL` (default `debug`) with
///   sqlx statement logging held at `warn`.
///
/// Call once, before the first log line.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1" | "true" | "yes") => true,
        Ok("0" | "false" | "no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(log_filter())
        .with_ansi(use_color)
        .compact()
        .init();
}

fn log_filter() -> EnvFilter {
    // ---
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
        Some(level @ ("trace" | "debug" | "info" | "warn" | "error")) => level.to_string(),
        _ => "debug".to_string(),
    };
    EnvFilter::new(format!("{level},sqlx::query=warn,sensorflow_occupancy::store=info"))
}
