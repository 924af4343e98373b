//! Database schema management for `sensorflow-occupancy`.
//!
//! Ensures the reading log table and its range-query index exist before
//! serving requests. Applied once on startup from `main.rs` (EMBP: single
//! gateway call). Rows are written by the ingestion service; this service
//! only reads them.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the append-only `sensor_readings` log. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Append-only reading log, one row per sensor message
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_readings (
            id             BIGSERIAL   PRIMARY KEY,
            sensor_id      TEXT        NOT NULL,
            kind           TEXT        NOT NULL,
            timestamp_utc  TIMESTAMPTZ NOT NULL,
            value          TEXT        NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Serves both the per-interval and the bulk range queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_readings_sensor_kind_time
            ON sensor_readings (sensor_id, kind, timestamp_utc);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
