//! Postgres-backed reading store.
//!
//! Reads the `sensor_readings` table created by the binary's schema module.
//! The multi-id predicate is expressed as `sensor_id = ANY($1)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::ReadingStore;
use crate::error::StoreError;
use crate::models::{Reading, ReadingKind};

// ---

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    // ---
    sensor_id: String,
    timestamp_utc: DateTime<Utc>,
    value: String,
}

/// Reading store backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        PgReadingStore { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn query_readings(
        &self,
        sensor_ids: &[String],
        kind: ReadingKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError> {
        // ---
        if sensor_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<ReadingRow> = sqlx::query_as(
            r#"
            SELECT sensor_id, timestamp_utc, value
              FROM sensor_readings
             WHERE sensor_id = ANY($1)
               AND kind = $2
               AND timestamp_utc >= $3
               AND timestamp_utc <  $4
             ORDER BY timestamp_utc ASC, id ASC
            "#,
        )
        .bind(sensor_ids)
        .bind(kind.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        tracing::trace!(
            sensors = sensor_ids.len(),
            rows = rows.len(),
            %kind,
            "Fetched readings"
        );

        Ok(rows
            .into_iter()
            .map(|row| Reading {
                sensor_id: row.sensor_id,
                kind,
                timestamp: row.timestamp_utc,
                value: row.value,
            })
            .collect())
    }
}
