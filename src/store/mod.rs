//! Read contract of the reading store.
//!
//! The engine only ever needs one operation: readings of one kind for a set
//! of sensor ids over a half-open time range, in time order. Single-id and
//! multi-id calls share the same semantics. Timestamps are normalized to
//! `DateTime<Utc>` by each implementation, so the engine sees a single
//! instant type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{Reading, ReadingKind};

mod memory;
mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

// ---

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Readings of `kind` for any of `sensor_ids` with `from <= timestamp < to`,
    /// ordered by timestamp.
    async fn query_readings(
        &self,
        sensor_ids: &[String],
        kind: ReadingKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError>;
}
