//! In-process reading store.
//!
//! Holds a fixed set of readings and counts round trips, so callers can
//! observe how many queries an aggregation issued. It can also be switched
//! to fail or to answer slowly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::ReadingStore;
use crate::error::StoreError;
use crate::models::{Reading, ReadingKind};

// ---

#[derive(Debug, Default)]
pub struct MemoryReadingStore {
    readings: Vec<Reading>,
    queries: AtomicUsize,
    unavailable: bool,
    latency: Option<Duration>,
}

impl MemoryReadingStore {
    // ---
    pub fn new(readings: Vec<Reading>) -> Self {
        // ---
        let mut store = MemoryReadingStore::default();
        store.extend(readings);
        store
    }

    /// Append readings, keeping the log in timestamp order.
    pub fn extend(&mut self, readings: impl IntoIterator<Item = Reading>) {
        self.readings.extend(readings);
        self.readings.sort_by_key(|r| r.timestamp);
    }

    /// Make every subsequent query fail.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Delay every query by `latency` before answering.
    pub fn set_latency(&mut self, latency: Option<Duration>) {
        self.latency = latency;
    }

    /// Number of queries answered or attempted so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn query_readings(
        &self,
        sensor_ids: &[String],
        kind: ReadingKind,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StoreError> {
        // ---
        self.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }

        Ok(self
            .readings
            .iter()
            .filter(|r| r.kind == kind)
            .filter(|r| from <= r.timestamp && r.timestamp < to)
            .filter(|r| sensor_ids.iter().any(|id| *id == r.sensor_id))
            .cloned()
            .collect())
    }
}
