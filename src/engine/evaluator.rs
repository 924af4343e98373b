//! Occupancy evaluation strategies.
//!
//! An interval counts as occupied when at least one occupied reading of the
//! sensor falls inside it. [`DirectEvaluator`] asks the store once per
//! (sensor, interval) pair; [`BulkEvaluator`] asks once for the whole group
//! and period, then scans the grouped readings in memory. Both must return
//! the same counts for the same inputs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::calendar::{covering_bounds, DateWindow, Interval};
use crate::error::StoreError;
use crate::models::{Reading, ReadingKind};
use crate::store::ReadingStore;

// ---

/// Occupied and generated interval counts for one sensor and one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalCount {
    pub occupied: u32,
    pub total: u32,
}

/// Which evaluator serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStrategy {
    Direct,
    Bulk,
}

impl EvaluationStrategy {
    /// Bulk once the group is larger than `threshold` sensors.
    pub fn for_group_size(sensors: usize, threshold: usize) -> Self {
        if sensors > threshold {
            EvaluationStrategy::Bulk
        } else {
            EvaluationStrategy::Direct
        }
    }

    pub fn evaluator<'a>(
        self,
        store: &'a dyn ReadingStore,
        offset: FixedOffset,
    ) -> Box<dyn OccupancyEvaluator + 'a> {
        // ---
        match self {
            EvaluationStrategy::Direct => Box::new(DirectEvaluator::new(store, offset)),
            EvaluationStrategy::Bulk => Box::new(BulkEvaluator::new(store, offset)),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            EvaluationStrategy::Direct => {
                "30-minute intervals, occupied when at least one positive reading falls inside; one store query per sensor and interval"
            }
            EvaluationStrategy::Bulk => {
                "30-minute intervals, occupied when at least one positive reading falls inside; single bulk store query scanned in memory"
            }
        }
    }
}

#[async_trait]
pub trait OccupancyEvaluator: Send + Sync {
    fn strategy(&self) -> EvaluationStrategy;

    /// Whether at least one occupied reading of the sensor falls in `interval`.
    async fn is_occupied(&self, sensor_id: &str, interval: &Interval) -> Result<bool, StoreError>;

    /// Counts indexed `[sensor][window]`, in the order of `sensor_ids` and `windows`.
    async fn occupied_counts(
        &self,
        sensor_ids: &[String],
        windows: &[DateWindow],
    ) -> Result<Vec<Vec<IntervalCount>>, StoreError>;
}

fn window_intervals(windows: &[DateWindow], offset: &FixedOffset) -> Vec<Vec<Interval>> {
    windows.iter().map(|w| w.intervals(offset)).collect()
}

// ---

/// One store query per sensor and interval.
pub struct DirectEvaluator<'a> {
    store: &'a dyn ReadingStore,
    offset: FixedOffset,
}

impl<'a> DirectEvaluator<'a> {
    // ---
    pub fn new(store: &'a dyn ReadingStore, offset: FixedOffset) -> Self {
        DirectEvaluator { store, offset }
    }

    /// Occupied members of `intervals`, querying each distinct interval once.
    pub async fn occupied_intervals(
        &self,
        sensor_id: &str,
        intervals: &[Interval],
    ) -> Result<HashSet<Interval>, StoreError> {
        // ---
        let mut seen = HashSet::with_capacity(intervals.len());
        let mut occupied = HashSet::new();
        for interval in intervals {
            if seen.insert(*interval) && self.is_occupied(sensor_id, interval).await? {
                occupied.insert(*interval);
            }
        }
        Ok(occupied)
    }
}

fn count_against(occupied: &HashSet<Interval>, intervals: &[Interval]) -> IntervalCount {
    IntervalCount {
        occupied: intervals.iter().filter(|i| occupied.contains(*i)).count() as u32,
        total: intervals.len() as u32,
    }
}

#[async_trait]
impl<'a> OccupancyEvaluator for DirectEvaluator<'a> {
    fn strategy(&self) -> EvaluationStrategy {
        EvaluationStrategy::Direct
    }

    async fn is_occupied(&self, sensor_id: &str, interval: &Interval) -> Result<bool, StoreError> {
        // ---
        let ids = [sensor_id.to_string()];
        let readings = self
            .store
            .query_readings(&ids, ReadingKind::Occupancy, interval.start, interval.end)
            .await?;
        Ok(readings.iter().any(Reading::is_occupied))
    }

    async fn occupied_counts(
        &self,
        sensor_ids: &[String],
        windows: &[DateWindow],
    ) -> Result<Vec<Vec<IntervalCount>>, StoreError> {
        // ---
        // Day and week windows overlap the month window; each distinct
        // interval is queried once per sensor.
        let per_window = window_intervals(windows, &self.offset);
        let union: Vec<Interval> = per_window.concat();

        let mut result = Vec::with_capacity(sensor_ids.len());
        for sensor_id in sensor_ids {
            let occupied = self.occupied_intervals(sensor_id, &union).await?;
            result.push(
                per_window
                    .iter()
                    .map(|intervals| count_against(&occupied, intervals))
                    .collect(),
            );
        }
        Ok(result)
    }
}

// ---

/// Occupied instants of each sensor, fetched in one round trip.
#[derive(Debug, Default)]
pub struct ReadingBatch {
    occupied: HashMap<String, Vec<DateTime<Utc>>>,
    fetched: usize,
}

impl ReadingBatch {
    /// Group readings by sensor, keeping only the occupied ones in time order.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        // ---
        let fetched = readings.len();
        let mut occupied: HashMap<String, Vec<DateTime<Utc>>> = HashMap::new();
        for reading in readings {
            if reading.is_occupied() {
                occupied
                    .entry(reading.sensor_id)
                    .or_default()
                    .push(reading.timestamp);
            }
        }
        for instants in occupied.values_mut() {
            instants.sort_unstable();
        }
        ReadingBatch { occupied, fetched }
    }

    /// Number of readings the batch was built from.
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    pub fn is_occupied(&self, sensor_id: &str, interval: &Interval) -> bool {
        // ---
        self.occupied
            .get(sensor_id)
            .map(|instants| {
                instants
                    .iter()
                    .take_while(|t| **t < interval.end)
                    .any(|t| interval.contains(*t))
            })
            .unwrap_or(false)
    }

    pub fn count(&self, sensor_id: &str, intervals: &[Interval]) -> IntervalCount {
        // ---
        IntervalCount {
            occupied: intervals
                .iter()
                .filter(|i| self.is_occupied(sensor_id, i))
                .count() as u32,
            total: intervals.len() as u32,
        }
    }
}

/// One store query for the whole group, then an in-memory scan.
pub struct BulkEvaluator<'a> {
    store: &'a dyn ReadingStore,
    offset: FixedOffset,
}

impl<'a> BulkEvaluator<'a> {
    // ---
    pub fn new(store: &'a dyn ReadingStore, offset: FixedOffset) -> Self {
        BulkEvaluator { store, offset }
    }

    pub async fn prefetch(
        &self,
        sensor_ids: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ReadingBatch, StoreError> {
        // ---
        let readings = self
            .store
            .query_readings(sensor_ids, ReadingKind::Occupancy, from, to)
            .await?;
        Ok(ReadingBatch::from_readings(readings))
    }
}

#[async_trait]
impl<'a> OccupancyEvaluator for BulkEvaluator<'a> {
    fn strategy(&self) -> EvaluationStrategy {
        EvaluationStrategy::Bulk
    }

    async fn is_occupied(&self, sensor_id: &str, interval: &Interval) -> Result<bool, StoreError> {
        // ---
        let ids = [sensor_id.to_string()];
        let batch = self.prefetch(&ids, interval.start, interval.end).await?;
        Ok(batch.is_occupied(sensor_id, interval))
    }

    async fn occupied_counts(
        &self,
        sensor_ids: &[String],
        windows: &[DateWindow],
    ) -> Result<Vec<Vec<IntervalCount>>, StoreError> {
        // ---
        let batch = match covering_bounds(windows, &self.offset) {
            Some((from, to)) if !sensor_ids.is_empty() => {
                self.prefetch(sensor_ids, from, to).await?
            }
            _ => ReadingBatch::default(),
        };
        tracing::debug!(
            sensors = sensor_ids.len(),
            readings = batch.fetched(),
            "Bulk readings loaded"
        );

        let per_window = window_intervals(windows, &self.offset);
        Ok(sensor_ids
            .iter()
            .map(|sensor_id| {
                per_window
                    .iter()
                    .map(|intervals| batch.count(sensor_id, intervals))
                    .collect()
            })
            .collect())
    }
}
