//! Occupancy aggregation engine.
//!
//! Gateway for the evaluation strategies (`evaluator`), the per-sensor
//! aggregator (`sensor`) and the section aggregator (`section`). The engine
//! holds no mutable state: every call builds its own interval lists and
//! maps, and the reading store is shared read-only.

use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::calendar::{DateWindow, PeriodKind, PeriodSelector};
use crate::error::{EngineError, StoreError};
use crate::models::{OccupancyStats, PeriodStats};
use crate::sections::SectionRegistry;
use crate::store::ReadingStore;

mod evaluator;
mod section;
mod sensor;

pub use evaluator::{
    BulkEvaluator, DirectEvaluator, EvaluationStrategy, IntervalCount, OccupancyEvaluator,
    ReadingBatch,
};

// ---

pub const DEFAULT_BULK_THRESHOLD: usize = 5;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 366;

/// Tunables of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Sections larger than this use the bulk strategy.
    pub bulk_threshold: usize,
    /// Bound on all store round trips of one request.
    pub query_timeout: Duration,
    /// Fixed zone readings are stored in; business hours and "today" use it.
    pub utc_offset: FixedOffset,
    /// Longest custom range accepted, in calendar days including both ends.
    pub max_range_days: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        // ---
        EngineSettings {
            bulk_threshold: DEFAULT_BULK_THRESHOLD,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            utc_offset: Utc.fix(),
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

/// Stateless occupancy calculator over a shared reading store.
pub struct OccupancyEngine {
    store: Arc<dyn ReadingStore>,
    sections: SectionRegistry,
    settings: EngineSettings,
}

impl OccupancyEngine {
    // ---
    pub fn new(
        store: Arc<dyn ReadingStore>,
        sections: SectionRegistry,
        settings: EngineSettings,
    ) -> Self {
        OccupancyEngine {
            store,
            sections,
            settings,
        }
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Current date in the store's fixed zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.settings.utc_offset).date_naive()
    }

    /// Periods for optional explicit bounds, relative to the current date.
    pub fn period_selector(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PeriodSelector, EngineError> {
        period_selector_at(self.today(), start, end, self.settings.max_range_days)
    }

    /// Run one strategy over the group, bounded by the request timeout.
    async fn evaluate(
        &self,
        strategy: EvaluationStrategy,
        sensor_ids: &[String],
        windows: &[DateWindow],
    ) -> Result<Vec<Vec<IntervalCount>>, EngineError> {
        // ---
        let evaluator = strategy.evaluator(self.store.as_ref(), self.settings.utc_offset);
        let timeout = self.settings.query_timeout;

        match tokio::time::timeout(timeout, evaluator.occupied_counts(sensor_ids, windows)).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(
                    strategy = ?evaluator.strategy(),
                    ?timeout,
                    "Occupancy evaluation timed out"
                );
                Err(StoreError::Timeout(timeout).into())
            }
        }
    }
}

/// Both bounds select a custom range, neither selects day/week/month.
///
/// A custom range must be ordered and span at most `max_days` calendar days;
/// the interval lists are built eagerly, before any store round trip.
pub fn period_selector_at(
    today: NaiveDate,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    max_days: u32,
) -> Result<PeriodSelector, EngineError> {
    // ---
    match (start, end) {
        (None, None) => Ok(PeriodSelector::Current { today }),
        (Some(s), Some(e)) if s <= e && (e - s).num_days() < i64::from(max_days) => {
            Ok(PeriodSelector::Custom { start: s, end: e })
        }
        _ => Err(EngineError::InvalidRange { start, end }),
    }
}

/// Fold per-window counts into the three reporting buckets.
fn stats_from_counts(windows: &[DateWindow], counts: &[IntervalCount]) -> OccupancyStats {
    // ---
    let mut stats = OccupancyStats::uniform(PeriodStats::empty());
    for (window, count) in windows.iter().zip(counts) {
        let period = PeriodStats::new(count.occupied, count.total);
        match window.kind {
            PeriodKind::Day => stats.daily = period,
            PeriodKind::Week => stats.weekly = period,
            PeriodKind::Month => stats.monthly = period,
            PeriodKind::Custom => stats = OccupancyStats::uniform(period),
        }
    }
    stats
}
