//! Per-sensor aggregation.

use chrono::NaiveDate;

use super::{stats_from_counts, EvaluationStrategy, OccupancyEngine};
use crate::calendar::PeriodSelector;
use crate::error::EngineError;
use crate::models::{OccupancyStats, SensorOccupancy};

// ---

impl OccupancyEngine {
    /// Occupancy stats of one sensor, evaluated with the direct strategy.
    #[tracing::instrument(skip(self))]
    pub async fn stats_for_sensor(
        &self,
        sensor_id: &str,
        selector: PeriodSelector,
    ) -> Result<OccupancyStats, EngineError> {
        // ---
        let windows = selector.windows();
        let ids = [sensor_id.to_string()];
        let counts = self
            .evaluate(EvaluationStrategy::Direct, &ids, &windows)
            .await?;

        let stats = counts
            .first()
            .map(|c| stats_from_counts(&windows, c))
            .unwrap_or_else(|| stats_from_counts(&windows, &[]));
        tracing::debug!(daily_rate = stats.daily.rate, "Sensor stats computed");
        Ok(stats)
    }

    /// Sensor report for optional explicit bounds, labelled with its display name.
    pub async fn get_sensor_occupancy(
        &self,
        sensor_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<SensorOccupancy, EngineError> {
        // ---
        let selector = self.period_selector(start_date, end_date)?;
        let stats = self.stats_for_sensor(sensor_id, selector).await?;
        Ok(SensorOccupancy {
            sensor_id: sensor_id.to_string(),
            sensor_display_name: self.sections().display_name(sensor_id).to_string(),
            stats,
        })
    }
}
