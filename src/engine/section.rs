//! Section aggregation.
//!
//! Resolves a section to its sensors, picks the evaluation strategy from
//! the group size, and builds the per-sensor entries plus the weighted
//! global rollup. Entries keep the configured sensor order.

use chrono::NaiveDate;

use super::{stats_from_counts, EvaluationStrategy, OccupancyEngine};
use crate::calendar::{PeriodSelector, BUSINESS_HOURS_LABEL, WORKING_DAYS_LABEL};
use crate::error::EngineError;
use crate::models::{OccupancyStats, SectionOccupancyResult, SensorOccupancy};

// ---

impl OccupancyEngine {
    /// Section report for optional explicit bounds.
    ///
    /// With neither bound the report covers today, week-to-date and
    /// month-to-date. With both it covers that inclusive range in every bucket.
    pub async fn get_section_occupancy(
        &self,
        section_name: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<SectionOccupancyResult, EngineError> {
        // ---
        let selector = self.period_selector(start_date, end_date)?;
        self.stats_for_section(section_name, selector).await
    }

    /// Section report using the strategy the group size calls for.
    pub async fn stats_for_section(
        &self,
        section_name: &str,
        selector: PeriodSelector,
    ) -> Result<SectionOccupancyResult, EngineError> {
        // ---
        let size = self
            .sections()
            .get(section_name)
            .map(|s| s.sensors.len())
            .ok_or_else(|| EngineError::UnknownSection(section_name.to_string()))?;
        let strategy = EvaluationStrategy::for_group_size(size, self.settings().bulk_threshold);
        self.stats_for_section_using(section_name, selector, strategy)
            .await
    }

    /// Section report with an explicit strategy.
    #[tracing::instrument(skip(self))]
    pub async fn stats_for_section_using(
        &self,
        section_name: &str,
        selector: PeriodSelector,
        strategy: EvaluationStrategy,
    ) -> Result<SectionOccupancyResult, EngineError> {
        // ---
        let section = self
            .sections()
            .get(section_name)
            .ok_or_else(|| EngineError::UnknownSection(section_name.to_string()))?;
        let sensor_ids = section.sensor_ids();
        let windows = selector.windows();

        tracing::info!(
            sensors = sensor_ids.len(),
            windows = windows.len(),
            ?strategy,
            "Computing section occupancy"
        );

        let counts = self.evaluate(strategy, &sensor_ids, &windows).await?;

        let per_sensor_stats: Vec<SensorOccupancy> = section
            .sensors
            .iter()
            .zip(&counts)
            .map(|(sensor, sensor_counts)| SensorOccupancy {
                sensor_id: sensor.id.clone(),
                sensor_display_name: sensor.display_name.clone(),
                stats: stats_from_counts(&windows, sensor_counts),
            })
            .collect();

        let global_stats = OccupancyStats::sum(per_sensor_stats.iter().map(|s| &s.stats));

        tracing::info!(
            daily_rate = global_stats.daily.rate,
            weekly_rate = global_stats.weekly.rate,
            monthly_rate = global_stats.monthly.rate,
            "Section occupancy computed"
        );

        Ok(SectionOccupancyResult {
            section_name: section.name.clone(),
            per_sensor_stats,
            global_stats,
            calculation_method: strategy.describe().to_string(),
            business_hours: BUSINESS_HOURS_LABEL.to_string(),
            working_days: WORKING_DAYS_LABEL.to_string(),
        })
    }
}
