//! Data models for the occupancy engine.
//!
//! [`Reading`] is the only shape the engine sees from the reading store; the
//! stats types are fresh, immutable snapshots built per request and
//! serialized as-is by the reporting gateway.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Tag distinguishing the kinds of readings sharing the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    Occupancy,
    Temperature,
    Humidity,
    Co2,
    Battery,
}

impl ReadingKind {
    // ---
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingKind::Occupancy => "occupancy",
            ReadingKind::Temperature => "temperature",
            ReadingKind::Humidity => "humidity",
            ReadingKind::Co2 => "co2",
            ReadingKind::Battery => "battery",
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.to_ascii_lowercase().as_str() {
            "occupancy" => Ok(ReadingKind::Occupancy),
            "temperature" => Ok(ReadingKind::Temperature),
            "humidity" => Ok(ReadingKind::Humidity),
            "co2" => Ok(ReadingKind::Co2),
            "battery" => Ok(ReadingKind::Battery),
            other => Err(format!("unknown reading kind: {other}")),
        }
    }
}

/// A single timestamped reading, normalized to UTC at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    // ---
    pub sensor_id: String,
    pub kind: ReadingKind,
    pub timestamp: DateTime<Utc>,
    pub value: String,
}

impl Reading {
    // ---
    pub fn occupancy(sensor_id: impl Into<String>, timestamp: DateTime<Utc>, value: &str) -> Self {
        Reading {
            sensor_id: sensor_id.into(),
            kind: ReadingKind::Occupancy,
            timestamp,
            value: value.to_string(),
        }
    }

    /// Whether this reading denotes positive presence.
    pub fn is_occupied(&self) -> bool {
        is_occupied_value(&self.value)
    }
}

/// Interpret a raw reading value.
///
/// Positive integers and the keywords `occupied` / `used` (any case) mean
/// occupied. Everything else, including values that fail to parse, means
/// not occupied and never aborts a scan.
pub fn is_occupied_value(value: &str) -> bool {
    // ---
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return n > 0;
    }
    if value.eq_ignore_ascii_case("occupied") || value.eq_ignore_ascii_case("used") {
        return true;
    }
    if !value.eq_ignore_ascii_case("free") && !value.eq_ignore_ascii_case("unused") {
        tracing::debug!(value, "Uninterpretable occupancy value, counting as not occupied");
    }
    false
}

/// Occupied/total interval counts for one period, with the derived rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    // ---
    pub rate: f64,
    pub occupied: u32,
    pub total: u32,
}

impl PeriodStats {
    // ---
    pub fn new(occupied: u32, total: u32) -> Self {
        PeriodStats {
            rate: occupancy_rate(occupied, total),
            occupied,
            total,
        }
    }

    pub fn empty() -> Self {
        PeriodStats::new(0, 0)
    }

    /// Weighted rollup: counts are summed and the rate derived from the sums.
    /// Sums saturate at `u32::MAX`.
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a PeriodStats>) -> Self {
        // ---
        let (occupied, total) = items.into_iter().fold((0u32, 0u32), |(o, t), s| {
            (o.saturating_add(s.occupied), t.saturating_add(s.total))
        });
        PeriodStats::new(occupied, total)
    }
}

/// `occupied / total * 100` rounded to two decimals; zero when `total` is zero.
pub fn occupancy_rate(occupied: u32, total: u32) -> f64 {
    // ---
    if total == 0 {
        return 0.0;
    }
    let rate = f64::from(occupied) / f64::from(total) * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Stats for the three reporting buckets.
///
/// When a custom range is requested all three buckets carry the same
/// custom-range figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupancyStats {
    // ---
    pub daily: PeriodStats,
    pub weekly: PeriodStats,
    pub monthly: PeriodStats,
}

impl OccupancyStats {
    // ---
    pub fn uniform(stats: PeriodStats) -> Self {
        OccupancyStats {
            daily: stats,
            weekly: stats,
            monthly: stats,
        }
    }

    pub fn sum<'a>(items: impl IntoIterator<Item = &'a OccupancyStats> + Clone) -> Self {
        // ---
        OccupancyStats {
            daily: PeriodStats::sum(items.clone().into_iter().map(|s| &s.daily)),
            weekly: PeriodStats::sum(items.clone().into_iter().map(|s| &s.weekly)),
            monthly: PeriodStats::sum(items.into_iter().map(|s| &s.monthly)),
        }
    }
}

/// Per-sensor entry of a section report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorOccupancy {
    // ---
    pub sensor_id: String,
    pub sensor_display_name: String,
    #[serde(flatten)]
    pub stats: OccupancyStats,
}

/// Full answer to a section occupancy query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOccupancyResult {
    // ---
    pub section_name: String,
    pub per_sensor_stats: Vec<SensorOccupancy>,
    pub global_stats: OccupancyStats,
    pub calculation_method: String,
    pub business_hours: String,
    pub working_days: String,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_occupied_values() {
        // ---
        assert!(is_occupied_value("1"));
        assert!(is_occupied_value(" 3 "));
        assert!(is_occupied_value("occupied"));
        assert!(is_occupied_value("OCCUPIED"));
        assert!(is_occupied_value("Used"));
    }

    #[test]
    fn test_not_occupied_values() {
        // ---
        assert!(!is_occupied_value("0"));
        assert!(!is_occupied_value("-2"));
        assert!(!is_occupied_value("free"));
        assert!(!is_occupied_value(""));
        assert!(!is_occupied_value("1.5"));
        assert!(!is_occupied_value("garbage"));
    }

    #[test]
    fn test_rate_rounding() {
        // ---
        assert_eq!(occupancy_rate(1, 16), 6.25);
        assert_eq!(occupancy_rate(1, 32), 3.13);
        assert_eq!(occupancy_rate(1, 3), 33.33);
        assert_eq!(occupancy_rate(2, 3), 66.67);
        assert_eq!(occupancy_rate(16, 16), 100.0);
    }

    #[test]
    fn test_rate_zero_total() {
        // ---
        assert_eq!(occupancy_rate(0, 0), 0.0);
        assert_eq!(PeriodStats::empty().rate, 0.0);
    }

    #[test]
    fn test_sum_is_weighted() {
        // ---
        let a = PeriodStats::new(1, 16);
        let b = PeriodStats::new(0, 16);
        let c = PeriodStats::new(0, 0);
        let global = PeriodStats::sum([&a, &b, &c]);

        assert_eq!(global.occupied, 1);
        assert_eq!(global.total, 32);
        assert_eq!(global.rate, 3.13);
    }

    #[test]
    fn test_sum_saturates() {
        // ---
        let huge = PeriodStats::new(u32::MAX, u32::MAX);
        let small = PeriodStats::new(1, 3);
        let rollup = PeriodStats::sum([&huge, &small, &huge]);

        assert_eq!(rollup.occupied, u32::MAX);
        assert_eq!(rollup.total, u32::MAX);
        assert_eq!(rollup.rate, 100.0);
    }

    #[test]
    fn test_reading_kind_round_trip_names() {
        // ---
        assert_eq!("OCCUPANCY".parse::<ReadingKind>(), Ok(ReadingKind::Occupancy));
        assert!("pressure".parse::<ReadingKind>().is_err());
        assert_eq!(ReadingKind::Co2.to_string(), "co2");
    }

    #[test]
    fn test_sensor_entry_serializes_flat_buckets() {
        // ---
        let entry = SensorOccupancy {
            sensor_id: "desk-vs41-03-01".to_string(),
            sensor_display_name: "Interview desk 1".to_string(),
            stats: OccupancyStats::uniform(PeriodStats::new(1, 16)),
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["sensorId"], "desk-vs41-03-01");
        assert_eq!(json["sensorDisplayName"], "Interview desk 1");
        assert_eq!(json["daily"]["rate"], 6.25);
        assert_eq!(json["monthly"]["total"], 16);
    }
}
