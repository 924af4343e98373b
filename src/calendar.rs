//! Business calendar: interval generation and reporting periods.
//!
//! Business hours are 09:00-12:30 and 14:00-18:30, Monday to Friday, cut
//! into fixed 30-minute half-open intervals. Everything here is a pure
//! function of its inputs and the fixed UTC offset readings are stored in.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};

// ---

/// Stride and length of one sampling interval.
pub const INTERVAL_MINUTES: u32 = 30;

/// Morning window as minutes since midnight, `[start, end)`.
pub const MORNING_WINDOW: (u32, u32) = (9 * 60, 12 * 60 + 30);

/// Afternoon window as minutes since midnight, `[start, end)`.
pub const AFTERNOON_WINDOW: (u32, u32) = (14 * 60, 18 * 60 + 30);

pub const BUSINESS_HOURS_LABEL: &str = "09:00-12:30, 14:00-18:30";
pub const WORKING_DAYS_LABEL: &str = "Monday-Friday";

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    // ---
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All business intervals of one day, morning first. Weekends yield none.
pub fn business_intervals_for_day(date: NaiveDate, offset: &FixedOffset) -> Vec<Interval> {
    // ---
    if !is_working_day(date) {
        return Vec::new();
    }

    [MORNING_WINDOW, AFTERNOON_WINDOW]
        .into_iter()
        .flat_map(|(from, to)| (from..to).step_by(INTERVAL_MINUTES as usize))
        .filter_map(|minute| {
            let naive = date.and_hms_opt(minute / 60, minute % 60, 0)?;
            let start = offset.from_local_datetime(&naive).single()?;
            let start = start.with_timezone(&Utc);
            Some(Interval {
                start,
                end: start + Duration::minutes(i64::from(INTERVAL_MINUTES)),
            })
        })
        .collect()
}

/// Business intervals from `start` through `end_inclusive`, in time order.
///
/// An inverted range yields no intervals.
pub fn business_intervals(
    start: NaiveDate,
    end_inclusive: NaiveDate,
    offset: &FixedOffset,
) -> Vec<Interval> {
    // ---
    let mut intervals = Vec::new();
    let mut day = start;
    while day <= end_inclusive {
        intervals.extend(business_intervals_for_day(day, offset));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    intervals
}

/// Local midnight of `date` as a UTC instant.
pub fn start_of_day(date: NaiveDate, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    // ---
    let naive = date.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Which reporting bucket a window feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Custom,
}

/// Inclusive calendar date range evaluated as one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end_inclusive: NaiveDate,
}

impl DateWindow {
    // ---
    pub fn intervals(&self, offset: &FixedOffset) -> Vec<Interval> {
        business_intervals(self.start, self.end_inclusive, offset)
    }

    /// Instant bounds `[start midnight, day after end midnight)`.
    pub fn bounds(&self, offset: &FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        // ---
        let from = start_of_day(self.start, offset)?;
        let to = start_of_day(self.end_inclusive.succ_opt()?, offset)?;
        Some((from, to))
    }
}

/// Requested reporting periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    /// Day, week-to-date and month-to-date relative to `today`.
    Current { today: NaiveDate },
    /// One explicit inclusive range reported in all three buckets.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl PeriodSelector {
    // ---
    pub fn windows(&self) -> Vec<DateWindow> {
        // ---
        match *self {
            PeriodSelector::Current { today } => {
                let week_start =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                let month_start = today.with_day(1).unwrap_or(today);
                vec![
                    DateWindow {
                        kind: PeriodKind::Day,
                        start: today,
                        end_inclusive: today,
                    },
                    DateWindow {
                        kind: PeriodKind::Week,
                        start: week_start,
                        end_inclusive: today,
                    },
                    DateWindow {
                        kind: PeriodKind::Month,
                        start: month_start,
                        end_inclusive: today,
                    },
                ]
            }
            PeriodSelector::Custom { start, end } => vec![DateWindow {
                kind: PeriodKind::Custom,
                start,
                end_inclusive: end,
            }],
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PeriodSelector::Custom { .. })
    }
}

/// Smallest instant range covering every window, or `None` when all are empty.
pub fn covering_bounds(
    windows: &[DateWindow],
    offset: &FixedOffset,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    // ---
    windows
        .iter()
        .filter(|w| w.start <= w.end_inclusive)
        .filter_map(|w| w.bounds(offset))
        .reduce(|(a_from, a_to), (b_from, b_to)| (a_from.min(b_from), a_to.max(b_to)))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::Timelike;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_business_day_has_sixteen_intervals() {
        // ---
        // 2025-03-24 is a Monday
        for day in 24..=28 {
            let intervals = business_intervals_for_day(date(2025, 3, day), &utc());
            assert_eq!(intervals.len(), 16, "day {day}");
        }
    }

    #[test]
    fn test_morning_and_afternoon_split() {
        // ---
        let intervals = business_intervals_for_day(date(2025, 3, 24), &utc());
        let morning: Vec<_> = intervals.iter().filter(|i| i.start.hour() < 13).collect();
        let afternoon: Vec<_> = intervals.iter().filter(|i| i.start.hour() >= 14).collect();

        assert_eq!(morning.len(), 7);
        assert_eq!(afternoon.len(), 9);
        assert_eq!(intervals[0].start.hour(), 9);
        assert_eq!(intervals[6].end.hour(), 12);
        assert_eq!(intervals[6].end.minute(), 30);
        assert_eq!(intervals[7].start.hour(), 14);
        assert_eq!(intervals[15].end.hour(), 18);
        assert_eq!(intervals[15].end.minute(), 30);
    }

    #[test]
    fn test_intervals_are_ordered_and_disjoint() {
        // ---
        let intervals = business_intervals(date(2025, 3, 20), date(2025, 3, 26), &utc());
        for pair in intervals.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for interval in &intervals {
            assert_eq!(interval.end - interval.start, Duration::minutes(30));
        }
    }

    #[test]
    fn test_weekend_contributes_nothing() {
        // ---
        // 2025-03-22 / 23 are Saturday / Sunday
        assert!(business_intervals_for_day(date(2025, 3, 22), &utc()).is_empty());
        assert!(business_intervals_for_day(date(2025, 3, 23), &utc()).is_empty());
        let range = business_intervals(date(2025, 3, 21), date(2025, 3, 24), &utc());
        assert_eq!(range.len(), 32);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        // ---
        assert!(business_intervals(date(2025, 3, 25), date(2025, 3, 24), &utc()).is_empty());
    }

    #[test]
    fn test_offset_shifts_instants() {
        // ---
        let paris = FixedOffset::east_opt(3600).unwrap();
        let intervals = business_intervals_for_day(date(2025, 3, 24), &paris);
        assert_eq!(intervals[0].start.hour(), 8);
    }

    #[test]
    fn test_contains_is_half_open() {
        // ---
        let intervals = business_intervals_for_day(date(2025, 3, 24), &utc());
        let first = intervals[0];
        assert!(first.contains(first.start));
        assert!(!first.contains(first.end));
    }

    #[test]
    fn test_current_windows() {
        // ---
        // Wednesday 2025-04-02: week starts in March, month on the 1st
        let windows = PeriodSelector::Current {
            today: date(2025, 4, 2),
        }
        .windows();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, date(2025, 4, 2));
        assert_eq!(windows[1].start, date(2025, 3, 31));
        assert_eq!(windows[2].start, date(2025, 4, 1));
        assert!(windows.iter().all(|w| w.end_inclusive == date(2025, 4, 2)));

        let (from, to) = covering_bounds(&windows, &utc()).unwrap();
        assert_eq!(from.date_naive(), date(2025, 3, 31));
        assert_eq!(to.date_naive(), date(2025, 4, 3));
    }

    #[test]
    fn test_custom_window() {
        // ---
        let selector = PeriodSelector::Custom {
            start: date(2025, 3, 22),
            end: date(2025, 3, 24),
        };
        let windows = selector.windows();

        assert!(selector.is_custom());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].kind, PeriodKind::Custom);
        assert_eq!(windows[0].intervals(&utc()).len(), 16);
    }
}
