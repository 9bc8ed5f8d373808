//! Monday-aligned week buckets and working-day overlap math.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One ISO week of the project timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    /// ISO identifier, e.g. "2025-W07".
    pub identifier: String,
    /// Monday.
    pub start: NaiveDate,
    /// Sunday.
    pub end: NaiveDate,
    /// ISO week number within the ISO year.
    pub week_number: u32,
}

/// The Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// ISO week identifier for a date, e.g. "2025-W07".
pub fn week_identifier(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Partition `[start, end]` into Monday-aligned week buckets. The first
/// bucket starts on the Monday of the week containing `start`, so the span
/// is always fully covered.
pub fn week_buckets(start: NaiveDate, end: NaiveDate) -> Vec<WeekBucket> {
    let mut buckets = Vec::new();
    let mut monday = monday_of(start);
    while monday <= end {
        let sunday = monday
            .checked_add_days(Days::new(6))
            .unwrap_or(monday);
        buckets.push(WeekBucket {
            identifier: week_identifier(monday),
            start: monday,
            end: sunday,
            week_number: monday.iso_week().week(),
        });
        monday = match monday.checked_add_days(Days::new(7)) {
            Some(next) => next,
            None => break,
        };
    }
    buckets
}

/// Count weekdays (Mon-Fri) in the intersection of two inclusive spans.
/// Weekends are excluded; holidays are not modeled.
pub fn working_day_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> u32 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if start > end {
        return 0;
    }
    let mut count = 0;
    let mut day = start;
    while day <= end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_monday_of() {
        // 2025-02-12 is a Wednesday.
        assert_eq!(monday_of(d(2025, 2, 12)), d(2025, 2, 10));
        assert_eq!(monday_of(d(2025, 2, 10)), d(2025, 2, 10));
        assert_eq!(monday_of(d(2025, 2, 16)), d(2025, 2, 10));
    }

    #[test]
    fn test_buckets_cover_span() {
        let buckets = week_buckets(d(2025, 2, 12), d(2025, 2, 25));
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].start, d(2025, 2, 10));
        assert_eq!(buckets[0].end, d(2025, 2, 16));
        assert_eq!(buckets[0].identifier, "2025-W07");
        assert_eq!(buckets[2].start, d(2025, 2, 24));
    }

    #[test]
    fn test_bucket_identifier_across_year_boundary() {
        // 2024-12-30 is the Monday of ISO week 2025-W01.
        let buckets = week_buckets(d(2024, 12, 30), d(2025, 1, 5));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].identifier, "2025-W01");
        assert_eq!(buckets[0].week_number, 1);
    }

    #[test]
    fn test_working_day_overlap_full_week() {
        // Mon Feb 10 .. Sun Feb 16 intersected with a Mon-Fri task.
        assert_eq!(
            working_day_overlap(d(2025, 2, 10), d(2025, 2, 14), d(2025, 2, 10), d(2025, 2, 16)),
            5
        );
    }

    #[test]
    fn test_working_day_overlap_excludes_weekend() {
        // Task covering the whole week including the weekend: still 5.
        assert_eq!(
            working_day_overlap(d(2025, 2, 10), d(2025, 2, 16), d(2025, 2, 10), d(2025, 2, 16)),
            5
        );
        // Weekend-only span: zero.
        assert_eq!(
            working_day_overlap(d(2025, 2, 15), d(2025, 2, 16), d(2025, 2, 10), d(2025, 2, 16)),
            0
        );
    }

    #[test]
    fn test_working_day_overlap_disjoint() {
        assert_eq!(
            working_day_overlap(d(2025, 2, 10), d(2025, 2, 14), d(2025, 2, 17), d(2025, 2, 23)),
            0
        );
    }

    #[test]
    fn test_partial_overlap() {
        // Task Wed-Fri against the Mon-Sun week: 3 working days.
        assert_eq!(
            working_day_overlap(d(2025, 2, 12), d(2025, 2, 14), d(2025, 2, 10), d(2025, 2, 16)),
            3
        );
    }
}
