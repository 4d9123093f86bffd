use chrono::NaiveDate;
use std::collections::HashSet;

use crate::store::AttendanceRecord;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE_FORMAT).ok()
}

/// Every calendar date from `start` to `end` inclusive, ascending, as ISO
/// strings. Empty when `start > end`. Uses calendar arithmetic, so month and
/// year boundaries are exact and the result is independent of DST shifts.
pub fn enumerate_dates(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day.format(ISO_DATE_FORMAT).to_string());
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }
    dates
}

/// Records whose date falls within the inclusive range.
pub fn filter_by_date_range(
    records: &[AttendanceRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<AttendanceRecord> {
    let in_range: HashSet<String> = enumerate_dates(start, end).into_iter().collect();
    records
        .iter()
        .filter(|r| in_range.contains(&r.date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).expect("test date")
    }

    #[test]
    fn parses_strict_iso_dates_only() {
        assert_eq!(parse_iso_date("2025-01-30"), NaiveDate::from_ymd_opt(2025, 1, 30));
        assert_eq!(parse_iso_date(" 2025-01-30 "), NaiveDate::from_ymd_opt(2025, 1, 30));
        assert!(parse_iso_date("30/01/2025").is_none());
        assert!(parse_iso_date("2025-02-30").is_none());
        assert!(parse_iso_date("").is_none());
    }

    #[test]
    fn enumerates_across_month_boundary() {
        assert_eq!(
            enumerate_dates(d("2025-01-30"), d("2025-02-02")),
            vec!["2025-01-30", "2025-01-31", "2025-02-01", "2025-02-02"]
        );
    }

    #[test]
    fn enumerates_across_year_boundary() {
        assert_eq!(
            enumerate_dates(d("2024-12-30"), d("2025-01-02")),
            vec!["2024-12-30", "2024-12-31", "2025-01-01", "2025-01-02"]
        );
    }

    #[test]
    fn leap_day_is_included() {
        assert_eq!(
            enumerate_dates(d("2024-02-28"), d("2024-03-01")),
            vec!["2024-02-28", "2024-02-29", "2024-03-01"]
        );
    }

    #[test]
    fn single_day_range_has_one_date() {
        assert_eq!(enumerate_dates(d("2025-06-15"), d("2025-06-15")), vec!["2025-06-15"]);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(enumerate_dates(d("2025-02-02"), d("2025-01-30")).is_empty());
    }

    #[test]
    fn length_matches_inclusive_day_count() {
        let start = d("2025-03-10");
        let end = d("2025-05-07");
        let expected = (end - start).num_days() + 1;
        assert_eq!(enumerate_dates(start, end).len() as i64, expected);
    }

    #[test]
    fn filter_keeps_only_in_range_records() {
        let records = vec![
            AttendanceRecord {
                student_id: "s1".to_string(),
                date: "2025-01-29".to_string(),
                morning: true,
                evening: true,
            },
            AttendanceRecord {
                student_id: "s1".to_string(),
                date: "2025-01-31".to_string(),
                morning: true,
                evening: false,
            },
            AttendanceRecord {
                student_id: "s2".to_string(),
                date: "2025-02-03".to_string(),
                morning: false,
                evening: true,
            },
        ];
        let kept = filter_by_date_range(&records, d("2025-01-30"), d("2025-02-02"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, "2025-01-31");
    }
}
