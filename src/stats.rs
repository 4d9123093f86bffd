use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::store::{AttendanceRecord, Dataset, Student};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub student_id: String,
    pub student_name: String,
    pub total_sessions: i64,
    pub attended_sessions: i64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_students: i64,
    pub total_sessions: i64,
    pub attended_sessions: i64,
    pub average_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    pub date: String,
    pub record_count: i64,
    pub morning_present: i64,
    pub evening_present: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub date_range: DateRange,
    pub stats: Vec<StudentStats>,
    pub total_students: i64,
    pub average_attendance: f64,
    pub daily: Vec<DayBreakdown>,
}

fn round_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Attendance stats for one student over the records in scope. Each record
/// contributes two sessions (morning and evening); a student with no records
/// in scope has zero sessions and a 0 percentage.
pub fn compute_stats(student: &Student, records: &[AttendanceRecord]) -> StudentStats {
    let mut record_count: i64 = 0;
    let mut attended_sessions: i64 = 0;
    for record in records.iter().filter(|r| r.student_id == student.id) {
        record_count += 1;
        attended_sessions += i64::from(record.morning) + i64::from(record.evening);
    }
    let total_sessions = record_count * 2;
    let attendance_percentage = if total_sessions > 0 {
        round_2_decimals(attended_sessions as f64 / total_sessions as f64 * 100.0)
    } else {
        0.0
    };
    StudentStats {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        total_sessions,
        attended_sessions,
        attendance_percentage,
    }
}

/// Dataset-level summary. The average is the arithmetic mean of the
/// per-student percentages, not attended/total over the whole pool: each
/// student weighs the same regardless of how many days they have records for.
pub fn aggregate(stats: &[StudentStats]) -> StatsSummary {
    if stats.is_empty() {
        return StatsSummary {
            total_students: 0,
            total_sessions: 0,
            attended_sessions: 0,
            average_attendance: 0.0,
        };
    }
    let total_sessions: i64 = stats.iter().map(|s| s.total_sessions).sum();
    let attended_sessions: i64 = stats.iter().map(|s| s.attended_sessions).sum();
    let average_attendance =
        stats.iter().map(|s| s.attendance_percentage).sum::<f64>() / stats.len() as f64;
    StatsSummary {
        total_students: stats.len() as i64,
        total_sessions,
        attended_sessions,
        average_attendance,
    }
}

/// Per-date presence counts over the given dates, in date order.
pub fn daily_breakdown(records: &[AttendanceRecord], dates: &[String]) -> Vec<DayBreakdown> {
    dates
        .iter()
        .map(|date| {
            let mut record_count = 0;
            let mut morning_present = 0;
            let mut evening_present = 0;
            for record in records.iter().filter(|r| &r.date == date) {
                record_count += 1;
                morning_present += i64::from(record.morning);
                evening_present += i64::from(record.evening);
            }
            DayBreakdown {
                date: date.clone(),
                record_count,
                morning_present,
                evening_present,
            }
        })
        .collect()
}

/// Assembles the report over `[start, end]`. Range ordering has already been
/// validated by the caller; an inverted range simply yields an empty scope.
pub fn build_report(data: &Dataset, start: NaiveDate, end: NaiveDate) -> Report {
    let in_range = dates::filter_by_date_range(&data.records, start, end);
    let stats: Vec<StudentStats> = data
        .students
        .iter()
        .map(|s| compute_stats(s, &in_range))
        .collect();
    let summary = aggregate(&stats);
    let day_list = dates::enumerate_dates(start, end);
    let daily = daily_breakdown(&in_range, &day_list);
    Report {
        date_range: DateRange {
            start: start.format(dates::ISO_DATE_FORMAT).to_string(),
            end: end.format(dates::ISO_DATE_FORMAT).to_string(),
        },
        stats,
        total_students: summary.total_students,
        average_attendance: summary.average_attendance,
        daily,
    }
}
