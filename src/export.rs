use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::dates;
use crate::stats::Report;
use crate::store::Student;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

const SUMMARY_HEADERS: [&str; 4] = [
    "Student Name",
    "Total Sessions",
    "Attended Sessions",
    "Attendance %",
];

/// `attendance-report-<start>-to-<end>.xlsx`, dates rendered as US short
/// dates with the slashes replaced so the result is a valid filename.
pub fn report_filename(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "attendance-report-{}-to-{}.xlsx",
        start.format("%-m-%-d-%Y"),
        end.format("%-m-%-d-%Y")
    )
}

/// Builds the two-sheet report workbook. An empty stats list still produces
/// a valid sheet pair with the summary header block and no student rows.
pub fn report_workbook(report: &Report) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let mut summary = Worksheet::new();
    summary.set_name("Summary")?;
    summary.write_string(0, 0, "Dorm Attendance Report")?;
    summary.write_string(
        1,
        0,
        &format!(
            "Date Range: {} to {}",
            report.date_range.start, report.date_range.end
        ),
    )?;
    summary.write_string(2, 0, &format!("Total Students: {}", report.total_students))?;
    summary.write_string(
        3,
        0,
        &format!("Average Attendance: {:.2}%", report.average_attendance),
    )?;
    // Row 4 stays blank to separate the header block from the table.
    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        summary.write_string(5, col as u16, *header)?;
    }
    for (i, stat) in report.stats.iter().enumerate() {
        let row = 6 + i as u32;
        summary.write_string(row, 0, &stat.student_name)?;
        summary.write_number(row, 1, stat.total_sessions as f64)?;
        summary.write_number(row, 2, stat.attended_sessions as f64)?;
        summary.write_string(row, 3, &format!("{}%", stat.attendance_percentage))?;
    }
    workbook.push_worksheet(summary);

    let mut detailed = Worksheet::new();
    detailed.set_name("Detailed Stats")?;
    detailed.write_string(0, 0, "Student Name")?;
    detailed.write_string(0, 1, "Total Sessions")?;
    detailed.write_string(0, 2, "Attended Sessions")?;
    detailed.write_string(0, 3, "Attendance Percentage")?;
    for (i, stat) in report.stats.iter().enumerate() {
        let row = 1 + i as u32;
        detailed.write_string(row, 0, &stat.student_name)?;
        detailed.write_number(row, 1, stat.total_sessions as f64)?;
        detailed.write_number(row, 2, stat.attended_sessions as f64)?;
        detailed.write_number(row, 3, stat.attendance_percentage)?;
    }
    workbook.push_worksheet(detailed);

    Ok(workbook.save_to_buffer()?)
}

/// Writes the report workbook into `dir` under its derived filename and
/// returns the full path.
pub fn write_report(dir: &Path, report: &Report) -> Result<PathBuf, ExportError> {
    let start = dates::parse_iso_date(&report.date_range.start);
    let end = dates::parse_iso_date(&report.date_range.end);
    let filename = match (start, end) {
        (Some(s), Some(e)) => report_filename(s, e),
        // The range was validated upstream; fall back to a stable name.
        _ => "attendance-report.xlsx".to_string(),
    };
    let path = dir.join(filename);
    std::fs::write(&path, report_workbook(report)?)?;
    Ok(path)
}

/// Single-sheet roster export, `Student ID | Name`, one row per student.
pub fn students_workbook(students: &[Student]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Students")?;
    worksheet.write_string(0, 0, "Student ID")?;
    worksheet.write_string(0, 1, "Name")?;
    for (i, student) in students.iter().enumerate() {
        let row = 1 + i as u32;
        worksheet.write_string(row, 0, student.student_id.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 1, &student.name)?;
    }
    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

pub fn write_students(dir: &Path, students: &[Student]) -> Result<PathBuf, ExportError> {
    let path = dir.join("students.xlsx");
    std::fs::write(&path, students_workbook(students)?)?;
    Ok(path)
}
