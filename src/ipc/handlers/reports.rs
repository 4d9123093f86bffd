use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::json;

use super::{get_required_str, open_workspace, HandlerErr};
use crate::dates;
use crate::export;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::Dataset;

/// The report flow is the one place range ordering is checked; the date
/// utilities below it assume `start <= end`.
fn parse_range(params: &serde_json::Value) -> Result<(NaiveDate, NaiveDate), HandlerErr> {
    let start_raw = get_required_str(params, "startDate")?;
    let end_raw = get_required_str(params, "endDate")?;
    let start = dates::parse_iso_date(&start_raw).ok_or_else(|| {
        HandlerErr::new("bad_params", "startDate must be a YYYY-MM-DD date")
    })?;
    let end = dates::parse_iso_date(&end_raw)
        .ok_or_else(|| HandlerErr::new("bad_params", "endDate must be a YYYY-MM-DD date"))?;
    if start > end {
        return Err(HandlerErr::new(
            "invalid_range",
            "Start date cannot be after end date",
        ));
    }
    Ok((start, end))
}

fn reports_preview(
    data: &Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let (start, end) = parse_range(params)?;
    let report = stats::build_report(data, start, end);
    Ok(json!({ "report": report }))
}

fn reports_generate(
    data: &Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let (start, end) = parse_range(params)?;
    let dir = PathBuf::from(get_required_str(params, "outputDir")?);
    let report = stats::build_report(data, start, end);
    let path = export::write_report(&dir, &report)
        .map_err(|e| HandlerErr::new("export_failed", e.to_string()))?;
    Ok(json!({
        "report": report,
        "filename": export::report_filename(start, end),
        "path": path.to_string_lossy()
    }))
}

fn handle_reports_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((_, data)) => match reports_preview(data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_reports_generate(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((_, data)) => match reports_generate(data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.preview" => Some(handle_reports_preview(state, req)),
        "reports.generate" => Some(handle_reports_generate(state, req)),
        _ => None,
    }
}
