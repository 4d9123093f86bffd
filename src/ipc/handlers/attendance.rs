use rusqlite::Connection;
use serde_json::json;

use super::{get_required_bool, get_required_str, open_workspace, HandlerErr};
use crate::dates;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::persist;
use crate::store::Dataset;

fn require_iso_date(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    let raw = get_required_str(params, key)?;
    let Some(parsed) = dates::parse_iso_date(&raw) else {
        return Err(HandlerErr::new(
            "bad_params",
            format!("{} must be a YYYY-MM-DD date", key),
        ));
    };
    Ok(parsed.format(dates::ISO_DATE_FORMAT).to_string())
}

/// One row per student for the given date. `recorded` distinguishes an
/// explicit both-absent record from no record at all.
fn attendance_day_open(
    data: &Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = require_iso_date(params, "date")?;
    let rows: Vec<serde_json::Value> = data
        .students
        .iter()
        .map(|s| {
            let record = data.record_for(&s.id, &date);
            json!({
                "studentId": s.id,
                "name": s.name,
                "morning": record.map(|r| r.morning).unwrap_or(false),
                "evening": record.map(|r| r.evening).unwrap_or(false),
                "recorded": record.is_some()
            })
        })
        .collect();
    Ok(json!({ "date": date, "rows": rows }))
}

fn attendance_set_student_day(
    conn: &Connection,
    data: &mut Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let date = require_iso_date(params, "date")?;
    let morning = get_required_bool(params, "morning")?;
    let evening = get_required_bool(params, "evening")?;

    if data.student(&student_id).is_none() {
        return Err(HandlerErr::new("not_found", "student not found"));
    }

    data.upsert_attendance(&student_id, &date, morning, evening);
    persist::save_dataset(conn, data);
    Ok(json!({ "ok": true }))
}

fn handle_attendance_day_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((_, data)) => match attendance_day_open(data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_attendance_set_student_day(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((conn, data)) => match attendance_set_student_day(conn, data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_attendance_dates(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((_, data)) => ok(&req.id, json!({ "dates": data.unique_dates() })),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.dayOpen" => Some(handle_attendance_day_open(state, req)),
        "attendance.setStudentDay" => Some(handle_attendance_set_student_day(state, req)),
        "attendance.dates" => Some(handle_attendance_dates(state, req)),
        _ => None,
    }
}
