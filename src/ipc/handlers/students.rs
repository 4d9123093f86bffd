use std::path::PathBuf;

use rusqlite::Connection;
use serde_json::json;

use super::{get_required_str, open_workspace, HandlerErr};
use crate::export;
use crate::import;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::persist;
use crate::sample;
use crate::stats;
use crate::store::{new_student_id, Dataset, Student};

fn students_list(data: &Dataset) -> serde_json::Value {
    let student_stats: Vec<stats::StudentStats> = data
        .students
        .iter()
        .map(|s| stats::compute_stats(s, &data.records))
        .collect();
    let summary = stats::aggregate(&student_stats);
    json!({
        "students": data.students,
        "stats": student_stats,
        "summary": summary
    })
}

fn students_add(
    conn: &Connection,
    data: &mut Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let name = name.trim();
    if name.is_empty() {
        return Err(HandlerErr::new("bad_params", "name must not be empty"));
    }
    let student = Student {
        id: new_student_id(),
        name: name.to_string(),
        student_id: None,
    };
    data.add_students(vec![student.clone()]);
    persist::save_dataset(conn, data);
    Ok(json!({ "student": student }))
}

fn students_import_file(
    conn: &Connection,
    data: &mut Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(get_required_str(params, "path")?);
    let students = import::import_students_from_path(&path)
        .map_err(|e| HandlerErr::new(e.code(), e.to_string()))?;
    let added = students.len();
    data.add_students(students.clone());
    persist::save_dataset(conn, data);
    Ok(json!({ "added": added, "students": students }))
}

fn students_delete(
    conn: &Connection,
    data: &mut Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    data.remove_student(&student_id);
    persist::save_dataset(conn, data);
    Ok(json!({ "ok": true }))
}

fn students_export_list(
    data: &Dataset,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let dir = PathBuf::from(get_required_str(params, "dir")?);
    let path = export::write_students(&dir, &data.students)
        .map_err(|e| HandlerErr::new("export_failed", e.to_string()))?;
    Ok(json!({ "path": path.to_string_lossy() }))
}

fn students_load_sample(conn: &Connection, data: &mut Dataset) -> serde_json::Value {
    *data = sample::sample_dataset();
    persist::save_dataset(conn, data);
    json!({
        "students": data.students.len(),
        "records": data.records.len()
    })
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((_, data)) => ok(&req.id, students_list(data)),
        Err(e) => e.response(&req.id),
    }
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((conn, data)) => match students_add(conn, data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_students_import_file(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((conn, data)) => match students_import_file(conn, data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((conn, data)) => match students_delete(conn, data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_students_export_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((_, data)) => match students_export_list(data, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        },
        Err(e) => e.response(&req.id),
    }
}

fn handle_students_load_sample(state: &mut AppState, req: &Request) -> serde_json::Value {
    match open_workspace(state) {
        Ok((conn, data)) => ok(&req.id, students_load_sample(conn, data)),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.importFile" => Some(handle_students_import_file(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.exportList" => Some(handle_students_export_list(state, req)),
        "students.loadSample" => Some(handle_students_load_sample(state, req)),
        _ => None,
    }
}
