use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::Deserialize;
use thiserror::Error;

use crate::store::{new_student_id, Student};

/// Header spellings accepted for the roster columns, tried in order.
const NAME_HEADERS: [&str; 4] = ["Name", "name", "Student Name", "student_name"];
const CODE_HEADERS: [&str; 4] = ["Student ID", "student_id", "ID", "id"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file format: {0}. Upload .xlsx, .xls or .json files")]
    UnsupportedFormat(String),
    #[error("no valid student rows in file")]
    NoValidRows,
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::UnsupportedFormat(_) => "unsupported_format",
            ImportError::NoValidRows => "no_valid_rows",
            ImportError::Io(_) => "io_error",
        }
    }
}

/// Reads a roster file into new `Student` values. The extension is checked
/// before anything is parsed; the dataset itself is never touched here — the
/// caller decides whether to merge the result.
pub fn import_students_from_path(path: &Path) -> Result<Vec<Student>, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xls" => parse_spreadsheet_students(&std::fs::read(path)?),
        "json" => parse_json_students(&std::fs::read(path)?),
        _ => Err(ImportError::UnsupportedFormat(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string()),
        )),
    }
}

/// First sheet only, first row as headers. Rows whose resolved name is empty
/// after trimming are dropped silently; every kept row gets a fresh id.
pub fn parse_spreadsheet_students(bytes: &[u8]) -> Result<Vec<Student>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::UnsupportedFormat(format!("unreadable workbook: {}", e)))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoValidRows)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::UnsupportedFormat(format!("unreadable sheet: {}", e)))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(row) => header_columns(row),
        None => return Err(ImportError::NoValidRows),
    };
    let name_col = lookup_column(&headers, &NAME_HEADERS);
    let code_col = lookup_column(&headers, &CODE_HEADERS);

    let mut students = Vec::new();
    for row in rows {
        let name = name_col
            .and_then(|c| row.get(c))
            .map(cell_text)
            .unwrap_or_default();
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let code = code_col
            .and_then(|c| row.get(c))
            .map(cell_text)
            .unwrap_or_default();
        let code = code.trim();
        students.push(Student {
            id: new_student_id(),
            name: name.to_string(),
            student_id: (!code.is_empty()).then(|| code.to_string()),
        });
    }

    if students.is_empty() {
        return Err(ImportError::NoValidRows);
    }
    Ok(students)
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "studentId")]
    student_id: Option<String>,
}

/// Top-level JSON array of `{name, id?, studentId?}`. A supplied id is kept;
/// a missing one is generated. Empty-name entries are dropped.
pub fn parse_json_students(bytes: &[u8]) -> Result<Vec<Student>, ImportError> {
    let entries: Vec<RosterEntry> = serde_json::from_slice(bytes)
        .map_err(|e| ImportError::UnsupportedFormat(format!("invalid JSON roster: {}", e)))?;

    let mut students = Vec::new();
    for entry in entries {
        let name = entry.name.as_deref().unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let code = entry
            .student_id
            .clone()
            .or_else(|| entry.id.clone())
            .filter(|c| !c.trim().is_empty());
        let id = entry
            .id
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(new_student_id);
        students.push(Student {
            id,
            name,
            student_id: code,
        });
    }

    if students.is_empty() {
        return Err(ImportError::NoValidRows);
    }
    Ok(students)
}

fn header_columns(row: &[Data]) -> HashMap<String, usize> {
    let mut headers = HashMap::new();
    for (idx, cell) in row.iter().enumerate() {
        let text = cell_text(cell);
        let text = text.trim();
        if !text.is_empty() {
            headers.entry(text.to_string()).or_insert(idx);
        }
    }
    headers
}

/// Ordered candidate-key lookup over the header map; None when no alias hits.
fn lookup_column(headers: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| headers.get(*alias).copied())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
