use calamine::{open_workbook_auto, Data, Reader};
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_dormtrackd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn dormtrackd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or("")
}

fn seeded_sidecar(workspace: &PathBuf) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let (child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "seed-1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "seed-2",
        "students.loadSample",
        json!({}),
    );
    (child, stdin, reader)
}

#[test]
fn preview_computes_stats_over_the_full_sample_range() {
    let workspace = temp_dir("dormtrack-report-preview");
    let (_child, mut stdin, mut reader) = seeded_sidecar(&workspace);

    let preview = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.preview",
        json!({ "startDate": "2025-01-01", "endDate": "2025-01-04" }),
    );
    let report = preview.get("report").cloned().expect("report");
    assert_eq!(report.get("totalStudents").and_then(|v| v.as_i64()), Some(8));
    assert_eq!(
        report.get("averageAttendance").and_then(|v| v.as_f64()),
        Some(85.9375)
    );

    let stats = report.get("stats").and_then(|v| v.as_array()).expect("stats");
    assert_eq!(stats.len(), 8);
    // Every student has 4 days in range, two sessions each.
    for stat in stats {
        assert_eq!(stat.get("totalSessions").and_then(|v| v.as_i64()), Some(8));
    }
    let s7 = stats
        .iter()
        .find(|s| s.get("studentId").and_then(|v| v.as_str()) == Some("student-7"))
        .expect("student-7 stats");
    assert_eq!(s7.get("attendedSessions").and_then(|v| v.as_i64()), Some(4));
    assert_eq!(
        s7.get("attendancePercentage").and_then(|v| v.as_f64()),
        Some(50.0)
    );

    let daily = report.get("daily").and_then(|v| v.as_array()).expect("daily");
    assert_eq!(daily.len(), 4);
    let jan4 = daily
        .iter()
        .find(|d| d.get("date").and_then(|v| v.as_str()) == Some("2025-01-04"))
        .expect("jan 4 breakdown");
    assert_eq!(jan4.get("recordCount").and_then(|v| v.as_i64()), Some(8));
    assert_eq!(jan4.get("morningPresent").and_then(|v| v.as_i64()), Some(6));
    assert_eq!(jan4.get("eveningPresent").and_then(|v| v.as_i64()), Some(6));
}

#[test]
fn preview_restricts_to_the_requested_range() {
    let workspace = temp_dir("dormtrack-report-subrange");
    let (_child, mut stdin, mut reader) = seeded_sidecar(&workspace);

    let preview = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.preview",
        json!({ "startDate": "2025-01-03", "endDate": "2025-01-04" }),
    );
    let report = preview.get("report").cloned().expect("report");
    let stats = report.get("stats").and_then(|v| v.as_array()).expect("stats");
    for stat in stats {
        assert_eq!(stat.get("totalSessions").and_then(|v| v.as_i64()), Some(4));
    }
    let s2 = stats
        .iter()
        .find(|s| s.get("studentId").and_then(|v| v.as_str()) == Some("student-2"))
        .expect("student-2 stats");
    assert_eq!(s2.get("attendedSessions").and_then(|v| v.as_i64()), Some(3));
    assert_eq!(
        s2.get("attendancePercentage").and_then(|v| v.as_f64()),
        Some(75.0)
    );

    // A single-day range enumerates exactly one date.
    let single = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.preview",
        json!({ "startDate": "2025-01-02", "endDate": "2025-01-02" }),
    );
    let daily = single
        .get("report")
        .and_then(|r| r.get("daily"))
        .and_then(|v| v.as_array())
        .expect("daily");
    assert_eq!(daily.len(), 1);
    assert_eq!(
        daily[0].get("date").and_then(|v| v.as_str()),
        Some("2025-01-02")
    );
}

#[test]
fn range_validation_rejects_inverted_and_malformed_dates() {
    let workspace = temp_dir("dormtrack-report-validation");
    let (_child, mut stdin, mut reader) = seeded_sidecar(&workspace);

    let inverted = request(
        &mut stdin,
        &mut reader,
        "1",
        "reports.preview",
        json!({ "startDate": "2025-01-04", "endDate": "2025-01-01" }),
    );
    assert_eq!(error_code(&inverted), "invalid_range");

    let missing = request(
        &mut stdin,
        &mut reader,
        "2",
        "reports.preview",
        json!({ "startDate": "2025-01-01" }),
    );
    assert_eq!(error_code(&missing), "bad_params");

    let malformed = request(
        &mut stdin,
        &mut reader,
        "3",
        "reports.preview",
        json!({ "startDate": "01/01/2025", "endDate": "2025-01-04" }),
    );
    assert_eq!(error_code(&malformed), "bad_params");
}

#[test]
fn generate_writes_the_two_sheet_workbook() {
    let workspace = temp_dir("dormtrack-report-generate");
    let out_dir = temp_dir("dormtrack-report-out");
    let (_child, mut stdin, mut reader) = seeded_sidecar(&workspace);

    let generated = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.generate",
        json!({
            "startDate": "2025-01-01",
            "endDate": "2025-01-04",
            "outputDir": out_dir.to_string_lossy()
        }),
    );
    assert_eq!(
        generated.get("filename").and_then(|v| v.as_str()),
        Some("attendance-report-1-1-2025-to-1-4-2025.xlsx")
    );
    let path = PathBuf::from(
        generated
            .get("path")
            .and_then(|v| v.as_str())
            .expect("report path"),
    );
    assert!(path.exists(), "report file missing at {}", path.display());

    let mut workbook = open_workbook_auto(&path).expect("reopen report");
    assert_eq!(
        workbook.sheet_names().to_vec(),
        vec!["Summary", "Detailed Stats"]
    );
    let summary = workbook.worksheet_range("Summary").expect("summary sheet");
    assert_eq!(
        summary.get((0, 0)),
        Some(&Data::String("Dorm Attendance Report".to_string()))
    );
    assert_eq!(
        summary.get((1, 0)),
        Some(&Data::String(
            "Date Range: 2025-01-01 to 2025-01-04".to_string()
        ))
    );
    assert_eq!(
        summary.get((2, 0)),
        Some(&Data::String("Total Students: 8".to_string()))
    );
    assert_eq!(
        summary.get((3, 0)),
        Some(&Data::String("Average Attendance: 85.94%".to_string()))
    );
    // Header block, blank row, then one row per student in roster order.
    assert_eq!(
        summary.get((6, 0)),
        Some(&Data::String("Ahmet Yılmaz".to_string()))
    );
    assert_eq!(summary.get((13, 1)), Some(&Data::Float(8.0)));
}

#[test]
fn generate_with_no_records_in_range_is_still_valid() {
    let workspace = temp_dir("dormtrack-report-empty-range");
    let out_dir = temp_dir("dormtrack-report-empty-out");
    let (_child, mut stdin, mut reader) = seeded_sidecar(&workspace);

    let generated = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.generate",
        json!({
            "startDate": "2030-06-01",
            "endDate": "2030-06-07",
            "outputDir": out_dir.to_string_lossy()
        }),
    );
    let report = generated.get("report").cloned().expect("report");
    // Students exist but none have records in range: all-zero stats.
    assert_eq!(report.get("totalStudents").and_then(|v| v.as_i64()), Some(8));
    assert_eq!(
        report.get("averageAttendance").and_then(|v| v.as_f64()),
        Some(0.0)
    );
    let path = PathBuf::from(
        generated
            .get("path")
            .and_then(|v| v.as_str())
            .expect("report path"),
    );
    assert!(path.exists());
}
