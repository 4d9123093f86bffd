use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    /// External student number, e.g. from an imported roster. Distinct from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    /// Calendar date in YYYY-MM-DD form.
    pub date: String,
    pub morning: bool,
    pub evening: bool,
}

/// The complete persisted state: all students (insertion order) and all
/// attendance records. Serialized wholesale through the persistence gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

pub fn new_student_id() -> String {
    Uuid::new_v4().to_string()
}

impl Dataset {
    /// At most one record exists per (student, date). An existing record is
    /// updated in place, keeping its position; otherwise a new one is appended.
    pub fn upsert_attendance(&mut self, student_id: &str, date: &str, morning: bool, evening: bool) {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.student_id == student_id && r.date == date)
        {
            existing.morning = morning;
            existing.evening = evening;
        } else {
            self.records.push(AttendanceRecord {
                student_id: student_id.to_string(),
                date: date.to_string(),
                morning,
                evening,
            });
        }
    }

    /// Removes the student and cascades to every record referencing it.
    /// Removing an unknown id is a no-op.
    pub fn remove_student(&mut self, student_id: &str) {
        self.students.retain(|s| s.id != student_id);
        self.records.retain(|r| r.student_id != student_id);
    }

    /// Appends to the student sequence. Duplicate names are permitted; id
    /// uniqueness is the caller's responsibility (see `new_student_id`).
    pub fn add_students(&mut self, new_students: Vec<Student>) {
        self.students.extend(new_students);
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn record_for(&self, student_id: &str, date: &str) -> Option<&AttendanceRecord> {
        self.records
            .iter()
            .find(|r| r.student_id == student_id && r.date == date)
    }

    /// Sorted, deduplicated list of every date with at least one record.
    pub fn unique_dates(&self) -> Vec<String> {
        let mut dates: Vec<String> = self.records.iter().map(|r| r.date.clone()).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}
