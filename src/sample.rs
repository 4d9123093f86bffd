use crate::store::{AttendanceRecord, Dataset, Student};

/// Demo roster and a few days of records, used to seed a fresh workspace.
/// Replaces the whole dataset; the UI confirms with the user before calling.
pub fn sample_dataset() -> Dataset {
    let students = [
        ("student-1", "Ahmet Yılmaz"),
        ("student-2", "Ayşe Demir"),
        ("student-3", "Mehmet Kaya"),
        ("student-4", "Fatma Özkan"),
        ("student-5", "Mustafa Çelik"),
        ("student-6", "Zeynep Arslan"),
        ("student-7", "Yusuf Şahin"),
        ("student-8", "Elif Doğan"),
    ]
    .into_iter()
    .map(|(id, name)| Student {
        id: id.to_string(),
        name: name.to_string(),
        student_id: None,
    })
    .collect();

    let days: [(&str, [(bool, bool); 8]); 4] = [
        (
            "2025-01-04",
            [
                (true, true),
                (true, false),
                (true, true),
                (false, true),
                (true, true),
                (true, true),
                (false, false),
                (true, true),
            ],
        ),
        (
            "2025-01-03",
            [
                (true, true),
                (true, true),
                (true, true),
                (true, true),
                (false, true),
                (true, true),
                (true, true),
                (true, true),
            ],
        ),
        (
            "2025-01-02",
            [
                (true, true),
                (true, true),
                (false, true),
                (true, false),
                (true, true),
                (true, true),
                (true, true),
                (true, true),
            ],
        ),
        (
            "2025-01-01",
            [
                (true, true),
                (true, true),
                (true, true),
                (true, true),
                (true, true),
                (true, true),
                (false, false),
                (true, true),
            ],
        ),
    ];

    let mut records = Vec::new();
    for (date, presences) in days {
        for (i, (morning, evening)) in presences.into_iter().enumerate() {
            records.push(AttendanceRecord {
                student_id: format!("student-{}", i + 1),
                date: date.to_string(),
                morning,
                evening,
            });
        }
    }

    Dataset { students, records }
}
