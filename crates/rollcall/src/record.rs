//! Record types for the two collections.
//!
//! Each collection row maps to a struct implementing [`Record`], which knows
//! its fixed header and how to convert to and from a row of text fields.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Timestamp format used for `created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Calendar date format used for attendance dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A row type stored in a collection file.
pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable record kind, used in errors and logs.
    const KIND: &'static str;

    /// Column names, in file order.
    const HEADER: &'static [&'static str];

    /// File name offered when the collection is downloaded.
    const EXPORT_FILE_NAME: &'static str;

    /// The record's unique identifier.
    fn id(&self) -> u64;

    /// Encode the record as text fields in [`Self::HEADER`] order.
    fn to_row(&self) -> Vec<String>;

    /// Decode a record from text fields in [`Self::HEADER`] order.
    ///
    /// The caller guarantees `row.len() == Self::HEADER.len()`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first field that could not be parsed.
    fn from_row(row: Vec<String>) -> std::result::Result<Self, String>;

    /// Look up a field by column name for equality filtering.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier within the students collection.
    pub id: u64,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Year level.
    pub year: String,
    /// Section.
    pub section: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

/// One attendance mark for one student on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier within the attendance collection.
    pub id: u64,
    /// The student this mark refers to. Not checked against the roster.
    pub student_id: u64,
    /// Student name at the time of marking.
    pub student_name: String,
    /// Year level.
    pub year: String,
    /// Section.
    pub section: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Raw status text; see [`AttendanceStatus`] for the known values.
    pub status: String,
    /// Free-form notes, possibly empty.
    pub notes: String,
}

/// The recognised attendance statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// The student attended.
    Present,
    /// The student did not attend.
    Absent,
    /// The student arrived late.
    Late,
}

impl AttendanceStatus {
    /// All recognised statuses.
    pub const ALL: [Self; 3] = [Self::Present, Self::Absent, Self::Late];

    /// Exact, case-sensitive match against the stored text.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Present" => Some(Self::Present),
            "Absent" => Some(Self::Absent),
            "Late" => Some(Self::Late),
            _ => None,
        }
    }

    /// The stored text for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AttendanceRecord {
    /// The status, if it is one of the recognised values.
    #[must_use]
    pub fn known_status(&self) -> Option<AttendanceStatus> {
        AttendanceStatus::parse(&self.status)
    }
}

fn parse_id(column: &str, value: &str) -> std::result::Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(format!(
            "column '{column}' is not a positive integer: {value:?}"
        )),
        Ok(id) => Ok(id),
    }
}

impl Record for Student {
    const KIND: &'static str = "student";
    const EXPORT_FILE_NAME: &'static str = "students_export.csv";
    const HEADER: &'static [&'static str] =
        &["id", "name", "email", "year", "section", "created_at"];

    fn id(&self) -> u64 {
        self.id
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.year.clone(),
            self.section.clone(),
            self.created_at.clone(),
        ]
    }

    fn from_row(row: Vec<String>) -> std::result::Result<Self, String> {
        let [id, name, email, year, section, created_at]: [String; 6] = row
            .try_into()
            .map_err(|row: Vec<String>| format!("expected 6 fields, found {}", row.len()))?;
        Ok(Self {
            id: parse_id("id", &id)?,
            name,
            email,
            year,
            section,
            created_at,
        })
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "name" => Some(Cow::Borrowed(&self.name)),
            "email" => Some(Cow::Borrowed(&self.email)),
            "year" => Some(Cow::Borrowed(&self.year)),
            "section" => Some(Cow::Borrowed(&self.section)),
            "created_at" => Some(Cow::Borrowed(&self.created_at)),
            _ => None,
        }
    }
}

impl Record for AttendanceRecord {
    const KIND: &'static str = "attendance record";
    const EXPORT_FILE_NAME: &'static str = "attendance_export.csv";
    const HEADER: &'static [&'static str] = &[
        "id",
        "student_id",
        "student_name",
        "year",
        "section",
        "date",
        "status",
        "notes",
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.student_id.to_string(),
            self.student_name.clone(),
            self.year.clone(),
            self.section.clone(),
            self.date.clone(),
            self.status.clone(),
            self.notes.clone(),
        ]
    }

    fn from_row(row: Vec<String>) -> std::result::Result<Self, String> {
        let [id, student_id, student_name, year, section, date, status, notes]: [String; 8] =
            row.try_into()
                .map_err(|row: Vec<String>| format!("expected 8 fields, found {}", row.len()))?;
        Ok(Self {
            id: parse_id("id", &id)?,
            student_id: parse_id("student_id", &student_id)?,
            student_name,
            year,
            section,
            date,
            status,
            notes,
        })
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "student_id" => Some(Cow::Owned(self.student_id.to_string())),
            "student_name" => Some(Cow::Borrowed(&self.student_name)),
            "year" => Some(Cow::Borrowed(&self.year)),
            "section" => Some(Cow::Borrowed(&self.section)),
            "date" => Some(Cow::Borrowed(&self.date)),
            "status" => Some(Cow::Borrowed(&self.status)),
            "notes" => Some(Cow::Borrowed(&self.notes)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_student_row_roundtrip() {
        let student = Student {
            id: 7,
            name: "Cruz, Ana".to_string(),
            email: "ana@x.com".to_string(),
            year: "2".to_string(),
            section: "A".to_string(),
            created_at: "2026-10-18 08:30:00".to_string(),
        };
        let decoded = Student::from_row(student.to_row()).unwrap();
        assert_eq!(decoded, student);
    }

    #[test]
    fn test_student_from_row_bad_id() {
        let err = Student::from_row(row(&["x", "a", "b", "c", "d", "e"])).unwrap_err();
        assert!(err.contains("'id'"));
    }

    #[test]
    fn test_student_from_row_zero_id() {
        let err = Student::from_row(row(&["0", "a", "b", "c", "d", "e"])).unwrap_err();
        assert!(err.contains("positive integer"));
    }

    #[test]
    fn test_student_from_row_wrong_width() {
        let err = Student::from_row(row(&["1", "a"])).unwrap_err();
        assert!(err.contains("expected 6 fields, found 2"));
    }

    #[test]
    fn test_attendance_from_row() {
        let record = AttendanceRecord::from_row(row(&[
            "3",
            "1",
            "Ana Cruz",
            "2",
            "A",
            "2026-10-18",
            "Late",
            "",
        ]))
        .unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.student_id, 1);
        assert_eq!(record.known_status(), Some(AttendanceStatus::Late));
        assert!(record.notes.is_empty());
    }

    #[test]
    fn test_attendance_from_row_bad_student_id() {
        let err = AttendanceRecord::from_row(row(&[
            "3", "abc", "Ana", "2", "A", "2026-10-18", "Late", "",
        ]))
        .unwrap_err();
        assert!(err.contains("student_id"));
    }

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!(
            AttendanceStatus::parse("Present"),
            Some(AttendanceStatus::Present)
        );
        assert_eq!(AttendanceStatus::parse("present"), None);
        assert_eq!(AttendanceStatus::parse("Excused"), None);
        for status in AttendanceStatus::ALL {
            assert_eq!(AttendanceStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_field_lookup() {
        let record = AttendanceRecord {
            id: 12,
            student_id: 4,
            student_name: "Ben".to_string(),
            year: "1".to_string(),
            section: "B".to_string(),
            date: "2026-10-17".to_string(),
            status: "Present".to_string(),
            notes: "bus delay".to_string(),
        };
        assert_eq!(record.field("id").as_deref(), Some("12"));
        assert_eq!(record.field("student_id").as_deref(), Some("4"));
        assert_eq!(record.field("section").as_deref(), Some("B"));
        assert_eq!(record.field("nope"), None);
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(Student::EXPORT_FILE_NAME, "students_export.csv");
        assert_eq!(AttendanceRecord::EXPORT_FILE_NAME, "attendance_export.csv");
    }

    #[test]
    fn test_headers_match_row_width() {
        let student = Student {
            id: 1,
            name: String::new(),
            email: String::new(),
            year: String::new(),
            section: String::new(),
            created_at: String::new(),
        };
        assert_eq!(student.to_row().len(), Student::HEADER.len());
        for column in Student::HEADER {
            assert!(student.field(column).is_some(), "missing field {column}");
        }

        let record = AttendanceRecord::from_row(row(&["1", "1", "", "", "", "", "", ""])).unwrap();
        assert_eq!(record.to_row().len(), AttendanceRecord::HEADER.len());
        for column in AttendanceRecord::HEADER {
            assert!(record.field(column).is_some(), "missing field {column}");
        }
    }
}
