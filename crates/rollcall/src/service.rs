//! Request handling independent of transport.
//!
//! [`Tracker`] validates input, runs the store operation, and publishes a
//! change event once the mutation succeeded. It holds no state of its own
//! beyond handles to the store, the notifier and the clock.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::{Clock, LocalClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{self, AttendanceQuery};
use crate::notify::{ChangeKind, Notifier};
use crate::record::{AttendanceRecord, Student, CREATED_AT_FORMAT, DATE_FORMAT};
use crate::stats::DashboardStats;
use crate::store::RecordStore;

/// Body of a create or update student request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentInput {
    /// Full name. Required.
    pub name: Option<String>,
    /// Contact email. Required.
    pub email: Option<String>,
    /// Year level. Required.
    pub year: Option<String>,
    /// Section. Required.
    pub section: Option<String>,
}

/// Body of a mark-attendance request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttendanceInput {
    /// Student identifier, as a number or numeric string. Required.
    pub student_id: Option<IdInput>,
    /// Student name. Required.
    pub student_name: Option<String>,
    /// Year level. Required.
    pub year: Option<String>,
    /// Section. Required.
    pub section: Option<String>,
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    /// Status text. Required.
    pub status: Option<String>,
    /// Free-form notes; defaults to empty.
    pub notes: Option<String>,
}

/// An identifier supplied either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    /// `1`
    Number(u64),
    /// `"1"`
    Text(String),
}

impl IdInput {
    fn resolve(self, field: &'static str) -> Result<u64> {
        let id = match self {
            Self::Number(n) => n,
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::invalid_field(field, format!("not an integer: {s:?}")))?,
        };
        if id == 0 {
            return Err(Error::invalid_field(field, "must be a positive integer"));
        }
        Ok(id)
    }
}

impl From<u64> for IdInput {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

/// Outcome of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Identifier allocated by a create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl MutationResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
        }
    }

    fn created(message: impl Into<String>, id: u64) -> Self {
        Self {
            id: Some(id),
            ..Self::ok(message)
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value.ok_or(Error::MissingField { field })
}

/// Accept only a real calendar date already written as `YYYY-MM-DD`.
fn canonical_date(date: String) -> Result<String> {
    match NaiveDate::parse_from_str(&date, DATE_FORMAT) {
        Ok(parsed) if parsed.format(DATE_FORMAT).to_string() == date => Ok(date),
        _ => Err(Error::invalid_field(
            "date",
            format!("expected YYYY-MM-DD, got {date:?}"),
        )),
    }
}

struct StudentFields {
    name: String,
    email: String,
    year: String,
    section: String,
}

impl StudentInput {
    fn validate(self) -> Result<StudentFields> {
        Ok(StudentFields {
            name: required(self.name, "name")?,
            email: required(self.email, "email")?,
            year: required(self.year, "year")?,
            section: required(self.section, "section")?,
        })
    }
}

/// The attendance service: store, notifier and clock.
#[derive(Debug)]
pub struct Tracker {
    store: RecordStore,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    /// Build a tracker from its parts.
    #[must_use]
    pub fn new(store: RecordStore, notifier: Notifier, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Open the store described by `config` and use the local clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection files cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            RecordStore::open(&config.storage)?,
            Notifier::new(config.notifier.channel_capacity),
            Arc::new(LocalClock),
        ))
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The change notifier.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Today's date according to the tracker's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn publish(&self, kind: ChangeKind) {
        self.notifier.publish(kind, self.clock.now());
    }

    /// All students in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the students file cannot be read or parsed.
    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.store.students().read_all()
    }

    /// Create a student and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a required field is absent, or a
    /// storage error.
    pub fn create_student(&self, input: StudentInput) -> Result<MutationResponse> {
        let fields = input.validate()?;
        let created_at = self.clock.now().format(CREATED_AT_FORMAT).to_string();

        let student = self.store.students().insert_with(|id| Student {
            id,
            name: fields.name,
            email: fields.email,
            year: fields.year,
            section: fields.section,
            created_at,
        })?;

        self.publish(ChangeKind::StudentCreated);
        Ok(MutationResponse::created(
            "Student created successfully",
            student.id,
        ))
    }

    /// Replace a student's name, email, year and section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for absent input, [`Error::NotFound`]
    /// if no student has `id`, or a storage error. Nothing is written on
    /// error.
    pub fn update_student(&self, id: u64, input: StudentInput) -> Result<MutationResponse> {
        let fields = input.validate()?;

        self.store.students().update(id, |student| {
            student.name = fields.name;
            student.email = fields.email;
            student.year = fields.year;
            student.section = fields.section;
        })?;

        self.publish(ChangeKind::StudentUpdated);
        Ok(MutationResponse::ok("Student updated successfully"))
    }

    /// Delete a student. Succeeds whether or not the student existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn delete_student(&self, id: u64) -> Result<MutationResponse> {
        self.store.students().remove(id)?;
        self.publish(ChangeKind::StudentDeleted);
        Ok(MutationResponse::ok("Student deleted successfully"))
    }

    /// Attendance records matching the query, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the attendance file cannot be read or parsed.
    pub fn list_attendance(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRecord>> {
        let records = self.store.attendance().read_all()?;
        Ok(filter::filter(records, &query.criteria()))
    }

    /// Record one attendance mark and return its allocated id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for absent input,
    /// [`Error::InvalidField`] for a non-numeric `student_id` or a `date`
    /// that is not `YYYY-MM-DD`, or a storage error.
    pub fn mark_attendance(&self, input: AttendanceInput) -> Result<MutationResponse> {
        let student_id = input
            .student_id
            .ok_or(Error::MissingField {
                field: "student_id",
            })?
            .resolve("student_id")?;
        let student_name = required(input.student_name, "student_name")?;
        let year = required(input.year, "year")?;
        let section = required(input.section, "section")?;
        let status = required(input.status, "status")?;

        let date = match input.date.filter(|d| !d.is_empty()) {
            Some(date) => canonical_date(date)?,
            None => self.today().format(DATE_FORMAT).to_string(),
        };
        let notes = input.notes.unwrap_or_default();

        let record = self.store.attendance().insert_with(|id| AttendanceRecord {
            id,
            student_id,
            student_name,
            year,
            section,
            date,
            status,
            notes,
        })?;

        info!(
            "Marked student {} as {} on {}",
            record.student_id, record.status, record.date
        );
        self.publish(ChangeKind::AttendanceMarked);
        Ok(MutationResponse::created(
            "Attendance marked successfully",
            record.id,
        ))
    }

    /// Delete an attendance record. Succeeds whether or not it existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn delete_attendance(&self, id: u64) -> Result<MutationResponse> {
        self.store.attendance().remove(id)?;
        self.publish(ChangeKind::AttendanceDeleted);
        Ok(MutationResponse::ok(
            "Attendance record deleted successfully",
        ))
    }

    /// Dashboard statistics as of now.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read or parsed.
    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let students = self.store.students().read_all()?;
        let attendance = self.store.attendance().read_all()?;
        Ok(DashboardStats::compute(&students, &attendance, self.today()))
    }

    /// The students file exactly as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn export_students(&self) -> Result<Vec<u8>> {
        self.store.students().raw_bytes()
    }

    /// The attendance file exactly as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn export_attendance(&self) -> Result<Vec<u8>> {
        self.store.attendance().raw_bytes()
    }
}
