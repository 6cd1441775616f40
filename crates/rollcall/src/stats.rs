//! Dashboard statistics.
//!
//! Everything is recomputed from the full collections on each call.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::{AttendanceRecord, AttendanceStatus, Student, DATE_FORMAT};

/// Number of days covered by the trend, ending today.
pub const TREND_DAYS: u64 = 7;

/// Summary shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Number of students.
    pub total_students: usize,
    /// Records dated today with status `Present`.
    pub present_today: usize,
    /// Records dated today with status `Absent`.
    pub absent_today: usize,
    /// Records dated today with status `Late`.
    pub late_today: usize,
    /// Students per year level.
    pub year_distribution: BTreeMap<String, usize>,
    /// Students per section.
    pub section_distribution: BTreeMap<String, usize>,
    /// Present counts for the last [`TREND_DAYS`] days, oldest first.
    pub weekly_trend: Vec<DayTrend>,
}

/// Present count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTrend {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Records on that date with status `Present`.
    pub present: usize,
}

impl DashboardStats {
    /// Compute the dashboard as of `today`.
    #[must_use]
    pub fn compute(
        students: &[Student],
        attendance: &[AttendanceRecord],
        today: NaiveDate,
    ) -> Self {
        let today_str = today.format(DATE_FORMAT).to_string();

        let mut present_today = 0;
        let mut absent_today = 0;
        let mut late_today = 0;
        for record in attendance.iter().filter(|r| r.date == today_str) {
            match record.known_status() {
                Some(AttendanceStatus::Present) => present_today += 1,
                Some(AttendanceStatus::Absent) => absent_today += 1,
                Some(AttendanceStatus::Late) => late_today += 1,
                None => {}
            }
        }

        Self {
            total_students: students.len(),
            present_today,
            absent_today,
            late_today,
            year_distribution: distribution(students.iter().map(|s| s.year.as_str())),
            section_distribution: distribution(students.iter().map(|s| s.section.as_str())),
            weekly_trend: weekly_trend(attendance, today),
        }
    }
}

fn distribution<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

fn weekly_trend(attendance: &[AttendanceRecord], today: NaiveDate) -> Vec<DayTrend> {
    (0..TREND_DAYS)
        .rev()
        .map(|back| {
            let date = today
                .checked_sub_days(Days::new(back))
                .unwrap_or(NaiveDate::MIN)
                .format(DATE_FORMAT)
                .to_string();
            let present = attendance
                .iter()
                .filter(|r| r.date == date && r.known_status() == Some(AttendanceStatus::Present))
                .count();
            DayTrend { date, present }
        })
        .collect()
}
