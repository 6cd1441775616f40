//! Equality filtering over loaded records.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::record::Record;

/// Field-name to expected-value constraints. Every entry must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria(BTreeMap<String, String>);

impl Criteria {
    /// No constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint, replacing any earlier one on the same field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Whether there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `record` satisfies every constraint.
    ///
    /// A field the record type does not have never matches.
    #[must_use]
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| record.field(field).is_some_and(|v| v == expected.as_str()))
    }
}

/// Keep the records matching every criterion, in their original order.
#[must_use]
pub fn filter<R: Record>(records: Vec<R>, criteria: &Criteria) -> Vec<R> {
    if criteria.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| criteria.matches(r)).collect()
}

/// Optional narrowing for attendance listings.
///
/// Empty strings mean "no constraint", the same as an absent parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttendanceQuery {
    /// Exact date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Exact year level.
    pub year: Option<String>,
    /// Exact section.
    pub section: Option<String>,
}

impl AttendanceQuery {
    /// Convert to filter criteria.
    #[must_use]
    pub fn criteria(&self) -> Criteria {
        [
            ("date", &self.date),
            ("year", &self.year),
            ("section", &self.section),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
        .fold(Criteria::new(), |c, (field, value)| c.with(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AttendanceRecord;

    fn mark(id: u64, date: &str, year: &str, section: &str) -> AttendanceRecord {
        AttendanceRecord {
            id,
            student_id: id,
            student_name: format!("Student {id}"),
            year: year.to_string(),
            section: section.to_string(),
            date: date.to_string(),
            status: "Present".to_string(),
            notes: String::new(),
        }
    }

    fn sample() -> Vec<AttendanceRecord> {
        vec![
            mark(1, "2026-10-17", "1", "A"),
            mark(2, "2026-10-18", "1", "B"),
            mark(3, "2026-10-18", "2", "A"),
            mark(4, "2026-10-18", "1", "A"),
        ]
    }

    fn ids(records: &[AttendanceRecord]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        assert_eq!(ids(&filter(sample(), &Criteria::new())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_single_criterion() {
        let criteria = Criteria::new().with("date", "2026-10-18");
        assert_eq!(ids(&filter(sample(), &criteria)), vec![2, 3, 4]);
    }

    #[test]
    fn test_all_criteria_must_match() {
        let criteria = Criteria::new()
            .with("date", "2026-10-18")
            .with("year", "1")
            .with("section", "A");
        assert_eq!(ids(&filter(sample(), &criteria)), vec![4]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let criteria = Criteria::new().with("section", "Z");
        assert!(filter(sample(), &criteria).is_empty());
    }

    #[test]
    fn test_exact_match_only() {
        let criteria = Criteria::new().with("date", "2026-10");
        assert!(filter(sample(), &criteria).is_empty());

        let criteria = Criteria::new().with("section", "a");
        assert!(filter(sample(), &criteria).is_empty());
    }

    #[test]
    fn test_unknown_field_matches_nothing() {
        let criteria = Criteria::new().with("guardian", "Smith");
        assert!(filter(sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filter_on_numeric_field() {
        let criteria = Criteria::new().with("student_id", "3");
        assert_eq!(ids(&filter(sample(), &criteria)), vec![3]);
    }

    #[test]
    fn test_query_skips_empty_values() {
        let query = AttendanceQuery {
            date: Some(String::new()),
            year: Some("2".to_string()),
            section: None,
        };
        assert_eq!(query.criteria(), Criteria::new().with("year", "2"));
        assert_eq!(ids(&filter(sample(), &query.criteria())), vec![3]);
    }

    #[test]
    fn test_default_query_has_no_criteria() {
        assert!(AttendanceQuery::default().criteria().is_empty());
    }
}
