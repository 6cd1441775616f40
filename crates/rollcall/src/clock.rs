//! Wall-clock source.

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Supplies the server's local date and time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// The current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The system clock in the server's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
