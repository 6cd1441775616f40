//! `rollcall` - Student attendance tracking over plain CSV files
//!
//! Students and attendance records live in two CSV files. This library
//! provides the record store, the query filter, dashboard aggregation, change
//! notification, and the HTTP layer that ties them together.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod notify;
pub mod record;
pub mod server;
pub mod service;
pub mod stats;
pub mod store;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use notify::{ChangeEvent, ChangeKind, Notifier};
pub use record::{AttendanceRecord, AttendanceStatus, Record, Student};
pub use service::Tracker;
pub use stats::DashboardStats;
pub use store::RecordStore;
