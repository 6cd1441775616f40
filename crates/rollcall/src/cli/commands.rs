//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::record::{AttendanceRecord, Record, Student};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind, overriding the configuration
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overriding the configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Which collection to export
    #[arg(value_enum)]
    pub collection: Collection,

    /// Write to this file, or into this directory, instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}

/// A persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    /// The student roster
    Students,
    /// Attendance records
    Attendance,
}

impl Collection {
    /// File name used when exporting into a directory.
    #[must_use]
    pub fn export_file_name(self) -> &'static str {
        match self {
            Self::Students => Student::EXPORT_FILE_NAME,
            Self::Attendance => AttendanceRecord::EXPORT_FILE_NAME,
        }
    }
}
