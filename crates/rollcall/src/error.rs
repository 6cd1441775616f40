//! Error types for rollcall.
//!
//! This module defines all error types used throughout the rollcall crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rollcall operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// A backing file could not be parsed.
    #[error("corrupt collection file {path} (line {line}): {message}")]
    StorageCorrupt {
        /// Path to the backing file.
        path: PathBuf,
        /// One-based line number where parsing failed.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to read or write a backing file.
    #[error("storage I/O failed for {path}: {source}")]
    StorageIo {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Request Errors ===
    /// A required input field was not supplied.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// An input field was supplied but could not be interpreted.
    #[error("invalid field '{field}': {message}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// The record targeted by an update does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// The kind of record that was looked up.
        kind: &'static str,
        /// The identifier that was looked up.
        id: u64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a corrupt-storage error for the given file and line.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::StorageCorrupt {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a storage I/O error for the given file.
    #[must_use]
    pub fn storage_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Check if this error was caused by bad client input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidField { .. })
    }

    /// Check if this error indicates a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error indicates an unparseable backing file.
    #[must_use]
    pub fn is_storage_corrupt(&self) -> bool {
        matches!(self, Self::StorageCorrupt { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingField { field: "email" };
        assert_eq!(err.to_string(), "missing required field: email");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            kind: "student",
            id: 42,
        };
        assert_eq!(err.to_string(), "student 42 not found");
        assert!(err.is_not_found());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_error_predicates() {
        assert!(Error::MissingField { field: "name" }.is_client_error());
        assert!(Error::invalid_field("student_id", "not a number").is_client_error());
        assert!(!Error::internal("boom").is_client_error());
    }

    #[test]
    fn test_corrupt_display() {
        let err = Error::corrupt("/tmp/students.csv", 3, "expected 6 fields, found 2");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/students.csv"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("expected 6 fields"));
        assert!(err.is_storage_corrupt());
    }

    #[test]
    fn test_storage_io_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::storage_io("/data/attendance.csv", io_err);
        let msg = err.to_string();
        assert!(msg.contains("/data/attendance.csv"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::invalid_field("date", "expected YYYY-MM-DD");
        let msg = err.to_string();
        assert!(msg.contains("date"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "port must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("port must be greater than 0"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden"));
    }
}
