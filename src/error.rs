//! Error types for schemagen
//!
//! This module defines the fatal error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Recoverable data problems (non-homogeneous arrays, type conflicts,
//! skipped records) are not errors in this sense: they are collected as
//! [`ErrorLog`](crate::schema::ErrorLog) entries and never abort a run.

use thiserror::Error;

/// The main error type for schemagen
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Existing Schema Errors
    // ============================================================================
    #[error("Unknown schema type '{type_name}'")]
    UnknownType { type_name: String },

    #[error("Invalid existing schema: {message}")]
    InvalidSchema { message: String },

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("Failed to decode record: {message}")]
    Decode { message: String },

    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    #[error("Invalid record {record_number}: {message}")]
    InvalidRecord { record_number: usize, message: String },

    // ============================================================================
    // Internal Errors
    // ============================================================================
    #[error("Internal error (should never happen): {message}")]
    Internal { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown type error
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid existing schema error
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(record_number: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            record_number,
            message: message.into(),
        }
    }

    /// Create an internal invariant violation error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error came from the input data rather than the program
    ///
    /// Data errors may be tolerated with `ignore_invalid_lines`; everything
    /// else aborts the run.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::Decode { .. }
                | Error::CsvParse { .. }
                | Error::JsonParse(_)
                | Error::InvalidRecord { .. }
        )
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => Self::CsvParse {
                message: format!("line {}: {err}", pos.line()),
            },
            None => Self::CsvParse {
                message: err.to_string(),
            },
        }
    }
}

/// Result type alias for schemagen
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
