//! Common types used throughout schemagen
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Field Mode
// ============================================================================

/// Cardinality of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Zero or one value
    #[default]
    Nullable,
    /// Zero or more values
    Repeated,
    /// Exactly one value
    Required,
}

impl Mode {
    /// Name used by the load contract
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Nullable => "NULLABLE",
            Mode::Repeated => "REPEATED",
            Mode::Required => "REQUIRED",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Input Format
// ============================================================================

/// Format of the records fed to the generator
///
/// The format decides a few capabilities of the source that the core
/// relies on: whether every record carries every column, and whether
/// output columns must keep their input position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Newline-delimited JSON (one object per line)
    #[default]
    Json,
    /// Delimited text with a header row
    Csv,
    /// Records already decoded in memory
    Dict,
}

impl InputFormat {
    /// Fields are positional: every record has every column.
    ///
    /// Only positional sources treat an empty string as a missing value,
    /// support `REQUIRED` promotion, and keep input column order.
    pub fn is_positional(&self) -> bool {
        matches!(self, InputFormat::Csv)
    }

    /// Output schema is sorted by field name
    pub fn sorts_schema(&self) -> bool {
        !self.is_positional()
    }

    /// Name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Json => "json",
            InputFormat::Csv => "csv",
            InputFormat::Dict => "dict",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InputFormat {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            "dict" => Ok(InputFormat::Dict),
            other => Err(crate::error::Error::invalid_value(
                "input_format",
                format!("Unknown input_format '{other}'"),
            )),
        }
    }
}

/// Short name for the shape of a JSON value, used in diagnostics
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde() {
        let mode: Mode = serde_json::from_str("\"REPEATED\"").unwrap();
        assert_eq!(mode, Mode::Repeated);

        let json = serde_json::to_string(&Mode::Required).unwrap();
        assert_eq!(json, "\"REQUIRED\"");
    }

    #[test]
    fn test_mode_default() {
        assert_eq!(Mode::default(), Mode::Nullable);
    }

    #[test]
    fn test_input_format_capabilities() {
        assert!(InputFormat::Csv.is_positional());
        assert!(!InputFormat::Csv.sorts_schema());
        assert!(!InputFormat::Json.is_positional());
        assert!(InputFormat::Json.sorts_schema());
        assert!(InputFormat::Dict.sorts_schema());
    }

    #[test]
    fn test_input_format_from_str() {
        assert_eq!("CSV".parse::<InputFormat>().unwrap(), InputFormat::Csv);
        assert_eq!("json".parse::<InputFormat>().unwrap(), InputFormat::Json);
        assert!("xml".parse::<InputFormat>().is_err());
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&serde_json::json!([1])), "array");
        assert_eq!(json_kind(&serde_json::json!("x")), "string");
        assert_eq!(json_kind(&serde_json::json!(null)), "null");
    }
}
