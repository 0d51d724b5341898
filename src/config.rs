//! Configuration for a schema generation run
//!
//! A [`GeneratorConfig`] can be built in code, loaded from a YAML file, or
//! assembled from command-line flags. Flags given on the command line win
//! over values from a file.

use crate::error::{Error, Result};
use crate::types::InputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Generator Config
// ============================================================================

/// Options recognized by [`SchemaGenerator`](crate::schema::SchemaGenerator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Format of the input records
    #[serde(default)]
    pub input_format: InputFormat,

    /// Promote always-filled NULLABLE fields to REQUIRED (positional
    /// formats only), and allow an existing REQUIRED field to relax to
    /// NULLABLE
    #[serde(default)]
    pub infer_mode: bool,

    /// Keep fields that were only ever null, `[]` or `{}`
    #[serde(default)]
    pub keep_nulls: bool,

    /// Quoted values are always STRING
    #[serde(default)]
    pub quoted_values_are_strings: bool,

    /// Replace characters outside `[a-zA-Z0-9_]` with `_` and cap names at
    /// 127 characters
    #[serde(default)]
    pub sanitize_names: bool,

    /// Log unparseable records and keep going instead of aborting
    #[serde(default)]
    pub ignore_invalid_lines: bool,

    /// Number of records between heartbeat log lines
    #[serde(default = "default_debugging_interval")]
    pub debugging_interval: usize,

    /// Print the internal bookkeeping map instead of the schema
    #[serde(default)]
    pub debugging_map: bool,

    /// Field delimiter for CSV input
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,

    /// Existing schema to extend
    #[serde(default)]
    pub existing_schema_path: Option<PathBuf>,
}

fn default_debugging_interval() -> usize {
    1000
}

fn default_csv_delimiter() -> char {
    ','
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input_format: InputFormat::default(),
            infer_mode: false,
            keep_nulls: false,
            quoted_values_are_strings: false,
            sanitize_names: false,
            ignore_invalid_lines: false,
            debugging_interval: default_debugging_interval(),
            debugging_map: false,
            csv_delimiter: default_csv_delimiter(),
            existing_schema_path: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input format
    #[must_use]
    pub fn with_input_format(mut self, format: InputFormat) -> Self {
        self.input_format = format;
        self
    }

    /// Enable/disable mode inference
    #[must_use]
    pub fn with_infer_mode(mut self, enabled: bool) -> Self {
        self.infer_mode = enabled;
        self
    }

    /// Enable/disable keeping null-only fields
    #[must_use]
    pub fn with_keep_nulls(mut self, enabled: bool) -> Self {
        self.keep_nulls = enabled;
        self
    }

    /// Enable/disable treating quoted values as strings
    #[must_use]
    pub fn with_quoted_values_are_strings(mut self, enabled: bool) -> Self {
        self.quoted_values_are_strings = enabled;
        self
    }

    /// Enable/disable field name sanitizing
    #[must_use]
    pub fn with_sanitize_names(mut self, enabled: bool) -> Self {
        self.sanitize_names = enabled;
        self
    }

    /// Enable/disable skipping invalid records
    #[must_use]
    pub fn with_ignore_invalid_lines(mut self, enabled: bool) -> Self {
        self.ignore_invalid_lines = enabled;
        self
    }

    /// Set the heartbeat interval
    #[must_use]
    pub fn with_debugging_interval(mut self, interval: usize) -> Self {
        self.debugging_interval = interval;
        self
    }

    /// Set the CSV delimiter
    #[must_use]
    pub fn with_csv_delimiter(mut self, delimiter: char) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    /// Set the existing schema to extend
    #[must_use]
    pub fn with_existing_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing_schema_path = Some(path.into());
        self
    }

    /// Whether null-only fields are kept in the output
    ///
    /// CSV columns are positional, so none may ever be left out.
    pub fn effective_keep_nulls(&self) -> bool {
        self.keep_nulls || self.input_format.is_positional()
    }

    /// Whether the output schema is sorted by field name
    pub fn sorted_schema(&self) -> bool {
        self.input_format.sorts_schema()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.debugging_interval == 0 {
            return Err(Error::invalid_value(
                "debugging_interval",
                "must be greater than zero",
            ));
        }
        if !self.csv_delimiter.is_ascii() {
            return Err(Error::invalid_value(
                "csv_delimiter",
                format!("'{}' is not a single-byte character", self.csv_delimiter),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a generator config from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<GeneratorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content)
}

/// Load a generator config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<GeneratorConfig> {
    let config: GeneratorConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.input_format, InputFormat::Json);
        assert_eq!(config.debugging_interval, 1000);
        assert_eq!(config.csv_delimiter, ',');
        assert!(!config.keep_nulls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_csv_forces_keep_nulls() {
        let config = GeneratorConfig::new().with_input_format(InputFormat::Csv);
        assert!(!config.keep_nulls);
        assert!(config.effective_keep_nulls());
        assert!(!config.sorted_schema());

        let config = GeneratorConfig::new();
        assert!(!config.effective_keep_nulls());
        assert!(config.sorted_schema());
    }

    #[test]
    fn test_load_config_from_str() {
        let yaml = r"
input_format: csv
infer_mode: true
csv_delimiter: '^'
";
        let config = load_config_from_str(yaml).unwrap();
        assert_eq!(config.input_format, InputFormat::Csv);
        assert!(config.infer_mode);
        assert_eq!(config.csv_delimiter, '^');
        assert_eq!(config.debugging_interval, 1000);
    }

    #[test]
    fn test_load_config_rejects_zero_interval() {
        let err = load_config_from_str("debugging_interval: 0").unwrap_err();
        assert!(err.to_string().contains("debugging_interval"));
    }

    #[test]
    fn test_load_config_rejects_unknown_format() {
        assert!(load_config_from_str("input_format: xml").is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "keep_nulls: true").unwrap();
        writeln!(file, "existing_schema_path: /tmp/schema.json").unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.keep_nulls);
        assert_eq!(
            config.existing_schema_path,
            Some(PathBuf::from("/tmp/schema.json"))
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
