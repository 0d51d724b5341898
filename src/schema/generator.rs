//! Schema deduction driver
//!
//! [`SchemaGenerator`] walks a stream of records, builds a candidate entry
//! for every field, and folds it into a running [`SchemaMap`] with the
//! merge rules in [`super::merge`].

use super::flatten::{flatten_schema_map, BqField, FlattenOptions};
use super::inference::{ArrayType, TypeInferrer};
use super::types::{ErrorLog, FieldInfo, SchemaEntry, SchemaMap, ScalarType, ValueType};
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::types::{json_kind, JsonObject, JsonValue, Mode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info};

/// Longest field name the load contract accepts
pub const MAX_NAME_LENGTH: usize = 127;

static INVALID_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("valid name regex"));

/// Deduces a schema from records
///
/// One generator owns the record counter and the diagnostics of a run.
/// Calling [`deduce_schema`](Self::deduce_schema) again continues the
/// numbering, so several inputs can be fed through one generator.
#[derive(Debug)]
pub struct SchemaGenerator {
    pub(super) config: GeneratorConfig,
    pub(super) inferrer: TypeInferrer,
    pub(super) record_number: usize,
    pub(super) error_logs: Vec<ErrorLog>,
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl SchemaGenerator {
    /// Create a generator for the given configuration
    pub fn new(config: GeneratorConfig) -> Self {
        let inferrer =
            TypeInferrer::new().with_quoted_values_are_strings(config.quoted_values_are_strings);
        Self {
            config,
            inferrer,
            record_number: 0,
            error_logs: Vec::new(),
        }
    }

    /// Configuration of this run
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Number of records consumed so far
    pub fn record_number(&self) -> usize {
        self.record_number
    }

    /// Diagnostics collected so far
    pub fn error_logs(&self) -> &[ErrorLog] {
        &self.error_logs
    }

    // ========================================================================
    // Driver
    // ========================================================================

    /// Deduce the schema of `records`, optionally extending `seed`
    ///
    /// Returns the bookkeeping map and the diagnostics collected by this
    /// call. A record that is not an object, or that the source failed to
    /// decode, aborts the run unless `ignore_invalid_lines` is set.
    pub fn deduce_schema<I>(
        &mut self,
        records: I,
        seed: Option<SchemaMap>,
    ) -> Result<(SchemaMap, Vec<ErrorLog>)>
    where
        I: IntoIterator<Item = Result<JsonValue>>,
    {
        self.deduce_schema_from_lines(records.into_iter().map(|r| r.map(Some)), seed)
    }

    /// Deduce the schema of a decoded input stream
    ///
    /// Same as [`deduce_schema`](Self::deduce_schema), but an `Ok(None)` item
    /// is a line without a record: it advances the line counter and nothing
    /// else, so diagnostics keep pointing at input lines.
    pub fn deduce_schema_from_lines<I>(
        &mut self,
        lines: I,
        seed: Option<SchemaMap>,
    ) -> Result<(SchemaMap, Vec<ErrorLog>)>
    where
        I: IntoIterator<Item = Result<Option<JsonValue>>>,
    {
        let mut schema_map = seed.unwrap_or_default();
        let outcome = self.consume_records(lines, &mut schema_map);
        info!("Processed {} lines", self.record_number);
        outcome?;
        Ok((schema_map, std::mem::take(&mut self.error_logs)))
    }

    /// Deduce the schema of records that are already in memory
    pub fn deduce_schema_from_values<'a, I>(
        &mut self,
        records: I,
        seed: Option<SchemaMap>,
    ) -> Result<(SchemaMap, Vec<ErrorLog>)>
    where
        I: IntoIterator<Item = &'a JsonValue>,
    {
        self.deduce_schema(records.into_iter().cloned().map(Ok), seed)
    }

    fn consume_records<I>(&mut self, lines: I, schema_map: &mut SchemaMap) -> Result<()>
    where
        I: IntoIterator<Item = Result<Option<JsonValue>>>,
    {
        for record in lines {
            self.record_number += 1;
            let interval = self.config.debugging_interval;
            if interval > 0 && self.record_number % interval == 0 {
                info!("Processing line {}", self.record_number);
            }

            match record {
                Ok(None) => {}
                Ok(Some(JsonValue::Object(object))) => {
                    self.deduce_schema_for_record(&object, schema_map, "")?;
                }
                Ok(Some(other)) => {
                    let kind = json_kind(&other);
                    self.log_error(format!("Record should be a JSON Object but was a {kind}"));
                    if !self.config.ignore_invalid_lines {
                        return Err(Error::invalid_record(
                            self.record_number,
                            format!("Record must be a JSON Object but was a {kind}"),
                        ));
                    }
                }
                Err(e) if e.is_data_error() => {
                    self.log_error(format!("Record could not be parsed: Exception: {e}"));
                    if !self.config.ignore_invalid_lines {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Fold every field of `object` into `schema_map`
    ///
    /// Fields already in the map but absent from `object` are marked as not
    /// supplied. A field first seen after the map already holds fields
    /// starts out unfilled.
    pub(super) fn deduce_schema_for_record(
        &mut self,
        object: &JsonObject,
        schema_map: &mut SchemaMap,
        base_path: &str,
    ) -> Result<()> {
        let fresh = schema_map.is_untouched();
        let mut seen = HashSet::with_capacity(object.len());

        for (key, value) in object {
            let canonical_key = self.sanitize_name(key).to_lowercase();
            seen.insert(canonical_key.clone());

            if schema_map.is_dropped(&canonical_key) {
                continue;
            }

            let Some(mut new_entry) = self.get_schema_entry(key, value, base_path)? else {
                schema_map.insert(canonical_key, None);
                continue;
            };

            let old_entry = schema_map.take(&canonical_key).flatten();
            if old_entry.is_none() && !fresh {
                new_entry.filled = false;
            }
            let merged = self.merge_schema_entry(old_entry, new_entry, base_path)?;
            schema_map.insert(canonical_key, merged);
        }

        self.mark_absent_fields(schema_map, &seen, base_path);
        Ok(())
    }

    // ========================================================================
    // Entry builder
    // ========================================================================

    /// Build the candidate entry for one `(key, value)` pair
    ///
    /// Returns `None` when the value cannot be represented (a mixed or
    /// unsupported array); the problem has already been logged.
    pub(super) fn get_schema_entry(
        &mut self,
        key: &str,
        value: &JsonValue,
        base_path: &str,
    ) -> Result<Option<SchemaEntry>> {
        let Some((mode, value_type)) = self.infer_bigquery_type(value)? else {
            return Ok(None);
        };
        let name = self.sanitize_name(key);

        let entry = match value_type {
            ValueType::Record => {
                let path = json_full_path(base_path, key);
                let mut fields = SchemaMap::new();
                match value {
                    JsonValue::Object(object) => {
                        self.deduce_schema_for_record(object, &mut fields, &path)?;
                    }
                    JsonValue::Array(elements) => {
                        for element in elements {
                            let JsonValue::Object(object) = element else {
                                return Err(Error::internal(format!(
                                    "RECORD array element at \"{path}\" is a {}",
                                    json_kind(element)
                                )));
                            };
                            self.deduce_schema_for_record(object, &mut fields, &path)?;
                        }
                    }
                    other => {
                        return Err(Error::internal(format!(
                            "RECORD value at \"{path}\" is a {}",
                            json_kind(other)
                        )));
                    }
                }
                SchemaEntry::hard(FieldInfo::record(name, mode, fields))
            }
            ValueType::Null => {
                SchemaEntry::soft(FieldInfo::scalar(name, Mode::Nullable, ScalarType::String))
            }
            ValueType::EmptyArray => {
                SchemaEntry::soft(FieldInfo::scalar(name, Mode::Repeated, ScalarType::String))
            }
            ValueType::EmptyRecord => {
                SchemaEntry::soft(FieldInfo::record(name, mode, SchemaMap::new()))
            }
            ValueType::NonEmptyArray => {
                return Err(Error::internal(format!(
                    "Nested array for \"{}\" reached the entry builder",
                    json_full_path(base_path, key)
                )));
            }
            ValueType::Scalar(scalar) => {
                let info = FieldInfo::scalar(name, mode, scalar);
                // Positional sources encode a missing value as ""
                if value.as_str() == Some("") && self.config.input_format.is_positional() {
                    SchemaEntry::soft(info)
                } else {
                    SchemaEntry::hard(info)
                }
            }
        };
        Ok(Some(entry))
    }

    /// Determine the `(mode, type)` of a value, resolving arrays to their
    /// element type
    fn infer_bigquery_type(&mut self, value: &JsonValue) -> Result<Option<(Mode, ValueType)>> {
        let node_type = self.inferrer.infer_value_type(value);
        if node_type != ValueType::NonEmptyArray {
            return Ok(Some((Mode::Nullable, node_type)));
        }

        let JsonValue::Array(elements) = value else {
            return Err(Error::internal("Non-array value tagged as an array"));
        };
        match self.inferrer.infer_array_type(elements)? {
            ArrayType::Mixed {
                index,
                candidate,
                found,
            } => {
                debug!(index, %candidate, %found, "Array element breaks homogeneity");
                self.log_error(format!(
                    "All array elements must be the same compatible type: {value}"
                ));
                Ok(None)
            }
            // A repeated field cannot hold nulls or nested arrays; `[{}]` is
            // accepted by the loader as a repeated record
            ArrayType::Uniform(
                element_type @ (ValueType::Null | ValueType::EmptyArray | ValueType::NonEmptyArray),
            ) => {
                self.log_error(format!("Unsupported array element type: {element_type}"));
                Ok(None)
            }
            ArrayType::Uniform(element_type) => Ok(Some((Mode::Repeated, element_type))),
        }
    }

    /// Sanitize a field name if enabled; case is preserved
    pub fn sanitize_name(&self, name: &str) -> String {
        if !self.config.sanitize_names {
            return name.to_string();
        }
        let truncated: String = name.chars().take(MAX_NAME_LENGTH).collect();
        INVALID_NAME_CHARS.replace_all(&truncated, "_").into_owned()
    }

    /// Record a recoverable problem against the current record
    pub(super) fn log_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(record_number = self.record_number, %message, "Schema problem");
        self.error_logs.push(ErrorLog {
            record_number: self.record_number,
            message,
        });
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Flatten a bookkeeping map using this generator's settings
    pub fn flatten_schema(&self, schema_map: &SchemaMap) -> Vec<BqField> {
        flatten_schema_map(schema_map, &FlattenOptions::from_config(&self.config))
    }
}

/// Dot-separated path to `key` below `base_path`, e.g. `server.config.port`
pub fn json_full_path(base_path: &str, key: &str) -> String {
    if base_path.is_empty() {
        key.to_string()
    } else {
        format!("{base_path}.{key}")
    }
}
