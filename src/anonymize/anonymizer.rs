//! Key and value anonymization for newline-delimited JSON

use crate::error::{Error, Result};
use crate::schema::{is_date, is_time, is_timestamp};
use crate::types::{json_kind, JsonObject, JsonValue};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use tracing::{error, info};

/// Replacement for TIMESTAMP-like strings
pub const ANON_TIMESTAMP: &str = "2018-07-17T09:05:00-07:00";
/// Replacement for DATE-like strings
pub const ANON_DATE: &str = "2018-07-17";
/// Replacement for TIME-like strings
pub const ANON_TIME: &str = "09:05:00";

/// Next key in the base-26 sequence `a, ..., z, ba, bb, ..., bz, ..., baa`
///
/// Assumes every character is in `a..=z`.
pub fn increment_anon_key(key: &str) -> String {
    let mut digits: Vec<u8> = key.bytes().collect();
    let mut carry = true;
    for digit in digits.iter_mut().rev() {
        if *digit == b'z' {
            *digit = b'a';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, b'b');
    }
    String::from_utf8_lossy(&digits).into_owned()
}

/// Key mapping for one nesting level, shared by every object at that level
#[derive(Debug, Default)]
struct AnonLevel {
    keys: HashMap<String, AnonKey>,
    next_anon_key: Option<String>,
}

#[derive(Debug)]
struct AnonKey {
    anon_key: String,
    children: AnonLevel,
}

impl AnonLevel {
    fn anonymize_object(&mut self, object: &JsonObject, preserve_keys: bool) -> JsonObject {
        let mut next_anon_key = self.next_anon_key.take().unwrap_or_else(|| "a".to_string());
        let mut anon_object = JsonObject::new();

        for (key, value) in object {
            let entry = self.keys.entry(key.clone()).or_insert_with(|| {
                let anon_key = if preserve_keys {
                    key.clone()
                } else {
                    // Pad to the original length
                    let padding = key.chars().count().saturating_sub(next_anon_key.len());
                    format!("{next_anon_key}{}", ".".repeat(padding))
                };
                next_anon_key = increment_anon_key(&next_anon_key);
                AnonKey {
                    anon_key,
                    children: AnonLevel::default(),
                }
            });

            let anon_value = entry.children.anonymize(value, preserve_keys);
            anon_object.insert(entry.anon_key.clone(), anon_value);
        }

        self.next_anon_key = Some(next_anon_key);
        anon_object
    }

    fn anonymize(&mut self, value: &JsonValue, preserve_keys: bool) -> JsonValue {
        match value {
            JsonValue::Object(object) => {
                JsonValue::Object(self.anonymize_object(object, preserve_keys))
            }
            // List elements share the mapping of the key holding the list
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.anonymize(item, preserve_keys))
                    .collect(),
            ),
            scalar => anonymize_value(scalar),
        }
    }
}

/// Replace a scalar with a stand-in of the same inferred type
///
/// Strings keep their character count; dates and times keep their shape.
pub fn anonymize_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) if is_timestamp(s) => JsonValue::from(ANON_TIMESTAMP),
        JsonValue::String(s) if is_date(s) => JsonValue::from(ANON_DATE),
        JsonValue::String(s) if is_time(s) => JsonValue::from(ANON_TIME),
        JsonValue::String(s) => JsonValue::String("*".repeat(s.chars().count())),
        JsonValue::Bool(_) => JsonValue::Bool(true),
        JsonValue::Number(n) if n.is_f64() => JsonValue::from(2.0),
        JsonValue::Number(_) => JsonValue::from(1),
        JsonValue::Null => JsonValue::Null,
        // Containers are handled by the caller
        other => other.clone(),
    }
}

/// Anonymizes records while keeping their structure
///
/// The schema deduced from anonymized data matches the original one, up to
/// key names (identical with `preserve_keys`).
#[derive(Debug)]
pub struct Anonymizer {
    preserve_keys: bool,
    debugging_interval: usize,
    line_number: usize,
    root: AnonLevel,
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Anonymizer {
    /// Create an anonymizer that replaces keys
    pub fn new() -> Self {
        Self {
            preserve_keys: false,
            debugging_interval: 1000,
            line_number: 0,
            root: AnonLevel::default(),
        }
    }

    /// Keep the original keys
    #[must_use]
    pub fn with_preserve_keys(mut self, enabled: bool) -> Self {
        self.preserve_keys = enabled;
        self
    }

    /// Set the heartbeat interval
    #[must_use]
    pub fn with_debugging_interval(mut self, interval: usize) -> Self {
        self.debugging_interval = interval;
        self
    }

    /// Number of lines read so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Anonymize one top-level record
    pub fn anonymize_record(&mut self, record: &JsonObject) -> JsonObject {
        self.root.anonymize_object(record, self.preserve_keys)
    }

    /// Anonymize every line of `reader` into `writer`, one record per line
    ///
    /// Lines that are not JSON objects are logged and skipped. Returns the
    /// number of records written.
    pub fn anonymize_lines<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        mut writer: W,
    ) -> Result<usize> {
        let mut written = 0;
        for line in reader.lines() {
            let line = line?;
            self.line_number += 1;
            if self.debugging_interval > 0 && self.line_number % self.debugging_interval == 0 {
                info!("Processing line {}", self.line_number);
            }
            if line.trim().is_empty() {
                continue;
            }

            let value: JsonValue = serde_json::from_str(&line).map_err(|e| Error::Decode {
                message: format!("Failed to parse JSON at line {}: {e}", self.line_number),
            })?;
            let record = match value {
                JsonValue::Object(record) => record,
                other => {
                    error!(
                        line = self.line_number,
                        "Top level record must be an Object but was a {}",
                        json_kind(&other)
                    );
                    continue;
                }
            };

            let anon = self.anonymize_record(&record);
            serde_json::to_writer(&mut writer, &anon)?;
            writeln!(writer)?;
            written += 1;
        }
        writer.flush()?;
        info!("Processed {} lines", self.line_number);
        Ok(written)
    }
}
