//! Decoder implementations

use super::types::{DecoderConfig, RecordDecoder, RecordIter};
use crate::error::{Error, Result};
use crate::types::{InputFormat, JsonObject, JsonValue};
use std::io::{self, BufRead};
use std::iter;

/// Build the decoder for a config
pub fn decoder_for(config: &DecoderConfig) -> Box<dyn RecordDecoder> {
    match config.format {
        InputFormat::Json => Box::new(JsonlDecoder::new()),
        InputFormat::Csv => Box::new(CsvDecoder::with_delimiter(config.csv_delimiter)),
        InputFormat::Dict => Box::new(JsonDecoder::new()),
    }
}

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder (one JSON value per line)
///
/// Blank lines yield no record. Each line is parsed independently, so one
/// bad line does not end the stream.
#[derive(Debug, Clone, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonlDecoder {
    fn decode<'a>(&self, reader: Box<dyn BufRead + 'a>) -> RecordIter<'a> {
        Box::new(
            reader
                .lines()
                .enumerate()
                .map(|(line_num, line)| match line {
                    // Bytes that are not UTF-8 are bad data, not a broken stream
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(Error::Decode {
                        message: format!("Failed to read JSONL at line {}: {e}", line_num + 1),
                    }),
                    Err(e) => Err(Error::Io(e)),
                    Ok(line) if line.trim().is_empty() => Ok(None),
                    Ok(line) => serde_json::from_str(&line).map(Some).map_err(|e| {
                        Error::Decode {
                            message: format!("Failed to parse JSONL at line {}: {e}", line_num + 1),
                        }
                    }),
                }),
        )
    }
}

// ============================================================================
// CSV Decoder
// ============================================================================

/// CSV decoder; the first row names the columns
///
/// Every value is a string. A row shorter than the header yields `null` for
/// the missing columns; a longer row is a decode failure.
#[derive(Debug, Clone)]
pub struct CsvDecoder {
    /// Field delimiter
    delimiter: char,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl CsvDecoder {
    /// Create a new CSV decoder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a CSV decoder with a custom delimiter
    pub fn with_delimiter(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl RecordDecoder for CsvDecoder {
    fn decode<'a>(&self, reader: Box<dyn BufRead + 'a>) -> RecordIter<'a> {
        if !self.delimiter.is_ascii() {
            let message = format!("CSV delimiter '{}' is not a single byte", self.delimiter);
            return Box::new(iter::once(Err(Error::invalid_value("csv_delimiter", message))));
        }
        let delimiter = self.delimiter as u8;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = match csv_reader.headers() {
            Ok(headers) => headers.iter().map(str::to_string).collect(),
            Err(e) => return Box::new(iter::once(Err(e.into()))),
        };

        Box::new(csv_reader.into_records().map(move |row| {
            let row = row?;
            if row.len() > headers.len() {
                let line = row.position().map_or(0, csv::Position::line);
                return Err(Error::decode(format!(
                    "CSV row at line {line} has {} fields but the header has {}",
                    row.len(),
                    headers.len()
                )));
            }

            let mut record = JsonObject::new();
            for (i, header) in headers.iter().enumerate() {
                let value = row
                    .get(i)
                    .map_or(JsonValue::Null, |v| JsonValue::String(v.to_string()));
                record.insert(header.clone(), value);
            }
            Ok(Some(JsonValue::Object(record)))
        }))
    }
}

// ============================================================================
// JSON Document Decoder
// ============================================================================

/// Decoder for one JSON document holding every record
///
/// A top-level array yields its elements; any other document is a single
/// record.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// Create a new JSON document decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode<'a>(&self, reader: Box<dyn BufRead + 'a>) -> RecordIter<'a> {
        let document: JsonValue = match serde_json::from_reader(reader) {
            Ok(document) => document,
            Err(e) => {
                return Box::new(iter::once(Err(Error::Decode {
                    message: format!("Failed to parse JSON: {e}"),
                })))
            }
        };

        match document {
            JsonValue::Array(records) => Box::new(records.into_iter().map(|r| Ok(Some(r)))),
            other => Box::new(iter::once(Ok(Some(other)))),
        }
    }
}

/// Decode a whole in-memory body with the decoder for `config`
pub fn decode_all(config: &DecoderConfig, body: &str) -> Result<Vec<JsonValue>> {
    decoder_for(config).decode_str(body)
}
