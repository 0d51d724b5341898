//! Decoder types and traits
//!
//! Defines the record source abstraction the generator consumes.

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::types::{InputFormat, JsonValue};
use std::io::{BufRead, Cursor};

/// Lazy stream of decoded input lines
///
/// Each item stands for one input line or row. `Ok(None)` is a line that
/// holds no record (a blank JSONL line); it still counts toward line
/// numbers. A record that could not be decoded is an `Err` item rather than
/// the end of the stream, so the generator can decide to skip it or abort.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Option<JsonValue>>> + 'a>;

/// Configuration for decoding input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Input format
    pub format: InputFormat,
    /// CSV delimiter (default: comma)
    pub csv_delimiter: char,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            format: InputFormat::Json,
            csv_delimiter: ',',
        }
    }
}

impl DecoderConfig {
    /// Create a newline-delimited JSON decoder config
    pub fn json() -> Self {
        Self::default()
    }

    /// Create a CSV decoder config
    pub fn csv() -> Self {
        Self {
            format: InputFormat::Csv,
            ..Default::default()
        }
    }

    /// Create a CSV decoder config with custom delimiter
    pub fn csv_with_delimiter(delimiter: char) -> Self {
        Self {
            format: InputFormat::Csv,
            csv_delimiter: delimiter,
        }
    }

    /// Create a config for a single JSON document holding all records
    pub fn dict() -> Self {
        Self {
            format: InputFormat::Dict,
            ..Default::default()
        }
    }

    /// Decoder settings matching a generator configuration
    pub fn from_generator(config: &GeneratorConfig) -> Self {
        Self {
            format: config.input_format,
            csv_delimiter: config.csv_delimiter,
        }
    }
}

/// Trait for turning an input stream into records
pub trait RecordDecoder {
    /// Decode `reader` lazily into records
    fn decode<'a>(&self, reader: Box<dyn BufRead + 'a>) -> RecordIter<'a>;

    /// Decode an in-memory body, stopping at the first failure
    fn decode_str(&self, body: &str) -> Result<Vec<JsonValue>> {
        self.decode(Box::new(Cursor::new(body.as_bytes())))
            .filter_map(Result::transpose)
            .collect()
    }
}
