//! Schema writer
//!
//! Writes flattened schemas (or the bookkeeping map) as indented JSON.

use crate::error::{Error, Result};
use crate::schema::{BqField, ErrorLog, SchemaMap};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes schema documents to any sink
#[derive(Debug)]
pub struct SchemaWriter<W: Write> {
    writer: W,
}

impl SchemaWriter<BufWriter<File>> {
    /// Create a writer for a file, truncating it
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            Error::output(format!("Failed to create '{}': {e}", path.display()))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SchemaWriter<W> {
    /// Wrap a sink
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a flattened schema
    pub fn write_schema(&mut self, schema: &[BqField]) -> Result<()> {
        self.write_pretty(schema)
    }

    /// Write the bookkeeping map, dropped fields included as `null`
    pub fn write_debugging_map(&mut self, schema_map: &SchemaMap) -> Result<()> {
        self.write_pretty(schema_map)
    }

    /// Write diagnostics one per line
    pub fn write_error_logs(&mut self, logs: &[ErrorLog]) -> Result<()> {
        for log in logs {
            writeln!(self.writer, "{log}")?;
        }
        Ok(())
    }

    fn write_pretty<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .map_err(|e| Error::output(format!("Failed to serialize schema: {e}")))?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Recover the underlying sink
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render a flattened schema as the text [`SchemaWriter`] would write
pub fn schema_to_string(schema: &[BqField]) -> Result<String> {
    let mut writer = SchemaWriter::new(Vec::new());
    writer.write_schema(schema)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::output(format!("Schema is not valid UTF-8: {e}")))
}
