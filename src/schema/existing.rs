//! Import of a previously generated schema
//!
//! The imported map seeds a new run so that a schema can evolve across
//! batches without losing what earlier batches established.

use super::flatten::BqField;
use super::types::{FieldInfo, ScalarType, SchemaEntry, SchemaMap};
use crate::error::{Error, Result};
use crate::types::Mode;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Schema type name after alias normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Scalar(ScalarType),
    Record,
}

/// Normalize a schema type name, accepting the standard SQL aliases
pub fn bq_type_to_entry_type(type_name: &str) -> Result<EntryType> {
    let entry_type = match type_name {
        "STRING" => EntryType::Scalar(ScalarType::String),
        "BYTES" => EntryType::Scalar(ScalarType::Bytes),
        "INTEGER" | "INT64" => EntryType::Scalar(ScalarType::Integer),
        "FLOAT" | "FLOAT64" => EntryType::Scalar(ScalarType::Float),
        "BOOLEAN" | "BOOL" => EntryType::Scalar(ScalarType::Boolean),
        "TIMESTAMP" => EntryType::Scalar(ScalarType::Timestamp),
        "DATE" => EntryType::Scalar(ScalarType::Date),
        "TIME" => EntryType::Scalar(ScalarType::Time),
        "DATETIME" => EntryType::Scalar(ScalarType::Datetime),
        "RECORD" | "STRUCT" => EntryType::Record,
        other => return Err(Error::unknown_type(other)),
    };
    Ok(entry_type)
}

/// Convert a list of schema fields into a bookkeeping map
///
/// Every entry is hard; only non-NULLABLE entries count as filled.
pub fn schema_to_map(fields: &[BqField]) -> Result<SchemaMap> {
    let mut schema_map = SchemaMap::new();
    for field in fields {
        schema_map.insert(field.name.to_lowercase(), Some(field_to_entry(field)?));
    }
    Ok(schema_map)
}

fn field_to_entry(field: &BqField) -> Result<SchemaEntry> {
    let mode = field.mode;
    let info = match bq_type_to_entry_type(&field.field_type)? {
        EntryType::Scalar(scalar) => FieldInfo::scalar(&field.name, mode, scalar),
        EntryType::Record => {
            let sub_fields = field.fields.as_deref().ok_or_else(|| {
                Error::invalid_schema(format!("RECORD field '{}' has no fields", field.name))
            })?;
            FieldInfo::record(&field.name, mode, schema_to_map(sub_fields)?)
        }
    };

    let mut entry = SchemaEntry::hard(info);
    entry.filled = mode != Mode::Nullable;
    Ok(entry)
}

/// Either a bare field list or a table resource with a `fields` list
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Fields(Vec<BqField>),
    Table { fields: Vec<BqField> },
}

/// Parse an existing schema from JSON text
pub fn parse_existing_schema(json: &str) -> Result<SchemaMap> {
    let document: SchemaDocument = serde_json::from_str(json)
        .map_err(|e| Error::invalid_schema(format!("Failed to parse existing schema: {e}")))?;
    let fields = match document {
        SchemaDocument::Fields(fields) | SchemaDocument::Table { fields } => fields,
    };
    schema_to_map(&fields)
}

/// Load an existing schema file
pub fn read_existing_schema_from_file(path: impl AsRef<Path>) -> Result<SchemaMap> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading existing schema");
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    parse_existing_schema(&content)
}
