//! Projection of the bookkeeping map into the load-contract schema

use super::types::{FieldKind, SchemaEntry, SchemaMap, Status};
use crate::config::GeneratorConfig;
use crate::types::{JsonObject, Mode};
use serde::{Deserialize, Serialize};

/// Name of the placeholder sub-field emitted for a record with no fields
pub const UNKNOWN_FIELD_NAME: &str = "__unknown__";

/// One column of an output (or existing) schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BqField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<BqField>>,

    #[serde(default)]
    pub mode: Mode,

    pub name: String,

    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Caller metadata carried through untouched
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl BqField {
    /// Create a field without sub-fields
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, mode: Mode) -> Self {
        Self {
            fields: None,
            mode,
            name: name.into(),
            field_type: field_type.into(),
            description: None,
            extra: JsonObject::new(),
        }
    }

    /// Set the sub-fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<BqField>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The synthetic sub-field standing in for an empty record
    pub fn placeholder() -> Self {
        Self::new(UNKNOWN_FIELD_NAME, "STRING", Mode::Nullable)
    }

    /// Whether this field is a RECORD (or its STRUCT alias)
    pub fn is_record(&self) -> bool {
        matches!(self.field_type.as_str(), "RECORD" | "STRUCT")
    }
}

/// Settings that shape the flattened output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Emit fields that were only ever null or empty
    pub keep_nulls: bool,
    /// Promote always-filled NULLABLE fields to REQUIRED
    pub infer_required: bool,
    /// Sort fields by canonical key instead of first appearance
    pub sorted: bool,
}

impl FlattenOptions {
    /// Derive the options for a run
    ///
    /// REQUIRED promotion is only sound for positional sources, where
    /// every record carries every column.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            keep_nulls: config.effective_keep_nulls(),
            infer_required: config.infer_mode && config.input_format.is_positional(),
            sorted: config.sorted_schema(),
        }
    }
}

/// Flatten `schema_map` into an ordered list of output fields
pub fn flatten_schema_map(schema_map: &SchemaMap, options: &FlattenOptions) -> Vec<BqField> {
    let mut entries: Vec<(&String, &SchemaEntry)> = schema_map.iter().collect();
    if options.sorted {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }

    entries
        .into_iter()
        .filter(|(_, entry)| options.keep_nulls || entry.status != Status::Soft)
        .map(|(_, entry)| flatten_entry(entry, options))
        .collect()
}

fn flatten_entry(entry: &SchemaEntry, options: &FlattenOptions) -> BqField {
    let info = &entry.info;
    let mode = if options.infer_required && info.mode == Mode::Nullable && entry.filled {
        Mode::Required
    } else {
        info.mode
    };

    match &info.kind {
        FieldKind::Scalar(scalar) => BqField::new(&info.name, scalar.unquoted().as_str(), mode),
        FieldKind::Record(fields) => {
            let mut sub_fields = flatten_schema_map(fields, options);
            // The loader rejects a RECORD with zero sub-fields
            if sub_fields.is_empty() {
                sub_fields.push(BqField::placeholder());
            }
            BqField::new(&info.name, "RECORD", mode).with_fields(sub_fields)
        }
    }
}
