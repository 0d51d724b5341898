//! Caller metadata for generated schemas
//!
//! Annotations are loaded from YAML and merged into the top-level fields of
//! a flattened schema before it is written:
//!
//! ```yaml
//! description: Describe this column shortly
//! attributes:
//!   privacy_classification: non_personal_data
//! columns:
//!   email:
//!     description: Customer email address
//!     privacy_classification: personal_data
//!     encryption_key_id: true
//! ```

use crate::error::{Error, Result};
use crate::schema::BqField;
use crate::types::JsonObject;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Metadata for one named column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnnotation {
    #[serde(default)]
    pub description: Option<String>,

    /// Any other attribute, copied onto the field as-is
    #[serde(flatten)]
    pub attributes: JsonObject,
}

/// Metadata applied to a flattened schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaAnnotations {
    /// Description for fields that have none
    #[serde(default)]
    pub description: Option<String>,

    /// Attributes set on every top-level field
    #[serde(default)]
    pub attributes: JsonObject,

    /// Per-column overrides, keyed by field name (case-insensitive)
    #[serde(default)]
    pub columns: IndexMap<String, ColumnAnnotation>,
}

impl SchemaAnnotations {
    /// Parse annotations from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let annotations: Self = serde_yaml::from_str(yaml)?;
        for reserved in ["description", "fields", "mode", "name", "type"] {
            let in_defaults = annotations.attributes.contains_key(reserved);
            let in_columns = annotations
                .columns
                .values()
                .any(|column| column.attributes.contains_key(reserved));
            if in_defaults || in_columns {
                return Err(Error::invalid_value(
                    "annotations",
                    format!("'{reserved}' cannot be set by an annotation"),
                ));
            }
        }
        Ok(annotations)
    }

    /// Load annotations from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Apply the annotations to the top-level fields of `schema`
    ///
    /// Column entries win over the defaults. Columns that match no field are
    /// reported and otherwise ignored.
    pub fn apply(&self, schema: &mut [BqField]) {
        let columns: IndexMap<String, &ColumnAnnotation> = self
            .columns
            .iter()
            .map(|(name, column)| (name.to_lowercase(), column))
            .collect();

        for field in schema.iter_mut() {
            for (key, value) in &self.attributes {
                field.extra.insert(key.clone(), value.clone());
            }

            let column = columns.get(&field.name.to_lowercase());
            if let Some(description) = column.and_then(|c| c.description.as_ref()) {
                field.description = Some(description.clone());
            } else if field.description.is_none() {
                field.description.clone_from(&self.description);
            }
            if let Some(column) = column {
                for (key, value) in &column.attributes {
                    field.extra.insert(key.clone(), value.clone());
                }
            }
        }

        for name in columns.keys() {
            if !schema.iter().any(|field| field.name.to_lowercase() == *name) {
                warn!(column = %name, "Annotation does not match any field");
            }
        }
    }
}
