//! Schema types
//!
//! Bookkeeping types used while deducing a schema. The output (load
//! contract) representation lives in [`super::flatten::BqField`].

use crate::types::Mode;
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Scalar Types
// ============================================================================

/// Primitive column type, including the quoted variants inferred from
/// string-encoded values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScalarType {
    String,
    Bytes,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Date,
    Time,
    Datetime,
    /// Boolean seen inside quotes ("true")
    #[serde(rename = "QBOOLEAN")]
    QBoolean,
    /// Integer seen inside quotes ("42")
    #[serde(rename = "QINTEGER")]
    QInteger,
    /// Float seen inside quotes ("4.2")
    #[serde(rename = "QFLOAT")]
    QFloat,
}

impl ScalarType {
    /// Type name as written in a schema
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "STRING",
            ScalarType::Bytes => "BYTES",
            ScalarType::Integer => "INTEGER",
            ScalarType::Float => "FLOAT",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Timestamp => "TIMESTAMP",
            ScalarType::Date => "DATE",
            ScalarType::Time => "TIME",
            ScalarType::Datetime => "DATETIME",
            ScalarType::QBoolean => "QBOOLEAN",
            ScalarType::QInteger => "QINTEGER",
            ScalarType::QFloat => "QFLOAT",
        }
    }

    /// Whether this is a quoted (string-encoded) primitive
    pub fn is_quoted(&self) -> bool {
        matches!(
            self,
            ScalarType::QBoolean | ScalarType::QInteger | ScalarType::QFloat
        )
    }

    /// The load-contract type for this type: quoted variants lose the quotes
    pub fn unquoted(self) -> ScalarType {
        match self {
            ScalarType::QBoolean => ScalarType::Boolean,
            ScalarType::QInteger => ScalarType::Integer,
            ScalarType::QFloat => ScalarType::Float,
            other => other,
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Value Types
// ============================================================================

/// Type tag of a single decoded value
///
/// The sentinel tags only exist while one value is being inferred. They
/// never reach a flattened schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar(ScalarType),
    Record,
    Null,
    EmptyArray,
    EmptyRecord,
    NonEmptyArray,
}

impl ValueType {
    /// True for the transient tags (null, empty containers, raw arrays)
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, ValueType::Scalar(_) | ValueType::Record)
    }
}

impl From<ScalarType> for ValueType {
    fn from(t: ScalarType) -> Self {
        ValueType::Scalar(t)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Scalar(t) => f.write_str(t.as_str()),
            ValueType::Record => f.write_str("RECORD"),
            ValueType::Null => f.write_str("__null__"),
            ValueType::EmptyArray => f.write_str("__empty_array__"),
            ValueType::EmptyRecord => f.write_str("__empty_record__"),
            ValueType::NonEmptyArray => f.write_str("__array__"),
        }
    }
}

// ============================================================================
// Schema Entries
// ============================================================================

/// Reliability of the type currently known for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Guessed from a null or empty value; a later value may replace it
    Soft,
    /// Confirmed by a real value
    Hard,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Soft => f.write_str("soft"),
            Status::Hard => f.write_str("hard"),
        }
    }
}

/// What a field holds: a primitive, or a record with its own sub-fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Record(SchemaMap),
}

impl FieldKind {
    /// Type name as written in a schema
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Scalar(t) => t.as_str(),
            FieldKind::Record(_) => "RECORD",
        }
    }

    /// The value type tag corresponding to this kind
    pub fn value_type(&self) -> ValueType {
        match self {
            FieldKind::Scalar(t) => ValueType::Scalar(*t),
            FieldKind::Record(_) => ValueType::Record,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FieldKind::Record(_))
    }
}

/// Name, type and mode of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Display name, in the casing first observed
    pub name: String,
    pub mode: Mode,
    pub kind: FieldKind,
}

impl FieldInfo {
    /// Create a scalar field
    pub fn scalar(name: impl Into<String>, mode: Mode, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            mode,
            kind: FieldKind::Scalar(scalar),
        }
    }

    /// Create a record field
    pub fn record(name: impl Into<String>, mode: Mode, fields: SchemaMap) -> Self {
        Self {
            name: name.into(),
            mode,
            kind: FieldKind::Record(fields),
        }
    }

    /// Type name as written in a schema
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Sub-fields, for records
    pub fn fields(&self) -> Option<&SchemaMap> {
        match &self.kind {
            FieldKind::Record(fields) => Some(fields),
            FieldKind::Scalar(_) => None,
        }
    }
}

impl Serialize for FieldInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.kind.is_record() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("FieldInfo", len)?;
        if let FieldKind::Record(fields) = &self.kind {
            state.serialize_field("fields", fields)?;
        }
        state.serialize_field("mode", &self.mode)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", self.type_name())?;
        state.end()
    }
}

/// Bookkeeping for one field at one nesting level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaEntry {
    pub status: Status,
    /// Every record seen so far supplied a value for this field
    pub filled: bool,
    pub info: FieldInfo,
}

impl SchemaEntry {
    /// A confirmed entry
    pub fn hard(info: FieldInfo) -> Self {
        Self {
            status: Status::Hard,
            filled: true,
            info,
        }
    }

    /// A provisional entry guessed from a null or empty value
    pub fn soft(info: FieldInfo) -> Self {
        Self {
            status: Status::Soft,
            filled: false,
            info,
        }
    }

    /// Short description used in merge diagnostics: `(status,path,mode,type)`
    pub(crate) fn describe(&self, full_name: &str) -> String {
        format!(
            "({},{},{},{})",
            self.status,
            full_name,
            self.info.mode,
            self.info.type_name()
        )
    }
}

// ============================================================================
// Schema Map
// ============================================================================

/// Ordered map from canonical field key to its entry
///
/// A slot holding `None` marks a field that was dropped because of a
/// conflict. Dropped fields stay dropped for the rest of the run and are
/// skipped when flattening.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaMap {
    entries: IndexMap<String, Option<SchemaEntry>>,
}

impl SchemaMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a live entry by canonical key
    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// Get a live entry mutably
    pub fn get_mut(&mut self, key: &str) -> Option<&mut SchemaEntry> {
        self.entries.get_mut(key).and_then(Option::as_mut)
    }

    /// Whether the key has any slot, live or dropped
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether the field under this key was dropped
    pub fn is_dropped(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(None))
    }

    /// Store an entry, or a drop marker when `entry` is `None`
    pub fn insert(&mut self, key: impl Into<String>, entry: Option<SchemaEntry>) {
        self.entries.insert(key.into(), entry);
    }

    /// Take the slot out for merging, leaving a drop marker behind
    pub(crate) fn take(&mut self, key: &str) -> Option<Option<SchemaEntry>> {
        self.entries.get_mut(key).map(Option::take)
    }

    /// Live entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaEntry)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|entry| (k, entry)))
    }

    /// All slots in insertion order, including drop markers
    pub fn slots(&self) -> impl Iterator<Item = (&String, &Option<SchemaEntry>)> {
        self.entries.iter()
    }

    /// Consume the map, yielding every slot in insertion order
    pub fn into_slots(self) -> impl Iterator<Item = (String, Option<SchemaEntry>)> {
        self.entries.into_iter()
    }

    /// Canonical keys of all slots
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// True if no field has been seen yet, not even a dropped one
    pub fn is_untouched(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.values().filter(|v| v.is_some()).count()
    }

    /// True if there are no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, SchemaEntry)> for SchemaMap {
    fn from_iter<T: IntoIterator<Item = (String, SchemaEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A recoverable problem found while deducing the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    /// 1-based number of the record that triggered the problem
    pub record_number: usize,
    pub message: String,
}

impl std::fmt::Display for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Problem on line {}: {}", self.record_number, self.message)
    }
}
