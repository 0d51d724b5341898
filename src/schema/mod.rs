//! Schema deduction module
//!
//! Infers a table schema from a stream of semi-structured records.
//!
//! # Features
//!
//! - **Type Inference**: Classifies values, including dates, times and
//!   numbers hidden inside quotes
//! - **Type Lattice**: Joins observed types to the least general common type
//! - **Schema Merging**: Tracks provisional vs confirmed knowledge per field
//!   and merges nested records recursively
//! - **Mode Handling**: NULLABLE, REPEATED and REQUIRED transitions
//! - **Existing Schemas**: Seeds a run from a previously generated schema

mod existing;
mod flatten;
mod generator;
mod inference;
mod lattice;
mod merge;
mod types;

pub use existing::{
    bq_type_to_entry_type, parse_existing_schema, read_existing_schema_from_file, schema_to_map,
    EntryType,
};
pub use flatten::{flatten_schema_map, BqField, FlattenOptions, UNKNOWN_FIELD_NAME};
pub use generator::{json_full_path, SchemaGenerator, MAX_NAME_LENGTH};
pub use inference::{
    is_date, is_time, is_timestamp, ArrayType, TypeInferrer, DATE_MATCHER, TIMESTAMP_MATCHER,
    TIME_MATCHER,
};
pub use lattice::{convert_type, is_string_type, join_scalar};
pub use types::{
    ErrorLog, FieldInfo, FieldKind, ScalarType, SchemaEntry, SchemaMap, Status, ValueType,
};
