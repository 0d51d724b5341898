// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # schemagen
//!
//! Deduces a columnar warehouse (BigQuery) load schema from newline-delimited
//! JSON, CSV or in-memory records.
//!
//! ## Features
//!
//! - **Type Inference**: BOOLEAN, INTEGER, FLOAT, STRING, TIMESTAMP, DATE,
//!   TIME and nested RECORDs, including values hidden inside quotes
//! - **Incremental Merging**: Each record refines the schema deduced so far
//! - **Mode Handling**: NULLABLE, REPEATED and REQUIRED, with optional
//!   relaxation of REQUIRED fields
//! - **Existing Schemas**: Extend a schema produced by an earlier run
//! - **Anonymizer**: Scrub data files while keeping their schema
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemagen::{GeneratorConfig, SchemaGenerator};
//! use serde_json::json;
//!
//! let records = vec![json!({"id": 1, "name": "a"}), json!({"id": 2.5})];
//!
//! let mut generator = SchemaGenerator::new(GeneratorConfig::default());
//! let (schema_map, error_logs) = generator.deduce_schema_from_values(&records, None)?;
//! let schema = generator.flatten_schema(&schema_map);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────────────────────┐   ┌──────────────┐
//! │  Decode   │ → │      SchemaGenerator       │ → │   Output     │
//! ├───────────┤   ├────────────────────────────┤   ├──────────────┤
//! │ JSONL     │   │ inference → merge → flatten│   │ JSON schema  │
//! │ CSV       │   │ seeded by existing schema  │   │ annotations  │
//! │ JSON doc  │   │                            │   │ debug map    │
//! └───────────┘   └────────────────────────────┘   └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Generator configuration
pub mod config;

/// Schema deduction
pub mod schema;

/// Record decoders (JSONL, CSV, JSON documents)
pub mod decode;

/// Schema output and annotations
pub mod output;

/// Data anonymization
pub mod anonymize;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, GeneratorConfig};
pub use schema::{BqField, ErrorLog, SchemaGenerator, SchemaMap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
