//! Output module
//!
//! Handles writing generated schemas.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing a flattened schema as indented JSON
//! - Writing the internal bookkeeping map for debugging
//! - Adding caller metadata (descriptions, classification attributes) to
//!   schema fields

mod annotations;
mod writer;

pub use annotations::{ColumnAnnotation, SchemaAnnotations};
pub use writer::{schema_to_string, SchemaWriter};

#[cfg(test)]
mod tests;
