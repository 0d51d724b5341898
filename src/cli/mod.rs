//! CLI module
//!
//! Command-line interface for generating schemas.
//!
//! # Commands
//!
//! - `generate` - Deduce a schema from JSON, CSV or JSON document input
//! - `anonymize` - Anonymize a newline-delimited JSON data file

mod commands;
mod runner;

pub use commands::{Cli, Commands, GenerateArgs};
pub use runner::{build_generator_config, Runner};
