//! CLI commands and argument parsing

use crate::types::InputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Schema generator CLI
#[derive(Parser, Debug)]
#[command(name = "schemagen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file (default: stdin)
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deduce a schema from data records
    Generate(GenerateArgs),

    /// Anonymize a newline-delimited JSON data file
    Anonymize {
        /// Preserve the keys, only anonymize the values
        #[arg(long)]
        preserve_keys: bool,

        /// Number of lines between heartbeat log messages
        #[arg(long, default_value = "1000")]
        debugging_interval: usize,
    },
}

/// Flags of the `generate` command
///
/// Flags override the values loaded from `--config`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Generator configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Input format
    #[arg(long, value_enum)]
    pub input_format: Option<InputFormat>,

    /// Print the schema for null values, empty arrays or empty records
    #[arg(long)]
    pub keep_nulls: bool,

    /// Quoted values are always STRING
    #[arg(long)]
    pub quoted_values_are_strings: bool,

    /// Determine if mode can be REQUIRED (CSV only), or relax an existing
    /// REQUIRED field to NULLABLE
    #[arg(long)]
    pub infer_mode: bool,

    /// Number of lines between heartbeat log messages
    #[arg(long)]
    pub debugging_interval: Option<usize>,

    /// Print the internal bookkeeping map instead of the schema
    #[arg(long)]
    pub debugging_map: bool,

    /// Replace invalid characters in field names and cap their length
    #[arg(long)]
    pub sanitize_names: bool,

    /// Skip lines that cannot be parsed instead of stopping
    #[arg(long)]
    pub ignore_invalid_lines: bool,

    /// Existing schema file to extend
    #[arg(long)]
    pub existing_schema_path: Option<PathBuf>,

    /// Field delimiter for CSV input
    #[arg(long)]
    pub csv_delimiter: Option<char>,

    /// Field annotations (YAML) merged into the generated schema
    #[arg(long)]
    pub annotations: Option<PathBuf>,
}
