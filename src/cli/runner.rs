//! CLI runner - executes commands

use crate::anonymize::Anonymizer;
use crate::cli::commands::{Cli, Commands, GenerateArgs};
use crate::config::{load_config, GeneratorConfig};
use crate::decode::{decoder_for, DecoderConfig};
use crate::error::{Error, Result, ResultExt};
use crate::output::{SchemaAnnotations, SchemaWriter};
use crate::schema::{read_existing_schema_from_file, SchemaGenerator, SchemaMap};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Generate(args) => self.generate(args),
            Commands::Anonymize {
                preserve_keys,
                debugging_interval,
            } => self.anonymize(*preserve_keys, *debugging_interval),
        }
    }

    /// Open the input file, or stdin
    fn open_input(&self) -> Result<Box<dyn BufRead>> {
        match &self.cli.input {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        Error::FileNotFound {
                            path: path.display().to_string(),
                        }
                    } else {
                        Error::Io(e)
                    }
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            None => Ok(Box::new(io::stdin().lock())),
        }
    }

    /// Open the output file, or stdout
    fn open_output(&self) -> Result<Box<dyn Write>> {
        match &self.cli.output {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    Error::output(format!("Failed to create '{}': {e}", path.display()))
                })?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(io::stdout().lock())),
        }
    }

    /// Deduce and print a schema
    fn generate(&self, args: &GenerateArgs) -> Result<()> {
        let config = build_generator_config(args)?;
        debug!(?config, "Generator configuration");

        let seed = match &config.existing_schema_path {
            Some(path) => Some(read_existing_schema_from_file(path).with_context(|| {
                format!("Failed to load existing schema '{}'", path.display())
            })?),
            None => None,
        };
        let annotations = match &args.annotations {
            Some(path) => Some(SchemaAnnotations::load(path).with_context(|| {
                format!("Failed to load annotations '{}'", path.display())
            })?),
            None => None,
        };

        let decoder = decoder_for(&DecoderConfig::from_generator(&config));
        let input = self.open_input()?;

        let mut generator = SchemaGenerator::new(config);
        let (schema_map, error_logs) =
            generator.deduce_schema_from_lines(decoder.decode(input), seed)?;

        if !error_logs.is_empty() {
            info!("{} problem(s) found", error_logs.len());
            SchemaWriter::new(io::stderr().lock()).write_error_logs(&error_logs)?;
        }

        let output = GenerateOutput {
            generator: &generator,
            schema_map: &schema_map,
            annotations: annotations.as_ref(),
        };
        match &self.cli.output {
            Some(path) => output.write(SchemaWriter::create(path)?),
            None => output.write(SchemaWriter::new(io::stdout().lock())),
        }
    }

    /// Anonymize newline-delimited JSON
    fn anonymize(&self, preserve_keys: bool, debugging_interval: usize) -> Result<()> {
        let mut anonymizer = Anonymizer::new()
            .with_preserve_keys(preserve_keys)
            .with_debugging_interval(debugging_interval);
        let written = anonymizer.anonymize_lines(self.open_input()?, self.open_output()?)?;
        debug!(written, "Anonymized records");
        Ok(())
    }
}

/// Result of a `generate` run, ready to be written
struct GenerateOutput<'a> {
    generator: &'a SchemaGenerator,
    schema_map: &'a SchemaMap,
    annotations: Option<&'a SchemaAnnotations>,
}

impl GenerateOutput<'_> {
    fn write<W: Write>(&self, mut writer: SchemaWriter<W>) -> Result<()> {
        if self.generator.config().debugging_map {
            return writer.write_debugging_map(self.schema_map);
        }
        let mut schema = self.generator.flatten_schema(self.schema_map);
        if let Some(annotations) = self.annotations {
            annotations.apply(&mut schema);
        }
        writer.write_schema(&schema)
    }
}

/// Combine the config file (if any) with the command-line flags
///
/// A flag only overrides the file when it is given.
pub fn build_generator_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(format) = args.input_format {
        config.input_format = format;
    }
    config.keep_nulls |= args.keep_nulls;
    config.quoted_values_are_strings |= args.quoted_values_are_strings;
    config.infer_mode |= args.infer_mode;
    config.debugging_map |= args.debugging_map;
    config.sanitize_names |= args.sanitize_names;
    config.ignore_invalid_lines |= args.ignore_invalid_lines;
    if let Some(interval) = args.debugging_interval {
        config.debugging_interval = interval;
    }
    if let Some(path) = &args.existing_schema_path {
        config.existing_schema_path = Some(path.clone());
    }
    if let Some(delimiter) = args.csv_delimiter {
        config.csv_delimiter = delimiter;
    }

    config.validate()?;
    Ok(config)
}
