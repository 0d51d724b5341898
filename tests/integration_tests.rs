//! Integration tests running the CLI runner against files
//!
//! Tests the full end-to-end flow: input file → decoder → generator → schema file

use clap::Parser;
use pretty_assertions::assert_eq;
use schemagen::cli::{Cli, Runner};
use schemagen::decode::{decode_all, DecoderConfig};
use schemagen::output::schema_to_string;
use schemagen::schema::parse_existing_schema;
use schemagen::{GeneratorConfig, InputFormat, SchemaGenerator};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> schemagen::Result<()> {
    let cli = Cli::parse_from(std::iter::once("schemagen").chain(args.iter().copied()));
    Runner::new(cli).run()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Generate Command
// ============================================================================

#[test]
fn test_generate_jsonl() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "data.jsonl",
        concat!(
            r#"{"s": "x", "i": 1, "b": true, "t": "2020-01-01T00:00:00", "d": "2020-01-01", "tm": "12:00:00", "n": null, "r": {"a": 1}, "arr": [1, 2]}"#,
            "\n",
            r#"{"i": 2.5, "q": "17"}"#,
            "\n",
        ),
    );
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "REPEATED", "name": "arr", "type": "INTEGER"},
            {"mode": "NULLABLE", "name": "b", "type": "BOOLEAN"},
            {"mode": "NULLABLE", "name": "d", "type": "DATE"},
            {"mode": "NULLABLE", "name": "i", "type": "FLOAT"},
            {"mode": "NULLABLE", "name": "q", "type": "INTEGER"},
            {
                "fields": [{"mode": "NULLABLE", "name": "a", "type": "INTEGER"}],
                "mode": "NULLABLE",
                "name": "r",
                "type": "RECORD"
            },
            {"mode": "NULLABLE", "name": "s", "type": "STRING"},
            {"mode": "NULLABLE", "name": "t", "type": "TIMESTAMP"},
            {"mode": "NULLABLE", "name": "tm", "type": "TIME"}
        ])
    );
}

#[test]
fn test_generate_keep_nulls() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.jsonl", "{\"n\": null, \"e\": [], \"o\": {}}\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--keep-nulls",
        "-i",
        path_str(&input),
        "-o",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "REPEATED", "name": "e", "type": "STRING"},
            {"mode": "NULLABLE", "name": "n", "type": "STRING"},
            {
                "fields": [{"mode": "NULLABLE", "name": "__unknown__", "type": "STRING"}],
                "mode": "NULLABLE",
                "name": "o",
                "type": "RECORD"
            }
        ])
    );
}

#[test]
fn test_generate_csv_infer_mode() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.csv", "name,age,note\na,1,\nb,,\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--input-format",
        "csv",
        "--infer-mode",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    // Column order is kept and empty columns survive
    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "REQUIRED", "name": "name", "type": "STRING"},
            {"mode": "NULLABLE", "name": "age", "type": "INTEGER"},
            {"mode": "NULLABLE", "name": "note", "type": "STRING"}
        ])
    );
}

#[test]
fn test_generate_invalid_line_aborts() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.jsonl", "{\"a\": 1}\n{\"a\": \n");
    let output = dir.path().join("schema.json");

    let err = run(&[
        "generate",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap_err();
    assert!(err.is_data_error());
}

#[test]
fn test_generate_ignore_invalid_lines() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.jsonl", "{\"a\": 1}\n{\"a\": \n[1]\n{\"b\": \"x\"}\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--ignore-invalid-lines",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "NULLABLE", "name": "a", "type": "INTEGER"},
            {"mode": "NULLABLE", "name": "b", "type": "STRING"}
        ])
    );
}

#[test]
fn test_generate_skips_undecodable_bytes() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("data.jsonl");
    fs::write(&input, b"{\"a\":1}\n{\"b\":\"\xff\"}\n{\"c\":2}\n").unwrap();
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--ignore-invalid-lines",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "NULLABLE", "name": "a", "type": "INTEGER"},
            {"mode": "NULLABLE", "name": "c", "type": "INTEGER"}
        ])
    );
}

#[test]
fn test_generate_missing_existing_schema() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.jsonl", "{\"a\": 1}\n");
    let missing = dir.path().join("missing.json");

    let err = run(&[
        "generate",
        "--existing-schema-path",
        path_str(&missing),
        "--input",
        path_str(&input),
    ])
    .unwrap_err();
    assert!(err.to_string().starts_with("Failed to load existing schema"));
    assert!(err.to_string().contains("File not found"));
}

#[test]
fn test_generate_missing_input() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.jsonl");

    let err = run(&["generate", "--input", path_str(&missing)]).unwrap_err();
    assert!(err.to_string().contains("missing.jsonl"));
}

// ============================================================================
// Existing Schemas and Config Files
// ============================================================================

#[test]
fn test_generate_extends_existing_schema() {
    let dir = TempDir::new().unwrap();
    let existing = write_file(
        &dir,
        "existing.json",
        r#"[{"name": "id", "type": "INT64", "mode": "REQUIRED"}, {"name": "Name", "type": "STRING", "mode": "NULLABLE"}]"#,
    );
    let input = write_file(&dir, "data.jsonl", "{\"id\": 1.5, \"name\": \"x\"}\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--existing-schema-path",
        path_str(&existing),
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    // The original casing is kept
    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "REQUIRED", "name": "id", "type": "FLOAT"},
            {"mode": "NULLABLE", "name": "Name", "type": "STRING"}
        ])
    );
}

#[test]
fn test_generate_relaxes_required_field() {
    let dir = TempDir::new().unwrap();
    let existing = write_file(
        &dir,
        "existing.json",
        r#"{"fields": [{"name": "id", "type": "INTEGER", "mode": "REQUIRED"}]}"#,
    );
    let input = write_file(&dir, "data.jsonl", "{\"id\": 1}\n{\"other\": true}\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--infer-mode",
        "--existing-schema-path",
        path_str(&existing),
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "NULLABLE", "name": "id", "type": "INTEGER"},
            {"mode": "NULLABLE", "name": "other", "type": "BOOLEAN"}
        ])
    );
}

#[test]
fn test_generate_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "config.yaml",
        "input_format: csv\ncsv_delimiter: \";\"\nsanitize_names: true\n",
    );
    let input = write_file(&dir, "data.csv", "first name;score\nann;1.5\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--config",
        path_str(&config),
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {"mode": "NULLABLE", "name": "first_name", "type": "STRING"},
            {"mode": "NULLABLE", "name": "score", "type": "FLOAT"}
        ])
    );
}

#[test]
fn test_generate_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config.yaml", "debugging_interval: 0\n");

    let err = run(&["generate", "--config", path_str(&config)]).unwrap_err();
    assert!(err.to_string().contains("debugging_interval"));
}

// ============================================================================
// Output Variants
// ============================================================================

#[test]
fn test_generate_with_annotations() {
    let dir = TempDir::new().unwrap();
    let annotations = write_file(
        &dir,
        "annotations.yaml",
        concat!(
            "description: Undocumented\n",
            "attributes:\n",
            "  owner: data-team\n",
            "columns:\n",
            "  Email:\n",
            "    description: Customer email\n",
            "    pii: true\n",
        ),
    );
    let input = write_file(&dir, "data.jsonl", "{\"email\": \"a@b.c\", \"n\": 1}\n");
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--annotations",
        path_str(&annotations),
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        read_json(&output),
        json!([
            {
                "description": "Customer email",
                "mode": "NULLABLE",
                "name": "email",
                "owner": "data-team",
                "pii": true,
                "type": "STRING"
            },
            {
                "description": "Undocumented",
                "mode": "NULLABLE",
                "name": "n",
                "owner": "data-team",
                "type": "INTEGER"
            }
        ])
    );
}

#[test]
fn test_generate_debugging_map() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.jsonl", "{\"a\": 1}\n{\"a\": null}\n");
    let output = dir.path().join("map.json");

    run(&[
        "generate",
        "--debugging-map",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    let map = read_json(&output);
    assert_eq!(map["a"]["status"], json!("hard"));
    assert_eq!(map["a"]["info"]["type"], json!("INTEGER"));
}

#[test]
fn test_library_matches_cli_output() {
    let dir = TempDir::new().unwrap();
    let body = "{\"x\": [1, 2.5], \"y\": {\"z\": \"2020-01-01\"}}\n";
    let input = write_file(&dir, "data.jsonl", body);
    let output = dir.path().join("schema.json");

    run(&[
        "generate",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    let records = decode_all(&DecoderConfig::json(), body).unwrap();
    let config = GeneratorConfig::new().with_input_format(InputFormat::Json);
    let mut generator = SchemaGenerator::new(config);
    let (schema_map, logs) = generator.deduce_schema_from_values(&records, None).unwrap();
    assert!(logs.is_empty());

    let schema = generator.flatten_schema(&schema_map);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        schema_to_string(&schema).unwrap()
    );

    // A written schema can seed the next run unchanged
    let seed = parse_existing_schema(&schema_to_string(&schema).unwrap()).unwrap();
    let mut next = SchemaGenerator::default();
    let (reseeded, _) = next.deduce_schema_from_values(std::iter::empty(), Some(seed)).unwrap();
    assert_eq!(next.flatten_schema(&reseeded), schema);
}

// ============================================================================
// Anonymize Command
// ============================================================================

#[test]
fn test_anonymize_command() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "data.jsonl",
        "{\"name\": \"Ann\", \"born\": \"1990-02-03\"}\n{\"name\": \"Bo\"}\n",
    );
    let output = dir.path().join("anon.jsonl");

    run(&[
        "anonymize",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\"a...\":\"***\",\"b...\":\"2018-07-17\"}\n{\"a...\":\"**\"}\n"
    );
}

#[test]
fn test_anonymize_preserve_keys() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "data.jsonl", "{\"name\": \"Ann\", \"n\": 5}\n");
    let output = dir.path().join("anon.jsonl");

    run(&[
        "anonymize",
        "--preserve-keys",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ])
    .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\"name\":\"***\",\"n\":1}\n"
    );
}
