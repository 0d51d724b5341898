//! Tests for output module

use super::*;
use crate::error::Error;
use crate::schema::{BqField, ErrorLog, SchemaGenerator};
use crate::types::Mode;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn sample_schema() -> Vec<BqField> {
    vec![
        BqField::new("email", "STRING", Mode::Nullable),
        BqField::new("id", "INTEGER", Mode::Required),
    ]
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_schema_to_string() {
    let text = schema_to_string(&[BqField::new("a", "INTEGER", Mode::Nullable)]).unwrap();
    assert_eq!(
        text,
        "[\n  {\n    \"mode\": \"NULLABLE\",\n    \"name\": \"a\",\n    \"type\": \"INTEGER\"\n  }\n]\n"
    );
}

#[test]
fn test_write_empty_schema() {
    assert_eq!(schema_to_string(&[]).unwrap(), "[]\n");
}

#[test]
fn test_write_nested_schema_key_order() {
    let schema = vec![BqField::new("r", "RECORD", Mode::Repeated)
        .with_fields(vec![BqField::new("x", "FLOAT", Mode::Nullable)])];
    let text = schema_to_string(&schema).unwrap();

    let fields_at = text.find("\"fields\"").unwrap();
    let mode_at = text.find("\"mode\": \"REPEATED\"").unwrap();
    let type_at = text.find("\"type\": \"RECORD\"").unwrap();
    assert!(fields_at < mode_at && mode_at < type_at);
}

#[test]
fn test_write_debugging_map() {
    let mut generator = SchemaGenerator::default();
    let (schema_map, _) = generator
        .deduce_schema_from_values(&[json!({"a": null})], None)
        .unwrap();

    let mut writer = SchemaWriter::new(Vec::new());
    writer.write_debugging_map(&schema_map).unwrap();
    let written: serde_json::Value = serde_json::from_slice(&writer.into_inner()).unwrap();
    assert_eq!(
        written,
        json!({
            "a": {
                "status": "soft",
                "filled": false,
                "info": {"mode": "NULLABLE", "name": "a", "type": "STRING"}
            }
        })
    );
}

#[test]
fn test_write_error_logs() {
    let logs = vec![
        ErrorLog {
            record_number: 3,
            message: "first".to_string(),
        },
        ErrorLog {
            record_number: 7,
            message: "second".to_string(),
        },
    ];
    let mut writer = SchemaWriter::new(Vec::new());
    writer.write_error_logs(&logs).unwrap();
    assert_eq!(
        String::from_utf8(writer.into_inner()).unwrap(),
        "Problem on line 3: first\nProblem on line 7: second\n"
    );
}

#[test]
fn test_write_schema_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schema.json");

    let mut writer = SchemaWriter::create(&path).unwrap();
    writer.write_schema(&sample_schema()).unwrap();
    drop(writer);

    let written: Vec<BqField> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, sample_schema());
}

// ============================================================================
// Annotation Tests
// ============================================================================

#[test]
fn test_apply_annotations() {
    let annotations = SchemaAnnotations::from_yaml(
        r"
description: Describe this column shortly
attributes:
  privacy_classification: non_personal_data
columns:
  EMAIL:
    description: Customer email address
    privacy_classification: personal_data
    encryption_key_id: true
",
    )
    .unwrap();

    let mut schema = sample_schema();
    annotations.apply(&mut schema);

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!([
            {
                "mode": "NULLABLE",
                "name": "email",
                "type": "STRING",
                "description": "Customer email address",
                "privacy_classification": "personal_data",
                "encryption_key_id": true
            },
            {
                "mode": "REQUIRED",
                "name": "id",
                "type": "INTEGER",
                "description": "Describe this column shortly",
                "privacy_classification": "non_personal_data"
            }
        ])
    );
}

#[test]
fn test_annotations_keep_existing_description() {
    let annotations = SchemaAnnotations::from_yaml("description: default").unwrap();
    let mut schema = vec![BqField::new("a", "STRING", Mode::Nullable).with_description("kept")];
    annotations.apply(&mut schema);
    assert_eq!(schema[0].description.as_deref(), Some("kept"));
}

#[test]
fn test_annotations_reject_reserved_keys() {
    let err = SchemaAnnotations::from_yaml("columns:\n  a:\n    type: INTEGER\n").unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_empty_annotations() {
    let annotations = SchemaAnnotations::from_yaml("{}").unwrap();
    let mut schema = sample_schema();
    annotations.apply(&mut schema);
    assert_eq!(schema, sample_schema());
}

#[test]
fn test_load_annotations_missing_file() {
    let err = SchemaAnnotations::load("/no/such/annotations.yaml").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
