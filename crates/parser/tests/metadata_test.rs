//! Integration tests for loading a metadata directory

use docgen_common::MetadataErrorKind;
use docgen_parser::{DocGen, LoadOptions, Schema};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn copy_metadata(dir: &TempDir) {
    for entry in fs::read_dir(fixtures().join("metadata")).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
}

#[test]
fn test_load_fixture_corpus() {
    let options = LoadOptions {
        strict: true,
        schema_dir: Some(fixtures().join("schema")),
    };
    let (doc_gen, errors) = DocGen::from_dir(&fixtures().join("metadata"), &options).unwrap();
    assert!(errors.is_empty(), "{errors}");

    assert_eq!(doc_gen.sdks.len(), 4);
    assert_eq!(doc_gen.services.len(), 2);
    assert_eq!(doc_gen.categories.len(), 4);
    assert_eq!(doc_gen.examples.len(), 5);

    let cross = doc_gen
        .example("cross_MessageProcessingFrameworkTutorial")
        .unwrap();
    assert_eq!(cross.file, "cross_metadata.yaml");
    assert_eq!(cross.category, "Scenarios");
    assert!(cross.is_cross_service());
}

#[test]
fn test_go_sdk_round_trip() {
    let (doc_gen, _) =
        DocGen::from_dir(&fixtures().join("metadata"), &LoadOptions::default()).unwrap();

    let go = doc_gen.sdk("Go").unwrap();
    assert_eq!(go.property, "go");
    assert_eq!(go.guide, "&guide-go-dev;");
    assert_eq!(go.versions.len(), 2);
    assert_eq!(go.versions[0].version, 1);
    assert_eq!(go.versions[0].long, "&Golong; V1");
    assert_eq!(go.versions[1].version, 2);
    assert_eq!(go.versions[1].long, "&Golong; V2");

    let api_ref = go.versions[1].api_ref.as_ref().unwrap();
    assert_eq!(
        api_ref.link("s3", "CreateBucket").as_deref(),
        Some("https://pkg.go.dev/github.com/aws/aws-sdk-go-v2/service/s3#Client.CreateBucket")
    );
}

#[test]
fn test_duplicate_example_across_files() {
    let dir = TempDir::new().unwrap();
    copy_metadata(&dir);
    fs::write(
        dir.path().join("s3_extra_metadata.yaml"),
        "s3_GetObject:\n  languages:\n    Go:\n      versions:\n        - sdk_version: 2\n          block_content: get.xml\n  services:\n    s3: {GetObject}\n",
    )
    .unwrap();

    let (doc_gen, errors) = DocGen::from_dir(dir.path(), &LoadOptions::default()).unwrap();

    // s3_extra sorts before s3_metadata, so it owns the id
    assert_eq!(doc_gen.example("s3_GetObject").unwrap().file, "s3_extra_metadata.yaml");
    let error = errors.iter().next().unwrap();
    assert_eq!(
        error.kind,
        MetadataErrorKind::DuplicateExample {
            other_file: "s3_extra_metadata.yaml".to_string()
        }
    );
    assert_eq!(error.context.file.as_deref(), Some("s3_metadata.yaml"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_schema_violations_are_reported_with_paths() {
    let dir = TempDir::new().unwrap();
    copy_metadata(&dir);
    fs::write(
        dir.path().join("sqs_metadata.yaml"),
        "sqs_SendMessage:\n  synopsis: Send a message\n  languages:\n    Go:\n      versions:\n        - sdk_version: 2\n          excerpts:\n            - snippet_tags: [gov2.sqs.SendMessage]\n  services:\n    sqs: {SendMessage}\n",
    )
    .unwrap();

    let options = LoadOptions {
        strict: false,
        schema_dir: Some(fixtures().join("schema")),
    };
    let (_, errors) = DocGen::from_dir(dir.path(), &options).unwrap();
    let violations: Vec<String> = errors
        .iter()
        .filter(|e| matches!(e.kind, MetadataErrorKind::SchemaViolation { .. }))
        .map(|e| e.to_string())
        .collect();

    assert_eq!(
        violations,
        vec![
            "In sqs_metadata.yaml, example sqs_SendMessage: sqs_SendMessage.synopsis: 'Send a message' must start with a lowercase letter",
            "In sqs_metadata.yaml, example sqs_SendMessage: sqs_SendMessage.synopsis: 'Send a message' must end with punctuation or a colon",
        ]
    );
}

#[test]
fn test_fixture_schemas_load() {
    for name in ["example_strict_schema.yaml", "services_schema.yaml"] {
        Schema::from_file(&fixtures().join("schema").join(name)).unwrap();
    }
}
