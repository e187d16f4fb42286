//! README rendering against the parser's metadata fixtures

use docgen_common::ToolConfig;
use docgen_generator::{ReadmeRenderer, ReadmeTarget, WriteOutcome};
use docgen_parser::{DocGen, LoadOptions};
use docgen_snippets::SnippetIndex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn metadata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../parser/tests/fixtures/metadata")
}

fn corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "gov2/s3/actions/bucket_basics.go",
        "package actions\n\n// snippet-start:[gov2.s3.BucketBasics.struct]\ntype BucketBasics struct {\n\tS3Client *s3.Client\n}\n// snippet-end:[gov2.s3.BucketBasics.struct]\n\n// snippet-start:[gov2.s3.CreateBucket]\nfunc (b BucketBasics) CreateBucket() error {\n\treturn nil\n}\n// snippet-end:[gov2.s3.CreateBucket]\n",
    );
    write(
        dir.path(),
        "gov2/s3/hello/hello.go",
        "// snippet-start:[gov2.s3.Hello]\npackage main\n// snippet-end:[gov2.s3.Hello]\n",
    );
    dir
}

fn go_s3() -> ReadmeTarget {
    ReadmeTarget {
        language: "Go".to_string(),
        sdk_version: 2,
        service: "s3".to_string(),
    }
}

#[test]
fn test_targets_cover_languages_with_examples() {
    let (doc_gen, _) = DocGen::from_dir(&metadata_dir(), &LoadOptions::default()).unwrap();
    let config = ToolConfig::default();
    let renderer = ReadmeRenderer::new(&doc_gen, &config, None).unwrap();

    let targets: Vec<(String, u32, String)> = renderer
        .targets()
        .into_iter()
        .map(|t| (t.language, t.sdk_version, t.service))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("Go".to_string(), 2, "s3".to_string()),
            ("Go".to_string(), 2, "sqs".to_string()),
            ("Python".to_string(), 3, "s3".to_string()),
        ]
    );
    assert_eq!(
        renderer.readme_path(&go_s3()).unwrap(),
        PathBuf::from("gov2/s3/README.md")
    );
}

#[test]
fn test_render_go_s3() {
    let dir = corpus();
    let (doc_gen, _) = DocGen::from_dir(&metadata_dir(), &LoadOptions::default()).unwrap();
    let (index, _) = SnippetIndex::build(dir.path(), &[]).unwrap();
    let config = ToolConfig::default();
    let mut renderer = ReadmeRenderer::new(&doc_gen, &config, Some(&index)).unwrap();

    let readme = renderer.render(&go_s3()).unwrap();

    assert!(readme.starts_with("# Amazon S3 code examples for the SDK for Go V2\n"));
    assert!(readme.contains(
        "Shows how to use the AWS SDK for Go V2 to work with Amazon Simple Storage Service."
    ));
    assert!(readme.contains("_Amazon S3 stores data as objects within resources called buckets._"));
    assert!(readme.contains(
        "- [Hello Amazon S3](hello/hello.go#L1) ([`ListBuckets`](https://pkg.go.dev/github.com/aws/aws-sdk-go-v2/service/s3#Client.ListBuckets))"
    ));
    assert!(readme.contains(
        "- [<code>CreateBucket</code>](actions/bucket_basics.go#L9) ([`CreateBucket`](https://pkg.go.dev/github.com/aws/aws-sdk-go-v2/service/s3#Client.CreateBucket))"
    ));
    assert!(readme.contains("- <code>GetObject</code> ([`GetObject`]"));
    assert!(readme.contains("### Basics\n"));
    assert!(readme.contains("- Learn the basics\n"));
    assert!(readme.contains("### Cross-service examples"));
    assert!(readme.contains(
        "- [Create a messaging application](../cross-services/message_processing)"
    ));
    assert!(readme.contains("- [Amazon S3 User Guide](https://docs.aws.amazon.com/AmazonS3/latest/userguide/Welcome.html)"));
    assert!(!readme.contains("### Scenarios\n"));

    let prerequisites = readme.find("## Prerequisites").unwrap();
    let examples = readme.find("## Code examples").unwrap();
    assert!(prerequisites < examples);
}

#[test]
fn test_render_is_deterministic() {
    let dir = corpus();
    let (doc_gen, _) = DocGen::from_dir(&metadata_dir(), &LoadOptions::default()).unwrap();
    let (index, _) = SnippetIndex::build(dir.path(), &[]).unwrap();
    let config = ToolConfig::default();
    let mut renderer = ReadmeRenderer::new(&doc_gen, &config, Some(&index)).unwrap();

    let first = renderer.render(&go_s3()).unwrap();
    let second = renderer.render(&go_s3()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_write_then_check() {
    let dir = corpus();
    let (doc_gen, _) = DocGen::from_dir(&metadata_dir(), &LoadOptions::default()).unwrap();
    let (index, _) = SnippetIndex::build(dir.path(), &[]).unwrap();
    let config = ToolConfig::default();
    let mut renderer = ReadmeRenderer::new(&doc_gen, &config, Some(&index)).unwrap();
    let target = go_s3();

    assert_eq!(renderer.write(dir.path(), &target, true).unwrap(), WriteOutcome::Stale);
    assert!(!dir.path().join("gov2/s3/README.md").exists());

    assert_eq!(renderer.write(dir.path(), &target, false).unwrap(), WriteOutcome::Written);
    assert_eq!(renderer.write(dir.path(), &target, true).unwrap(), WriteOutcome::Unchanged);

    fs::write(dir.path().join("gov2/s3/README.md"), "# edited\n").unwrap();
    assert_eq!(renderer.write(dir.path(), &target, true).unwrap(), WriteOutcome::Stale);
    assert_eq!(renderer.write(dir.path(), &target, false).unwrap(), WriteOutcome::Written);
}

#[test]
fn test_unconfigured_language_is_an_error() {
    let (doc_gen, _) = DocGen::from_dir(&metadata_dir(), &LoadOptions::default()).unwrap();
    let config = ToolConfig::default();
    let mut renderer = ReadmeRenderer::new(&doc_gen, &config, None).unwrap();

    let target = ReadmeTarget {
        language: "Go".to_string(),
        sdk_version: 1,
        service: "s3".to_string(),
    };
    assert!(renderer.render(&target).is_err());
}
