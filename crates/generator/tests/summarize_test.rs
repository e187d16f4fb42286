//! Root summary over a tree of rendered READMEs

use docgen_common::{DocGenError, ToolConfig};
use docgen_generator::{gather_data, write_super_summary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "README.md", "# Old root page\n");
    write(
        dir.path(),
        "gov2/s3/README.md",
        "# Amazon S3 code examples for the SDK for Go V2\n\n## Overview\n\nShows how to use S3.\n\n## Prerequisites\n\nInstall Go.\n",
    );
    write(
        dir.path(),
        "python/example_code/sqs/README.md",
        "# Amazon SQS examples\n\nNo prerequisites heading here.\n",
    );
    write(dir.path(), "node_modules/pkg/README.md", "# Vendored\n");
    write(dir.path(), "gov2/s3/notes.md", "# Not a README\n");
    dir
}

#[test]
fn test_gather_data() {
    let dir = tree();
    let config = ToolConfig::default();
    let summaries = gather_data(dir.path(), &config).unwrap();

    let paths: Vec<PathBuf> = summaries.iter().map(|s| s.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("gov2/s3/README.md"),
            PathBuf::from("python/example_code/sqs/README.md"),
        ]
    );

    assert_eq!(
        summaries[0].summary,
        "# Amazon S3 code examples for the SDK for Go V2\n\n## Overview\n\nShows how to use S3.\n\n"
    );
    assert_eq!(
        summaries[0].url,
        "https://github.com/awsdocs/aws-doc-sdk-examples/tree/main/gov2/s3"
    );
    assert_eq!(
        summaries[1].summary,
        "# Amazon SQS examples\n\nNo prerequisites heading here.\n"
    );
}

#[test]
fn test_write_super_summary_replaces_root_readme() {
    let dir = tree();
    let config = ToolConfig::default();
    let summaries = gather_data(dir.path(), &config).unwrap();

    let path = write_super_summary(dir.path(), &summaries).unwrap();
    assert_eq!(path, dir.path().join("README.md"));

    let page = fs::read_to_string(path).unwrap();
    assert!(!page.contains("Old root page"));
    assert!(page.contains(
        "## [Amazon S3 code examples for the SDK for Go V2](https://github.com/awsdocs/aws-doc-sdk-examples/tree/main/gov2/s3)"
    ));
    assert!(page.contains("#### Overview\n\nShows how to use S3."));
    assert!(!page.contains("Install Go."));
    assert!(page.contains("## [Amazon SQS examples\n\nNo prerequisites heading here.]"));
}

#[test]
fn test_gather_data_requires_directory() {
    let dir = tree();
    let config = ToolConfig::default();
    let result = gather_data(&dir.path().join("README.md"), &config);
    assert!(matches!(result, Err(DocGenError::NotADirectory(_))));
}
