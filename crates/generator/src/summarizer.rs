//! Root README summarizer
//!
//! Collects the overview of every README below a corpus root and writes
//! them into one page at the root. Works on rendered Markdown only.

use crate::templates;
use docgen_common::{DocGenError, Result, ToolConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Everything before this heading is a README's summary
pub const SUMMARY_END: &str = "## Prerequisites";

const README: &str = "README.md";

/// Overview of one README below the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadmeSummary {
    /// README path relative to the root
    pub path: PathBuf,
    pub summary: String,
    pub url: String,
}

#[derive(Serialize)]
struct SummaryEntry {
    title: String,
    url: String,
    sections: Vec<String>,
}

/// Collect the summary of every `README.md` below `root`
///
/// The README at the root itself is skipped, as are folders named in
/// `config.summary_ignore`. A README without a `## Prerequisites` heading
/// contributes its whole text.
pub fn gather_data(root: &Path, config: &ToolConfig) -> Result<Vec<ReadmeSummary>> {
    if !root.is_dir() {
        return Err(DocGenError::NotADirectory(root.to_path_buf()));
    }

    let github_url = config.github_url.trim_end_matches('/');
    let mut summaries = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !e.file_type().is_dir()
                || !config
                    .summary_ignore
                    .iter()
                    .any(|name| e.file_name() == name.as_str())
        });

    for entry in walker {
        let entry = entry
            .map_err(|e| DocGenError::Parse(format!("Failed to walk {:?}: {}", root, e)))?;
        if entry.depth() < 2 || !entry.file_type().is_file() || entry.file_name() != README {
            continue;
        }

        let content = fs::read_to_string(entry.path())?;
        let summary = match content.find(SUMMARY_END) {
            Some(end) => content[..end].to_string(),
            None => content,
        };

        let path = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
        let folder = path
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();

        debug!("Summarized {}", path.display());
        summaries.push(ReadmeSummary {
            path,
            summary,
            url: format!("{github_url}/{folder}"),
        });
    }

    info!("Found {} READMEs under {}", summaries.len(), root.display());
    Ok(summaries)
}

/// Render the root page from gathered summaries
///
/// Each summary is split on `##`: the first fragment is its title and the
/// rest come back as `####` headings.
pub fn render_super_summary(summaries: &[ReadmeSummary]) -> Result<String> {
    let entries: Vec<SummaryEntry> = summaries
        .iter()
        .map(|readme| {
            let mut fragments = readme.summary.split("##");
            let title = fragments
                .next()
                .unwrap_or_default()
                .trim()
                .trim_start_matches('#')
                .trim()
                .to_string();
            let sections = fragments
                .filter(|fragment| !fragment.trim().is_empty())
                .map(|fragment| format!("####{fragment}").trim().to_string())
                .collect();
            SummaryEntry {
                title,
                url: readme.url.clone(),
                sections,
            }
        })
        .collect();

    let tera = templates::load_summary_templates()?;
    let mut context = tera::Context::new();
    context.insert("entries", &entries);
    tera.render("summary.md", &context)
        .map_err(|e| DocGenError::Generation(format!("Template error: {:?}", e)))
}

/// Write the root page to `{root}/README.md`, replacing any existing file
pub fn write_super_summary(root: &Path, summaries: &[ReadmeSummary]) -> Result<PathBuf> {
    let rendered = render_super_summary(summaries)?;
    let path = root.join(README);
    fs::write(&path, rendered)
        .map_err(|e| DocGenError::Generation(format!("Failed to write {:?}: {}", path, e)))?;

    info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(text: &str) -> ReadmeSummary {
        ReadmeSummary {
            path: PathBuf::from("gov2/s3/README.md"),
            summary: text.to_string(),
            url: "https://example.com/gov2/s3".to_string(),
        }
    }

    #[test]
    fn test_title_and_sections() {
        let rendered = render_super_summary(&[summary(
            "# S3 code examples\n\n## Overview\n\nShows S3.\n\n## Extra\n\nMore.\n",
        )])
        .unwrap();

        assert!(rendered.starts_with("# Code examples\n"));
        assert!(rendered.contains("## [S3 code examples](https://example.com/gov2/s3)\n"));
        assert!(rendered.contains("#### Overview\n\nShows S3."));
        assert!(rendered.contains("#### Extra\n\nMore."));
        assert!(rendered.trim_end().ends_with("not this file."));
    }

    #[test]
    fn test_summary_without_headings() {
        let rendered = render_super_summary(&[summary("Plain text only")]).unwrap();
        assert!(rendered.contains("## [Plain text only](https://example.com/gov2/s3)"));
        assert!(!rendered.contains("####"));
    }
}
