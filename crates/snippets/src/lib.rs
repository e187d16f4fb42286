//! Snippet tag index
//!
//! Example source files mark the excerpts shown in documentation with
//! comment markers:
//!
//! ```text
//! // snippet-start:[gov2.s3.CreateBucket]
//! ...
//! // snippet-end:[gov2.s3.CreateBucket]
//! ```
//!
//! [`SnippetIndex::build`] walks a corpus and records every tagged excerpt;
//! [`SnippetIndex::validate`] checks example metadata against it.
//!
//! # Examples
//!
//! ```no_run
//! use docgen_snippets::SnippetIndex;
//! use std::path::Path;
//!
//! let (index, errors) = SnippetIndex::build(Path::new("."), &[".git".to_string()]).unwrap();
//! for snippet in index.iter() {
//!     println!("{} {}#L{}", snippet.tag, snippet.file, snippet.line_start);
//! }
//! assert!(errors.is_empty());
//! ```

mod markers;

use docgen_common::{DocGenError, MetadataError, MetadataErrorKind, MetadataErrors, Result};
use docgen_parser::DocGen;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One tagged excerpt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub tag: String,
    /// Path relative to the corpus root, `/`-separated
    pub file: String,
    /// Line of the `snippet-start` marker (1-based)
    pub line_start: usize,
    /// Line of the `snippet-end` marker (1-based)
    pub line_end: usize,
    pub code: String,
}

/// All snippets of a corpus, keyed by tag
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnippetIndex {
    root: PathBuf,
    snippets: BTreeMap<String, Snippet>,
}

impl SnippetIndex {
    /// Walk `root` and index every snippet tag
    ///
    /// Directories whose name is in `ignore` are skipped, as are files that
    /// are not UTF-8 text. Duplicate tags and unbalanced markers come back
    /// as metadata errors; the first definition of a tag wins.
    pub fn build(root: &Path, ignore: &[String]) -> Result<(Self, MetadataErrors)> {
        if !root.is_dir() {
            return Err(DocGenError::NotADirectory(root.to_path_buf()));
        }

        let mut index = Self {
            root: root.to_path_buf(),
            snippets: BTreeMap::new(),
        };
        let mut errors = MetadataErrors::new();
        let mut seen = HashSet::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !ignore.iter().any(|name| e.file_name() == name.as_str())
            });

        for entry in walker {
            let entry = entry.map_err(|e| DocGenError::Parse(format!("Failed to walk {:?}: {}", root, e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            if !content.contains("snippet-") {
                continue;
            }

            let file = relative(root, entry.path());
            debug!("Scanning {} for snippet markers", file);
            let (found, problems) = markers::extract(&content);

            for kind in problems {
                let error = MetadataError::new(kind).in_file(file.as_str());
                if seen.insert(error.clone()) {
                    errors.append(error)?;
                }
            }

            for marked in found {
                if let Some(existing) = index.snippets.get(&marked.tag) {
                    let error = MetadataError::new(MetadataErrorKind::DuplicateSnippetTag {
                        tag: marked.tag.clone(),
                        other_file: existing.file.clone(),
                    })
                    .in_file(file.as_str())
                    .with_id(marked.tag.as_str());
                    if seen.insert(error.clone()) {
                        errors.append(error)?;
                    }
                    continue;
                }
                index.snippets.insert(
                    marked.tag.clone(),
                    Snippet {
                        tag: marked.tag,
                        file: file.clone(),
                        line_start: marked.line_start,
                        line_end: marked.line_end,
                        code: marked.code,
                    },
                );
            }
        }

        info!("Indexed {} snippet tags under {}", index.len(), root.display());
        Ok((index, errors))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, tag: &str) -> Option<&Snippet> {
        self.snippets.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.snippets.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Snippets in tag order
    pub fn iter(&self) -> impl Iterator<Item = &Snippet> {
        self.snippets.values()
    }

    /// Check every excerpt of `doc_gen` against the index
    ///
    /// Reports tags that no source file defines and `snippet_files` that do
    /// not exist under the corpus root.
    pub fn validate(&self, doc_gen: &DocGen) -> Result<MetadataErrors> {
        let mut errors = MetadataErrors::new();
        let mut seen = HashSet::new();

        for example in doc_gen.examples.values() {
            for (language, lang) in &example.languages {
                for version in &lang.versions {
                    for excerpt in &version.excerpts {
                        let missing_tags = excerpt
                            .snippet_tags
                            .iter()
                            .filter(|tag| !self.contains(tag))
                            .map(|tag| MetadataErrorKind::MissingSnippetTag { tag: tag.clone() });
                        let missing_files = excerpt
                            .snippet_files
                            .iter()
                            .filter(|path| !self.root.join(path).is_file())
                            .map(|path| MetadataErrorKind::FileNotFound { path: path.clone() });

                        for kind in missing_tags.chain(missing_files) {
                            let error = MetadataError::new(kind)
                                .in_file(example.file.as_str())
                                .with_id(example.id.as_str())
                                .with_language(language.as_str())
                                .with_sdk_version(version.sdk_version);
                            if seen.insert(error.clone()) {
                                warn!("{}", error);
                                errors.append(error)?;
                            }
                        }
                    }
                }
            }
        }

        Ok(errors)
    }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
