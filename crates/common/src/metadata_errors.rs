//! Metadata error taxonomy
//!
//! Every problem found in the YAML metadata is recorded as a
//! [`MetadataError`]: a variant-specific payload ([`MetadataErrorKind`])
//! plus a shared [`ErrorContext`] naming the file, example id, language and
//! SDK version it was found in. Low-level parsers build the payload; callers
//! higher up attach the context once they know it.

use crate::{DocGenError, Result};
use serde::Serialize;
use std::fmt;

/// Where an error was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorContext {
    pub file: Option<String>,
    pub id: Option<String>,
    pub language: Option<String>,
    pub sdk_version: Option<u32>,
}

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataErrorKind {
    MissingField { field: String },
    MappingMustBeEntity { field: String, value: String },
    AwsNotEntity { field: String, value: String },
    WrongType { field: String, expected: String },
    DuplicateKey { key: String },
    UnknownLanguage { language: String },
    InvalidSdkVersion { version: u32 },
    InvalidGithubLink { link: String },
    MissingBlockContentAndExcerpt,
    BlockContentAndExcerptConflict,
    MissingSnippetTag { tag: String },
    ApiCannotHaveTitleFields,
    ServiceNotFound { service: String },
    DuplicateService { service: String },
    DuplicateExample { other_file: String },
    MissingCategoryBody,
    CategoryWithNoDisplay,
    SdkWithNoVersions,
    UnknownCategory { category: String },
    SchemaViolation { path: String, message: String },
    DuplicateSnippetTag { tag: String, other_file: String },
    UnclosedSnippet { tag: String },
    SnippetEndWithoutStart { tag: String },
    FileNotFound { path: String },
    YamlParse { message: String },
}

impl MetadataErrorKind {
    /// Human-readable, variant-specific message
    pub fn message(&self) -> String {
        match self {
            Self::MissingField { field } => format!("missing field {field}"),
            Self::MappingMustBeEntity { field, value } => {
                format!("field {field} must be an entity reference like &Name;, got {value}")
            }
            Self::AwsNotEntity { field, value } => {
                format!("field {field} uses AWS outside of an entity reference: {value}")
            }
            Self::WrongType { field, expected } => format!("field {field} must be {expected}"),
            Self::DuplicateKey { key } => format!("key {key} is defined more than once"),
            Self::UnknownLanguage { language } => format!("unknown language {language}"),
            Self::InvalidSdkVersion { version } => {
                format!("SDK version {version} is not defined for this language")
            }
            Self::InvalidGithubLink { link } => format!(
                "github link {link} must be a folder path relative to the repository root"
            ),
            Self::MissingBlockContentAndExcerpt => {
                "must have either block_content or excerpts".to_string()
            }
            Self::BlockContentAndExcerptConflict => {
                "cannot have both block_content and excerpts".to_string()
            }
            Self::MissingSnippetTag { tag } => {
                format!("snippet tag {tag} was not found in the source tree")
            }
            Self::ApiCannotHaveTitleFields => {
                "API examples cannot have title, title_abbrev or synopsis_list".to_string()
            }
            Self::ServiceNotFound { service } => {
                format!("service {service} is not defined in services.yaml")
            }
            Self::DuplicateService { service } => {
                format!("service {service} is defined more than once")
            }
            Self::DuplicateExample { other_file } => {
                format!("example id is already defined in {other_file}")
            }
            Self::MissingCategoryBody => "category has no body".to_string(),
            Self::CategoryWithNoDisplay => "category has no display value".to_string(),
            Self::SdkWithNoVersions => "SDK has no versions".to_string(),
            Self::UnknownCategory { category } => format!("unknown category {category}"),
            Self::SchemaViolation { path, message } => format!("{path}: {message}"),
            Self::DuplicateSnippetTag { tag, other_file } => {
                format!("snippet tag {tag} is also defined in {other_file}")
            }
            Self::UnclosedSnippet { tag } => {
                format!("snippet tag {tag} has no matching snippet-end")
            }
            Self::SnippetEndWithoutStart { tag } => {
                format!("snippet-end for {tag} has no matching snippet-start")
            }
            Self::FileNotFound { path } => format!("file {path} does not exist"),
            Self::YamlParse { message } => format!("could not parse YAML: {message}"),
        }
    }
}

/// One metadata problem with its context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MetadataError {
    #[serde(flatten)]
    pub context: ErrorContext,
    #[serde(flatten)]
    pub kind: MetadataErrorKind,
}

impl MetadataError {
    pub fn new(kind: MetadataErrorKind) -> Self {
        Self {
            context: ErrorContext::default(),
            kind,
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(MetadataErrorKind::MissingField {
            field: field.to_string(),
        })
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.context.file = Some(file.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.context.id = Some(id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.context.language = Some(language.into());
        self
    }

    pub fn with_sdk_version(mut self, sdk_version: u32) -> Self {
        self.context.sdk_version = Some(sdk_version);
        self
    }

    /// `In {file}, example {id}[: {language}][: {sdk_version}]`
    pub fn prefix(&self) -> String {
        let ctx = &self.context;
        let mut prefix = format!(
            "In {}, example {}",
            ctx.file.as_deref().unwrap_or("<unknown file>"),
            ctx.id.as_deref().unwrap_or("<unknown id>")
        );
        if let Some(language) = &ctx.language {
            prefix.push_str(&format!(": {language}"));
        }
        if let Some(sdk_version) = ctx.sdk_version {
            prefix.push_str(&format!(": {sdk_version}"));
        }
        prefix
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.prefix(), self.message())
    }
}

/// Ordered collection of metadata errors
///
/// Appending an error that is structurally identical to one already present
/// is a caller bug and fails with [`DocGenError::DuplicateError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataErrors {
    errors: Vec<MetadataError>,
}

impl MetadataErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, error: MetadataError) -> Result<()> {
        if self.errors.contains(&error) {
            return Err(DocGenError::DuplicateError(Box::new(error)));
        }
        self.errors.push(error);
        Ok(())
    }

    pub fn extend(&mut self, other: MetadataErrors) -> Result<()> {
        for error in other.errors {
            self.append(error)?;
        }
        Ok(())
    }

    /// Add the errors of `other` that are not already present
    pub fn merge(&mut self, other: MetadataErrors) {
        for error in other.errors {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
    }

    /// Attach a file and example id to every error, replacing what was there
    pub fn with_file_and_id(mut self, file: &str, id: &str) -> Self {
        for error in &mut self.errors {
            error.context.file = Some(file.to_string());
            error.context.id = Some(id.to_string());
        }
        self
    }

    /// Attach a language to errors that do not have one yet
    pub fn with_language(mut self, language: &str) -> Self {
        for error in &mut self.errors {
            error.context.language.get_or_insert_with(|| language.to_string());
        }
        self
    }

    /// Attach an SDK version to errors that do not have one yet
    pub fn with_sdk_version(mut self, sdk_version: u32) -> Self {
        for error in &mut self.errors {
            error.context.sdk_version.get_or_insert(sdk_version);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataError> {
        self.errors.iter()
    }
}

impl IntoIterator for MetadataErrors {
    type Item = MetadataError;
    type IntoIter = std::vec::IntoIter<MetadataError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MetadataErrors {
    type Item = &'a MetadataError;
    type IntoIter = std::slice::Iter<'a, MetadataError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for MetadataErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataErrors:")?;
        for error in &self.errors {
            write!(f, "\n\t{error}")?;
        }
        Ok(())
    }
}
