//! Common types and utilities for docgen
//!
//! This crate contains the error types, the metadata error taxonomy, entity
//! reference helpers and the tool configuration shared by the parser,
//! snippet index, generator and CLI crates.

pub mod config;
pub mod entity;
pub mod metadata_errors;

pub use config::{LanguageConfig, ToolConfig};
pub use entity::{check_mapping, has_bare_aws, is_entity, Entities};
pub use metadata_errors::{ErrorContext, MetadataError, MetadataErrorKind, MetadataErrors};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a docgen run
///
/// Malformed metadata is never reported through this type; it is collected
/// as [`MetadataError`] values instead. These variants cover caller and
/// configuration bugs plus I/O failures.
#[derive(Error, Debug)]
pub enum DocGenError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Invalid schema: {0}")]
    Schema(String),

    #[error("already have error {0}")]
    DuplicateError(Box<MetadataError>),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for docgen operations
pub type Result<T> = std::result::Result<T, DocGenError>;
