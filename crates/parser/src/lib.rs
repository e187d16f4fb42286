//! Metadata parsing for the example corpus
//!
//! This crate turns the YAML metadata of a code-example corpus into typed
//! records and checks them.
//!
//! ## Parsing Strategy
//!
//! Parsers never stop at the first bad field. Each malformed value is
//! recorded as a [`MetadataError`](docgen_common::MetadataError), replaced
//! with an empty default, and parsing moves on, so one pass reports every
//! problem in a file:
//! - `sdks.yaml` → [`Sdk`] records
//! - `services.yaml` → [`Service`] records
//! - `categories.yaml` → [`Category`] records
//! - `*_metadata.yaml` → [`Example`] records, checked against the above
//!
//! [`DocGen`] ties the files of one metadata directory together, and the
//! [`validator`] module checks raw documents against yamale-style schemas.

pub mod categories;
mod doc_gen;
pub mod examples;
mod fields;
pub mod sdks;
pub mod services;
pub mod validator;

pub use categories::{Category, SynopsisPrefix, TemplateVars, TitleField, TitleInfo};
pub use doc_gen::{DocGen, LoadOptions};
pub use examples::{Example, Excerpt, GuideTopic, Language, References, Version};
pub use sdks::{Expanded, Sdk, SdkApiRef, SdkVersion, TitleOverride};
pub use services::{Service, ServiceGuide};
pub use validator::{Schema, SchemaError};
