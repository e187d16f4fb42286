//! The full metadata graph of one corpus
//!
//! [`DocGen::from_dir`] reads a metadata directory:
//! - `sdks.yaml` and `services.yaml` (required)
//! - `categories.yaml` (optional)
//! - every `*_metadata.yaml`, including `cross_metadata.yaml`, in name order
//!
//! When a schema directory is given, each file is first checked against the
//! matching schema (`sdks_schema.yaml`, `services_schema.yaml`,
//! `categories_schema.yaml`, `example_strict_schema.yaml`).

use crate::categories::{self, Category};
use crate::examples::{self, Example, References};
use crate::sdks::{self, Sdk};
use crate::services::{self, Service};
use crate::validator::Schema;
use docgen_common::{DocGenError, Entities, MetadataError, MetadataErrorKind, MetadataErrors, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SDKS_FILE: &str = "sdks.yaml";
pub const SERVICES_FILE: &str = "services.yaml";
pub const CATEGORIES_FILE: &str = "categories.yaml";
pub const METADATA_SUFFIX: &str = "_metadata.yaml";

const SDKS_SCHEMA: &str = "sdks_schema.yaml";
const SERVICES_SCHEMA: &str = "services_schema.yaml";
const CATEGORIES_SCHEMA: &str = "categories_schema.yaml";
const EXAMPLE_SCHEMA: &str = "example_strict_schema.yaml";

/// How metadata is loaded
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Report fields that are otherwise silently defaulted
    pub strict: bool,
    /// Directory holding the schema files, if schema checks are wanted
    pub schema_dir: Option<PathBuf>,
}

/// Parsed SDKs, services, categories and examples
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocGen {
    pub root: PathBuf,
    pub sdks: BTreeMap<String, Sdk>,
    pub services: BTreeMap<String, Service>,
    pub categories: BTreeMap<String, Category>,
    pub examples: BTreeMap<String, Example>,
}

#[derive(Default)]
struct Schemas {
    sdks: Option<Schema>,
    services: Option<Schema>,
    categories: Option<Schema>,
    examples: Option<Schema>,
}

impl Schemas {
    fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        if !dir.is_dir() {
            return Err(DocGenError::NotADirectory(dir.to_path_buf()));
        }

        let load = |name: &str| -> Result<Option<Schema>> {
            let path = dir.join(name);
            if path.is_file() {
                debug!("Loading schema {}", path.display());
                Schema::from_file(&path).map(Some)
            } else {
                Ok(None)
            }
        };

        Ok(Self {
            sdks: load(SDKS_SCHEMA)?,
            services: load(SERVICES_SCHEMA)?,
            categories: load(CATEGORIES_SCHEMA)?,
            examples: load(EXAMPLE_SCHEMA)?,
        })
    }
}

impl DocGen {
    /// Load and check every metadata file in `dir`
    ///
    /// Problems in the metadata come back as [`MetadataErrors`]; `Err` is
    /// reserved for an unusable directory or schema.
    pub fn from_dir(dir: &Path, options: &LoadOptions) -> Result<(Self, MetadataErrors)> {
        if !dir.is_dir() {
            return Err(DocGenError::NotADirectory(dir.to_path_buf()));
        }
        let schemas = Schemas::load(options.schema_dir.as_deref())?;
        let mut errors = MetadataErrors::new();

        let mut doc_gen = DocGen {
            root: dir.to_path_buf(),
            ..DocGen::default()
        };

        if let Some(yaml) = load_file(dir, SDKS_FILE, true, schemas.sdks.as_ref(), &mut errors)? {
            let (sdks, sdk_errors) = sdks::parse(SDKS_FILE, &yaml, options.strict)?;
            errors.extend(sdk_errors)?;
            doc_gen.sdks = sdks;
        }

        if let Some(yaml) =
            load_file(dir, SERVICES_FILE, true, schemas.services.as_ref(), &mut errors)?
        {
            let (services, service_errors) = services::parse(SERVICES_FILE, &yaml)?;
            errors.extend(service_errors)?;
            doc_gen.services = services;
        }

        if let Some(yaml) =
            load_file(dir, CATEGORIES_FILE, false, schemas.categories.as_ref(), &mut errors)?
        {
            let (categories, category_errors) = categories::parse(CATEGORIES_FILE, &yaml)?;
            errors.extend(category_errors)?;
            doc_gen.categories = categories;
        }

        for file in metadata_files(dir)? {
            let Some(yaml) = load_file(dir, &file, true, schemas.examples.as_ref(), &mut errors)?
            else {
                continue;
            };
            let refs = References {
                sdks: &doc_gen.sdks,
                services: &doc_gen.services,
                categories: &doc_gen.categories,
            };
            let (examples, example_errors) = examples::parse(&file, &yaml, refs)?;
            errors.extend(example_errors)?;

            for example in examples {
                if let Some(existing) = doc_gen.examples.get(&example.id) {
                    errors.append(
                        MetadataError::new(MetadataErrorKind::DuplicateExample {
                            other_file: existing.file.clone(),
                        })
                        .in_file(file.as_str())
                        .with_id(example.id.as_str()),
                    )?;
                    continue;
                }
                doc_gen.examples.insert(example.id.clone(), example);
            }
        }

        info!(
            "Loaded {} SDKs, {} services, {} categories and {} examples from {} ({} errors)",
            doc_gen.sdks.len(),
            doc_gen.services.len(),
            doc_gen.categories.len(),
            doc_gen.examples.len(),
            dir.display(),
            errors.len()
        );
        Ok((doc_gen, errors))
    }

    pub fn sdk(&self, name: &str) -> Option<&Sdk> {
        self.sdks.get(name)
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    pub fn example(&self, id: &str) -> Option<&Example> {
        self.examples.get(id)
    }

    /// Entity expansions declared by services and SDK versions
    ///
    /// Only names that are a single entity reference with an `expanded`
    /// block contribute; `"&Golong; V2"` style names are left to the
    /// shorter entity they start with.
    pub fn entities(&self) -> Entities {
        let mut entities = Entities::new();
        for service in self.services.values() {
            if let Some(expanded) = &service.expanded {
                entities.insert(&service.long, &expanded.long);
                entities.insert(&service.short, &expanded.short);
            }
        }
        for version in self.sdks.values().flat_map(|sdk| &sdk.versions) {
            if let Some(expanded) = &version.expanded {
                entities.insert(&version.long, &expanded.long);
                entities.insert(&version.short, &expanded.short);
            }
        }
        entities
    }
}

fn metadata_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(METADATA_SUFFIX) {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read, decode and schema-check one file
///
/// Missing required files, YAML syntax errors and schema violations are
/// recorded as metadata errors.
fn load_file(
    dir: &Path,
    file: &str,
    required: bool,
    schema: Option<&Schema>,
    errors: &mut MetadataErrors,
) -> Result<Option<Value>> {
    let path = dir.join(file);
    if !path.is_file() {
        if required {
            errors.append(
                MetadataError::new(MetadataErrorKind::FileNotFound {
                    path: path.display().to_string(),
                })
                .in_file(file),
            )?;
        }
        return Ok(None);
    }

    debug!("Loading {}", path.display());
    let content = fs::read_to_string(&path)
        .map_err(|e| DocGenError::Parse(format!("Failed to read {:?}: {}", path, e)))?;

    let yaml: Value = match serde_yaml::from_str(&content) {
        Ok(yaml) => yaml,
        Err(e) => {
            errors.append(
                MetadataError::new(MetadataErrorKind::YamlParse {
                    message: e.to_string(),
                })
                .in_file(file),
            )?;
            return Ok(None);
        }
    };

    if let Some(schema) = schema {
        let mut seen = HashSet::new();
        for violation in schema.validate(&yaml) {
            if !seen.insert((violation.path.clone(), violation.message.clone())) {
                continue;
            }
            let mut error = MetadataError::new(MetadataErrorKind::SchemaViolation {
                path: violation.path.clone(),
                message: violation.message,
            })
            .in_file(file);
            if let Some(id) = violation.path.split('.').next().filter(|id| !id.is_empty()) {
                error = error.with_id(id);
            }
            errors.append(error)?;
        }
    }

    Ok(Some(yaml))
}
