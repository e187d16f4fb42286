//! Entity references
//!
//! Product names in the metadata are written as `&Name;` placeholders and
//! expanded when READMEs are rendered.

use crate::metadata_errors::{MetadataError, MetadataErrorKind};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ENTITY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&[-_a-zA-Z0-9]+;").expect("valid entity regex"));

static ENTITY_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&[-_a-zA-Z0-9]+;$").expect("valid entity regex"));

static BARE_AWS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAWS\b").expect("valid AWS regex"));

static ENTITY_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[-_a-zA-Z0-9]+;").expect("valid entity regex"));

/// True when `value` starts with an entity reference
///
/// Only the start is anchored, so `"&Golong; V2"` is accepted.
pub fn is_entity(value: &str) -> bool {
    ENTITY_START.is_match(value)
}

/// Require `value` to be present and written as an entity reference
///
/// # Examples
/// ```
/// use docgen_common::{check_mapping, MetadataErrorKind};
///
/// assert_eq!(check_mapping(Some("&S3long;"), "long").unwrap(), "&S3long;");
/// let err = check_mapping(Some("Amazon S3"), "long").unwrap_err();
/// assert!(matches!(err.kind, MetadataErrorKind::MappingMustBeEntity { .. }));
/// ```
pub fn check_mapping(value: Option<&str>, field: &str) -> Result<String, MetadataError> {
    match value {
        None | Some("") => Err(MetadataError::missing_field(field)),
        Some(value) if !is_entity(value) => {
            Err(MetadataError::new(MetadataErrorKind::MappingMustBeEntity {
                field: field.to_string(),
                value: value.to_string(),
            }))
        }
        Some(value) => Ok(value.to_string()),
    }
}

/// True when "AWS" appears in `text` outside of an entity reference
pub fn has_bare_aws(text: &str) -> bool {
    let stripped = ENTITY_ANYWHERE.replace_all(text, "");
    BARE_AWS.is_match(&stripped)
}

/// Known entity expansions, keyed by the full `&Name;` reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    map: BTreeMap<String, String>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expansion; the first registration of a name wins
    ///
    /// Values that are not exactly one entity reference are ignored.
    pub fn insert(&mut self, entity: &str, expansion: &str) {
        if ENTITY_EXACT.is_match(entity) {
            self.map
                .entry(entity.to_string())
                .or_insert_with(|| expansion.to_string());
        }
    }

    pub fn get(&self, entity: &str) -> Option<&str> {
        self.map.get(entity).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Replace every known entity in `text`; unknown entities are kept verbatim
    pub fn expand(&self, text: &str) -> String {
        ENTITY_ANYWHERE
            .replace_all(text, |caps: &Captures| {
                let entity = &caps[0];
                self.get(entity).unwrap_or(entity).to_string()
            })
            .into_owned()
    }
}
