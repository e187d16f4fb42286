//! SDK definitions from `sdks.yaml`
//!
//! ```yaml
//! Go:
//!   property: go
//!   guide: "&guide-go-dev;"
//!   sdk:
//!     2:
//!       long: "&Golong; V2"
//!       short: "&Go; V2"
//!       expanded:
//!         long: "AWS SDK for Go V2"
//!         short: "SDK for Go V2"
//!       api_ref:
//!         uid: "SdkForGoV2"
//!         name: "&guide-go-api;"
//!         link_template: "https://pkg.go.dev/github.com/aws/aws-sdk-go-v2/service/{{.Service}}#Client.{{.Operation}}"
//! ```

use crate::fields::{
    duplicate_key, entity_or_default, get_bool, get_string, or_record, scalar_to_string,
    wrong_type,
};
use docgen_common::{MetadataError, MetadataErrorKind, MetadataErrors, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One language's SDK
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sdk {
    pub name: String,
    pub display: String,
    pub property: String,
    pub guide: String,
    pub is_pseudo_sdk: bool,
    pub versions: Vec<SdkVersion>,
}

/// One major version of an SDK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SdkVersion {
    pub version: u32,
    pub long: String,
    pub short: String,
    pub expanded: Option<Expanded>,
    pub guide: Option<String>,
    pub api_ref: Option<SdkApiRef>,
    pub caveat: Option<String>,
    pub bookmark: Option<String>,
    pub title_override: Option<TitleOverride>,
}

/// Plain-text forms of an entity-valued name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expanded {
    pub long: String,
    pub short: String,
}

/// Link template into an SDK's API reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkApiRef {
    pub uid: String,
    pub name: String,
    pub link_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleOverride {
    pub title: Option<String>,
    pub title_abbrev: Option<String>,
}

impl Sdk {
    pub fn version(&self, version: u32) -> Option<&SdkVersion> {
        self.versions.iter().find(|v| v.version == version)
    }
}

impl SdkApiRef {
    /// Fill the link template for one operation of a service
    ///
    /// # Examples
    /// ```
    /// use docgen_parser::SdkApiRef;
    ///
    /// let api_ref = SdkApiRef {
    ///     uid: "SdkForGoV2".to_string(),
    ///     name: "&guide-go-api;".to_string(),
    ///     link_template: Some("https://docs/{{.Service}}/{{.OperationLower}}".to_string()),
    /// };
    /// assert_eq!(
    ///     api_ref.link("s3", "CreateBucket").as_deref(),
    ///     Some("https://docs/s3/createbucket")
    /// );
    /// ```
    pub fn link(&self, service: &str, operation: &str) -> Option<String> {
        self.link_template.as_ref().map(|template| {
            template
                .replace("{{.Service}}", service)
                .replace("{{.OperationLower}}", &operation.to_lowercase())
                .replace("{{.Operation}}", operation)
        })
    }
}

/// Parse every SDK in an `sdks.yaml` document
///
/// Malformed entries are reported in the returned errors and parsed with
/// empty defaults. Every SDK needs an entity `guide`. With `strict`, a version
/// of a real SDK without a `guide` and an `api_ref` without a `uid` are
/// reported too; otherwise they default to nothing.
pub fn parse(
    file: &str,
    yaml: &Value,
    strict: bool,
) -> Result<(BTreeMap<String, Sdk>, MetadataErrors)> {
    let mut sdks = BTreeMap::new();
    let mut errors = MetadataErrors::new();

    let Value::Mapping(entries) = yaml else {
        errors.append(wrong_type("sdks", "a mapping").in_file(file))?;
        return Ok((sdks, errors));
    };

    for (name, body) in entries {
        let Some(name) = scalar_to_string(name) else {
            continue;
        };
        if sdks.contains_key(&name) {
            or_record(Err(duplicate_key(&name).in_file(file)), (), &mut errors)?;
            continue;
        }
        let (sdk, sdk_errors) = parse_sdk(&name, body, strict)?;
        errors.extend(sdk_errors.with_file_and_id(file, &name))?;
        sdks.insert(name, sdk);
    }

    debug!("Parsed {} SDKs from {} ({} errors)", sdks.len(), file, errors.len());
    Ok((sdks, errors))
}

fn parse_sdk(name: &str, yaml: &Value, strict: bool) -> Result<(Sdk, MetadataErrors)> {
    let mut errors = MetadataErrors::new();

    let is_pseudo_sdk = or_record(get_bool(yaml, "is_pseudo_sdk", false), false, &mut errors)?;
    let display = get_string(yaml, "display").unwrap_or_else(|| name.to_string());
    let property = get_string(yaml, "property").unwrap_or_default();

    let guide = entity_or_default(yaml, "guide", &mut errors)?;

    let mut versions = Vec::new();
    match yaml.get("sdk") {
        Some(Value::Mapping(entries)) => {
            let mut bad_key = false;
            let mut seen = HashSet::new();
            for (version, body) in entries {
                let Some(version) = parse_version_key(version) else {
                    bad_key = true;
                    continue;
                };
                if !seen.insert(version) {
                    or_record(Err(duplicate_key(&version.to_string())), (), &mut errors)?;
                    continue;
                }
                let require_guide = strict && !is_pseudo_sdk;
                let (sdk_version, version_errors) =
                    parse_version(version, body, strict, require_guide)?;
                errors.extend(version_errors.with_sdk_version(version))?;
                versions.push(sdk_version);
            }
            if bad_key {
                errors.append(wrong_type("sdk", "a mapping keyed by version number"))?;
            }
        }
        None | Some(Value::Null) => {}
        Some(_) => errors.append(wrong_type("sdk", "a mapping keyed by version number"))?,
    }

    if versions.is_empty() {
        errors.append(MetadataError::new(MetadataErrorKind::SdkWithNoVersions))?;
    }

    let sdk = Sdk {
        name: name.to_string(),
        display,
        property,
        guide,
        is_pseudo_sdk,
        versions,
    };
    Ok((sdk, errors))
}

fn parse_version_key(key: &Value) -> Option<u32> {
    match key {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_version(
    version: u32,
    yaml: &Value,
    strict: bool,
    require_guide: bool,
) -> Result<(SdkVersion, MetadataErrors)> {
    let mut errors = MetadataErrors::new();

    let long = entity_or_default(yaml, "long", &mut errors)?;
    let short = entity_or_default(yaml, "short", &mut errors)?;

    let expanded = yaml.get("expanded").map(|expanded| Expanded {
        long: get_string(expanded, "long").unwrap_or_default(),
        short: get_string(expanded, "short").unwrap_or_default(),
    });

    let api_ref = match yaml.get("api_ref") {
        Some(api_ref @ Value::Mapping(_)) => {
            let uid = match get_string(api_ref, "uid") {
                Some(uid) => uid,
                None => {
                    if strict {
                        errors.append(MetadataError::missing_field("api_ref.uid"))?;
                    }
                    String::new()
                }
            };
            Some(SdkApiRef {
                uid,
                name: get_string(api_ref, "name").unwrap_or_default(),
                link_template: get_string(api_ref, "link_template"),
            })
        }
        None | Some(Value::Null) => None,
        Some(_) => {
            errors.append(wrong_type("api_ref", "a mapping"))?;
            None
        }
    };

    let guide = get_string(yaml, "guide");
    if guide.is_none() && require_guide {
        errors.append(MetadataError::missing_field("guide"))?;
    }

    let title_override = yaml.get("title_override").map(|o| TitleOverride {
        title: get_string(o, "title"),
        title_abbrev: get_string(o, "title_abbrev"),
    });

    let sdk_version = SdkVersion {
        version,
        long,
        short,
        expanded,
        guide,
        api_ref,
        caveat: get_string(yaml, "caveat"),
        bookmark: get_string(yaml, "bookmark"),
        title_override,
    };
    Ok((sdk_version, errors))
}
