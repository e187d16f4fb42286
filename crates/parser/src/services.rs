//! Service definitions from `services.yaml`

use crate::fields::{entity_or_default, get_name_sets, get_string, or_record, scalar_to_string, wrong_type};
use crate::sdks::Expanded;
use docgen_common::{has_bare_aws, MetadataError, MetadataErrorKind, MetadataErrors, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One cloud service the examples call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Service {
    pub name: String,
    pub long: String,
    pub short: String,
    pub sort: String,
    pub expanded: Option<Expanded>,
    pub version: Option<String>,
    pub api_ref: Option<String>,
    pub blurb: Option<String>,
    pub caveat: Option<String>,
    pub bundle: Option<String>,
    pub guide: Option<ServiceGuide>,
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceGuide {
    pub subtitle: Option<String>,
    pub url: String,
}

/// Parse every service in a `services.yaml` document
pub fn parse(file: &str, yaml: &Value) -> Result<(BTreeMap<String, Service>, MetadataErrors)> {
    let mut services: BTreeMap<String, Service> = BTreeMap::new();
    let mut errors = MetadataErrors::new();

    let Value::Mapping(entries) = yaml else {
        errors.append(wrong_type("services", "a mapping").in_file(file))?;
        return Ok((services, errors));
    };

    for (name, body) in entries {
        let Some(name) = scalar_to_string(name) else {
            continue;
        };
        // Keys are case sensitive in YAML but not in service folders
        if services.keys().any(|known| known.eq_ignore_ascii_case(&name)) {
            let duplicate = MetadataError::new(MetadataErrorKind::DuplicateService {
                service: name.clone(),
            })
            .in_file(file)
            .with_id(name.as_str());
            or_record(Err(duplicate), (), &mut errors)?;
            continue;
        }
        let (service, service_errors) = parse_service(&name, body)?;
        errors.extend(service_errors.with_file_and_id(file, &name))?;
        services.insert(name, service);
    }

    debug!("Parsed {} services from {} ({} errors)", services.len(), file, errors.len());
    Ok((services, errors))
}

fn parse_service(name: &str, yaml: &Value) -> Result<(Service, MetadataErrors)> {
    let mut errors = MetadataErrors::new();

    let long = entity_or_default(yaml, "long", &mut errors)?;
    let short = entity_or_default(yaml, "short", &mut errors)?;

    let blurb = get_string(yaml, "blurb");
    if let Some(blurb) = blurb.as_deref().filter(|b| has_bare_aws(b)) {
        errors.append(MetadataError::new(MetadataErrorKind::AwsNotEntity {
            field: "blurb".to_string(),
            value: blurb.to_string(),
        }))?;
    }

    let guide = match yaml.get("guide") {
        Some(guide @ Value::Mapping(_)) => match get_string(guide, "url") {
            Some(url) => Some(ServiceGuide {
                subtitle: get_string(guide, "subtitle"),
                url,
            }),
            None => {
                errors.append(MetadataError::missing_field("guide.url"))?;
                None
            }
        },
        None | Some(Value::Null) => None,
        Some(_) => {
            errors.append(wrong_type("guide", "a mapping"))?;
            None
        }
    };

    let service = Service {
        name: name.to_string(),
        long,
        short,
        sort: get_string(yaml, "sort").unwrap_or_else(|| name.to_string()),
        expanded: yaml.get("expanded").map(|expanded| Expanded {
            long: get_string(expanded, "long").unwrap_or_default(),
            short: get_string(expanded, "short").unwrap_or_default(),
        }),
        version: get_string(yaml, "version"),
        api_ref: get_string(yaml, "api_ref"),
        blurb,
        caveat: get_string(yaml, "caveat"),
        bundle: get_string(yaml, "bundle"),
        guide,
        tags: or_record(get_name_sets(yaml, "tags"), BTreeMap::new(), &mut errors)?,
    };
    Ok((service, errors))
}
