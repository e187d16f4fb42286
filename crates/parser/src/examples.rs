//! Example definitions from `*_metadata.yaml` files
//!
//! Each top-level key is an example id. Examples are checked against the
//! already parsed SDKs, services and categories while they are read.

use crate::categories::{Category, ACTIONS};
use crate::fields::{
    duplicate_key, get_name_sets, get_string, get_string_list, or_record, scalar_to_string,
    wrong_type,
};
use crate::sdks::Sdk;
use crate::services::Service;
use docgen_common::{has_bare_aws, MetadataError, MetadataErrorKind, MetadataErrors, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// One documented example
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Example {
    pub id: String,
    pub file: String,
    pub title: Option<String>,
    pub title_abbrev: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_list: Vec<String>,
    pub category: String,
    pub guide_topic: Option<GuideTopic>,
    pub languages: BTreeMap<String, Language>,
    /// Service name → actions the example demonstrates
    pub services: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideTopic {
    pub title: String,
    pub url: Option<String>,
}

/// An example's implementations in one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: String,
    pub property: String,
    pub versions: Vec<Version>,
}

/// An implementation for one SDK version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Version {
    pub sdk_version: u32,
    pub block_content: Option<String>,
    pub excerpts: Vec<Excerpt>,
    pub github: Option<String>,
    pub add_services: BTreeMap<String, BTreeSet<String>>,
    pub sdkguide: Option<String>,
    pub more_info: Vec<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Excerpt {
    pub description: Option<String>,
    pub snippet_tags: Vec<String>,
    pub snippet_files: Vec<String>,
}

/// Records examples are checked against
#[derive(Debug, Clone, Copy)]
pub struct References<'a> {
    pub sdks: &'a BTreeMap<String, Sdk>,
    pub services: &'a BTreeMap<String, Service>,
    pub categories: &'a BTreeMap<String, Category>,
}

impl Example {
    /// True for examples that span several services
    pub fn is_cross_service(&self) -> bool {
        self.id.starts_with("cross_")
    }

    pub fn version(&self, language: &str, sdk_version: u32) -> Option<&Version> {
        self.languages
            .get(language)?
            .versions
            .iter()
            .find(|v| v.sdk_version == sdk_version)
    }

    /// First action listed for `service`, or "" when there is none
    pub fn action(&self, service: &str) -> &str {
        self.services
            .get(service)
            .and_then(|actions| actions.iter().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Version {
    /// Every snippet tag across all excerpts
    pub fn snippet_tags(&self) -> impl Iterator<Item = &str> {
        self.excerpts
            .iter()
            .flat_map(|e| e.snippet_tags.iter().map(String::as_str))
    }
}

/// Parse every example in one metadata document
pub fn parse(file: &str, yaml: &Value, refs: References<'_>) -> Result<(Vec<Example>, MetadataErrors)> {
    let mut examples = Vec::new();
    let mut errors = MetadataErrors::new();

    let entries = match yaml {
        Value::Mapping(entries) => entries,
        Value::Null => return Ok((examples, errors)),
        _ => {
            errors.append(wrong_type("examples", "a mapping").in_file(file))?;
            return Ok((examples, errors));
        }
    };

    let mut seen = HashSet::new();
    for (id, body) in entries {
        let Some(id) = scalar_to_string(id) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            or_record(Err(duplicate_key(&id).in_file(file)), (), &mut errors)?;
            continue;
        }
        let (example, example_errors) = parse_example(&id, file, body, refs)?;
        errors.extend(example_errors.with_file_and_id(file, &id))?;
        examples.push(example);
    }

    debug!("Parsed {} examples from {} ({} errors)", examples.len(), file, errors.len());
    Ok((examples, errors))
}

fn parse_example(
    id: &str,
    file: &str,
    yaml: &Value,
    refs: References<'_>,
) -> Result<(Example, MetadataErrors)> {
    let mut errors = MetadataErrors::new();

    let title = get_string(yaml, "title");
    let title_abbrev = get_string(yaml, "title_abbrev");
    let synopsis = get_string(yaml, "synopsis");
    let synopsis_list = or_record(get_string_list(yaml, "synopsis_list"), Vec::new(), &mut errors)?;

    for (field, value) in [("title", &title), ("title_abbrev", &title_abbrev), ("synopsis", &synopsis)] {
        if let Some(value) = value.as_deref().filter(|v| has_bare_aws(v)) {
            errors.append(MetadataError::new(MetadataErrorKind::AwsNotEntity {
                field: field.to_string(),
                value: value.to_string(),
            }))?;
        }
    }

    let category = match get_string(yaml, "category").as_deref() {
        None | Some("Api") => ACTIONS.to_string(),
        Some(category) => category.to_string(),
    };
    if !refs.categories.is_empty() && !refs.categories.contains_key(&category) {
        errors.append(MetadataError::new(MetadataErrorKind::UnknownCategory {
            category: category.clone(),
        }))?;
    }
    if category == ACTIONS
        && (title.is_some() || title_abbrev.is_some() || !synopsis_list.is_empty())
    {
        errors.append(MetadataError::new(MetadataErrorKind::ApiCannotHaveTitleFields))?;
    }

    let services = or_record(get_name_sets(yaml, "services"), BTreeMap::new(), &mut errors)?;
    for service in services.keys() {
        if !refs.services.contains_key(service) {
            errors.append(MetadataError::new(MetadataErrorKind::ServiceNotFound {
                service: service.clone(),
            }))?;
        }
    }

    let mut languages = BTreeMap::new();
    match yaml.get("languages") {
        Some(Value::Mapping(entries)) => {
            let mut seen = HashSet::new();
            for (name, body) in entries {
                let Some(name) = scalar_to_string(name) else {
                    continue;
                };
                if !seen.insert(name.clone()) {
                    or_record(Err(duplicate_key(&name)), (), &mut errors)?;
                    continue;
                }
                let (language, language_errors) = parse_language(&name, body, &services, refs)?;
                errors.extend(language_errors.with_language(&name))?;
                if let Some(language) = language {
                    languages.insert(name, language);
                }
            }
        }
        None | Some(Value::Null) => errors.append(MetadataError::missing_field("languages"))?,
        Some(_) => errors.append(wrong_type("languages", "a mapping"))?,
    }

    let guide_topic = yaml.get("guide_topic").and_then(|topic| {
        Some(GuideTopic {
            title: get_string(topic, "title")?,
            url: get_string(topic, "url"),
        })
    });

    let example = Example {
        id: id.to_string(),
        file: file.to_string(),
        title,
        title_abbrev,
        synopsis,
        synopsis_list,
        category,
        guide_topic,
        languages,
        services,
    };
    Ok((example, errors))
}

fn parse_language(
    name: &str,
    yaml: &Value,
    services: &BTreeMap<String, BTreeSet<String>>,
    refs: References<'_>,
) -> Result<(Option<Language>, MetadataErrors)> {
    let mut errors = MetadataErrors::new();

    let Some(sdk) = refs.sdks.get(name) else {
        errors.append(MetadataError::new(MetadataErrorKind::UnknownLanguage {
            language: name.to_string(),
        }))?;
        return Ok((None, errors));
    };

    let mut versions = Vec::new();
    match yaml.get("versions") {
        Some(Value::Sequence(items)) if !items.is_empty() => {
            for item in items {
                let (version, version_errors) = parse_version(item, sdk, services, refs)?;
                // Repeated versions repeat their errors; keep one of each
                match version {
                    Some(version) => {
                        errors.merge(version_errors.with_sdk_version(version.sdk_version));
                        versions.push(version);
                    }
                    None => errors.merge(version_errors),
                }
            }
        }
        Some(Value::Sequence(_)) | None | Some(Value::Null) => {
            errors.append(MetadataError::missing_field("versions"))?
        }
        Some(_) => errors.append(wrong_type("versions", "a list"))?,
    }

    let language = Language {
        name: name.to_string(),
        property: sdk.property.clone(),
        versions,
    };
    Ok((Some(language), errors))
}

fn parse_version(
    yaml: &Value,
    sdk: &Sdk,
    services: &BTreeMap<String, BTreeSet<String>>,
    refs: References<'_>,
) -> Result<(Option<Version>, MetadataErrors)> {
    let mut errors = MetadataErrors::new();

    let sdk_version = match yaml.get("sdk_version") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    let Some(sdk_version) = sdk_version else {
        errors.append(MetadataError::missing_field("sdk_version"))?;
        return Ok((None, errors));
    };
    if sdk.version(sdk_version).is_none() {
        errors.append(MetadataError::new(MetadataErrorKind::InvalidSdkVersion {
            version: sdk_version,
        }))?;
    }

    let block_content = get_string(yaml, "block_content");
    let excerpts = match yaml.get("excerpts") {
        Some(Value::Sequence(items)) => {
            let mut excerpts = Vec::new();
            for item in items {
                excerpts.push(Excerpt {
                    description: get_string(item, "description"),
                    snippet_tags: or_record(get_string_list(item, "snippet_tags"), Vec::new(), &mut errors)?,
                    snippet_files: or_record(get_string_list(item, "snippet_files"), Vec::new(), &mut errors)?,
                });
            }
            excerpts
        }
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            errors.append(wrong_type("excerpts", "a list"))?;
            Vec::new()
        }
    };

    match (block_content.is_some(), excerpts.is_empty()) {
        (false, true) => errors.append(MetadataError::new(
            MetadataErrorKind::MissingBlockContentAndExcerpt,
        ))?,
        (true, false) => errors.append(MetadataError::new(
            MetadataErrorKind::BlockContentAndExcerptConflict,
        ))?,
        _ => {}
    }

    let github = get_string(yaml, "github");
    if let Some(link) = github.as_deref().filter(|l| !is_relative_folder(l)) {
        errors.append(MetadataError::new(MetadataErrorKind::InvalidGithubLink {
            link: link.to_string(),
        }))?;
    }

    let add_services = or_record(get_name_sets(yaml, "add_services"), BTreeMap::new(), &mut errors)?;
    for service in add_services.keys() {
        if services.contains_key(service) {
            errors.append(MetadataError::new(MetadataErrorKind::DuplicateService {
                service: service.clone(),
            }))?;
        } else if !refs.services.contains_key(service) {
            errors.append(MetadataError::new(MetadataErrorKind::ServiceNotFound {
                service: service.clone(),
            }))?;
        }
    }

    let version = Version {
        sdk_version,
        block_content,
        excerpts,
        github,
        add_services,
        sdkguide: get_string(yaml, "sdkguide"),
        more_info: or_record(get_string_list(yaml, "more_info"), Vec::new(), &mut errors)?,
        owner: get_string(yaml, "owner"),
    };
    Ok((Some(version), errors))
}

fn is_relative_folder(link: &str) -> bool {
    !(link.is_empty() || link.starts_with('/') || link.contains("://"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{categories, sdks, services};

    struct Fixture {
        sdks: BTreeMap<String, Sdk>,
        services: BTreeMap<String, Service>,
        categories: BTreeMap<String, Category>,
    }

    impl Fixture {
        fn new() -> Self {
            let sdks_yaml = serde_yaml::from_str(
                "Go:\n  property: go\n  guide: '&guide-go-dev;'\n  sdk:\n    2:\n      long: '&Golong; V2'\n      short: '&Go; V2'\n      guide: go/v2\n",
            )
            .unwrap();
            let services_yaml = serde_yaml::from_str(
                "s3:\n  long: '&S3long;'\n  short: '&S3;'\nsqs:\n  long: '&SQSlong;'\n  short: '&SQS;'\n",
            )
            .unwrap();
            let categories_yaml = serde_yaml::from_str(
                "Hello:\n  display: Get started\nActions:\n  display: Actions\nScenarios:\n  display: Scenarios\n",
            )
            .unwrap();
            Self {
                sdks: sdks::parse("sdks.yaml", &sdks_yaml, true).unwrap().0,
                services: services::parse("services.yaml", &services_yaml).unwrap().0,
                categories: categories::parse("categories.yaml", &categories_yaml).unwrap().0,
            }
        }

        fn refs(&self) -> References<'_> {
            References {
                sdks: &self.sdks,
                services: &self.services,
                categories: &self.categories,
            }
        }
    }

    fn parse_text(text: &str) -> (Vec<Example>, MetadataErrors) {
        let fixture = Fixture::new();
        let yaml: Value = serde_yaml::from_str(text).unwrap();
        parse("s3_metadata.yaml", &yaml, fixture.refs()).unwrap()
    }

    fn kinds(errors: &MetadataErrors) -> Vec<MetadataErrorKind> {
        errors.iter().map(|e| e.kind.clone()).collect()
    }

    #[test]
    fn test_parse_action_example() {
        let (examples, errors) = parse_text(
            r#"
s3_CreateBucket:
  languages:
    Go:
      versions:
        - sdk_version: 2
          github: gov2/s3
          excerpts:
            - description: Create a bucket.
              snippet_tags:
                - gov2.s3.CreateBucket
  services:
    s3: {CreateBucket}
"#,
        );
        assert!(errors.is_empty(), "{errors}");

        let example = &examples[0];
        assert_eq!(example.category, ACTIONS);
        assert_eq!(example.file, "s3_metadata.yaml");
        assert_eq!(example.action("s3"), "CreateBucket");
        assert_eq!(example.languages["Go"].property, "go");
        let version = example.version("Go", 2).unwrap();
        assert_eq!(version.snippet_tags().collect::<Vec<_>>(), vec!["gov2.s3.CreateBucket"]);
        assert!(!example.is_cross_service());
    }

    #[test]
    fn test_reference_errors_carry_context() {
        let (_, errors) = parse_text(
            r#"
s3_Broken:
  category: Scenarios
  languages:
    Go:
      versions:
        - sdk_version: 3
          github: https://github.com/somewhere
          block_content: broken.xml
          excerpts:
            - snippet_tags: [a]
    Cobol:
      versions:
        - sdk_version: 1
  services:
    s4:
"#,
        );

        assert_eq!(
            kinds(&errors),
            vec![
                MetadataErrorKind::ServiceNotFound {
                    service: "s4".to_string()
                },
                MetadataErrorKind::InvalidSdkVersion { version: 3 },
                MetadataErrorKind::BlockContentAndExcerptConflict,
                MetadataErrorKind::InvalidGithubLink {
                    link: "https://github.com/somewhere".to_string()
                },
                MetadataErrorKind::UnknownLanguage {
                    language: "Cobol".to_string()
                },
            ]
        );

        let version_error = errors.iter().nth(1).unwrap();
        assert_eq!(
            version_error.to_string(),
            "In s3_metadata.yaml, example s3_Broken: Go: 3: SDK version 3 is not defined for this language"
        );
    }

    #[test]
    fn test_actions_cannot_have_titles() {
        let (_, errors) = parse_text(
            r#"
s3_PutObject:
  title: Put an object
  languages:
    Go:
      versions:
        - sdk_version: 2
          block_content: put.xml
  services:
    s3: {PutObject}
"#,
        );
        assert_eq!(kinds(&errors), vec![MetadataErrorKind::ApiCannotHaveTitleFields]);
    }

    #[test]
    fn test_unknown_category_and_bare_aws() {
        let (examples, errors) = parse_text(
            r#"
cross_Thing:
  title: Build an AWS app
  category: Showcase
  languages:
    Go:
      versions:
        - sdk_version: 2
          block_content: thing.xml
          add_services:
            sqs:
            s3:
  services:
    s3:
"#,
        );
        assert!(examples[0].is_cross_service());
        assert_eq!(
            kinds(&errors),
            vec![
                MetadataErrorKind::AwsNotEntity {
                    field: "title".to_string(),
                    value: "Build an AWS app".to_string()
                },
                MetadataErrorKind::UnknownCategory {
                    category: "Showcase".to_string()
                },
                MetadataErrorKind::DuplicateService {
                    service: "s3".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_missing_block_content_and_excerpts() {
        let (_, errors) = parse_text(
            "s3_Hello:\n  category: Hello\n  languages:\n    Go:\n      versions:\n        - sdk_version: 2\n  services:\n    s3: {ListBuckets}\n",
        );
        assert_eq!(kinds(&errors), vec![MetadataErrorKind::MissingBlockContentAndExcerpt]);
    }

    #[test]
    fn test_ids_colliding_as_text_are_reported() {
        let (examples, errors) = parse_text(
            "1:\n  title: One\n  category: Hello\n  languages: {}\n  services: {s3: }\n'1':\n  title: One\n  category: Hello\n  languages: {}\n  services: {s3: }\n",
        );

        assert_eq!(examples.len(), 1);
        assert!(kinds(&errors).contains(&MetadataErrorKind::DuplicateKey {
            key: "1".to_string()
        }));
    }

    #[test]
    fn test_languages_colliding_as_text_are_reported() {
        let (examples, errors) = parse_text(
            "s3_Hello:\n  category: Hello\n  title: Hello Amazon S3\n  languages:\n    1: {versions: []}\n    '1': {versions: []}\n  services: {s3: }\n",
        );

        assert_eq!(examples.len(), 1);
        let kinds = kinds(&errors);
        assert!(kinds.contains(&MetadataErrorKind::UnknownLanguage {
            language: "1".to_string()
        }));
        assert!(kinds.contains(&MetadataErrorKind::DuplicateKey {
            key: "1".to_string()
        }));
    }
}
