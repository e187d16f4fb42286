//! Example categories from `categories.yaml`
//!
//! A category groups examples on a README page and supplies default or
//! forced titles and synopses. Template placeholders `{{.Action}}` and
//! `{{.Service}}` are substituted when a title is evaluated.

use crate::fields::{duplicate_key, get_string, or_record, scalar_to_string, wrong_type};
use docgen_common::{MetadataError, MetadataErrorKind, MetadataErrors, Result};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub const HELLO: &str = "Hello";
pub const ACTIONS: &str = "Actions";
pub const BASICS: &str = "Basics";
pub const SCENARIOS: &str = "Scenarios";

/// Categories with a fixed place on every README
pub const KNOWN_CATEGORIES: [&str; 4] = [HELLO, ACTIONS, BASICS, SCENARIOS];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub key: String,
    pub display: String,
    pub defaults: Option<TitleInfo>,
    pub overrides: Option<TitleInfo>,
    pub description: Option<String>,
    pub synopsis_prefix: Option<SynopsisPrefix>,
    pub more_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitleInfo {
    pub title: Option<String>,
    pub title_abbrev: Option<String>,
    pub synopsis: Option<String>,
    pub title_suffixes: Option<String>,
}

/// Singular and plural lead-in for a list of synopses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynopsisPrefix {
    pub one: String,
    pub many: String,
}

/// Which [`TitleInfo`] field a value is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleField {
    Title,
    TitleAbbrev,
    Synopsis,
}

/// Values substituted into category templates
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub service: &'a str,
    pub action: &'a str,
}

impl TitleInfo {
    fn from_yaml(yaml: &Value) -> Self {
        Self {
            title: get_string(yaml, "title"),
            title_abbrev: get_string(yaml, "title_abbrev"),
            synopsis: get_string(yaml, "synopsis"),
            title_suffixes: get_string(yaml, "title_suffixes"),
        }
    }

    pub fn get(&self, field: TitleField) -> Option<&str> {
        match field {
            TitleField::Title => self.title.as_deref(),
            TitleField::TitleAbbrev => self.title_abbrev.as_deref(),
            TitleField::Synopsis => self.synopsis.as_deref(),
        }
    }
}

impl TemplateVars<'_> {
    pub fn substitute(&self, template: &str) -> String {
        template
            .replace("{{.Action}}", self.action)
            .replace("{{.Service}}", self.service)
    }
}

impl Category {
    /// Resolve a title or synopsis for one example
    ///
    /// An override always wins, then the example's own value, then the
    /// category default. With none of them the result is
    /// `"{service} {action}"`.
    pub fn evaluate(&self, value: Option<&str>, field: TitleField, vars: TemplateVars<'_>) -> String {
        if let Some(forced) = self.overrides.as_ref().and_then(|o| o.get(field)) {
            return vars.substitute(forced);
        }
        if let Some(value) = value {
            return value.to_string();
        }
        if let Some(default) = self.defaults.as_ref().and_then(|d| d.get(field)) {
            return vars.substitute(default);
        }
        format!("{} {}", vars.service, vars.action)
    }

    pub fn is_known(&self) -> bool {
        KNOWN_CATEGORIES.contains(&self.key.as_str())
    }
}

/// Parse every category in a `categories.yaml` document
pub fn parse(file: &str, yaml: &Value) -> Result<(BTreeMap<String, Category>, MetadataErrors)> {
    let mut categories = BTreeMap::new();
    let mut errors = MetadataErrors::new();

    let entries = match yaml {
        Value::Mapping(entries) => entries,
        Value::Null => return Ok((categories, errors)),
        _ => {
            errors.append(wrong_type("categories", "a mapping").in_file(file))?;
            return Ok((categories, errors));
        }
    };

    for (key, body) in entries {
        let Some(key) = scalar_to_string(key) else {
            continue;
        };
        if categories.contains_key(&key) {
            or_record(Err(duplicate_key(&key).in_file(file)), (), &mut errors)?;
            continue;
        }
        let error = |kind| MetadataError::new(kind).in_file(file).with_id(key.as_str());

        if !body.is_mapping() {
            errors.append(error(MetadataErrorKind::MissingCategoryBody))?;
            continue;
        }

        let display = get_string(body, "display").unwrap_or_default();
        if display.trim().is_empty() {
            errors.append(error(MetadataErrorKind::CategoryWithNoDisplay))?;
        }

        let synopsis_prefix = body.get("synopsis_prefix").and_then(|prefix| {
            Some(SynopsisPrefix {
                one: get_string(prefix, "one")?,
                many: get_string(prefix, "many")?,
            })
        });

        let category = Category {
            key: key.clone(),
            display,
            defaults: body.get("defaults").map(TitleInfo::from_yaml),
            overrides: body.get("overrides").map(TitleInfo::from_yaml),
            description: get_string(body, "description"),
            synopsis_prefix,
            more_info: get_string(body, "more_info"),
        };
        categories.insert(key, category);
    }

    debug!("Parsed {} categories from {} ({} errors)", categories.len(), file, errors.len());
    Ok((categories, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: TemplateVars<'static> = TemplateVars {
        service: "s3",
        action: "CreateBucket",
    };

    fn category(defaults: Option<TitleInfo>, overrides: Option<TitleInfo>) -> Category {
        Category {
            key: ACTIONS.to_string(),
            display: "Actions".to_string(),
            defaults,
            overrides,
            description: None,
            synopsis_prefix: None,
            more_info: None,
        }
    }

    fn title(text: &str) -> Option<TitleInfo> {
        Some(TitleInfo {
            title: Some(text.to_string()),
            ..TitleInfo::default()
        })
    }

    #[test]
    fn test_override_dominates() {
        let actions = category(title("Default"), title("X"));
        assert_eq!(actions.evaluate(Some("Mine"), TitleField::Title, VARS), "X");
        assert_eq!(actions.evaluate(None, TitleField::Title, VARS), "X");
    }

    #[test]
    fn test_override_substitutes_placeholders() {
        let actions = category(None, title("Use <code>{{.Action}}</code> with {{.Service}}"));
        assert_eq!(
            actions.evaluate(None, TitleField::Title, VARS),
            "Use <code>CreateBucket</code> with s3"
        );
    }

    #[test]
    fn test_value_then_default_then_fallback() {
        let actions = category(title("Default {{.Action}}"), None);
        assert_eq!(actions.evaluate(Some("Mine {{.Action}}"), TitleField::Title, VARS), "Mine {{.Action}}");
        assert_eq!(actions.evaluate(None, TitleField::Title, VARS), "Default CreateBucket");
        assert_eq!(actions.evaluate(None, TitleField::Synopsis, VARS), "s3 CreateBucket");

        let bare = category(None, None);
        assert_eq!(bare.evaluate(None, TitleField::TitleAbbrev, VARS), "s3 CreateBucket");
    }

    #[test]
    fn test_parse_categories() {
        let doc: Value = serde_yaml::from_str(
            r#"
Actions:
  display: Actions
  overrides:
    title: "Use <code>{{.Action}}</code> with an &AWS; SDK"
    title_abbrev: "<code>{{.Action}}</code>"
  synopsis_prefix:
    one: Action example
    many: Action examples
Broken:
Hidden:
  description: no display here
"#,
        )
        .unwrap();
        let (categories, errors) = parse("categories.yaml", &doc).unwrap();

        assert!(categories[ACTIONS].is_known());
        assert_eq!(categories[ACTIONS].synopsis_prefix.as_ref().unwrap().many, "Action examples");
        assert!(!categories.contains_key("Broken"));
        assert_eq!(categories["Hidden"].display, "");

        let kinds: Vec<_> = errors.iter().map(|e| (e.context.id.clone(), e.kind.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (Some("Broken".to_string()), MetadataErrorKind::MissingCategoryBody),
                (Some("Hidden".to_string()), MetadataErrorKind::CategoryWithNoDisplay),
            ]
        );
    }

    #[test]
    fn test_keys_colliding_as_text_are_reported() {
        let doc = serde_yaml::from_str("1: {}\n'1': {}\n").unwrap();
        let (_, errors) = parse("categories.yaml", &doc).unwrap();

        let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                MetadataErrorKind::CategoryWithNoDisplay,
                MetadataErrorKind::DuplicateKey {
                    key: "1".to_string()
                },
            ]
        );
    }
}
