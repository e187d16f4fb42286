//! Schema validator primitives
//!
//! Each [`Validator`] checks the shape of a single decoded YAML value and
//! any [`Constraint`]s attached to it. Composite validators (`map`, `list`,
//! `any`, `subset`) only check their own shape; walking into children is
//! the job of [`Schema`].

mod expr;
mod schema;

pub use schema::{Schema, SchemaError};

use docgen_common::{has_bare_aws, DocGenError, Result};
use regex::Regex;
use serde_yaml::Value;
use std::net::IpAddr;

/// A type-checked validator with optional constraints
#[derive(Debug, Clone)]
pub struct Validator {
    pub kind: ValidatorKind,
    pub required: bool,
    pub constraints: Vec<Constraint>,
}

/// The schema keyword a validator was built from
#[derive(Debug, Clone)]
pub enum ValidatorKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Enum(Vec<Value>),
    Regex {
        patterns: Vec<Regex>,
        name: Option<String>,
    },
    Ip {
        version: Option<u8>,
    },
    Map {
        values: Vec<Validator>,
        keys: Vec<Validator>,
    },
    List(Vec<Validator>),
    Any(Vec<Validator>),
    Subset(Vec<Validator>),
    Include(String),
}

/// Extra checks on an already type-checked value
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Min(f64),
    Max(f64),
    LengthMin(usize),
    LengthMax(usize),
    Exclude(String),
    Multiline(bool),
    UpperStart,
    LowerStart,
    EndPunc,
    NoEndPunc,
    EndPuncOrColon,
    CheckAws,
}

impl Validator {
    fn of(kind: ValidatorKind) -> Self {
        Self {
            kind,
            required: true,
            constraints: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(ValidatorKind::String)
    }

    pub fn number() -> Self {
        Self::of(ValidatorKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(ValidatorKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(ValidatorKind::Boolean)
    }

    pub fn null() -> Self {
        Self::of(ValidatorKind::Null)
    }

    pub fn enumeration(values: Vec<Value>) -> Result<Self> {
        if values.is_empty() {
            return Err(DocGenError::Schema(
                "enum requires at least one value".to_string(),
            ));
        }
        Ok(Self::of(ValidatorKind::Enum(values)))
    }

    /// Regex validator; patterns are matched from the start of the value
    pub fn regex(patterns: &[&str], name: Option<&str>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(DocGenError::Schema(
                "regex requires at least one pattern".to_string(),
            ));
        }
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{p})"))
                    .map_err(|e| DocGenError::Schema(format!("invalid regex {p:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::of(ValidatorKind::Regex {
            patterns,
            name: name.map(String::from),
        }))
    }

    pub fn ip(version: Option<u8>) -> Result<Self> {
        match version {
            None | Some(4) | Some(6) => Ok(Self::of(ValidatorKind::Ip { version })),
            Some(other) => Err(DocGenError::Schema(format!(
                "ip version must be 4 or 6, got {other}"
            ))),
        }
    }

    pub fn map(values: Vec<Validator>, keys: Vec<Validator>) -> Self {
        Self::of(ValidatorKind::Map { values, keys })
    }

    pub fn list(children: Vec<Validator>) -> Self {
        Self::of(ValidatorKind::List(children))
    }

    pub fn any(children: Vec<Validator>) -> Self {
        Self::of(ValidatorKind::Any(children))
    }

    pub fn subset(children: Vec<Validator>) -> Result<Self> {
        if children.is_empty() {
            return Err(DocGenError::Schema(
                "subset requires at least one validator".to_string(),
            ));
        }
        Ok(Self::of(ValidatorKind::Subset(children)))
    }

    pub fn include(name: &str) -> Self {
        Self::of(ValidatorKind::Include(name.to_string()))
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Schema keyword of this validator
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            ValidatorKind::String => "str",
            ValidatorKind::Number => "num",
            ValidatorKind::Integer => "int",
            ValidatorKind::Boolean => "bool",
            ValidatorKind::Null => "null",
            ValidatorKind::Enum(_) => "enum",
            ValidatorKind::Regex { .. } => "regex",
            ValidatorKind::Ip { .. } => "ip",
            ValidatorKind::Map { .. } => "map",
            ValidatorKind::List(_) => "list",
            ValidatorKind::Any(_) => "any",
            ValidatorKind::Subset(_) => "subset",
            ValidatorKind::Include(_) => "include",
        }
    }

    /// Type check of the value itself, without constraints or children
    pub fn is_valid(&self, value: &Value) -> bool {
        match &self.kind {
            ValidatorKind::String => value.is_string(),
            ValidatorKind::Number => value.is_number(),
            ValidatorKind::Integer => value.is_i64() || value.is_u64(),
            ValidatorKind::Boolean => value.is_bool(),
            ValidatorKind::Null => value.is_null(),
            ValidatorKind::Enum(values) => values.contains(value),
            ValidatorKind::Regex { patterns, .. } => value
                .as_str()
                .is_some_and(|s| patterns.iter().any(|p| p.is_match(s))),
            ValidatorKind::Ip { version } => value
                .as_str()
                .and_then(|s| s.parse::<IpAddr>().ok())
                .is_some_and(|ip| match version {
                    Some(4) => ip.is_ipv4(),
                    Some(6) => ip.is_ipv6(),
                    _ => true,
                }),
            ValidatorKind::Map { .. } => value.is_mapping(),
            ValidatorKind::List(_) => value.is_sequence(),
            ValidatorKind::Any(_) | ValidatorKind::Subset(_) | ValidatorKind::Include(_) => true,
        }
    }

    /// Message for a value that failed [`Validator::is_valid`]
    pub fn fail(&self, value: &Value) -> String {
        let shown = display_value(value);
        match &self.kind {
            ValidatorKind::Enum(values) => {
                let allowed: Vec<String> = values.iter().map(display_value).collect();
                format!("'{shown}' not in ({})", allowed.join(", "))
            }
            ValidatorKind::Regex {
                name: Some(name), ..
            } => format!("'{shown}' is not a {name}."),
            ValidatorKind::Regex { .. } => format!("'{shown}' is not a regex match."),
            _ => format!("'{shown}' is not a {}.", self.tag()),
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Type check followed by constraint checks on this value only
    pub fn validate(&self, value: &Value) -> Vec<String> {
        if !self.is_valid(value) {
            return vec![self.fail(value)];
        }
        self.constraints
            .iter()
            .filter_map(|c| c.check(value))
            .collect()
    }
}

impl Constraint {
    /// Error message when `value` breaks the constraint
    pub fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::Min(min) => {
                let n = value.as_f64()?;
                (n < *min).then(|| format!("{n} is less than {min}"))
            }
            Self::Max(max) => {
                let n = value.as_f64()?;
                (n > *max).then(|| format!("{n} is greater than {max}"))
            }
            Self::LengthMin(min) => {
                let len = length(value)?;
                (len < *min).then(|| format!("Length of {} is less than {min}", display_value(value)))
            }
            Self::LengthMax(max) => {
                let len = length(value)?;
                (len > *max)
                    .then(|| format!("Length of {} is greater than {max}", display_value(value)))
            }
            Self::Exclude(chars) => {
                let s = value.as_str()?;
                s.chars()
                    .find(|c| chars.contains(*c))
                    .map(|c| format!("'{s}' contains excluded character '{c}'"))
            }
            Self::Multiline(allowed) => {
                let s = value.as_str()?;
                (!allowed && s.contains('\n')).then(|| format!("'{s}' contains a newline"))
            }
            Self::UpperStart => {
                let s = value.as_str()?;
                (!s.chars().next().is_some_and(char::is_uppercase))
                    .then(|| format!("'{s}' must start with an uppercase letter"))
            }
            Self::LowerStart => {
                let s = value.as_str()?;
                (!s.chars().next().is_some_and(char::is_lowercase))
                    .then(|| format!("'{s}' must start with a lowercase letter"))
            }
            Self::EndPunc => {
                let s = value.as_str()?;
                (!ends_with_any(s, &['.', '!', '?']))
                    .then(|| format!("'{s}' must end with punctuation"))
            }
            Self::NoEndPunc => {
                let s = value.as_str()?;
                ends_with_any(s, &['.', '!', '?'])
                    .then(|| format!("'{s}' must not end with punctuation"))
            }
            Self::EndPuncOrColon => {
                let s = value.as_str()?;
                (!ends_with_any(s, &['.', '!', '?', ':']))
                    .then(|| format!("'{s}' must end with punctuation or a colon"))
            }
            Self::CheckAws => {
                let s = value.as_str()?;
                has_bare_aws(s).then(|| format!("'{s}' must use an entity for AWS"))
            }
        }
    }
}

fn ends_with_any(s: &str, chars: &[char]) -> bool {
    s.trim_end().ends_with(chars)
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Sequence(items) => Some(items.len()),
        Value::Mapping(map) => Some(map.len()),
        _ => None,
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_leaf_types() {
        assert!(Validator::string().is_valid(&v("hello")));
        assert!(!Validator::string().is_valid(&v("3")));
        assert!(Validator::number().is_valid(&v("3.5")));
        assert!(Validator::integer().is_valid(&v("3")));
        assert!(!Validator::integer().is_valid(&v("3.5")));
        assert!(Validator::boolean().is_valid(&v("true")));
        assert!(Validator::null().is_valid(&v("~")));
    }

    #[test]
    fn test_empty_composites_are_configuration_errors() {
        assert!(matches!(
            Validator::enumeration(vec![]),
            Err(DocGenError::Schema(_))
        ));
        assert!(matches!(
            Validator::regex(&[], None),
            Err(DocGenError::Schema(_))
        ));
        assert!(matches!(Validator::subset(vec![]), Err(DocGenError::Schema(_))));
    }

    #[test]
    fn test_regex_matches_from_start() {
        let validator = Validator::regex(&[r"[a-z0-9]+_\w+"], Some("example id")).unwrap();
        assert!(validator.is_valid(&v("s3_CreateBucket")));
        assert!(!validator.is_valid(&v("S3 bucket")));
        assert_eq!(validator.fail(&v("S3 bucket")), "'S3 bucket' is not a example id.");
    }

    #[test]
    fn test_enum_fail_message() {
        let validator = Validator::enumeration(vec![v("Api"), v("Hello")]).unwrap();
        assert!(validator.is_valid(&v("Hello")));
        assert_eq!(validator.fail(&v("Nope")), "'Nope' not in (Api, Hello)");
    }

    #[test]
    fn test_ip_versions() {
        let any = Validator::ip(None).unwrap();
        let v4 = Validator::ip(Some(4)).unwrap();
        assert!(any.is_valid(&v("'::1'")));
        assert!(v4.is_valid(&v("10.0.0.1")));
        assert!(!v4.is_valid(&v("'::1'")));
        assert!(Validator::ip(Some(5)).is_err());
    }

    #[test]
    fn test_string_extension_constraints() {
        let title = Validator::string()
            .with_constraint(Constraint::UpperStart)
            .with_constraint(Constraint::NoEndPunc)
            .with_constraint(Constraint::CheckAws);

        assert!(title.validate(&v("Create a bucket")).is_empty());
        assert_eq!(title.validate(&v("create a bucket.")).len(), 2);
        assert_eq!(
            title.validate(&v("Use AWS")),
            vec!["'Use AWS' must use an entity for AWS".to_string()]
        );
    }

    #[test]
    fn test_length_and_range() {
        let name = Validator::string().with_constraint(Constraint::LengthMax(3));
        assert_eq!(name.validate(&v("abcd")).len(), 1);

        let port = Validator::integer()
            .with_constraint(Constraint::Min(1.0))
            .with_constraint(Constraint::Max(65535.0));
        assert!(port.validate(&v("443")).is_empty());
        assert_eq!(port.validate(&v("0")), vec!["0 is less than 1".to_string()]);
    }

    #[test]
    fn test_type_failure_skips_constraints() {
        let validator = Validator::string().with_constraint(Constraint::UpperStart);
        assert_eq!(validator.validate(&v("12")), vec!["'12' is not a str.".to_string()]);
    }
}
