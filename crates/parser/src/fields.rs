//! Field access helpers over decoded YAML values

use docgen_common::{check_mapping, MetadataError, MetadataErrorKind, MetadataErrors};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// String value of `key`, if present and a scalar
///
/// Numbers and booleans are rendered to text, since YAML authors often
/// write versions and ids unquoted.
pub(crate) fn get_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_to_string)
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Boolean value of `key`, reporting a type error when it is not a bool
pub(crate) fn get_bool(
    value: &Value,
    key: &str,
    default: bool,
) -> Result<bool, MetadataError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(wrong_type(key, "a boolean")),
    }
}

/// List of strings under `key`; a single scalar counts as a one-item list
pub(crate) fn get_string_list(value: &Value, key: &str) -> Result<Vec<String>, MetadataError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| scalar_to_string(item).ok_or_else(|| wrong_type(key, "a list of strings")))
            .collect(),
        Some(other) => scalar_to_string(other)
            .map(|s| vec![s])
            .ok_or_else(|| wrong_type(key, "a list of strings")),
    }
}

/// `service: [Action, ...]` style mapping used by `services` and `add_services`
///
/// Each value may be null, a list of names or a mapping whose keys are names.
pub(crate) fn get_name_sets(
    value: &Value,
    key: &str,
) -> Result<BTreeMap<String, BTreeSet<String>>, MetadataError> {
    let mut sets = BTreeMap::new();
    let Some(entries) = value.get(key) else {
        return Ok(sets);
    };
    let Value::Mapping(entries) = entries else {
        return match entries {
            Value::Null => Ok(sets),
            _ => Err(wrong_type(key, "a mapping")),
        };
    };

    for (name, names) in entries {
        let name = scalar_to_string(name).ok_or_else(|| wrong_type(key, "a mapping"))?;
        let names: BTreeSet<String> = match names {
            Value::Null => BTreeSet::new(),
            Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
            Value::Mapping(map) => map.keys().filter_map(scalar_to_string).collect(),
            other => scalar_to_string(other).into_iter().collect(),
        };
        sets.insert(name, names);
    }

    Ok(sets)
}

/// Entity-checked value of `key`; on failure the error is recorded and "" returned
pub(crate) fn entity_or_default(
    value: &Value,
    key: &str,
    errors: &mut MetadataErrors,
) -> docgen_common::Result<String> {
    match check_mapping(get_string(value, key).as_deref(), key) {
        Ok(mapped) => Ok(mapped),
        Err(error) => {
            errors.append(error)?;
            Ok(String::new())
        }
    }
}

/// Unwrap a field result, recording the error and substituting `default`
///
/// An error already recorded is not added again, so list items may share
/// one `errors`.
pub(crate) fn or_record<T>(
    result: Result<T, MetadataError>,
    default: T,
    errors: &mut MetadataErrors,
) -> docgen_common::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(error) => {
            if !errors.iter().any(|e| *e == error) {
                errors.append(error)?;
            }
            Ok(default)
        }
    }
}

pub(crate) fn wrong_type(field: &str, expected: &str) -> MetadataError {
    MetadataError::new(MetadataErrorKind::WrongType {
        field: field.to_string(),
        expected: expected.to_string(),
    })
}

pub(crate) fn duplicate_key(key: &str) -> MetadataError {
    MetadataError::new(MetadataErrorKind::DuplicateKey {
        key: key.to_string(),
    })
}
