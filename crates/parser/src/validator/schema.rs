//! Schema documents: nested maps of validator expressions plus named includes
//!
//! A schema file holds one or more YAML documents. The first is the root
//! schema; every further document defines named schemas that `include('name')`
//! can refer to.
//!
//! ```yaml
//! map(include('example'), key=regex('^[a-z0-9]+_\w+$', name='example id'))
//! ---
//! example:
//!   title: str(required=False, upper_start=True, no_end_punc=True)
//!   category: str(required=False)
//! ```

use super::expr::parse_validator;
use super::{display_value, Validator, ValidatorKind};
use crate::fields::scalar_to_string;
use docgen_common::{DocGenError, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Includes resolved inside one another before a walk gives up
const MAX_INCLUDE_DEPTH: usize = 64;

/// One schema violation, located by its dotted path in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Validator(Validator),
    Map(Vec<(String, Node)>),
}

/// A loaded schema ready to validate documents
#[derive(Debug, Clone)]
pub struct Schema {
    root: Node,
    includes: BTreeMap<String, Node>,
}

impl Schema {
    /// Load a schema from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocGenError::Schema(format!("Failed to read schema file {:?}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a schema from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(text) {
            documents.push(Value::deserialize(document)?);
        }

        let mut documents = documents.into_iter();
        let root = match documents.next() {
            Some(root) => node_from_value(&root)?,
            None => return Err(DocGenError::Schema("schema is empty".to_string())),
        };

        let mut includes = BTreeMap::new();
        for document in documents {
            let Value::Mapping(map) = document else {
                return Err(DocGenError::Schema(
                    "include documents must be mappings".to_string(),
                ));
            };
            for (name, node) in &map {
                let name = scalar_to_string(name).ok_or_else(|| {
                    DocGenError::Schema("include names must be strings".to_string())
                })?;
                includes.insert(name, node_from_value(node)?);
            }
        }

        let schema = Self { root, includes };
        schema.check_includes(&schema.root)?;
        for node in schema.includes.values() {
            schema.check_includes(node)?;
        }
        Ok(schema)
    }

    /// Validate a document, returning every violation found
    ///
    /// Keys a mapping schema does not name are reported as unexpected.
    pub fn validate(&self, data: &Value) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        self.validate_node(&self.root, data, "", 0, &mut errors);
        errors
    }

    fn check_includes(&self, node: &Node) -> Result<()> {
        match node {
            Node::Map(fields) => fields
                .iter()
                .try_for_each(|(_, child)| self.check_includes(child)),
            Node::Validator(validator) => self.check_validator_includes(validator),
        }
    }

    fn check_validator_includes(&self, validator: &Validator) -> Result<()> {
        match &validator.kind {
            ValidatorKind::Include(name) if !self.includes.contains_key(name) => Err(
                DocGenError::Schema(format!("Include '{name}' has not been defined.")),
            ),
            ValidatorKind::Map { values, keys } => values
                .iter()
                .chain(keys)
                .try_for_each(|v| self.check_validator_includes(v)),
            ValidatorKind::List(children)
            | ValidatorKind::Any(children)
            | ValidatorKind::Subset(children) => children
                .iter()
                .try_for_each(|v| self.check_validator_includes(v)),
            _ => Ok(()),
        }
    }

    fn validate_node(
        &self,
        node: &Node,
        data: &Value,
        path: &str,
        depth: usize,
        errors: &mut Vec<SchemaError>,
    ) {
        match node {
            Node::Validator(validator) => self.validate_item(validator, data, path, depth, errors),
            Node::Map(fields) => {
                let Value::Mapping(map) = data else {
                    push(errors, path, format!("'{}' is not a map.", display_value(data)));
                    return;
                };

                for (key, child) in fields {
                    let child_path = join(path, key);
                    match map.get(key.as_str()) {
                        Some(value) => {
                            self.validate_node(child, value, &child_path, depth, errors)
                        }
                        None if node_required(child) => {
                            push(errors, &child_path, "Required field missing".to_string())
                        }
                        None => {}
                    }
                }

                for key in map.keys() {
                    let key = display_value(key);
                    if !fields.iter().any(|(name, _)| *name == key) {
                        push(errors, &join(path, &key), "Unexpected element".to_string());
                    }
                }
            }
        }
    }

    fn validate_item(
        &self,
        validator: &Validator,
        data: &Value,
        path: &str,
        depth: usize,
        errors: &mut Vec<SchemaError>,
    ) {
        if data.is_null() && !validator.required {
            return;
        }

        match &validator.kind {
            ValidatorKind::Include(_) if depth >= MAX_INCLUDE_DEPTH => push(
                errors,
                path,
                format!("Include depth exceeds {MAX_INCLUDE_DEPTH}; is the schema recursive?"),
            ),
            ValidatorKind::Include(name) => match self.includes.get(name) {
                Some(node) => self.validate_node(node, data, path, depth + 1, errors),
                None => push(errors, path, format!("Include '{name}' has not been defined.")),
            },
            ValidatorKind::Any(children) => {
                self.validate_any_of(children, data, path, depth, errors)
            }
            ValidatorKind::Subset(children) => {
                let items: Vec<&Value> = match data {
                    Value::Sequence(items) => items.iter().collect(),
                    other => vec![other],
                };
                for item in items {
                    if !children
                        .iter()
                        .any(|c| self.check(c, item, path, depth).is_empty())
                    {
                        push(
                            errors,
                            path,
                            format!(
                                "'{}' is not a subset of [{}]",
                                display_value(item),
                                tags(children)
                            ),
                        );
                    }
                }
            }
            ValidatorKind::Map { values, keys } => {
                if self.push_own(validator, data, path, errors) {
                    return;
                }
                let Value::Mapping(map) = data else { return };
                for (key, value) in map {
                    let key_text = display_value(key);
                    let child_path = join(path, &key_text);
                    if !keys.is_empty()
                        && !keys.iter().any(|k| self.check(k, key, path, depth).is_empty())
                    {
                        push(
                            errors,
                            &child_path,
                            format!("Key error - '{key_text}' is not a {}.", tags(keys)),
                        );
                    }
                    if !values.is_empty() {
                        self.validate_any_of(values, value, &child_path, depth, errors);
                    }
                }
            }
            ValidatorKind::List(children) => {
                if self.push_own(validator, data, path, errors) {
                    return;
                }
                let Value::Sequence(items) = data else { return };
                if children.is_empty() {
                    return;
                }
                for (i, item) in items.iter().enumerate() {
                    let item_path = join(path, &i.to_string());
                    self.validate_any_of(children, item, &item_path, depth, errors);
                }
            }
            _ => {
                for message in validator.validate(data) {
                    push(errors, path, message);
                }
            }
        }
    }

    /// Own type and constraint check; true when it failed
    fn push_own(
        &self,
        validator: &Validator,
        data: &Value,
        path: &str,
        errors: &mut Vec<SchemaError>,
    ) -> bool {
        let messages = validator.validate(data);
        let failed = !messages.is_empty();
        for message in messages {
            push(errors, path, message);
        }
        failed
    }

    fn validate_any_of(
        &self,
        children: &[Validator],
        data: &Value,
        path: &str,
        depth: usize,
        errors: &mut Vec<SchemaError>,
    ) {
        match children {
            [] => {}
            [only] => self.validate_item(only, data, path, depth, errors),
            _ => {
                if !children
                    .iter()
                    .any(|c| self.check(c, data, path, depth).is_empty())
                {
                    push(
                        errors,
                        path,
                        format!("'{}' is not any of [{}]", display_value(data), tags(children)),
                    );
                }
            }
        }
    }

    fn check(
        &self,
        validator: &Validator,
        data: &Value,
        path: &str,
        depth: usize,
    ) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        self.validate_item(validator, data, path, depth, &mut errors);
        errors
    }
}

fn node_from_value(value: &Value) -> Result<Node> {
    match value {
        Value::String(expr) => Ok(Node::Validator(parse_validator(expr)?)),
        Value::Mapping(map) => {
            let mut fields = Vec::new();
            for (key, child) in map {
                let key = scalar_to_string(key).ok_or_else(|| {
                    DocGenError::Schema("schema keys must be strings".to_string())
                })?;
                fields.push((key, node_from_value(child)?));
            }
            Ok(Node::Map(fields))
        }
        other => Err(DocGenError::Schema(format!(
            "schema entries must be validator strings or mappings, got {}",
            display_value(other)
        ))),
    }
}

fn node_required(node: &Node) -> bool {
    match node {
        Node::Validator(validator) => validator.required,
        Node::Map(_) => true,
    }
}

fn tags(validators: &[Validator]) -> String {
    validators
        .iter()
        .map(|v| match &v.kind {
            ValidatorKind::Include(name) => format!("include('{name}')"),
            _ => v.tag().to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn push(errors: &mut Vec<SchemaError>, path: &str, message: String) {
    errors.push(SchemaError {
        path: path.to_string(),
        message,
    });
}
