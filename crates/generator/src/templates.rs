//! Template loading and management

use docgen_common::{DocGenError, Entities, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load the README templates with an `expand` filter over `entities`
pub fn load_readme_templates(entities: Entities) -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter(
        "expand",
        move |value: &Value, _args: &HashMap<String, Value>| expand_filter(&entities, value),
    );

    // Macros first: templates importing them are checked on insert
    tera.add_raw_template("macros.tera", include_str!("../templates/macros.tera"))
        .map_err(|e| {
            DocGenError::Generation(format!("Failed to load macros template: {}", e))
        })?;

    tera.add_raw_template("readme.md", include_str!("../templates/readme.md.tera"))
        .map_err(|e| {
            DocGenError::Generation(format!("Failed to load readme.md template: {}", e))
        })?;

    Ok(tera)
}

/// Load the root summary template
pub fn load_summary_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.add_raw_template("summary.md", include_str!("../templates/summary.md.tera"))
        .map_err(|e| {
            DocGenError::Generation(format!("Failed to load summary.md template: {}", e))
        })?;

    Ok(tera)
}

/// Filter replacing `&Name;` entity references with their expansion
fn expand_filter(entities: &Entities, value: &Value) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(text) => Ok(Value::String(entities.expand(text))),
        _ => Err(tera::Error::msg("expand filter expects a string")),
    }
}
