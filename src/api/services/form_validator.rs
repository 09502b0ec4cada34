//! Form definition validation.
//!
//! Gates form creation and update: a candidate field list (as authored in
//! the builder UI) is checked in order and short-circuits on the first
//! violation. The input is raw JSON rather than typed field schemas so that
//! authoring mistakes produce the builder's own error messages instead of
//! deserialization noise; a successful pass yields the typed field list.

use crate::models::{FieldSchema, FieldType, FieldValidation};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// A rejected form-authoring payload, carrying the first violation found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DefinitionError(pub String);

fn valid_types_list() -> String {
    FieldType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty_str<'a>(field: &'a Value, key: &str) -> Option<&'a str> {
    field.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Validate a candidate field list and convert it into typed field schemas.
pub fn validate_form_definition(fields: &Value) -> Result<Vec<FieldSchema>, DefinitionError> {
    let Some(items) = fields.as_array() else {
        return Err(DefinitionError("Fields must be an array".to_string()));
    };

    if items.is_empty() {
        return Err(DefinitionError(
            "Form must have at least one field to be saved".to_string(),
        ));
    }

    let mut parsed = Vec::with_capacity(items.len());
    let mut seen_names: HashSet<String> = HashSet::new();

    for item in items {
        let type_str = non_empty_str(item, "type");
        let label = non_empty_str(item, "label");
        let name = non_empty_str(item, "name");
        let (Some(type_str), Some(label), Some(name)) = (type_str, label, name) else {
            return Err(DefinitionError(
                "Each field must have type, label, and name properties".to_string(),
            ));
        };

        let Some(field_type) = FieldType::parse(type_str) else {
            return Err(DefinitionError(format!(
                "Invalid field type: {}. Valid types: {}",
                type_str,
                valid_types_list()
            )));
        };

        // Submission payloads are keyed by field name; a collision would
        // silently merge two fields' answers.
        if !seen_names.insert(name.to_string()) {
            return Err(DefinitionError(format!(
                "Duplicate field name \"{}\"",
                name
            )));
        }

        let options: Vec<String> = item
            .get("options")
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if field_type.is_choice() && options.is_empty() {
            return Err(DefinitionError(format!(
                "Field \"{}\" of type {} must have options array",
                label, field_type
            )));
        }

        let validation: Option<FieldValidation> = item
            .get("validation")
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        if field_type == FieldType::Email {
            if let Some(pattern) = validation.as_ref().and_then(|v| v.pattern.as_deref()) {
                if Regex::new(pattern).is_err() {
                    return Err(DefinitionError(format!(
                        "Invalid regex pattern for field \"{}\"",
                        label
                    )));
                }
            }
        }

        parsed.push(FieldSchema {
            field_type,
            label: label.to_string(),
            name: name.to_string(),
            placeholder: item
                .get("placeholder")
                .and_then(Value::as_str)
                .map(str::to_string),
            required: item
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            options: if field_type.is_choice() {
                options
            } else {
                // Scalar fields never carry options.
                Vec::new()
            },
            validation,
        });
    }

    Ok(parsed)
}
