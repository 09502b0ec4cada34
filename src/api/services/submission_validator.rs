//! Submission validation.
//!
//! Pure gate between a published form's field schemas and a raw submission
//! payload. Fields are checked in declaration order and the first violation
//! wins; persistence, files and the HTTP shape of the request are none of
//! this module's business.

use crate::models::{FieldSchema, FieldType};
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::OnceLock;
use thiserror::Error;

/// A rejected submission payload, carrying the first violation found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    // local@domain.tld: one @, at least one dot after it, no whitespace.
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

/// Absent, null and empty-string all count as "no answer".
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// String form of a submitted value, used for email/choice/length checks.
fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

fn as_finite_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Validate a submission payload against a form's field list.
pub fn validate_submission(
    fields: &[FieldSchema],
    payload: &Map<String, Value>,
) -> Result<(), ValidationError> {
    for field in fields {
        let value = payload.get(&field.name);

        if field.required && is_blank(value) {
            return Err(ValidationError(format!(
                "Field \"{}\" is required",
                field.label
            )));
        }

        // Empty optional fields skip every remaining check.
        if !field.required && is_blank(value) {
            continue;
        }

        let Some(value) = value else { continue };

        if field.field_type == FieldType::Email {
            let text = as_text(value).unwrap_or_default();
            if !email_regex().is_match(&text) {
                return Err(ValidationError(format!(
                    "Invalid email format for field \"{}\"",
                    field.label
                )));
            }
        }

        if field.field_type == FieldType::Number {
            let Some(number) = as_finite_number(value) else {
                return Err(ValidationError(format!(
                    "Field \"{}\" must be a valid number",
                    field.label
                )));
            };
            if let Some(validation) = &field.validation {
                if let Some(min) = validation.min {
                    if number < min {
                        return Err(ValidationError(format!(
                            "Field \"{}\" must be at least {}",
                            field.label, min
                        )));
                    }
                }
                if let Some(max) = validation.max {
                    if number > max {
                        return Err(ValidationError(format!(
                            "Field \"{}\" must be at most {}",
                            field.label, max
                        )));
                    }
                }
            }
        }

        if let Some(validation) = &field.validation {
            // Length bounds apply to any value with a string form; numbers
            // are measured as their string form.
            if let Some(text) = as_text(value) {
                let length = text.chars().count() as u64;
                if let Some(min_length) = validation.min_length {
                    if length < min_length {
                        return Err(ValidationError(format!(
                            "Field \"{}\" must be at least {} characters long",
                            field.label, min_length
                        )));
                    }
                }
                if let Some(max_length) = validation.max_length {
                    if length > max_length {
                        return Err(ValidationError(format!(
                            "Field \"{}\" must be at most {} characters long",
                            field.label, max_length
                        )));
                    }
                }
            }
        }

        match field.field_type {
            FieldType::Select | FieldType::Radio => {
                let chosen = as_text(value).unwrap_or_default();
                if !field.options.iter().any(|o| o.as_str() == chosen.as_ref()) {
                    return Err(ValidationError(format!(
                        "Invalid option for field \"{}\"",
                        field.label
                    )));
                }
            }
            FieldType::Checkbox => {
                if let Value::Array(choices) = value {
                    for choice in choices {
                        let chosen = as_text(choice).unwrap_or_default();
                        if !field.options.iter().any(|o| o.as_str() == chosen.as_ref()) {
                            return Err(ValidationError(format!(
                                "Invalid option \"{}\" for field \"{}\"",
                                chosen, field.label
                            )));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}
