//! Field schema model: one designed field of a form.
//!
//! Two flavours exist: choice fields (select/checkbox/radio) that take their
//! value from a fixed option set, and scalar fields (text/email/number/
//! textarea/file) that never carry options.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The closed set of field types a form can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
    File,
}

impl FieldType {
    /// All recognized types, in the order reported to form authors.
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::File,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::File => "file",
        }
    }

    /// Parse the wire name of a field type.
    pub fn parse(s: &str) -> Option<Self> {
        FieldType::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Choice fields must declare a non-empty option set.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Checkbox | FieldType::Radio
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-field constraint bundle.
///
/// `pattern` is only consulted for email fields (authoring-time compile
/// check); `min`/`max` apply to number fields; `minLength`/`maxLength` apply
/// to any value with a string form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// One designed field of a form.
///
/// `name` is the submission payload key and must be unique within a form's
/// field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldSchema {
    pub fn new(field_type: FieldType, label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            name: name.into(),
            placeholder: None,
            required: false,
            options: Vec::new(),
            validation: None,
        }
    }
}
