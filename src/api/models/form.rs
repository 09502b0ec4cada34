use super::field::FieldSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_THANK_YOU_MESSAGE: &str = "Thank you for your submission!";

/// Publication state of a form. Only published forms accept submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
}

/// A named, ordered set of field schemas plus publication state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub status: FormStatus,
    #[serde(default = "default_thank_you_message")]
    pub thank_you_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_limit: Option<u32>,
    #[serde(default)]
    pub submissions_count: u32,
    // Form settings carried from the builder UI. Persisted but not enforced
    // here (authentication is out of scope).
    #[serde(default = "default_true")]
    pub allow_duplicates: bool,
    #[serde(default)]
    pub collect_emails: bool,
    #[serde(default)]
    pub require_login: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_thank_you_message() -> String {
    DEFAULT_THANK_YOU_MESSAGE.to_string()
}

fn default_true() -> bool {
    true
}

impl Form {
    pub fn new(title: String, fields: Vec<FieldSchema>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: None,
            fields,
            status: FormStatus::Draft,
            thank_you_message: default_thank_you_message(),
            submission_limit: None,
            submissions_count: 0,
            allow_duplicates: true,
            collect_emails: false,
            require_login: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the submission limit has been reached.
    ///
    /// This read is advisory only; the authoritative check is the conditional
    /// increment at the store layer.
    pub fn at_submission_limit(&self) -> bool {
        self.submission_limit
            .is_some_and(|limit| self.submissions_count >= limit)
    }

    /// Copy of this form under a new identity, with a suffixed title and a
    /// fresh submission counter.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: format!("{} (Copy)", self.title),
            submissions_count: 0,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}
