use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use utoipa::ToSchema;
use uuid::Uuid;

/// Normalized file metadata, independent of which upload channel delivered
/// the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub field_name: String,
    pub original_name: String,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
}

/// One attached file as delivered by an upload channel, before normalization
/// into a [`FileAttachment`].
///
/// Forms may be served by a lightweight client that uploads directly to
/// object storage and passes back a URL (`Remote`), or by a traditional
/// multipart upload that the pipeline stages to local disk (`Staged`).
#[derive(Debug, Clone, PartialEq)]
pub enum UploadedFile {
    Remote {
        field_name: String,
        name: String,
        url: String,
        size: u64,
        mime: String,
    },
    Staged {
        field_name: String,
        name: String,
        path: PathBuf,
        size: u64,
        mime: String,
    },
}

impl UploadedFile {
    pub fn field_name(&self) -> &str {
        match self {
            UploadedFile::Remote { field_name, .. } | UploadedFile::Staged { field_name, .. } => {
                field_name
            }
        }
    }

    pub fn original_name(&self) -> &str {
        match self {
            UploadedFile::Remote { name, .. } | UploadedFile::Staged { name, .. } => name,
        }
    }

    /// Collapse either channel into the attachment record that is persisted.
    pub fn into_attachment(self) -> FileAttachment {
        match self {
            UploadedFile::Remote {
                field_name,
                name,
                url,
                size,
                mime,
            } => FileAttachment {
                field_name,
                original_name: name,
                url,
                size,
                mime_type: mime,
            },
            UploadedFile::Staged {
                field_name,
                name,
                path,
                size,
                mime,
            } => FileAttachment {
                field_name,
                original_name: name,
                url: path.to_string_lossy().into_owned(),
                size,
                mime_type: mime,
            },
        }
    }
}

/// One accepted response to a form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    /// Parent form id (weak back-reference, not ownership).
    pub form: Uuid,
    /// Field name to submitted value. Values are strings, string arrays
    /// (checkbox multi-select) or the original filename for file fields.
    #[schema(value_type = Object)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileAttachment>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(form: Uuid, data: Map<String, Value>, files: Vec<FileAttachment>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            form,
            data,
            files,
            submitted_at: now,
            created_at: now,
        }
    }
}
