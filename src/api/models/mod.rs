// Models module - contains FieldSchema, Form, Submission, and enums

pub mod field;
pub mod form;
pub mod submission;

pub use field::{FieldSchema, FieldType, FieldValidation};
pub use form::{DEFAULT_THANK_YOU_MESSAGE, Form, FormStatus};
pub use submission::{FileAttachment, Submission, UploadedFile};
