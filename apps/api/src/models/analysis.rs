use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned in place of model output when the backend yields no usable completion.
pub const NO_FEEDBACK_PLACEHOLDER: &str = "No feedback generated.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidReference {
    #[error("bucket must not be empty")]
    EmptyBucket,

    #[error("document key must not be empty")]
    EmptyKey,
}

/// Locates a document in the blob store. Both parts are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentReference {
    bucket: String,
    key: String,
}

impl DocumentReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, InvalidReference> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.trim().is_empty() {
            return Err(InvalidReference::EmptyBucket);
        }
        if key.trim().is_empty() {
            return Err(InvalidReference::EmptyKey);
        }
        Ok(Self { bucket, key })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Entity categories reported by the recognition backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Person,
    Location,
    Organization,
    CommercialItem,
    Event,
    Date,
    Quantity,
    Title,
    Other,
}

impl EntityCategory {
    /// Parses the backend's wire name. Unknown names are rejected rather than
    /// folded into `Other`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "PERSON" => Some(Self::Person),
            "LOCATION" => Some(Self::Location),
            "ORGANIZATION" => Some(Self::Organization),
            "COMMERCIAL_ITEM" => Some(Self::CommercialItem),
            "EVENT" => Some(Self::Event),
            "DATE" => Some(Self::Date),
            "QUANTITY" => Some(Self::Quantity),
            "TITLE" => Some(Self::Title),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A recognized span in the extracted text.
///
/// Field names follow the Comprehend response so existing consumers of the
/// `skills` array keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entity {
    pub text: String,
    #[serde(rename = "Type")]
    pub category: EntityCategory,
    pub score: f32,
    pub begin_offset: usize,
    pub end_offset: usize,
}

/// Terminal output of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub resume_text: String,
    pub skills: Vec<Entity>,
    pub feedback: String,
}
