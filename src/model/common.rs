use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The store's stable document identifier.
///
/// This is the identity of every domain entity. It is distinct from the
/// store-internal numeric row id, which only matters when the upload API
/// needs a numeric owner reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A team/age-group category an entry is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: DocumentId,
    pub name: String,
}

impl Category {
    /// Category assigned to rows created before categories existed.
    pub fn fallback() -> Self {
        Self {
            id: DocumentId::from("general"),
            name: "General".to_string(),
        }
    }
}

/// Minimal reference to the user a record points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: DocumentId,
    pub username: String,
}

/// Who touched a record, and when.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Authorship {
    pub created_by: Option<UserRef>,
    pub updated_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An uploaded image together with its responsive variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub id: DocumentId,
    pub row_id: i64,
    pub name: String,
    pub url: String,
    pub size_bytes: u64,
    pub mime: String,
    pub formats: Option<ImageFormats>,
}

/// Pre-scaled renditions the store derives from an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageFormats {
    pub thumbnail: Option<ImageVariant>,
    pub small: Option<ImageVariant>,
    pub medium: Option<ImageVariant>,
    pub large: Option<ImageVariant>,
}

/// One rendition of an image at a fixed size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageVariant {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A non-image attachment (match report PDF, lineup sheet, …).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAsset {
    pub id: DocumentId,
    pub row_id: i64,
    pub name: String,
    pub url: String,
    pub size_bytes: u64,
    pub ext: Option<String>,
}
