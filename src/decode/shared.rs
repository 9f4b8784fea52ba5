use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{relation, require, Relation};
use crate::error::Result;
use crate::model::{Authorship, Category, DocumentId, UserRef};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CategoryDto {
    pub document_id: Option<String>,
    pub name: Option<String>,
}

impl CategoryDto {
    pub(crate) fn into_domain(self) -> Result<Category> {
        Ok(Category {
            id: DocumentId(require("category", "documentId", self.document_id)?),
            name: require("category", "name", self.name)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UserRefDto {
    pub document_id: Option<String>,
    pub username: Option<String>,
}

impl UserRefDto {
    pub(crate) fn into_domain(self) -> Result<UserRef> {
        Ok(UserRef {
            id: DocumentId(require("user", "documentId", self.document_id)?),
            username: require("user", "username", self.username)?,
        })
    }
}

/// Audit fields every collection record carries. Embedded into entity DTOs
/// via `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AuditDto {
    pub author: Option<Relation<UserRefDto>>,
    pub updated_by: Option<Relation<UserRefDto>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuditDto {
    pub(crate) fn into_domain(self, entity: &'static str) -> Result<Authorship> {
        let created_at = require(entity, "createdAt", self.created_at)?;
        Ok(Authorship {
            created_by: relation(self.author)
                .map(UserRefDto::into_domain)
                .transpose()?,
            updated_by: relation(self.updated_by)
                .map(UserRefDto::into_domain)
                .transpose()?,
            created_at,
            // Rows written once never get an updatedAt from old store
            // versions; creation time is the honest answer then.
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

/// A bare reference to another record, used when only identity matters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RefDto {
    pub document_id: Option<String>,
}

impl RefDto {
    pub(crate) fn into_id(self, entity: &'static str) -> Result<DocumentId> {
        Ok(DocumentId(require(entity, "documentId", self.document_id)?))
    }
}
