use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::shared::{RefDto, UserRefDto};
use super::{lossy, malformed, relation, relation_list, require, with_payload, Relation, RelationList};
use crate::error::{AppError, Result};
use crate::model::{Comment, CommentTarget, DocumentId};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CommentDto {
    id: Option<i64>,
    document_id: Option<String>,
    content: Option<String>,
    author: Option<Relation<UserRefDto>>,
    match_result: Option<Relation<RefDto>>,
    tournament: Option<Relation<RefDto>>,
    event: Option<Relation<RefDto>>,
    parent: Option<Relation<RefDto>>,
    replies: Option<RelationList<CommentDto>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

const ENTITY: &str = "comment";

/// Resolve the one-of-three parent reference. A comment pointing at zero
/// or several parents is corrupt and refuses to decode.
fn target(
    match_result: Option<DocumentId>,
    tournament: Option<DocumentId>,
    event: Option<DocumentId>,
) -> Result<CommentTarget> {
    match (match_result, tournament, event) {
        (Some(id), None, None) => Ok(CommentTarget::MatchResult(id)),
        (None, Some(id), None) => Ok(CommentTarget::Tournament(id)),
        (None, None, Some(id)) => Ok(CommentTarget::Event(id)),
        (None, None, None) => Err(AppError::validation(
            "comment is not attached to a match result, tournament, or event",
        )),
        _ => Err(AppError::validation(
            "comment is attached to more than one parent",
        )),
    }
}

impl CommentDto {
    /// Replies recurse into the same decoder; depth is bounded by what the
    /// query layer populates (top-level comments plus direct replies).
    fn into_domain(self) -> Result<Comment> {
        let author = relation(self.author)
            .map(UserRefDto::into_domain)
            .transpose()?;

        let created_at = require(ENTITY, "createdAt", self.created_at)?;

        let replies = relation_list(self.replies)
            .into_iter()
            .filter_map(|dto| lossy(ENTITY, dto.into_domain()))
            .collect();

        Ok(Comment {
            id: DocumentId(require(ENTITY, "documentId", self.document_id)?),
            row_id: require(ENTITY, "id", self.id)?,
            content: require(ENTITY, "content", self.content)?,
            author: require(ENTITY, "author", author)?,
            target: target(
                relation(self.match_result)
                    .map(|r| r.into_id(ENTITY))
                    .transpose()?,
                relation(self.tournament)
                    .map(|r| r.into_id(ENTITY))
                    .transpose()?,
                relation(self.event).map(|r| r.into_id(ENTITY)).transpose()?,
            )?,
            parent: relation(self.parent)
                .map(|r| r.into_id(ENTITY))
                .transpose()?,
            replies,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

pub fn decode_comment(raw: &Value) -> Result<Comment> {
    let dto: CommentDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(ENTITY, raw, e))?;
    dto.into_domain().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_comment(raw: &Value) -> Option<Comment> {
    lossy(ENTITY, decode_comment(raw))
}
