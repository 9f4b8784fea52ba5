use chrono::{DateTime, Utc};
use serde::Serialize;

use super::UserRef;
use crate::model::DocumentId;

/// What a comment is attached to. Exactly one parent, by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum CommentTarget {
    MatchResult(DocumentId),
    Tournament(DocumentId),
    Event(DocumentId),
}

impl CommentTarget {
    pub fn id(&self) -> &DocumentId {
        match self {
            CommentTarget::MatchResult(id)
            | CommentTarget::Tournament(id)
            | CommentTarget::Event(id) => id,
        }
    }
}

/// A visitor comment under a match result, tournament, or event.
///
/// Replies reference their parent comment and are materialized one level
/// deep below top-level comments, matching what the query layer populates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: DocumentId,
    pub row_id: i64,
    pub content: String,
    pub author: UserRef,
    pub target: CommentTarget,
    pub parent: Option<DocumentId>,
    pub replies: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
