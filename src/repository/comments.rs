use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::Collection;
use crate::decode::{decode_comment, safe_decode_comment};
use crate::error::{AppError, Result};
use crate::model::{Comment, CommentTarget, DocumentId};
use crate::store::{ContentStore, ListOptions};

/// A comment as submitted by a form: the three possible parent references
/// arrive as independent optionals and are validated down to exactly one
/// before anything touches the store.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub content: String,
    pub author: DocumentId,
    pub match_result: Option<DocumentId>,
    pub tournament: Option<DocumentId>,
    pub event: Option<DocumentId>,
    /// Set when replying to another comment.
    pub parent: Option<DocumentId>,
}

impl NewComment {
    /// Resolve the parent reference, rejecting zero or several.
    pub fn validate(&self) -> Result<CommentTarget> {
        if self.content.trim().is_empty() {
            return Err(AppError::validation("the comment text must not be empty"));
        }
        match (&self.match_result, &self.tournament, &self.event) {
            (Some(id), None, None) => Ok(CommentTarget::MatchResult(id.clone())),
            (None, Some(id), None) => Ok(CommentTarget::Tournament(id.clone())),
            (None, None, Some(id)) => Ok(CommentTarget::Event(id.clone())),
            (None, None, None) => Err(AppError::validation(
                "a comment must reference a match result, tournament, or event",
            )),
            _ => Err(AppError::validation(
                "a comment can only reference one of match result, tournament, or event",
            )),
        }
    }

    fn payload(&self, target: &CommentTarget) -> Value {
        let mut map = Map::new();
        map.insert("content".into(), json!(self.content));
        map.insert("author".into(), json!(self.author));
        let field = match target {
            CommentTarget::MatchResult(_) => "matchResult",
            CommentTarget::Tournament(_) => "tournament",
            CommentTarget::Event(_) => "event",
        };
        map.insert(field.into(), json!(target.id()));
        if let Some(parent) = &self.parent {
            map.insert("parent".into(), json!(parent));
        }
        Value::Object(map)
    }
}

pub struct CommentRepository {
    collection: Collection,
}

impl CommentRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            collection: Collection::new(
                store,
                "comments",
                "api::comment.comment",
                "comment",
                &[
                    "author",
                    "matchResult",
                    "tournament",
                    "event",
                    "parent",
                    "replies",
                    "replies.author",
                ],
            ),
        }
    }

    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Comment>> {
        match self.collection.fetch_by_id(id).await? {
            Some(raw) => Ok(Some(decode_comment(&raw)?)),
            None => Ok(None),
        }
    }

    /// Top-level comments under one record, newest first, each with its
    /// direct replies populated.
    pub async fn find_for_target(&self, target: &CommentTarget) -> Result<Vec<Comment>> {
        let parent_field = match target {
            CommentTarget::MatchResult(_) => "matchResult",
            CommentTarget::Tournament(_) => "tournament",
            CommentTarget::Event(_) => "event",
        };
        let options = ListOptions::unbounded()
            .sorted_by("createdAt:desc")
            .filter(format!("{parent_field}.documentId"), target.id().as_str())
            .raw_param("filters[parent][documentId][$null]", "true");
        let (items, _) = self.collection.fetch_list(&options).await?;
        Ok(items.iter().filter_map(safe_decode_comment).collect())
    }

    /// Validates the draft before any store call.
    pub async fn create(&self, data: &NewComment) -> Result<Comment> {
        let target = data.validate()?;
        let raw = self.collection.create_raw(data.payload(&target)).await?;
        decode_comment(&raw)
    }

    pub async fn update_content(&self, id: &DocumentId, content: &str) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::validation("the comment text must not be empty"));
        }
        let raw = self
            .collection
            .update_raw(id, json!({ "content": content }))
            .await?;
        decode_comment(&raw)
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.collection.delete(id).await
    }
}
