use std::sync::Arc;

use tracing::instrument;

use super::notify::{dispatch, Notification, Notifier, WriteAction};
use crate::error::{AppError, Result};
use crate::model::{Comment, CommentTarget, DocumentId};
use crate::repository::{CommentRepository, NewComment};
use crate::store::ContentStore;

pub struct CommentService {
    repository: CommentRepository,
    notifier: Arc<dyn Notifier>,
}

impl CommentService {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: CommentRepository::new(store),
            notifier,
        }
    }

    /// Direct lookup; a missing record is an error at this level.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &DocumentId) -> Result<Comment> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("comment"))
    }

    /// The comment thread under one record: top-level comments, newest
    /// first, each with its direct replies.
    #[instrument(skip(self))]
    pub async fn for_target(&self, target: &CommentTarget) -> Result<Vec<Comment>> {
        self.repository.find_for_target(target).await
    }

    /// Validates the draft (exactly one parent reference) before any store
    /// call, then persists and notifies.
    #[instrument(skip_all)]
    pub async fn create(&self, data: &NewComment) -> Result<Comment> {
        let comment = self.repository.create(data).await?;
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Created,
                entity: "comment",
                id: comment.id.clone(),
                summary: comment.content.chars().take(80).collect(),
                actor: Some(data.author.clone()),
            },
        );
        Ok(comment)
    }

    #[instrument(skip(self, content), fields(id = %id))]
    pub async fn update_content(&self, id: &DocumentId, content: &str) -> Result<Comment> {
        self.repository.update_content(id, content).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.repository.delete(id).await
    }
}
