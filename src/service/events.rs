use std::sync::Arc;

use tracing::instrument;

use super::notify::{dispatch, Notification, Notifier, WriteAction};
use super::upload_warnings;
use crate::error::{AppError, Result};
use crate::model::{DocumentId, Event};
use crate::outcome::WithWarnings;
use crate::repository::{Attachments, EventRepository, EventUpdate, NewEvent, Page};
use crate::store::{ContentStore, ListOptions};

pub struct EventService {
    repository: EventRepository,
    notifier: Arc<dyn Notifier>,
}

impl EventService {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: EventRepository::new(store),
            notifier,
        }
    }

    /// Direct lookup; a missing record is an error at this level.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &DocumentId) -> Result<Event> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("event"))
    }

    #[instrument(skip(self, options))]
    pub async fn get_all(&self, options: &ListOptions) -> Result<Vec<Event>> {
        self.repository.find_all(options).await
    }

    #[instrument(skip(self, options))]
    pub async fn get_page(&self, options: &ListOptions) -> Result<Page<Event>> {
        self.repository.find_page(options).await
    }

    #[instrument(skip(self, options))]
    pub async fn get_by_user(&self, user: DocumentId, options: &ListOptions) -> Result<Vec<Event>> {
        let options = options.clone().by_user(user);
        self.repository.find_all(&options).await
    }

    #[instrument(skip_all)]
    pub async fn create(
        &self,
        data: &NewEvent,
        attachments: Attachments,
    ) -> Result<WithWarnings<Event>> {
        let (entity, report) = self.repository.create_with_files(data, attachments).await?;
        let warnings = upload_warnings(&report);
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Created,
                entity: "event",
                id: entity.id.clone(),
                summary: entity.name.clone(),
                actor: data.author.clone(),
            },
        );
        Ok(WithWarnings::new(entity, warnings))
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(
        &self,
        id: &DocumentId,
        update: &EventUpdate,
        attachments: Attachments,
    ) -> Result<WithWarnings<Event>> {
        let (entity, report) = self
            .repository
            .update_with_files(id, update, attachments)
            .await?;
        let warnings = upload_warnings(&report);
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Updated,
                entity: "event",
                id: entity.id.clone(),
                summary: entity.name.clone(),
                actor: update.editor.clone(),
            },
        );
        Ok(WithWarnings::new(entity, warnings))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.repository.delete(id).await
    }
}
