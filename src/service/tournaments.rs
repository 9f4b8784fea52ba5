use std::sync::Arc;

use tracing::instrument;

use super::notify::{dispatch, Notification, Notifier, WriteAction};
use super::upload_warnings;
use crate::error::{AppError, Result};
use crate::model::{DocumentId, Tournament, TournamentMatch};
use crate::outcome::WithWarnings;
use crate::repository::{
    Attachments, NewTournament, NewTournamentMatch, Page, TournamentMatchRepository,
    TournamentMatchUpdate, TournamentRepository, TournamentUpdate,
};
use crate::store::{ContentStore, ListOptions};

/// Tournaments and the matches recorded inside them.
pub struct TournamentService {
    repository: TournamentRepository,
    matches: TournamentMatchRepository,
    notifier: Arc<dyn Notifier>,
}

impl TournamentService {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: TournamentRepository::new(Arc::clone(&store)),
            matches: TournamentMatchRepository::new(store),
            notifier,
        }
    }

    /// Direct lookup; a missing record is an error at this level.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &DocumentId) -> Result<Tournament> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("tournament"))
    }

    #[instrument(skip(self, options))]
    pub async fn get_all(&self, options: &ListOptions) -> Result<Vec<Tournament>> {
        self.repository.find_all(options).await
    }

    #[instrument(skip(self, options))]
    pub async fn get_page(&self, options: &ListOptions) -> Result<Page<Tournament>> {
        self.repository.find_page(options).await
    }

    #[instrument(skip(self, options))]
    pub async fn get_by_user(
        &self,
        user: DocumentId,
        options: &ListOptions,
    ) -> Result<Vec<Tournament>> {
        let options = options.clone().by_user(user);
        self.repository.find_all(&options).await
    }

    #[instrument(skip_all)]
    pub async fn create(
        &self,
        data: &NewTournament,
        attachments: Attachments,
    ) -> Result<WithWarnings<Tournament>> {
        let (entity, report) = self.repository.create_with_files(data, attachments).await?;
        let warnings = upload_warnings(&report);
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Created,
                entity: "tournament",
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
        update: &TournamentUpdate,
        attachments: Attachments,
    ) -> Result<WithWarnings<Tournament>> {
        let (entity, report) = self
            .repository
            .update_with_files(id, update, attachments)
            .await?;
        let warnings = upload_warnings(&report);
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Updated,
                entity: "tournament",
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

    /// Matches of one tournament, in creation order.
    #[instrument(skip(self))]
    pub async fn matches_of(&self, tournament: &DocumentId) -> Result<Vec<TournamentMatch>> {
        self.matches.find_by_tournament(tournament).await
    }

    /// Record several matches, strictly one after another.
    ///
    /// Sequential on purpose: when one submission fails, everything before
    /// it is already persisted and everything after it was never sent, so
    /// the store holds a clean prefix rather than an arbitrary subset.
    #[instrument(skip(self, drafts), fields(tournament = %tournament, count = drafts.len()))]
    pub async fn add_matches(
        &self,
        tournament: &DocumentId,
        drafts: &[NewTournamentMatch],
    ) -> Result<Vec<TournamentMatch>> {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if draft.tournament != *tournament {
                return Err(AppError::validation(
                    "all matches must belong to the tournament being edited",
                ));
            }
            created.push(self.matches.create(draft).await?);
        }
        if !created.is_empty() {
            dispatch(
                &self.notifier,
                Notification {
                    action: WriteAction::Updated,
                    entity: "tournament",
                    id: tournament.clone(),
                    summary: format!("{} match(es) recorded", created.len()),
                    actor: drafts.first().and_then(|d| d.author.clone()),
                },
            );
        }
        Ok(created)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn update_match(
        &self,
        id: &DocumentId,
        update: &TournamentMatchUpdate,
    ) -> Result<TournamentMatch> {
        self.matches.update(id, update).await
    }

    #[instrument(skip(self))]
    pub async fn delete_match(&self, id: &DocumentId) -> Result<()> {
        self.matches.delete(id).await
    }
}
