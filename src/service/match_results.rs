use std::sync::Arc;

use tracing::instrument;

use super::notify::{dispatch, Notification, Notifier, WriteAction};
use super::upload_warnings;
use crate::error::{AppError, Result};
use crate::model::{DocumentId, MatchResult};
use crate::outcome::WithWarnings;
use crate::repository::{Attachments, MatchResultRepository, MatchResultUpdate, NewMatchResult, Page};
use crate::store::{ContentStore, ListOptions};

pub struct MatchResultService {
    repository: MatchResultRepository,
    notifier: Arc<dyn Notifier>,
}

impl MatchResultService {
    pub fn new(store: Arc<dyn ContentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: MatchResultRepository::new(store),
            notifier,
        }
    }

    /// Direct lookup; a missing record is an error at this level.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &DocumentId) -> Result<MatchResult> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("match result"))
    }

    #[instrument(skip(self, options))]
    pub async fn get_all(&self, options: &ListOptions) -> Result<Vec<MatchResult>> {
        self.repository.find_all(options).await
    }

    #[instrument(skip(self, options))]
    pub async fn get_page(&self, options: &ListOptions) -> Result<Page<MatchResult>> {
        self.repository.find_page(options).await
    }

    /// Results submitted by one member, for the "my entries" view.
    #[instrument(skip(self, options))]
    pub async fn get_by_user(
        &self,
        user: DocumentId,
        options: &ListOptions,
    ) -> Result<Vec<MatchResult>> {
        let options = options.clone().by_user(user);
        self.repository.find_all(&options).await
    }

    /// Persist the result, attach files best-effort, notify.
    ///
    /// The entity write decides success; upload shortfalls arrive as
    /// warnings and the notification never blocks or changes the outcome.
    #[instrument(skip_all)]
    pub async fn create(
        &self,
        data: &NewMatchResult,
        attachments: Attachments,
    ) -> Result<WithWarnings<MatchResult>> {
        let (entity, report) = self.repository.create_with_files(data, attachments).await?;
        let warnings = upload_warnings(&report);
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Created,
                entity: "match result",
                id: entity.id.clone(),
                summary: score_line(&entity),
                actor: data.author.clone(),
            },
        );
        Ok(WithWarnings::new(entity, warnings))
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(
        &self,
        id: &DocumentId,
        update: &MatchResultUpdate,
        attachments: Attachments,
    ) -> Result<WithWarnings<MatchResult>> {
        let (entity, report) = self
            .repository
            .update_with_files(id, update, attachments)
            .await?;
        let warnings = upload_warnings(&report);
        dispatch(
            &self.notifier,
            Notification {
                action: WriteAction::Updated,
                entity: "match result",
                id: entity.id.clone(),
                summary: score_line(&entity),
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

fn score_line(result: &MatchResult) -> String {
    format!(
        "{} {}:{} {}",
        result.home_team, result.home_score, result.away_score, result.away_team
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Authorship, Category};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn score_line_reads_like_a_scoreboard() {
        let result = MatchResult {
            id: DocumentId::from("mr-17"),
            row_id: 17,
            home_team: "SC Blau-Weiß".into(),
            away_team: "FC Rot".into(),
            home_score: 3,
            away_score: 1,
            goalscorers: None,
            report: None,
            categories: vec![Category::fallback()],
            match_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            image_url: None,
            photos: vec![],
            files: vec![],
            authorship: Authorship {
                created_by: None,
                updated_by: None,
                created_at: Utc.with_ymd_and_hms(2025, 9, 14, 18, 0, 0).unwrap(),
                updated_at: Utc.with_ymd_and_hms(2025, 9, 14, 18, 0, 0).unwrap(),
            },
        };
        assert_eq!(score_line(&result), "SC Blau-Weiß 3:1 FC Rot");
    }
}
