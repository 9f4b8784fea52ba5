use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use super::{Attachments, Collection, Page, UploadReport};
use crate::decode::{decode_match_result, safe_decode_match_result};
use crate::error::{AppError, Result};
use crate::model::{DocumentId, MatchResult};
use crate::store::{ContentStore, ListOptions};

/// Input for creating a match result.
#[derive(Debug, Clone)]
pub struct NewMatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub goalscorers: Option<String>,
    pub report: Option<String>,
    pub category_ids: Vec<DocumentId>,
    pub match_date: NaiveDate,
    pub image_url: Option<String>,
    /// The submitting member; recorded as the record's author.
    pub author: Option<DocumentId>,
}

impl NewMatchResult {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(AppError::validation("both team names are required"));
        }
        Ok(())
    }

    /// Wire payload. Categories are *connected*: creation only ever adds
    /// to the relation.
    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("homeTeam".into(), json!(self.home_team));
        map.insert("awayTeam".into(), json!(self.away_team));
        map.insert("homeScore".into(), json!(self.home_score));
        map.insert("awayScore".into(), json!(self.away_score));
        map.insert("matchDate".into(), json!(self.match_date));
        if let Some(goalscorers) = &self.goalscorers {
            map.insert("goalscorers".into(), json!(goalscorers));
        }
        if let Some(report) = &self.report {
            map.insert("report".into(), json!(report));
        }
        if let Some(image_url) = &self.image_url {
            map.insert("imageUrl".into(), json!(image_url));
        }
        if !self.category_ids.is_empty() {
            map.insert("categories".into(), json!({ "connect": self.category_ids }));
        }
        if let Some(author) = &self.author {
            map.insert("author".into(), json!(author));
        }
        Value::Object(map)
    }
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct MatchResultUpdate {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub goalscorers: Option<String>,
    pub report: Option<String>,
    /// When set, *replaces* the whole category relation.
    pub category_ids: Option<Vec<DocumentId>>,
    pub match_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    /// The member making the edit; recorded as last modifier.
    pub editor: Option<DocumentId>,
}

impl MatchResultUpdate {
    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        if let Some(home_team) = &self.home_team {
            map.insert("homeTeam".into(), json!(home_team));
        }
        if let Some(away_team) = &self.away_team {
            map.insert("awayTeam".into(), json!(away_team));
        }
        if let Some(home_score) = self.home_score {
            map.insert("homeScore".into(), json!(home_score));
        }
        if let Some(away_score) = self.away_score {
            map.insert("awayScore".into(), json!(away_score));
        }
        if let Some(goalscorers) = &self.goalscorers {
            map.insert("goalscorers".into(), json!(goalscorers));
        }
        if let Some(report) = &self.report {
            map.insert("report".into(), json!(report));
        }
        if let Some(category_ids) = &self.category_ids {
            map.insert("categories".into(), json!({ "set": category_ids }));
        }
        if let Some(match_date) = self.match_date {
            map.insert("matchDate".into(), json!(match_date));
        }
        if let Some(image_url) = &self.image_url {
            map.insert("imageUrl".into(), json!(image_url));
        }
        if let Some(editor) = &self.editor {
            map.insert("updatedBy".into(), json!(editor));
        }
        Value::Object(map)
    }
}

pub struct MatchResultRepository {
    collection: Collection,
}

impl MatchResultRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            collection: Collection::new(
                store,
                "match-results",
                "api::match-result.match-result",
                "match result",
                &["categories", "photos", "files", "author", "updatedBy"],
            ),
        }
    }

    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<MatchResult>> {
        match self.collection.fetch_by_id(id).await? {
            Some(raw) => Ok(Some(decode_match_result(&raw)?)),
            None => Ok(None),
        }
    }

    /// All match results, bounded by the fixed list limit. Records that
    /// fail to decode are dropped, not fatal.
    pub async fn find_all(&self, options: &ListOptions) -> Result<Vec<MatchResult>> {
        let mut options = options.clone();
        if options.page_size.is_none() {
            options.page = Some(1);
            options.page_size = Some(crate::store::MAX_LIST_LIMIT);
        }
        let (items, _) = self.collection.fetch_list(&options).await?;
        Ok(items.iter().filter_map(safe_decode_match_result).collect())
    }

    pub async fn find_page(&self, options: &ListOptions) -> Result<Page<MatchResult>> {
        let (items, pagination) = self.collection.fetch_list(options).await?;
        Ok(Page {
            items: items.iter().filter_map(safe_decode_match_result).collect(),
            pagination,
        })
    }

    pub async fn create(&self, data: &NewMatchResult) -> Result<MatchResult> {
        data.validate()?;
        let raw = self.collection.create_raw(data.payload()).await?;
        decode_match_result(&raw)
    }

    pub async fn update(&self, id: &DocumentId, update: &MatchResultUpdate) -> Result<MatchResult> {
        let raw = self.collection.update_raw(id, update.payload()).await?;
        decode_match_result(&raw)
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.collection.delete(id).await
    }

    /// Attach files to an already-created result, field by field.
    pub async fn upload_files(&self, row_id: i64, attachments: Attachments) -> UploadReport {
        self.collection.upload_attachments(row_id, attachments).await
    }

    /// Create, then attach, then re-read. Upload shortfalls are reported,
    /// never thrown; a failed re-read falls back to the created snapshot.
    pub async fn create_with_files(
        &self,
        data: &NewMatchResult,
        attachments: Attachments,
    ) -> Result<(MatchResult, UploadReport)> {
        let created = self.create(data).await?;
        if attachments.is_empty() {
            return Ok((created, UploadReport::default()));
        }
        let report = self
            .collection
            .upload_attachments(created.row_id, attachments)
            .await;
        let id = created.id.clone();
        let entity = self
            .collection
            .refetch_or(&id, decode_match_result, created)
            .await;
        Ok((entity, report))
    }

    pub async fn update_with_files(
        &self,
        id: &DocumentId,
        update: &MatchResultUpdate,
        attachments: Attachments,
    ) -> Result<(MatchResult, UploadReport)> {
        let updated = self.update(id, update).await?;
        if attachments.is_empty() {
            return Ok((updated, UploadReport::default()));
        }
        let report = self
            .collection
            .upload_attachments(updated.row_id, attachments)
            .await;
        let entity = self
            .collection
            .refetch_or(id, decode_match_result, updated)
            .await;
        Ok((entity, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_result() -> NewMatchResult {
        NewMatchResult {
            home_team: "SC Blau-Weiß".into(),
            away_team: "FC Rot".into(),
            home_score: 3,
            away_score: 1,
            goalscorers: Some("Meyer (2), Kranz".into()),
            report: None,
            category_ids: vec![DocumentId::from("cat-1")],
            match_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            image_url: None,
            author: Some(DocumentId::from("u-1")),
        }
    }

    #[test]
    fn create_payload_connects_categories() {
        let payload = new_result().payload();
        assert_eq!(payload["homeTeam"], "SC Blau-Weiß");
        assert_eq!(payload["categories"]["connect"][0], "cat-1");
        assert_eq!(payload["author"], "u-1");
        assert!(payload.get("report").is_none());
    }

    #[test]
    fn update_payload_sets_categories_and_skips_unset_fields() {
        let update = MatchResultUpdate {
            home_score: Some(4),
            category_ids: Some(vec![DocumentId::from("cat-2")]),
            ..MatchResultUpdate::default()
        };
        let payload = update.payload();
        assert_eq!(payload["homeScore"], 4);
        assert_eq!(payload["categories"]["set"][0], "cat-2");
        assert!(payload.get("homeTeam").is_none());
    }

    #[test]
    fn blank_team_names_fail_validation() {
        let mut data = new_result();
        data.away_team = "  ".into();
        assert!(data.validate().is_err());
    }

    #[test]
    fn create_payload_field_names_match_the_wire_shape() {
        // The names we write are the names we read back in the decoder.
        let payload = new_result().payload();
        for key in ["homeTeam", "awayTeam", "homeScore", "awayScore", "matchDate"] {
            assert!(payload.get(key).is_some(), "missing {key}");
        }
    }
}
