use std::sync::Arc;

use chrono::NaiveDate;
use itertools::Itertools;
use serde_json::{json, Map, Value};

use super::{Attachments, Collection, Page, UploadReport};
use crate::decode::{decode_tournament, safe_decode_tournament};
use crate::error::{AppError, Result};
use crate::model::{DocumentId, Tournament, TournamentPlayer};
use crate::store::{ContentStore, ListOptions};

fn players_payload(players: &[TournamentPlayer]) -> Value {
    // Roster entries are components: sent inline, replaced wholesale.
    json!(players
        .iter()
        .map(|p| json!({ "title": p.title, "name": p.player_name, "awards": p.awards }))
        .collect_vec())
}

/// Input for creating a tournament.
#[derive(Debug, Clone)]
pub struct NewTournament {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub category_ids: Vec<DocumentId>,
    pub players: Vec<TournamentPlayer>,
    pub author: Option<DocumentId>,
}

impl NewTournament {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("the tournament needs a name"));
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), json!(self.name));
        map.insert("dateFrom".into(), json!(self.date_from));
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        if let Some(location) = &self.location {
            map.insert("location".into(), json!(location));
        }
        if let Some(date_to) = self.date_to {
            map.insert("dateTo".into(), json!(date_to));
        }
        if !self.category_ids.is_empty() {
            map.insert("categories".into(), json!({ "connect": self.category_ids }));
        }
        if !self.players.is_empty() {
            map.insert("players".into(), players_payload(&self.players));
        }
        if let Some(author) = &self.author {
            map.insert("author".into(), json!(author));
        }
        Value::Object(map)
    }
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// When set, *replaces* the whole category relation.
    pub category_ids: Option<Vec<DocumentId>>,
    /// When set, replaces the whole roster.
    pub players: Option<Vec<TournamentPlayer>>,
    pub editor: Option<DocumentId>,
}

impl TournamentUpdate {
    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        if let Some(name) = &self.name {
            map.insert("name".into(), json!(name));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        if let Some(location) = &self.location {
            map.insert("location".into(), json!(location));
        }
        if let Some(date_from) = self.date_from {
            map.insert("dateFrom".into(), json!(date_from));
        }
        if let Some(date_to) = self.date_to {
            map.insert("dateTo".into(), json!(date_to));
        }
        if let Some(category_ids) = &self.category_ids {
            map.insert("categories".into(), json!({ "set": category_ids }));
        }
        if let Some(players) = &self.players {
            map.insert("players".into(), players_payload(players));
        }
        if let Some(editor) = &self.editor {
            map.insert("updatedBy".into(), json!(editor));
        }
        Value::Object(map)
    }
}

pub struct TournamentRepository {
    collection: Collection,
}

impl TournamentRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            collection: Collection::new(
                store,
                "tournaments",
                "api::tournament.tournament",
                "tournament",
                &[
                    "categories",
                    "photos",
                    "files",
                    "players",
                    "matches",
                    "author",
                    "updatedBy",
                ],
            ),
        }
    }

    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Tournament>> {
        match self.collection.fetch_by_id(id).await? {
            Some(raw) => Ok(Some(decode_tournament(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn find_all(&self, options: &ListOptions) -> Result<Vec<Tournament>> {
        let mut options = options.clone();
        if options.page_size.is_none() {
            options.page = Some(1);
            options.page_size = Some(crate::store::MAX_LIST_LIMIT);
        }
        let (items, _) = self.collection.fetch_list(&options).await?;
        Ok(items.iter().filter_map(safe_decode_tournament).collect())
    }

    pub async fn find_page(&self, options: &ListOptions) -> Result<Page<Tournament>> {
        let (items, pagination) = self.collection.fetch_list(options).await?;
        Ok(Page {
            items: items.iter().filter_map(safe_decode_tournament).collect(),
            pagination,
        })
    }

    pub async fn create(&self, data: &NewTournament) -> Result<Tournament> {
        data.validate()?;
        let raw = self.collection.create_raw(data.payload()).await?;
        decode_tournament(&raw)
    }

    pub async fn update(&self, id: &DocumentId, update: &TournamentUpdate) -> Result<Tournament> {
        let raw = self.collection.update_raw(id, update.payload()).await?;
        decode_tournament(&raw)
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.collection.delete(id).await
    }

    pub async fn upload_files(&self, row_id: i64, attachments: Attachments) -> UploadReport {
        self.collection.upload_attachments(row_id, attachments).await
    }

    pub async fn create_with_files(
        &self,
        data: &NewTournament,
        attachments: Attachments,
    ) -> Result<(Tournament, UploadReport)> {
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
            .refetch_or(&id, decode_tournament, created)
            .await;
        Ok((entity, report))
    }

    pub async fn update_with_files(
        &self,
        id: &DocumentId,
        update: &TournamentUpdate,
        attachments: Attachments,
    ) -> Result<(Tournament, UploadReport)> {
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
            .refetch_or(id, decode_tournament, updated)
            .await;
        Ok((entity, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_serializes_with_wire_names() {
        let data = NewTournament {
            name: "Summer Cup".into(),
            description: None,
            location: Some("Club grounds".into()),
            date_from: NaiveDate::from_ymd_opt(2025, 7, 12).unwrap(),
            date_to: None,
            category_ids: vec![DocumentId::from("cat-youth")],
            players: vec![TournamentPlayer {
                title: "Top scorer".into(),
                player_name: "J. Meyer".into(),
                awards: vec!["Golden boot".into()],
            }],
            author: None,
        };
        let payload = data.payload();
        assert_eq!(payload["players"][0]["name"], "J. Meyer");
        assert_eq!(payload["players"][0]["awards"][0], "Golden boot");
        assert_eq!(payload["categories"]["connect"][0], "cat-youth");
    }

    #[test]
    fn update_replaces_roster_and_categories() {
        let update = TournamentUpdate {
            players: Some(vec![]),
            category_ids: Some(vec![]),
            ..TournamentUpdate::default()
        };
        let payload = update.payload();
        assert_eq!(payload["players"], json!([]));
        assert_eq!(payload["categories"]["set"], json!([]));
    }
}
