use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{Collection, Page};
use crate::decode::{decode_tournament_match, safe_decode_tournament_match};
use crate::error::{AppError, Result};
use crate::model::{DocumentId, TournamentMatch};
use crate::store::{ContentStore, ListOptions};

/// Input for recording a match inside a tournament.
#[derive(Debug, Clone)]
pub struct NewTournamentMatch {
    pub tournament: DocumentId,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub goalscorers: Option<String>,
    pub author: Option<DocumentId>,
}

impl NewTournamentMatch {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(AppError::validation("both team names are required"));
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("tournament".into(), json!(self.tournament));
        map.insert("homeTeam".into(), json!(self.home_team));
        map.insert("awayTeam".into(), json!(self.away_team));
        map.insert("homeScore".into(), json!(self.home_score));
        map.insert("awayScore".into(), json!(self.away_score));
        if let Some(goalscorers) = &self.goalscorers {
            map.insert("goalscorers".into(), json!(goalscorers));
        }
        if let Some(author) = &self.author {
            map.insert("author".into(), json!(author));
        }
        Value::Object(map)
    }
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct TournamentMatchUpdate {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub goalscorers: Option<String>,
    pub editor: Option<DocumentId>,
}

impl TournamentMatchUpdate {
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
        if let Some(editor) = &self.editor {
            map.insert("updatedBy".into(), json!(editor));
        }
        Value::Object(map)
    }
}

pub struct TournamentMatchRepository {
    collection: Collection,
}

impl TournamentMatchRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            collection: Collection::new(
                store,
                "tournament-matches",
                "api::tournament-match.tournament-match",
                "tournament match",
                &["tournament", "author", "updatedBy"],
            ),
        }
    }

    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<TournamentMatch>> {
        match self.collection.fetch_by_id(id).await? {
            Some(raw) => Ok(Some(decode_tournament_match(&raw)?)),
            None => Ok(None),
        }
    }

    /// Matches of one tournament, oldest first.
    pub async fn find_by_tournament(&self, tournament: &DocumentId) -> Result<Vec<TournamentMatch>> {
        let options = ListOptions::unbounded()
            .sorted_by("createdAt")
            .filter("tournament.documentId", tournament.as_str());
        let (items, _) = self.collection.fetch_list(&options).await?;
        Ok(items
            .iter()
            .filter_map(safe_decode_tournament_match)
            .collect())
    }

    pub async fn find_page(&self, options: &ListOptions) -> Result<Page<TournamentMatch>> {
        let (items, pagination) = self.collection.fetch_list(options).await?;
        Ok(Page {
            items: items
                .iter()
                .filter_map(safe_decode_tournament_match)
                .collect(),
            pagination,
        })
    }

    pub async fn create(&self, data: &NewTournamentMatch) -> Result<TournamentMatch> {
        data.validate()?;
        let raw = self.collection.create_raw(data.payload()).await?;
        decode_tournament_match(&raw)
    }

    pub async fn update(
        &self,
        id: &DocumentId,
        update: &TournamentMatchUpdate,
    ) -> Result<TournamentMatch> {
        let raw = self.collection.update_raw(id, update.payload()).await?;
        decode_tournament_match(&raw)
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.collection.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_the_owning_tournament() {
        let data = NewTournamentMatch {
            tournament: DocumentId::from("t-3"),
            home_team: "Group A winner".into(),
            away_team: "Group B winner".into(),
            home_score: 2,
            away_score: 2,
            goalscorers: None,
            author: None,
        };
        let payload = data.payload();
        assert_eq!(payload["tournament"], "t-3");
        assert_eq!(payload["homeScore"], 2);
    }
}
