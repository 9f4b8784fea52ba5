use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::media::MediaDto;
use super::shared::{AuditDto, CategoryDto, RefDto};
use super::{
    lossy, malformed, none_if_blank, relation, relation_list, require, with_payload, Relation,
    RelationList,
};
use crate::error::Result;
use crate::model::{DocumentId, Tournament, TournamentMatch, TournamentPlayer};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TournamentDto {
    id: Option<i64>,
    document_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    location: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    categories: Option<RelationList<CategoryDto>>,
    photos: Option<RelationList<MediaDto>>,
    files: Option<RelationList<MediaDto>>,
    players: Option<Vec<PlayerDto>>,
    matches: Option<RelationList<TournamentMatchDto>>,
    #[serde(flatten)]
    audit: AuditDto,
}

/// Roster entries are components, not relations; they arrive as a plain
/// array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayerDto {
    title: Option<String>,
    name: Option<String>,
    awards: Option<Vec<String>>,
}

impl PlayerDto {
    fn into_domain(self) -> Result<TournamentPlayer> {
        Ok(TournamentPlayer {
            title: require("tournament player", "title", self.title)?,
            player_name: require("tournament player", "name", self.name)?,
            awards: self.awards.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct TournamentMatchDto {
    id: Option<i64>,
    document_id: Option<String>,
    tournament: Option<Relation<RefDto>>,
    home_team: Option<String>,
    away_team: Option<String>,
    home_score: Option<u32>,
    away_score: Option<u32>,
    goalscorers: Option<String>,
    #[serde(flatten)]
    audit: AuditDto,
}

const ENTITY: &str = "tournament";
const MATCH_ENTITY: &str = "tournament match";

impl TournamentMatchDto {
    /// `parent` supplies the owning tournament when the match is embedded
    /// in a tournament payload, where the store omits the back-reference.
    fn into_domain(self, parent: Option<&DocumentId>) -> Result<TournamentMatch> {
        let tournament = match relation(self.tournament) {
            Some(r) => r.into_id(MATCH_ENTITY)?,
            None => require(MATCH_ENTITY, "tournament", parent.cloned())?,
        };
        Ok(TournamentMatch {
            id: DocumentId(require(MATCH_ENTITY, "documentId", self.document_id)?),
            row_id: require(MATCH_ENTITY, "id", self.id)?,
            tournament,
            home_team: require(MATCH_ENTITY, "homeTeam", self.home_team)?,
            away_team: require(MATCH_ENTITY, "awayTeam", self.away_team)?,
            home_score: require(MATCH_ENTITY, "homeScore", self.home_score)?,
            away_score: require(MATCH_ENTITY, "awayScore", self.away_score)?,
            goalscorers: none_if_blank(self.goalscorers),
            authorship: self.audit.into_domain(MATCH_ENTITY)?,
        })
    }
}

impl TournamentDto {
    fn into_domain(self) -> Result<Tournament> {
        let id = DocumentId(require(ENTITY, "documentId", self.document_id)?);

        let players = self
            .players
            .unwrap_or_default()
            .into_iter()
            .map(PlayerDto::into_domain)
            .collect::<Result<Vec<_>>>()?;

        let matches = relation_list(self.matches)
            .into_iter()
            .filter_map(|m| lossy(MATCH_ENTITY, m.into_domain(Some(&id))))
            .collect();

        Ok(Tournament {
            row_id: require(ENTITY, "id", self.id)?,
            name: require(ENTITY, "name", self.name)?,
            description: none_if_blank(self.description),
            location: none_if_blank(self.location),
            date_from: require(ENTITY, "dateFrom", self.date_from)?,
            date_to: self.date_to,
            categories: relation_list(self.categories)
                .into_iter()
                .map(CategoryDto::into_domain)
                .collect::<Result<Vec<_>>>()?,
            photos: relation_list(self.photos)
                .into_iter()
                .filter_map(|m| lossy("image", m.into_image()))
                .collect(),
            files: relation_list(self.files)
                .into_iter()
                .filter_map(|m| lossy("file", m.into_file()))
                .collect(),
            players,
            matches,
            authorship: self.audit.into_domain(ENTITY)?,
            id,
        })
    }
}

pub fn decode_tournament(raw: &Value) -> Result<Tournament> {
    let dto: TournamentDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(ENTITY, raw, e))?;
    dto.into_domain().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_tournament(raw: &Value) -> Option<Tournament> {
    lossy(ENTITY, decode_tournament(raw))
}

pub fn decode_tournament_match(raw: &Value) -> Result<TournamentMatch> {
    let dto: TournamentMatchDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(MATCH_ENTITY, raw, e))?;
    dto.into_domain(None).map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_tournament_match(raw: &Value) -> Option<TournamentMatch> {
    lossy(MATCH_ENTITY, decode_tournament_match(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "id": 3,
            "documentId": "t-3",
            "name": "Summer Cup",
            "location": "Club grounds",
            "dateFrom": "2025-07-12",
            "dateTo": "2025-07-13",
            "categories": { "data": [{ "documentId": "cat-youth", "name": "Youth" }] },
            "players": [
                { "title": "Top scorer", "name": "J. Meyer", "awards": ["Golden boot"] },
                { "title": "Keeper", "name": "A. Kranz" }
            ],
            "matches": { "data": [{
                "id": 31,
                "documentId": "tm-31",
                "homeTeam": "Group A winner",
                "awayTeam": "Group B winner",
                "homeScore": 2,
                "awayScore": 2,
                "createdAt": "2025-07-13T16:00:00.000Z",
                "updatedAt": "2025-07-13T16:00:00.000Z"
            }]},
            "createdAt": "2025-06-01T12:00:00.000Z",
            "updatedAt": "2025-06-01T12:00:00.000Z"
        })
    }

    #[test]
    fn decodes_tournament_with_roster_and_matches() {
        let tournament = decode_tournament(&record()).unwrap();
        assert_eq!(tournament.players.len(), 2);
        assert_eq!(tournament.players[0].awards, vec!["Golden boot"]);
        assert!(tournament.players[1].awards.is_empty());
        // Embedded matches inherit the owning tournament's identity.
        assert_eq!(tournament.matches[0].tournament, tournament.id);
    }

    #[test]
    fn standalone_match_requires_its_tournament_relation() {
        let raw = json!({
            "id": 31,
            "documentId": "tm-31",
            "tournament": { "data": { "documentId": "t-3" } },
            "homeTeam": "A",
            "awayTeam": "B",
            "homeScore": 1,
            "awayScore": 0,
            "createdAt": "2025-07-13T16:00:00.000Z",
            "updatedAt": "2025-07-13T16:00:00.000Z"
        });
        let m = decode_tournament_match(&raw).unwrap();
        assert_eq!(m.tournament, DocumentId::from("t-3"));

        let mut orphan = raw;
        orphan.as_object_mut().unwrap().remove("tournament");
        assert!(decode_tournament_match(&orphan).is_err());
    }

    #[test]
    fn malformed_embedded_match_is_dropped_not_fatal() {
        let mut raw = record();
        raw["matches"]["data"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "documentId": "tm-broken" }));
        let tournament = decode_tournament(&raw).unwrap();
        assert_eq!(tournament.matches.len(), 1);
    }

    #[test]
    fn roster_entry_without_name_fails() {
        let mut raw = record();
        raw["players"][0].as_object_mut().unwrap().remove("name");
        assert!(decode_tournament(&raw).is_err());
    }
}
