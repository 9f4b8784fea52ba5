use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::media::MediaDto;
use super::shared::{AuditDto, CategoryDto};
use super::{lossy, malformed, none_if_blank, relation_list, require, with_payload, RelationList};
use crate::error::Result;
use crate::model::{Category, DocumentId, MatchResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MatchResultDto {
    id: Option<i64>,
    document_id: Option<String>,
    home_team: Option<String>,
    away_team: Option<String>,
    home_score: Option<u32>,
    away_score: Option<u32>,
    goalscorers: Option<String>,
    report: Option<String>,
    categories: Option<RelationList<CategoryDto>>,
    match_date: Option<NaiveDate>,
    image_url: Option<String>,
    photos: Option<RelationList<MediaDto>>,
    files: Option<RelationList<MediaDto>>,
    #[serde(flatten)]
    audit: AuditDto,
}

const ENTITY: &str = "match result";

impl MatchResultDto {
    fn into_domain(self) -> Result<MatchResult> {
        let authorship = self.audit.into_domain("match result")?;

        // Rows older than the categories field carry null; they belong to
        // the fallback category rather than none at all.
        let categories = match self.categories {
            Some(list) => list
                .into_vec()
                .into_iter()
                .map(CategoryDto::into_domain)
                .collect::<Result<Vec<Category>>>()?,
            None => vec![Category::fallback()],
        };

        // Same deal for the match date: old rows only have their creation
        // timestamp, truncated to a calendar date.
        let match_date = self
            .match_date
            .unwrap_or_else(|| authorship.created_at.date_naive());

        Ok(MatchResult {
            id: DocumentId(require(ENTITY, "documentId", self.document_id)?),
            row_id: require(ENTITY, "id", self.id)?,
            home_team: require(ENTITY, "homeTeam", self.home_team)?,
            away_team: require(ENTITY, "awayTeam", self.away_team)?,
            home_score: require(ENTITY, "homeScore", self.home_score)?,
            away_score: require(ENTITY, "awayScore", self.away_score)?,
            goalscorers: none_if_blank(self.goalscorers),
            report: none_if_blank(self.report),
            categories,
            match_date,
            image_url: none_if_blank(self.image_url),
            photos: relation_list(self.photos)
                .into_iter()
                .filter_map(|m| lossy("image", m.into_image()))
                .collect(),
            files: relation_list(self.files)
                .into_iter()
                .filter_map(|m| lossy("file", m.into_file()))
                .collect(),
            authorship,
        })
    }
}

pub fn decode_match_result(raw: &Value) -> Result<MatchResult> {
    let dto: MatchResultDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(ENTITY, raw, e))?;
    dto.into_domain().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_match_result(raw: &Value) -> Option<MatchResult> {
    lossy(ENTITY, decode_match_result(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Value {
        json!({
            "id": 17,
            "documentId": "mr-17",
            "homeTeam": "SC Blau-Weiß",
            "awayTeam": "FC Rot",
            "homeScore": 3,
            "awayScore": 1,
            "goalscorers": "Meyer (2), Kranz",
            "report": "Deserved win after a strong second half.",
            "categories": { "data": [
                { "documentId": "cat-1", "name": "First team" }
            ]},
            "matchDate": "2025-09-14",
            "imageUrl": null,
            "photos": { "data": [{
                "id": 4, "documentId": "img-4", "name": "team.jpg",
                "url": "/uploads/team.jpg", "size": 100.0, "mime": "image/jpeg"
            }]},
            "files": null,
            "author": { "data": { "documentId": "u-1", "username": "petra" } },
            "createdAt": "2025-09-14T18:00:00.000Z",
            "updatedAt": "2025-09-15T09:30:00.000Z"
        })
    }

    #[test]
    fn decodes_full_record() {
        let result = decode_match_result(&full_record()).unwrap();
        assert_eq!(result.id, DocumentId::from("mr-17"));
        assert_eq!(result.row_id, 17);
        assert_eq!((result.home_score, result.away_score), (3, 1));
        assert_eq!(result.categories[0].name, "First team");
        assert_eq!(result.match_date, NaiveDate::from_ymd_opt(2025, 9, 14).unwrap());
        assert_eq!(result.photos.len(), 1);
        assert!(result.files.is_empty());
        assert_eq!(
            result.authorship.created_by.as_ref().unwrap().username,
            "petra"
        );
    }

    #[test]
    fn flat_author_relation_decodes_the_same() {
        let mut raw = full_record();
        raw["author"] = json!({ "documentId": "u-1", "username": "petra" });
        let result = decode_match_result(&raw).unwrap();
        assert_eq!(
            result.authorship.created_by.unwrap().id,
            DocumentId::from("u-1")
        );
    }

    #[test]
    fn legacy_record_gets_fallback_category_and_date() {
        let raw = json!({
            "id": 2,
            "documentId": "mr-2",
            "homeTeam": "SC Blau-Weiß II",
            "awayTeam": "TSV Grün",
            "homeScore": 0,
            "awayScore": 0,
            "categories": null,
            "createdAt": "2019-03-02T10:15:00.000Z",
            "updatedAt": "2019-03-02T10:15:00.000Z"
        });
        let result = decode_match_result(&raw).unwrap();
        assert_eq!(result.categories, vec![Category::fallback()]);
        assert_eq!(result.match_date, NaiveDate::from_ymd_opt(2019, 3, 2).unwrap());
    }

    #[test]
    fn missing_required_field_is_a_validation_error() {
        let mut raw = full_record();
        raw.as_object_mut().unwrap().remove("homeTeam");
        let error = decode_match_result(&raw).unwrap_err();
        assert!(error.to_string().contains("homeTeam"));
        assert!(error.details().is_some());
        assert!(safe_decode_match_result(&raw).is_none());
    }

    #[test]
    fn negative_score_does_not_decode() {
        let mut raw = full_record();
        raw["homeScore"] = json!(-1);
        assert!(decode_match_result(&raw).is_err());
    }

    #[test]
    fn blank_text_fields_become_absent() {
        let mut raw = full_record();
        raw["goalscorers"] = json!("");
        raw["report"] = json!("   ");
        let result = decode_match_result(&raw).unwrap();
        assert!(result.goalscorers.is_none());
        assert!(result.report.is_none());
    }
}
