use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use super::media::MediaDto;
use super::shared::AuditDto;
use super::{lossy, malformed, none_if_blank, relation_list, require, with_payload, RelationList};
use crate::error::{AppError, Result};
use crate::model::{DocumentId, Event, EventKind};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EventDto {
    id: Option<i64>,
    document_id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    time_from: Option<NaiveTime>,
    time_to: Option<NaiveTime>,
    publish_by: Option<NaiveDate>,
    description: Option<String>,
    photographer_required: Option<bool>,
    photos: Option<RelationList<MediaDto>>,
    files: Option<RelationList<MediaDto>>,
    #[serde(flatten)]
    audit: AuditDto,
}

const ENTITY: &str = "event";

impl EventDto {
    fn into_domain(self) -> Result<Event> {
        let kind_raw = require(ENTITY, "type", self.kind)?;
        let kind = EventKind::from_str(&kind_raw).map_err(|_| {
            AppError::validation(format!("event type `{kind_raw}` is not one of upcoming, past"))
        })?;

        let date_from = require(ENTITY, "dateFrom", self.date_from)?;
        if let Some(date_to) = self.date_to {
            if date_to < date_from {
                return Err(AppError::validation(format!(
                    "event ends ({date_to}) before it starts ({date_from})"
                )));
            }
        }

        Ok(Event {
            id: DocumentId(require(ENTITY, "documentId", self.document_id)?),
            row_id: require(ENTITY, "id", self.id)?,
            name: require(ENTITY, "name", self.name)?,
            kind,
            date_from,
            date_to: self.date_to,
            time_from: self.time_from,
            time_to: self.time_to,
            publish_by: self.publish_by,
            description: none_if_blank(self.description),
            photographer_required: self.photographer_required.unwrap_or(false),
            photos: relation_list(self.photos)
                .into_iter()
                .filter_map(|m| lossy("image", m.into_image()))
                .collect(),
            files: relation_list(self.files)
                .into_iter()
                .filter_map(|m| lossy("file", m.into_file()))
                .collect(),
            authorship: self.audit.into_domain(ENTITY)?,
        })
    }
}

pub fn decode_event(raw: &Value) -> Result<Event> {
    let dto: EventDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(ENTITY, raw, e))?;
    dto.into_domain().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_event(raw: &Value) -> Option<Event> {
    lossy(ENTITY, decode_event(raw))
}
