use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Map, Value};

use super::{Attachments, Collection, Page, UploadReport};
use crate::decode::{decode_event, safe_decode_event};
use crate::error::{AppError, Result};
use crate::model::{DocumentId, Event, EventKind};
use crate::store::{ContentStore, ListOptions};

/// Input for announcing an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub kind: EventKind,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    pub publish_by: Option<NaiveDate>,
    pub description: Option<String>,
    pub photographer_required: bool,
    pub author: Option<DocumentId>,
}

impl NewEvent {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("the event needs a name"));
        }
        if let Some(date_to) = self.date_to {
            if date_to < self.date_from {
                return Err(AppError::validation("the event cannot end before it starts"));
            }
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), json!(self.name));
        map.insert("type".into(), json!(self.kind));
        map.insert("dateFrom".into(), json!(self.date_from));
        map.insert(
            "photographerRequired".into(),
            json!(self.photographer_required),
        );
        if let Some(date_to) = self.date_to {
            map.insert("dateTo".into(), json!(date_to));
        }
        if let Some(time_from) = self.time_from {
            map.insert("timeFrom".into(), json!(time_from));
        }
        if let Some(time_to) = self.time_to {
            map.insert("timeTo".into(), json!(time_to));
        }
        if let Some(publish_by) = self.publish_by {
            map.insert("publishBy".into(), json!(publish_by));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        if let Some(author) = &self.author {
            map.insert("author".into(), json!(author));
        }
        Value::Object(map)
    }
}

/// Partial update; unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub kind: Option<EventKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    pub publish_by: Option<NaiveDate>,
    pub description: Option<String>,
    pub photographer_required: Option<bool>,
    pub editor: Option<DocumentId>,
}

impl EventUpdate {
    pub(crate) fn validate(&self) -> Result<()> {
        if let (Some(date_from), Some(date_to)) = (self.date_from, self.date_to) {
            if date_to < date_from {
                return Err(AppError::validation("the event cannot end before it starts"));
            }
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> Value {
        let mut map = Map::new();
        if let Some(name) = &self.name {
            map.insert("name".into(), json!(name));
        }
        if let Some(kind) = self.kind {
            map.insert("type".into(), json!(kind));
        }
        if let Some(date_from) = self.date_from {
            map.insert("dateFrom".into(), json!(date_from));
        }
        if let Some(date_to) = self.date_to {
            map.insert("dateTo".into(), json!(date_to));
        }
        if let Some(time_from) = self.time_from {
            map.insert("timeFrom".into(), json!(time_from));
        }
        if let Some(time_to) = self.time_to {
            map.insert("timeTo".into(), json!(time_to));
        }
        if let Some(publish_by) = self.publish_by {
            map.insert("publishBy".into(), json!(publish_by));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        if let Some(flag) = self.photographer_required {
            map.insert("photographerRequired".into(), json!(flag));
        }
        if let Some(editor) = &self.editor {
            map.insert("updatedBy".into(), json!(editor));
        }
        Value::Object(map)
    }
}

pub struct EventRepository {
    collection: Collection,
}

impl EventRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            collection: Collection::new(
                store,
                "events",
                "api::event.event",
                "event",
                &["photos", "files", "author", "updatedBy"],
            ),
        }
    }

    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Event>> {
        match self.collection.fetch_by_id(id).await? {
            Some(raw) => Ok(Some(decode_event(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn find_all(&self, options: &ListOptions) -> Result<Vec<Event>> {
        let mut options = options.clone();
        if options.page_size.is_none() {
            options.page = Some(1);
            options.page_size = Some(crate::store::MAX_LIST_LIMIT);
        }
        let (items, _) = self.collection.fetch_list(&options).await?;
        Ok(items.iter().filter_map(safe_decode_event).collect())
    }

    pub async fn find_page(&self, options: &ListOptions) -> Result<Page<Event>> {
        let (items, pagination) = self.collection.fetch_list(options).await?;
        Ok(Page {
            items: items.iter().filter_map(safe_decode_event).collect(),
            pagination,
        })
    }

    pub async fn create(&self, data: &NewEvent) -> Result<Event> {
        data.validate()?;
        let raw = self.collection.create_raw(data.payload()).await?;
        decode_event(&raw)
    }

    pub async fn update(&self, id: &DocumentId, update: &EventUpdate) -> Result<Event> {
        update.validate()?;
        let raw = self.collection.update_raw(id, update.payload()).await?;
        decode_event(&raw)
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.collection.delete(id).await
    }

    pub async fn upload_files(&self, row_id: i64, attachments: Attachments) -> UploadReport {
        self.collection.upload_attachments(row_id, attachments).await
    }

    pub async fn create_with_files(
        &self,
        data: &NewEvent,
        attachments: Attachments,
    ) -> Result<(Event, UploadReport)> {
        let created = self.create(data).await?;
        if attachments.is_empty() {
            return Ok((created, UploadReport::default()));
        }
        let report = self
            .collection
            .upload_attachments(created.row_id, attachments)
            .await;
        let id = created.id.clone();
        let entity = self.collection.refetch_or(&id, decode_event, created).await;
        Ok((entity, report))
    }

    pub async fn update_with_files(
        &self,
        id: &DocumentId,
        update: &EventUpdate,
        attachments: Attachments,
    ) -> Result<(Event, UploadReport)> {
        let updated = self.update(id, update).await?;
        if attachments.is_empty() {
            return Ok((updated, UploadReport::default()));
        }
        let report = self
            .collection
            .upload_attachments(updated.row_id, attachments)
            .await;
        let entity = self.collection.refetch_or(id, decode_event, updated).await;
        Ok((entity, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event() -> NewEvent {
        NewEvent {
            name: "Season opening".into(),
            kind: EventKind::Upcoming,
            date_from: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            date_to: Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            time_from: None,
            time_to: None,
            publish_by: None,
            description: None,
            photographer_required: true,
            author: None,
        }
    }

    #[test]
    fn payload_uses_the_wire_field_names() {
        let payload = new_event().payload();
        assert_eq!(payload["type"], "upcoming");
        assert_eq!(payload["dateFrom"], "2026-03-01");
        assert_eq!(payload["photographerRequired"], true);
        assert!(payload.get("description").is_none());
    }

    #[test]
    fn inverted_date_range_fails_validation() {
        let mut data = new_event();
        data.date_to = Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert!(data.validate().is_err());

        let update = EventUpdate {
            date_from: Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            date_to: Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
            ..EventUpdate::default()
        };
        assert!(update.validate().is_err());
    }
}
