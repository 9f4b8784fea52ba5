//! In-memory stand-in for the content store, with just enough behavior to
//! exercise the repositories and services end to end: id assignment,
//! relation materialization, per-field upload failure injection, and
//! read-after-write visibility.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use clubside::error::{AppError, Result};
use clubside::service::{Notification, Notifier};
use clubside::store::{ContentStore, Meta, Pagination, StoreResponse, UploadRequest};

pub const CREATED_AT: &str = "2026-01-01T12:00:00.000Z";
pub const UPDATED_AT: &str = "2026-01-02T12:00:00.000Z";

#[derive(Default)]
pub struct FakeStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    next_row: AtomicI64,
    pub post_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    failing_upload_fields: Mutex<HashSet<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            next_row: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Make every upload for `field` fail from now on.
    pub fn fail_uploads_for(&self, field: &str) {
        self.failing_upload_fields
            .lock()
            .unwrap()
            .insert(field.to_string());
    }

    /// Insert a raw record verbatim, bypassing create semantics.
    pub fn seed_raw(&self, collection: &str, record: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    fn assign_row(&self) -> i64 {
        self.next_row.fetch_add(1, Ordering::SeqCst)
    }

    /// Turn a write payload into a stored record the way the real store
    /// would: relation operations become materialized related records.
    fn materialize(payload: &Value) -> Map<String, Value> {
        let mut record = Map::new();
        let Some(fields) = payload.as_object() else {
            return record;
        };
        for (key, value) in fields {
            let stored = match (key.as_str(), value) {
                (_, Value::Object(op)) if op.contains_key("connect") || op.contains_key("set") => {
                    let ids = op
                        .get("connect")
                        .or_else(|| op.get("set"))
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default();
                    json!(ids
                        .iter()
                        .map(|id| json!({
                            "documentId": id,
                            "name": format!("Category {}", id.as_str().unwrap_or("?"))
                        }))
                        .collect::<Vec<_>>())
                }
                ("author" | "updatedBy", Value::String(id)) => {
                    json!({ "documentId": id, "username": format!("user-{id}") })
                }
                ("tournament" | "matchResult" | "event" | "parent", Value::String(id)) => {
                    json!({ "documentId": id })
                }
                _ => value.clone(),
            };
            record.insert(key.clone(), stored);
        }
        record
    }

    fn find_index(records: &[Value], document_id: &str) -> Option<usize> {
        records
            .iter()
            .position(|r| r["documentId"].as_str() == Some(document_id))
    }

    /// Apply `filters[...][$eq]` / `filters[...][$null]` query params.
    fn matches_filters(record: &Value, query: &[(String, String)]) -> bool {
        for (key, expected) in query {
            let Some(path) = key.strip_prefix("filters") else {
                continue;
            };
            let segments: Vec<&str> = path
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split("][")
                .collect();
            let Some((operator, field_path)) = segments.split_last() else {
                continue;
            };
            let mut value = record;
            for segment in field_path {
                value = &value[*segment];
            }
            match *operator {
                "$eq" => {
                    let actual = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    if actual != *expected {
                        return false;
                    }
                }
                "$null" => {
                    if value.is_null() != (expected == "true") {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<StoreResponse> {
        let collections = self.collections.lock().unwrap();
        match path.split_once('/') {
            Some((collection, id)) => {
                let records = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);
                match Self::find_index(records, id) {
                    Some(index) => Ok(StoreResponse::of(records[index].clone())),
                    None => Err(AppError::not_found(path.to_string())),
                }
            }
            None => {
                let records = collections.get(path).map(Vec::as_slice).unwrap_or(&[]);
                let items: Vec<Value> = records
                    .iter()
                    .filter(|r| Self::matches_filters(r, query))
                    .cloned()
                    .collect();
                let total = items.len() as u64;
                Ok(StoreResponse {
                    data: Value::Array(items),
                    meta: Some(Meta {
                        pagination: Some(Pagination {
                            page: 1,
                            page_size: total.max(1) as u32,
                            page_count: 1,
                            total,
                        }),
                    }),
                })
            }
        }
    }

    async fn post(
        &self,
        path: &str,
        _query: &[(String, String)],
        body: &Value,
    ) -> Result<StoreResponse> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        let row = self.assign_row();
        let mut record = Self::materialize(body);
        record.insert("id".into(), json!(row));
        record.insert("documentId".into(), json!(format!("{path}-{row}")));
        record.insert("createdAt".into(), json!(CREATED_AT));
        record.insert("updatedAt".into(), json!(CREATED_AT));
        let record = Value::Object(record);
        self.collections
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(record.clone());
        Ok(StoreResponse::of(record))
    }

    async fn put(
        &self,
        path: &str,
        _query: &[(String, String)],
        body: &Value,
    ) -> Result<StoreResponse> {
        let (collection, id) = path
            .split_once('/')
            .ok_or_else(|| AppError::internal("update needs a document id"))?;
        let mut collections = self.collections.lock().unwrap();
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::not_found(path.to_string()))?;
        let index = Self::find_index(records, id)
            .ok_or_else(|| AppError::not_found(path.to_string()))?;
        let updates = Self::materialize(body);
        let record = records[index]
            .as_object_mut()
            .expect("stored records are objects");
        for (key, value) in updates {
            record.insert(key, value);
        }
        record.insert("updatedAt".into(), json!(UPDATED_AT));
        Ok(StoreResponse::of(records[index].clone()))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let (collection, id) = path
            .split_once('/')
            .ok_or_else(|| AppError::internal("delete needs a document id"))?;
        let mut collections = self.collections.lock().unwrap();
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::not_found(path.to_string()))?;
        let index = Self::find_index(records, id)
            .ok_or_else(|| AppError::not_found(path.to_string()))?;
        records.remove(index);
        Ok(())
    }

    async fn upload(&self, request: UploadRequest) -> Result<Value> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_upload_fields
            .lock()
            .unwrap()
            .contains(&request.field)
        {
            return Err(AppError::Upload {
                field: request.field.clone(),
                message: "injected upload failure".into(),
            });
        }

        // `api::event.event` owns records under the `events` path, and so
        // on for the other collections.
        let collection = match request.owner_ref.as_str() {
            "api::match-result.match-result" => "match-results",
            "api::event.event" => "events",
            "api::tournament.tournament" => "tournaments",
            other => {
                return Err(AppError::internal(format!("unknown upload owner {other}")))
            }
        };

        let mut created = Vec::new();
        let mut collections = self.collections.lock().unwrap();
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::not_found(collection.to_string()))?;
        let record = records
            .iter_mut()
            .find(|r| r["id"].as_i64() == Some(request.owner_row_id))
            .ok_or_else(|| AppError::not_found(format!("{collection} row")))?;

        for file in &request.files {
            let row = self.assign_row();
            let media = json!({
                "id": row,
                "documentId": format!("media-{row}"),
                "name": file.file_name,
                "url": format!("/uploads/{}", file.file_name),
                "size": file.bytes.len() as f64 / 1024.0,
                "mime": file.content_type,
            });
            let field = record
                .as_object_mut()
                .expect("stored records are objects")
                .entry(request.field.clone())
                .or_insert_with(|| json!([]));
            field
                .as_array_mut()
                .expect("media fields are arrays")
                .push(media.clone());
            created.push(media);
        }
        Ok(Value::Array(created))
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<Value> {
        if identifier == "petra" && password == "secret" {
            Ok(json!({
                "jwt": "token-petra",
                "user": {
                    "id": 1,
                    "documentId": "u-1",
                    "username": "petra",
                    "email": "petra@example.com",
                    "confirmed": true,
                    "blocked": false
                }
            }))
        } else {
            Err(AppError::Auth)
        }
    }

    async fn me(&self) -> Result<Value> {
        Ok(json!({
            "id": 1,
            "documentId": "u-1",
            "username": "petra",
            "email": "petra@example.com",
            "confirmed": true,
            "blocked": false
        }))
    }
}

/// Notifier that records everything it is asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Notifier that always fails, for proving failures never leak out.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<()> {
        Err(AppError::internal("notification channel is down"))
    }
}
