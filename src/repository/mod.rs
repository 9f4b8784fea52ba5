//! Typed CRUD over the store's collections, one repository per entity
//! family.
//!
//! Repositories treat "not found" as a normal `None` result; classifying
//! it as an error is the service layer's call. Upload outcomes are
//! captured per field and reported, never thrown.

mod comments;
mod events;
mod match_results;
mod tournament_matches;
mod tournaments;
mod users;

pub use comments::{CommentRepository, NewComment};
pub use events::{EventRepository, EventUpdate, NewEvent};
pub use match_results::{MatchResultRepository, MatchResultUpdate, NewMatchResult};
pub use tournament_matches::{NewTournamentMatch, TournamentMatchRepository, TournamentMatchUpdate};
pub use tournaments::{NewTournament, TournamentRepository, TournamentUpdate};
pub use users::UserRepository;

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::model::DocumentId;
use crate::store::{ContentStore, FileUpload, ListOptions, Pagination, UploadRequest};

/// Largest accepted upload. Bigger files are refused before any bytes move.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// One page of a list fetch.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Files to attach to an entity, keyed by its two media fields.
#[derive(Debug, Clone, Default)]
pub struct Attachments {
    pub photos: Vec<FileUpload>,
    pub files: Vec<FileUpload>,
}

impl Attachments {
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.files.is_empty()
    }
}

/// Outcome of the upload attempt for a single media field.
#[derive(Debug)]
pub struct FieldUpload {
    pub field: String,
    pub outcome: Result<()>,
}

impl FieldUpload {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-field outcomes of one upload pass. Fields are attempted in a fixed
/// order and independently; one failure never cancels the rest.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub fields: Vec<FieldUpload>,
}

impl UploadReport {
    pub fn is_clean(&self) -> bool {
        self.fields.iter().all(FieldUpload::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FieldUpload> {
        self.fields.iter().filter(|f| !f.succeeded())
    }
}

/// Refuse uploads the store would reject anyway, with a clearer error.
fn validate_file(field: &str, file: &FileUpload) -> Result<()> {
    if file.bytes.len() as u64 > MAX_UPLOAD_BYTES {
        return Err(AppError::FileTooLarge {
            name: file.file_name.clone(),
            size_bytes: file.bytes.len() as u64,
        });
    }
    let photos_need_images = field == "photos" && !file.content_type.starts_with("image/");
    if file.content_type.is_empty() || photos_need_images {
        return Err(AppError::InvalidFileType {
            name: file.file_name.clone(),
        });
    }
    Ok(())
}

/// Store-facing plumbing shared by all repositories.
pub(crate) struct Collection {
    store: Arc<dyn ContentStore>,
    /// REST path segment, e.g. `match-results`.
    path: &'static str,
    /// Store UID used by the upload endpoint, e.g.
    /// `api::match-result.match-result`.
    upload_ref: &'static str,
    /// Human name for error messages.
    display: &'static str,
    /// Relations the read queries populate.
    populate: &'static [&'static str],
}

impl Collection {
    pub(crate) fn new(
        store: Arc<dyn ContentStore>,
        path: &'static str,
        upload_ref: &'static str,
        display: &'static str,
        populate: &'static [&'static str],
    ) -> Self {
        Self {
            store,
            path,
            upload_ref,
            display,
            populate,
        }
    }

    fn populate_params(&self) -> Vec<(String, String)> {
        self.populate
            .iter()
            .enumerate()
            .map(|(i, relation)| (format!("populate[{i}]"), (*relation).to_string()))
            .collect()
    }

    /// Fetch one record; a missing document is a normal `None`.
    pub(crate) async fn fetch_by_id(&self, id: &DocumentId) -> Result<Option<Value>> {
        let path = format!("{}/{}", self.path, id);
        match self.store.get(&path, &self.populate_params()).await {
            Ok(response) if response.data.is_null() => Ok(None),
            Ok(response) => Ok(Some(response.data)),
            Err(AppError::NotFound { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Fetch a list page as raw records plus pagination metadata.
    pub(crate) async fn fetch_list(
        &self,
        options: &ListOptions,
    ) -> Result<(Vec<Value>, Pagination)> {
        let mut params = options.to_params();
        params.extend(self.populate_params());
        let response = self.store.get(self.path, &params).await?;
        let items = match response.data {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(AppError::internal(format!(
                    "list fetch for {} returned a non-list payload: {other}",
                    self.display
                )))
            }
        };
        let pagination = response
            .meta
            .and_then(|m| m.pagination)
            .unwrap_or_default();
        Ok((items, pagination))
    }

    pub(crate) async fn create_raw(&self, payload: Value) -> Result<Value> {
        let response = self
            .store
            .post(self.path, &self.populate_params(), &payload)
            .await?;
        Ok(response.data)
    }

    pub(crate) async fn update_raw(&self, id: &DocumentId, payload: Value) -> Result<Value> {
        let path = format!("{}/{}", self.path, id);
        let response = self
            .store
            .put(&path, &self.populate_params(), &payload)
            .await?;
        Ok(response.data)
    }

    pub(crate) async fn delete(&self, id: &DocumentId) -> Result<()> {
        let path = format!("{}/{}", self.path, id);
        self.store.delete(&path).await
    }

    /// Upload all files for one field, reporting instead of throwing.
    async fn upload_field(&self, row_id: i64, field: &str, files: Vec<FileUpload>) -> FieldUpload {
        for file in &files {
            if let Err(error) = validate_file(field, file) {
                return FieldUpload {
                    field: field.to_string(),
                    outcome: Err(error),
                };
            }
        }
        let request = UploadRequest {
            owner_ref: self.upload_ref.to_string(),
            owner_row_id: row_id,
            field: field.to_string(),
            files,
        };
        let outcome = self.store.upload(request).await.map(|_| ());
        if let Err(error) = &outcome {
            warn!(collection = self.path, field, %error, "field upload failed");
        }
        FieldUpload {
            field: field.to_string(),
            outcome,
        }
    }

    /// Attempt both media fields sequentially, in a fixed order, each with
    /// its own captured outcome.
    pub(crate) async fn upload_attachments(
        &self,
        row_id: i64,
        attachments: Attachments,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        if !attachments.photos.is_empty() {
            report
                .fields
                .push(self.upload_field(row_id, "photos", attachments.photos).await);
        }
        if !attachments.files.is_empty() {
            report
                .fields
                .push(self.upload_field(row_id, "files", attachments.files).await);
        }
        report
    }

    /// Re-read an entity after uploads so the caller sees attached media.
    /// Any failure here degrades to the snapshot we already have.
    pub(crate) async fn refetch_or<T>(
        &self,
        id: &DocumentId,
        decode: fn(&Value) -> Result<T>,
        snapshot: T,
    ) -> T {
        match self.fetch_by_id(id).await {
            Ok(Some(raw)) => match decode(&raw) {
                Ok(fresh) => fresh,
                Err(error) => {
                    warn!(collection = self.path, %id, %error, "refetch failed to decode");
                    snapshot
                }
            },
            Ok(None) => {
                warn!(collection = self.path, %id, "refetch found nothing");
                snapshot
            }
            Err(error) => {
                warn!(collection = self.path, %id, %error, "refetch failed");
                snapshot
            }
        }
    }
}
