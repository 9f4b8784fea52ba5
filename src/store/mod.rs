//! Transport to the external content store.
//!
//! [`ContentStore`] is the seam between repositories and the wire: the
//! production implementation is [`StrapiClient`], tests plug in fakes. All
//! methods speak raw JSON; typed decoding happens in [`crate::decode`].

mod client;
mod query;

pub use client::StrapiClient;
pub use query::{ListOptions, MAX_LIST_LIMIT};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// A store response body: the record payload plus optional list metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: Option<Meta>,
}

impl StoreResponse {
    pub fn of(data: Value) -> Self {
        Self { data, meta: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 25,
            page_count: 1,
            total: 0,
        }
    }
}

/// One file handed to the upload endpoint.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A multipart upload linking files to one field of an existing record.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Store UID of the owning collection, e.g. `api::event.event`.
    pub owner_ref: String,
    /// The owner's numeric row id; the upload endpoint does not speak
    /// document ids.
    pub owner_row_id: i64,
    /// The media field on the owner the files attach to.
    pub field: String,
    pub files: Vec<FileUpload>,
}

/// Raw JSON transport to the content store.
///
/// Implementations classify failures into [`crate::AppError`]: 401/403 to
/// the auth variants, 404 to `NotFound`, store-reported errors to
/// `Upstream`, transport failures to `Network`/`Timeout`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<StoreResponse>;

    async fn post(&self, path: &str, query: &[(String, String)], body: &Value)
        -> Result<StoreResponse>;

    async fn put(&self, path: &str, query: &[(String, String)], body: &Value)
        -> Result<StoreResponse>;

    async fn delete(&self, path: &str) -> Result<()>;

    /// Upload files and link them to their owner. Returns the created file
    /// records.
    async fn upload(&self, request: UploadRequest) -> Result<Value>;

    /// Exchange credentials for a bearer token plus the user record.
    /// Returns the raw `{ "jwt": …, "user": … }` body.
    async fn login(&self, identifier: &str, password: &str) -> Result<Value>;

    /// Resolve the bound bearer token to the current user record.
    async fn me(&self) -> Result<Value>;
}
