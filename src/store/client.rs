use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::debug;

use super::{ContentStore, FileUpload, StoreResponse, UploadRequest};
use crate::error::{AppError, Result};

/// HTTP client for the content store's REST API.
///
/// One instance is bound to at most one bearer token; per-request user
/// scoping is done by cloning via [`StrapiClient::as_user`], never by
/// mutating a shared client.
///
/// # Examples
///
/// ```no_run
/// use clubside::store::StrapiClient;
///
/// let client = StrapiClient::new("https://cms.sc-blauweiss.example")
///     .as_user("someone.jwt.token");
/// ```
#[derive(Debug, Clone)]
pub struct StrapiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl StrapiClient {
    /// Create a client with default transport settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Create a client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            http: client,
            base_url: base_url.into(),
            token: None,
        }
    }

    /// A copy of this client bound to one user's bearer token.
    pub fn as_user(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and parse the body, classifying every failure mode.
    async fn send(&self, builder: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        debug!(url, "store request");
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| AppError::transport(url, e))?;

        let status = response.status();
        let body: Value = if status == reqwest::StatusCode::NO_CONTENT {
            Value::Null
        } else {
            response
                .json()
                .await
                .map_err(|e| AppError::transport(url, e))?
        };

        if status.is_success() {
            return Ok(body);
        }
        Err(classify(status.as_u16(), url, &body))
    }
}

/// Map a non-success store response onto the error taxonomy.
fn classify(status: u16, url: &str, body: &Value) -> AppError {
    match status {
        401 => AppError::Auth,
        403 => AppError::Forbidden,
        404 => AppError::not_found(url.to_string()),
        _ => {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("the store rejected the request")
                .to_string();
            AppError::Upstream { status, message }
        }
    }
}

/// Some store endpoints wrap payloads in `{ "data": …, "meta": … }`,
/// others (the users plugin) answer with the bare record. Presence of the
/// `data` key decides which shape we are looking at.
fn parse_response(body: Value) -> Result<StoreResponse> {
    match &body {
        Value::Object(map) if map.contains_key("data") => serde_json::from_value(body)
            .map_err(|e| AppError::internal(format!("store response has an unexpected shape: {e}"))),
        _ => Ok(StoreResponse::of(body)),
    }
}

fn file_part(field: &str, file: FileUpload) -> Result<Part> {
    let FileUpload {
        file_name,
        content_type,
        bytes,
    } = file;
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(|e| AppError::Upload {
            field: field.to_string(),
            message: format!("unusable content type `{content_type}`: {e}"),
        })
}

#[async_trait]
impl ContentStore for StrapiClient {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<StoreResponse> {
        let url = self.url(path);
        let body = self.send(self.http.get(&url).query(query), &url).await?;
        parse_response(body)
    }

    async fn post(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<StoreResponse> {
        let url = self.url(path);
        let request = self.http.post(&url).query(query).json(&json!({ "data": body }));
        let body = self.send(request, &url).await?;
        parse_response(body)
    }

    async fn put(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &Value,
    ) -> Result<StoreResponse> {
        let url = self.url(path);
        let request = self.http.put(&url).query(query).json(&json!({ "data": body }));
        let body = self.send(request, &url).await?;
        parse_response(body)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.send(self.http.delete(&url), &url).await?;
        Ok(())
    }

    async fn upload(&self, request: UploadRequest) -> Result<Value> {
        let url = self.url("upload");
        let mut form = Form::new()
            .text("ref", request.owner_ref.clone())
            .text("refId", request.owner_row_id.to_string())
            .text("field", request.field.clone());
        for file in request.files {
            form = form.part("files", file_part(&request.field, file)?);
        }
        self.send(self.http.post(&url).multipart(form), &url).await
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<Value> {
        let url = self.url("auth/local");
        let payload = json!({ "identifier": identifier, "password": password });
        self.send(self.http.post(&url).json(&payload), &url)
            .await
            .map_err(|error| match error {
                // The store answers bad credentials with a generic 400.
                AppError::Upstream { status: 400, .. } => AppError::Auth,
                other => other,
            })
    }

    async fn me(&self) -> Result<Value> {
        let url = self.url("users/me");
        self.send(self.http.get(&url), &url).await
    }
}
