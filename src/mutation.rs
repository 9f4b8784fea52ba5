//! Client-side mutation controller: one instance per logical write
//! endpoint, tracking request lifecycle state and refusing concurrent
//! submissions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::outcome::{Envelope, WithWarnings};
use crate::store::FileUpload;

/// Default per-request deadline. Generous, because mutation payloads may
/// carry file uploads over slow links.
pub const DEFAULT_MUTATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Wire payload produced from the caller's variables.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Multipart {
        texts: Vec<(String, String)>,
        files: Vec<(String, FileUpload)>,
    },
}

/// One logical write endpoint the controller can submit to.
#[async_trait]
pub trait MutationEndpoint<T>: Send + Sync {
    async fn send(&self, payload: Payload) -> Result<Envelope<T>>;

    /// Where requests go; used in timeout diagnostics.
    fn url(&self) -> &str;
}

/// HTTP implementation of [`MutationEndpoint`].
pub struct HttpEndpoint {
    http: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            http: client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send> MutationEndpoint<T> for HttpEndpoint {
    async fn send(&self, payload: Payload) -> Result<Envelope<T>> {
        let request = match payload {
            Payload::Json(body) => self.http.post(&self.url).json(&body),
            Payload::Multipart { texts, files } => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in texts {
                    form = form.text(name, value);
                }
                for (name, file) in files {
                    let part = reqwest::multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name.clone())
                        .mime_str(&file.content_type)
                        .map_err(|e| AppError::Upload {
                            field: name.clone(),
                            message: format!("unusable content type: {e}"),
                        })?;
                    form = form.part(name, part);
                }
                self.http.post(&self.url).multipart(form)
            }
        };
        // The envelope contract covers failures too, so the body is parsed
        // regardless of status; an unparseable body is an error outright.
        let response = request
            .send()
            .await
            .map_err(|e| AppError::transport(&self.url, e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::transport(&self.url, e))?;
        Envelope::from_body(&body)
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// Observable request state, mirrored for UI consumption.
#[derive(Debug, Clone)]
pub struct MutationState<T> {
    pub loading: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            data: None,
            error: None,
            warnings: Vec::new(),
        }
    }
}

type Transform<V> = Box<dyn Fn(&V) -> Result<Payload> + Send + Sync>;
type SuccessHook<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&AppError) + Send + Sync>;

/// Request-lifecycle controller for one write endpoint.
///
/// At most one request per instance is ever outstanding: a second
/// `mutate` while the first is pending fails immediately without issuing
/// a request, which makes double-clicked submit buttons harmless by
/// construction.
pub struct Mutation<V, T> {
    endpoint: Arc<dyn MutationEndpoint<T>>,
    transform: Transform<V>,
    timeout: Duration,
    state: Mutex<MutationState<T>>,
    in_flight: tokio::sync::Mutex<()>,
    on_success: Option<SuccessHook<T>>,
    on_error: Option<ErrorHook>,
}

impl<V, T: Clone> Mutation<V, T> {
    pub fn new(
        endpoint: Arc<dyn MutationEndpoint<T>>,
        transform: impl Fn(&V) -> Result<Payload> + Send + Sync + 'static,
    ) -> Self {
        Self {
            endpoint,
            transform: Box::new(transform),
            timeout: DEFAULT_MUTATION_TIMEOUT,
            state: Mutex::new(MutationState::default()),
            in_flight: tokio::sync::Mutex::new(()),
            on_success: None,
            on_error: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&AppError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Copy of the current request state.
    pub fn snapshot(&self) -> MutationState<T> {
        self.state.lock().unwrap().clone()
    }

    /// Submit the variables to the endpoint.
    ///
    /// Refuses immediately while a prior call is pending. Otherwise:
    /// transform to a payload, send under the configured deadline (the
    /// in-flight request is dropped on timeout), parse the envelope, and
    /// settle state plus hooks either way. The guard clears on every exit
    /// path, so the next call always proceeds.
    pub async fn mutate(&self, variables: V) -> Result<WithWarnings<T>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(AppError::validation("a submission is already in progress"));
        };

        {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            state.error = None;
            state.warnings.clear();
        }

        let result = match (self.transform)(&variables) {
            Ok(payload) => match tokio::time::timeout(self.timeout, self.endpoint.send(payload))
                .await
            {
                Ok(Ok(envelope)) => envelope.into_result(),
                Ok(Err(error)) => Err(error),
                Err(_elapsed) => Err(AppError::Timeout {
                    url: self.endpoint.url().to_string(),
                }),
            },
            Err(error) => Err(error),
        };

        match &result {
            Ok(outcome) => {
                let mut state = self.state.lock().unwrap();
                state.loading = false;
                state.data = Some(outcome.value.clone());
                state.warnings = outcome.warnings.clone();
                drop(state);
                if let Some(hook) = &self.on_success {
                    hook(&outcome.value);
                }
            }
            Err(error) => {
                let mut state = self.state.lock().unwrap();
                state.loading = false;
                state.error = Some(error.user_message());
                drop(state);
                if let Some(hook) = &self.on_error {
                    hook(error);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Saved {
        id: String,
    }

    /// Endpoint that can be held open and counts every send.
    struct GatedEndpoint {
        calls: AtomicUsize,
        gate: Option<Notify>,
        delay: Option<Duration>,
        response: fn() -> Result<Envelope<Saved>>,
    }

    impl GatedEndpoint {
        fn ok() -> Result<Envelope<Saved>> {
            Ok(Envelope::ok(WithWarnings::clean(Saved { id: "x".into() })))
        }

        fn immediate() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: None,
                delay: None,
                response: Self::ok,
            }
        }

        fn gated() -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::immediate()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::immediate()
            }
        }
    }

    impl Default for GatedEndpoint {
        fn default() -> Self {
            Self::immediate()
        }
    }

    #[async_trait]
    impl MutationEndpoint<Saved> for GatedEndpoint {
        async fn send(&self, _payload: Payload) -> Result<Envelope<Saved>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response)()
        }

        fn url(&self) -> &str {
            "http://test/endpoint"
        }
    }

    fn controller(endpoint: Arc<GatedEndpoint>) -> Mutation<u32, Saved> {
        Mutation::new(endpoint, |n| Ok(Payload::Json(serde_json::json!({ "n": n }))))
    }

    #[tokio::test]
    async fn success_updates_state_and_hook() {
        let endpoint = Arc::new(GatedEndpoint::immediate());
        let hits = Arc::new(AtomicUsize::new(0));
        let hook_hits = Arc::clone(&hits);
        let mutation = controller(Arc::clone(&endpoint))
            .on_success(move |_| {
                hook_hits.fetch_add(1, Ordering::SeqCst);
            });

        let outcome = mutation.mutate(1).await.unwrap();
        assert_eq!(outcome.value.id, "x");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let state = mutation.snapshot();
        assert!(!state.loading);
        assert_eq!(state.data.unwrap().id, "x");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_refused_without_a_request() {
        let endpoint = Arc::new(GatedEndpoint::gated());
        let mutation = Arc::new(controller(Arc::clone(&endpoint)));

        let first = {
            let mutation = Arc::clone(&mutation);
            tokio::spawn(async move { mutation.mutate(1).await })
        };
        // Let the first call reach the endpoint and park there.
        while endpoint.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = mutation.mutate(2).await;
        assert_eq!(
            second.unwrap_err().code(),
            ErrorCode::ValidationFailed,
            "double submit must fail fast"
        );
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);

        endpoint.gate.as_ref().unwrap().notify_one();
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_classifies_and_clears_the_guard() {
        let endpoint = Arc::new(GatedEndpoint::slow(Duration::from_secs(120)));
        let mutation = controller(Arc::clone(&endpoint)).with_timeout(Duration::from_secs(60));

        let error = mutation.mutate(1).await.unwrap_err();
        assert_eq!(error.code(), ErrorCode::Timeout);
        assert!(mutation.snapshot().error.is_some());

        // The guard is free again; a fast endpoint would now succeed, and
        // even this slow one gets a fresh deadline.
        let error = mutation.mutate(2).await.unwrap_err();
        assert_eq!(error.code(), ErrorCode::Timeout);
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_envelope_surfaces_as_error_state() {
        let endpoint = Arc::new(GatedEndpoint {
            response: || Ok(Envelope::err(&AppError::Forbidden)),
            ..GatedEndpoint::immediate()
        });
        let saw_error = Arc::new(AtomicUsize::new(0));
        let hook_saw = Arc::clone(&saw_error);
        let mutation = controller(endpoint).on_error(move |_| {
            hook_saw.fetch_add(1, Ordering::SeqCst);
        });

        let error = mutation.mutate(1).await.unwrap_err();
        assert_eq!(error.code(), ErrorCode::Forbidden);
        assert_eq!(saw_error.load(Ordering::SeqCst), 1);
        assert_eq!(
            mutation.snapshot().error.as_deref(),
            Some("You are not allowed to do that.")
        );
    }

    #[tokio::test]
    async fn transform_failure_never_reaches_the_endpoint() {
        let endpoint = Arc::new(GatedEndpoint::immediate());
        let mutation: Mutation<u32, Saved> = Mutation::new(endpoint.clone() as Arc<dyn MutationEndpoint<Saved>>, |_| {
            Err(AppError::validation("bad variables"))
        });
        assert!(mutation.mutate(1).await.is_err());
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
    }
}
