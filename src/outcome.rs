use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, ErrorCode, Result};

/// A successful value that may carry non-fatal caveats.
///
/// Write operations use this to report "entity saved, but a secondary step
/// fell short" (typically a media upload). Warnings are complete sentences
/// fit for end users.
#[derive(Debug, Clone, PartialEq)]
pub struct WithWarnings<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> WithWarnings<T> {
    /// A success with nothing to warn about.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn new(value: T, warnings: Vec<String>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WithWarnings<U> {
        WithWarnings {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

impl<T> From<T> for WithWarnings<T> {
    fn from(value: T) -> Self {
        Self::clean(value)
    }
}

/// The response envelope spoken between mutation endpoints and the
/// mutation controller.
///
/// Success: `{ "success": true, "data": …, "warnings": […]? }`.
/// Failure: `{ "success": false, "error": "…", "code": "…"?, "details": …? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T> Envelope<T> {
    pub fn ok(outcome: WithWarnings<T>) -> Self {
        let warnings = if outcome.warnings.is_empty() {
            None
        } else {
            Some(outcome.warnings)
        };
        Self {
            success: true,
            data: Some(outcome.value),
            warnings,
            error: None,
            code: None,
            details: None,
        }
    }

    pub fn err(error: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            warnings: None,
            error: Some(error.user_message()),
            code: Some(error.code()),
            details: error.details().cloned(),
        }
    }

    /// Collapse the envelope into the crate-wide result type.
    ///
    /// A success flag without a body is malformed and is treated as a
    /// failure, never as a partial success.
    pub fn into_result(self) -> Result<WithWarnings<T>> {
        if self.success {
            let value = self.data.ok_or_else(|| {
                AppError::internal("success envelope is missing its data field")
            })?;
            return Ok(WithWarnings::new(value, self.warnings.unwrap_or_default()));
        }
        let message = self
            .error
            .unwrap_or_else(|| "the request failed without an error message".to_string());
        Err(wire_error(self.code, message, self.details))
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a raw response body. A body that does not parse as the
    /// envelope is an error, not a success.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| {
            AppError::internal(format!("response is not a valid envelope: {e}"))
        })
    }
}

/// Rebuild a typed error from the wire `(code, message)` pair.
fn wire_error(code: Option<ErrorCode>, message: String, details: Option<Value>) -> AppError {
    match code {
        Some(ErrorCode::ValidationFailed) => AppError::Validation { message, details },
        Some(ErrorCode::Unauthorized) => AppError::Auth,
        Some(ErrorCode::Forbidden) => AppError::Forbidden,
        Some(ErrorCode::NotFound) => AppError::NotFound { what: message },
        Some(ErrorCode::AlreadyExists) => AppError::AlreadyExists { what: message },
        Some(ErrorCode::Timeout) => AppError::Timeout { url: message },
        Some(ErrorCode::UpstreamError) => AppError::Upstream {
            status: 500,
            message,
        },
        Some(ErrorCode::UploadFailed) => AppError::Upload {
            field: "files".to_string(),
            message,
        },
        Some(ErrorCode::InternalError) => AppError::Internal { message },
        _ => AppError::Unknown { message },
    }
}
