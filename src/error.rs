use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All failures that can surface from store, repository, or service calls.
///
/// Expected failure modes travel as values of this type; panics and raw
/// `reqwest` errors never cross the crate boundary.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// A payload failed validation, either on the way in (user input) or on
    /// the way out of the store (schema drift in a stored record).
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        /// Diagnostics plus, for decode failures, the offending raw payload.
        details: Option<Value>,
    },

    /// Missing or invalid credentials.
    #[error("authentication required")]
    Auth,

    /// Authenticated but not allowed to perform the operation.
    #[error("operation not permitted")]
    Forbidden,

    /// A directly requested record does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A uniqueness constraint was violated.
    #[error("{what} already exists")]
    AlreadyExists { what: String },

    /// The transport layer failed before a response arrived (DNS, TLS,
    /// connection reset).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    /// The request did not complete within its deadline.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The store answered with an error of its own.
    #[error("store error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// A media upload was rejected or failed mid-transfer.
    #[error("upload for field `{field}` failed: {message}")]
    Upload { field: String, message: String },

    #[error("file `{name}` is too large ({size_bytes} bytes)")]
    FileTooLarge { name: String, size_bytes: u64 },

    #[error("file `{name}` has an unsupported type")]
    InvalidFileType { name: String },

    /// A bug on our side: invariants broken, impossible states reached.
    #[error("internal error: {message}")]
    Internal { message: String },

    /// Anything that could not be classified.
    #[error("unexpected error: {message}")]
    Unknown { message: String },
}

/// Machine-readable error discriminator for programmatic branching.
///
/// Codes are stable wire values; user-facing text comes from
/// [`AppError::user_message`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    ValidationFailed,
    Unauthorized,
    Forbidden,
    NotFound,
    AlreadyExists,
    NetworkError,
    Timeout,
    UpstreamError,
    UploadFailed,
    FileTooLarge,
    InvalidFileType,
    InternalError,
    UnknownError,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound { what: what.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }

    /// Classify a transport-level failure for `url`.
    ///
    /// `reqwest` reports deadline overruns as just another error kind; they
    /// get their own variant so callers can tell "slow" from "broken".
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            AppError::Timeout { url }
        } else {
            AppError::Network { url, source }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationFailed,
            AppError::Auth => ErrorCode::Unauthorized,
            AppError::Forbidden => ErrorCode::Forbidden,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            AppError::Network { .. } => ErrorCode::NetworkError,
            AppError::Timeout { .. } => ErrorCode::Timeout,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::Upload { .. } => ErrorCode::UploadFailed,
            AppError::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            AppError::InvalidFileType { .. } => ErrorCode::InvalidFileType,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Unknown { .. } => ErrorCode::UnknownError,
        }
    }

    /// HTTP-style status for the error, usable by handler adapters.
    pub fn status(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::Auth => 401,
            AppError::Forbidden => 403,
            AppError::NotFound { .. } => 404,
            AppError::AlreadyExists { .. } => 409,
            AppError::FileTooLarge { .. } => 413,
            AppError::InvalidFileType { .. } => 415,
            AppError::Network { .. } => 503,
            AppError::Timeout { .. } => 504,
            AppError::Upstream { status, .. } => *status,
            AppError::Upload { .. } | AppError::Internal { .. } | AppError::Unknown { .. } => 500,
        }
    }

    /// A complete sentence fit for end users. No codes, no stack traces, no
    /// store internals.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => {
                format!("The submitted data is invalid: {message}.")
            }
            AppError::Auth => "Please sign in to continue.".to_string(),
            AppError::Forbidden => "You are not allowed to do that.".to_string(),
            AppError::NotFound { what } => format!("The requested {what} could not be found."),
            AppError::AlreadyExists { what } => format!("This {what} already exists."),
            AppError::Network { .. } => {
                "The server could not be reached. Please try again.".to_string()
            }
            AppError::Timeout { .. } => "The request took too long. Please try again.".to_string(),
            AppError::Upstream { .. } => {
                "The content server reported a problem. Please try again later.".to_string()
            }
            AppError::Upload { field, .. } => {
                format!("The upload for {field} did not complete.")
            }
            AppError::FileTooLarge { name, .. } => format!("The file {name} is too large."),
            AppError::InvalidFileType { name } => {
                format!("The file {name} has an unsupported format.")
            }
            AppError::Internal { .. } | AppError::Unknown { .. } => {
                "Something went wrong on our side. Please try again later.".to_string()
            }
        }
    }

    /// Structured details, if the error carries any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            AppError::Validation { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_line_up() {
        let cases: Vec<(AppError, ErrorCode, u16)> = vec![
            (AppError::validation("bad"), ErrorCode::ValidationFailed, 400),
            (AppError::Auth, ErrorCode::Unauthorized, 401),
            (AppError::Forbidden, ErrorCode::Forbidden, 403),
            (AppError::not_found("event"), ErrorCode::NotFound, 404),
            (
                AppError::AlreadyExists { what: "user".into() },
                ErrorCode::AlreadyExists,
                409,
            ),
            (
                AppError::Timeout { url: "http://x".into() },
                ErrorCode::Timeout,
                504,
            ),
            (
                AppError::Upstream {
                    status: 502,
                    message: "bad gateway".into(),
                },
                ErrorCode::UpstreamError,
                502,
            ),
            (
                AppError::Upload {
                    field: "photos".into(),
                    message: "boom".into(),
                },
                ErrorCode::UploadFailed,
                500,
            ),
        ];
        for (error, code, status) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.status(), status);
        }
    }

    #[test]
    fn error_code_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorCode::ValidationFailed).unwrap();
        assert_eq!(json, "\"validation-failed\"");
        assert_eq!(ErrorCode::NotFound.to_string(), "not-found");
    }

    #[test]
    fn user_messages_hide_internals() {
        let error = AppError::Upstream {
            status: 500,
            message: "ECONNREFUSED 10.0.0.3:1337".into(),
        };
        assert!(!error.user_message().contains("ECONNREFUSED"));
    }
}
