//! Decoding of raw store records into domain types.
//!
//! Every decoder takes the raw `serde_json::Value` the store returned and
//! either produces a validated domain entity or an
//! [`AppError::Validation`](crate::AppError) carrying the diagnostics and
//! the offending payload. The `safe_decode_*` variants log and swallow the
//! failure instead, so one malformed record cannot sink a whole list fetch.

mod comment;
mod event;
mod match_result;
mod media;
mod shared;
mod tournament;
mod user;

pub use comment::{decode_comment, safe_decode_comment};
pub use event::{decode_event, safe_decode_event};
pub use match_result::{decode_match_result, safe_decode_match_result};
pub use media::{decode_file_asset, decode_image, safe_decode_file_asset, safe_decode_image};
pub use tournament::{
    decode_tournament, decode_tournament_match, safe_decode_tournament,
    safe_decode_tournament_match,
};
pub use user::{decode_user, safe_decode_user};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{AppError, Result};

/// A to-one relation as the store serializes it.
///
/// Depending on store version and query shape the related record arrives
/// nested (`{ "data": {…} | null }`) or flattened (`{…}`). The shapes are
/// told apart by one capability check, presence of the `data` key; both
/// normalize to a plain optional value here and the distinction never
/// leaves this module.
#[derive(Debug, Clone)]
pub(crate) enum Relation<T> {
    Nested { data: Option<T> },
    Flat(T),
}

impl<'de, T> serde::Deserialize<'de> for Relation<T>
where
    T: serde::de::DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let relation = match value {
            Value::Object(mut map) if map.contains_key("data") => match map.remove("data") {
                Some(Value::Null) | None => Relation::Nested { data: None },
                Some(inner) => Relation::Nested {
                    data: Some(serde_json::from_value(inner).map_err(serde::de::Error::custom)?),
                },
            },
            Value::Null => Relation::Nested { data: None },
            other => {
                Relation::Flat(serde_json::from_value(other).map_err(serde::de::Error::custom)?)
            }
        };
        Ok(relation)
    }
}

impl<T> Relation<T> {
    fn into_inner(self) -> Option<T> {
        match self {
            Relation::Nested { data } => data,
            Relation::Flat(value) => Some(value),
        }
    }
}

/// Normalize an optional relation field to its flat payload.
pub(crate) fn relation<T>(field: Option<Relation<T>>) -> Option<T> {
    field.and_then(Relation::into_inner)
}

/// A to-many relation, nested (`{ "data": […] | null }`) or flattened.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RelationList<T> {
    Nested { data: Option<Vec<T>> },
    Flat(Vec<T>),
}

impl<T> RelationList<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            RelationList::Nested { data } => data.unwrap_or_default(),
            RelationList::Flat(items) => items,
        }
    }
}

/// Flatten an optional to-many relation; a missing or null relation is an
/// empty list.
pub(crate) fn relation_list<T>(field: Option<RelationList<T>>) -> Vec<T> {
    field.map(RelationList::into_vec).unwrap_or_default()
}

/// The store stores "absent" as `""` in some legacy text columns.
pub(crate) fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Fail with a validation error naming the missing field.
pub(crate) fn require<T>(entity: &'static str, field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| {
        AppError::validation(format!("{entity} record is missing required field `{field}`"))
    })
}

/// Wrap a serde failure as a validation error, keeping the raw payload for
/// diagnostics.
pub(crate) fn malformed(entity: &'static str, raw: &Value, reason: impl ToString) -> AppError {
    AppError::Validation {
        message: format!("{entity} record does not match the expected shape"),
        details: Some(serde_json::json!({
            "reason": reason.to_string(),
            "payload": raw,
        })),
    }
}

/// Attach the raw payload to validation errors produced while converting a
/// wire DTO, leaving other error kinds untouched.
pub(crate) fn with_payload(raw: &Value, error: AppError) -> AppError {
    match error {
        AppError::Validation { message, details } => AppError::Validation {
            message,
            details: details.or_else(|| Some(serde_json::json!({ "payload": raw }))),
        },
        other => other,
    }
}

/// Shared implementation of the `safe_decode_*` family: log and drop.
pub(crate) fn lossy<T>(entity: &'static str, decoded: Result<T>) -> Option<T> {
    match decoded {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(entity, %error, "dropping record that failed to decode");
            None
        }
    }
}
