use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use super::{Authorship, FileAsset, Image};
use crate::model::DocumentId;

/// Whether an event is announced or already archived.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Upcoming,
    Past,
}

/// A club event (training camp, party, away trip).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: DocumentId,
    pub row_id: i64,
    pub name: String,
    pub kind: EventKind,
    pub date_from: NaiveDate,
    /// If set, never before `date_from`.
    pub date_to: Option<NaiveDate>,
    pub time_from: Option<NaiveTime>,
    pub time_to: Option<NaiveTime>,
    /// Deadline for getting the announcement onto the website.
    pub publish_by: Option<NaiveDate>,
    pub description: Option<String>,
    pub photographer_required: bool,
    pub photos: Vec<Image>,
    pub files: Vec<FileAsset>,
    pub authorship: Authorship,
}
