use chrono::NaiveDate;
use serde::Serialize;

use super::{Authorship, Category, FileAsset, Image};
use crate::model::DocumentId;

/// The final score of a club match, as submitted by a member.
///
/// Scores are unsigned by construction; rows predating the category and
/// match-date fields are normalized at decode time, so both are always
/// present here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub id: DocumentId,
    pub row_id: i64,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub goalscorers: Option<String>,
    pub report: Option<String>,
    pub categories: Vec<Category>,
    pub match_date: NaiveDate,
    /// Link to an externally hosted photo, used before uploads existed.
    pub image_url: Option<String>,
    pub photos: Vec<Image>,
    pub files: Vec<FileAsset>,
    pub authorship: Authorship,
}
