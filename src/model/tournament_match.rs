use serde::Serialize;

use super::Authorship;
use crate::model::DocumentId;

/// A single match played within a tournament.
///
/// Owned by exactly one tournament via `tournament`; its lifetime does not
/// depend on the parent being loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentMatch {
    pub id: DocumentId,
    pub row_id: i64,
    pub tournament: DocumentId,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub goalscorers: Option<String>,
    pub authorship: Authorship,
}
