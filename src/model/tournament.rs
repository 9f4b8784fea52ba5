use chrono::NaiveDate;
use serde::Serialize;

use super::{Authorship, Category, FileAsset, Image, TournamentMatch};
use crate::model::DocumentId;

/// A club tournament with its roster of players and played matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tournament {
    pub id: DocumentId,
    pub row_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub categories: Vec<Category>,
    pub photos: Vec<Image>,
    pub files: Vec<FileAsset>,
    pub players: Vec<TournamentPlayer>,
    /// Matches embedded by the query layer; may be fetched separately via
    /// the tournament-match repository instead.
    pub matches: Vec<TournamentMatch>,
    pub authorship: Authorship,
}

/// A named slot in the tournament roster ("Top seed", "Goalkeeper", …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentPlayer {
    pub title: String,
    pub player_name: String,
    pub awards: Vec<String>,
}
