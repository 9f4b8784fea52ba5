use serde::Serialize;

use crate::model::DocumentId;

/// A registered club member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: DocumentId,
    pub row_id: i64,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub confirmed: bool,
    pub blocked: bool,
}
