use serde::Deserialize;
use serde_json::Value;

use super::{lossy, malformed, none_if_blank, require, with_payload};
use crate::error::Result;
use crate::model::{DocumentId, User};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserDto {
    id: Option<i64>,
    document_id: Option<String>,
    username: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    confirmed: Option<bool>,
    blocked: Option<bool>,
}

const ENTITY: &str = "user";

impl UserDto {
    fn into_domain(self) -> Result<User> {
        Ok(User {
            id: DocumentId(require(ENTITY, "documentId", self.document_id)?),
            row_id: require(ENTITY, "id", self.id)?,
            username: require(ENTITY, "username", self.username)?,
            email: require(ENTITY, "email", self.email)?,
            display_name: none_if_blank(self.display_name),
            confirmed: self.confirmed.unwrap_or(false),
            blocked: self.blocked.unwrap_or(false),
        })
    }
}

pub fn decode_user(raw: &Value) -> Result<User> {
    let dto: UserDto =
        serde_json::from_value(raw.clone()).map_err(|e| malformed(ENTITY, raw, e))?;
    dto.into_domain().map_err(|e| with_payload(raw, e))
}

pub fn safe_decode_user(raw: &Value) -> Option<User> {
    lossy(ENTITY, decode_user(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_user() {
        let user = decode_user(&json!({
            "id": 5,
            "documentId": "u-5",
            "username": "petra",
            "email": "petra@example.com",
            "displayName": "Petra M.",
            "confirmed": true,
            "blocked": false
        }))
        .unwrap();
        assert_eq!(user.id, DocumentId::from("u-5"));
        assert!(user.confirmed);
        assert_eq!(user.display_name.as_deref(), Some("Petra M."));
    }

    #[test]
    fn missing_email_fails() {
        let raw = json!({ "id": 5, "documentId": "u-5", "username": "petra" });
        assert!(decode_user(&raw).is_err());
        assert!(safe_decode_user(&raw).is_none());
    }
}
