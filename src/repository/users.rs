use std::sync::Arc;

use crate::decode::{decode_user, safe_decode_user};
use crate::error::Result;
use crate::model::{DocumentId, User};
use crate::store::{ContentStore, ListOptions};

/// Read-only access to member records. Accounts are managed by the store's
/// own registration flow; this side only looks them up.
pub struct UserRepository {
    store: Arc<dyn ContentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<User>> {
        let path = format!("users/{id}");
        match self.store.get(&path, &[]).await {
            Ok(response) if response.data.is_null() => Ok(None),
            Ok(response) => Ok(Some(decode_user(&response.data)?)),
            Err(crate::AppError::NotFound { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let options = ListOptions::default().filter("username", username);
        let response = self.store.get("users", &options.to_params()).await?;
        let users: Vec<User> = match response.data {
            serde_json::Value::Array(items) => {
                items.iter().filter_map(safe_decode_user).collect()
            }
            _ => Vec::new(),
        };
        Ok(users.into_iter().next())
    }

    /// The user the bound bearer token belongs to.
    pub async fn current(&self) -> Result<User> {
        let raw = self.store.me().await?;
        decode_user(&raw)
    }
}
