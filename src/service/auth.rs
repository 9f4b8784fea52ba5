use std::sync::Arc;

use tracing::instrument;

use crate::decode::decode_user;
use crate::error::{AppError, Result};
use crate::model::User;
use crate::store::ContentStore;

/// A successful login: the bearer token to bind follow-up clients to, plus
/// the member it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Login and current-user resolution against the store's auth endpoints.
pub struct AuthService {
    store: Arc<dyn ContentStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthSession> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("identifier and password are required"));
        }
        let body = self.store.login(identifier, password).await?;
        let token = body
            .get("jwt")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AppError::internal("login response is missing the token"))?
            .to_string();
        let user = body
            .get("user")
            .ok_or_else(|| AppError::internal("login response is missing the user record"))?;
        Ok(AuthSession {
            token,
            user: decode_user(user)?,
        })
    }

    /// Resolve the token the underlying store handle is bound to.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        let raw = self.store.me().await?;
        decode_user(&raw)
    }
}
