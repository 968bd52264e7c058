use super::KeyValueStore;
use crate::error::ClientResult;
use crate::models::User;
use crate::utils::jwt;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key of the JSON-serialized user.
pub const USER_KEY: &str = "user";

/// The persisted form of a session.
#[derive(Clone, PartialEq)]
pub struct StoredCredential {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Reads and writes the `authToken`/`user` pair. Both keys are written
/// together and cleared together.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the stored credential. A half-present pair or an unreadable
    /// user entry is cleared and reported as absent.
    pub async fn read(&self) -> ClientResult<Option<StoredCredential>> {
        let token = self.store.get(TOKEN_KEY).await?;
        let user = self.store.get(USER_KEY).await?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(user)) => match serde_json::from_str::<User>(&user) {
                Ok(user) => Ok(Some(StoredCredential { token, user })),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored user is unreadable, clearing credential");
                    self.clear().await?;
                    Ok(None)
                }
            },
            _ => {
                tracing::warn!("Found a partial credential, clearing it");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn write(&self, credential: &StoredCredential) -> ClientResult<()> {
        let user = serde_json::to_string(&credential.user)?;
        self.store
            .set_many(&[(TOKEN_KEY, credential.token.clone()), (USER_KEY, user)])
            .await
    }

    pub async fn clear(&self) -> ClientResult<()> {
        self.store.remove_many(&[TOKEN_KEY, USER_KEY]).await
    }

    /// The stored bearer token, if any.
    pub async fn token(&self) -> ClientResult<Option<String>> {
        self.store.get(TOKEN_KEY).await
    }

    /// Whether a stored token exists and is unexpired at `now`. Expired or
    /// undecodable tokens clear both keys.
    pub async fn has_valid_token(&self, now: DateTime<Utc>) -> ClientResult<bool> {
        let Some(token) = self.token().await? else {
            return Ok(false);
        };

        if jwt::is_token_valid_at(&token, now) {
            return Ok(true);
        }

        tracing::info!("Stored token is expired or unreadable, clearing credential");
        self.clear().await?;
        Ok(false)
    }
}
