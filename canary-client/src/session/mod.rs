//! Client-side authentication state.
//!
//! [`SessionManager`] owns the current [`Session`] and drives the boot
//! sequence: stored credential, expiry check, optimistic session, then
//! server verification. Anything that cannot be verified ends
//! unauthenticated with storage cleared.

pub mod manager;

use crate::error::ClientResult;
use crate::models::User;
use crate::services::AuthClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;

pub use manager::SessionManager;

/// Confirms with the server that the stored token still belongs to a user.
#[async_trait]
pub trait ProfileVerifier: Send + Sync {
    async fn verify_profile(&self) -> ClientResult<User>;
}

#[async_trait]
impl ProfileVerifier for AuthClient {
    async fn verify_profile(&self) -> ClientResult<User> {
        Ok(self.get_profile().await?.to_user())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// `initialize` has not run yet.
    #[default]
    Uninitialized,
    /// Boot is in progress.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// An authenticated session. The token is only reachable through
/// [`secrecy::ExposeSecret`].
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: Secret<String>,
    /// From the token's `exp` claim; `None` when the token does not decode.
    pub token_expiry: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user: User, token: String, token_expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            user,
            token: Secret::new(token),
            token_expiry,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn display_name(&self) -> String {
        self.user.display_name()
    }
}

/// Point-in-time view of the session state handed to front ends.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub session: Option<Session>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }
}
