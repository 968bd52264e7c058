//! Durable storage for the bearer token and cached user profile.
//!
//! [`KeyValueStore`] is the injected persistence collaborator; batch writes
//! and removals are single operations so the credential pair never ends up
//! half-written. [`CredentialStore`] layers the `authToken`/`user` contract
//! on top of it.

pub mod credentials;
pub mod file;
pub mod memory;

use crate::error::ClientResult;
use async_trait::async_trait;

pub use credentials::{CredentialStore, StoredCredential, TOKEN_KEY, USER_KEY};
pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Writes every entry in one operation.
    async fn set_many(&self, entries: &[(&str, String)]) -> ClientResult<()>;

    /// Removes every key in one operation. Missing keys are ignored.
    async fn remove_many(&self, keys: &[&str]) -> ClientResult<()>;
}
