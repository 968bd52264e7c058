//! Client core for the Canary news and chat assistant: session management,
//! typed API clients, and the chat and feed state front ends render from.

pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod news;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;

use config::Settings;
use services::{ApiTransport, AuthClient, ChatClient, NewsClient};
use session::SessionManager;
use std::sync::Arc;
use storage::{CredentialStore, KeyValueStore};

pub use error::{ClientError, ClientResult};

/// The API clients wired to one base URL and one credential store.
#[derive(Clone)]
pub struct CanaryApi {
    pub auth: AuthClient,
    pub chat: ChatClient,
    pub news: NewsClient,
    pub credentials: CredentialStore,
}

impl CanaryApi {
    pub fn new(settings: &Settings, store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let credentials = CredentialStore::new(store);
        let transport = ApiTransport::new(
            settings.base_url(),
            credentials.clone(),
            settings.api.request_timeout(),
        )?;

        Ok(Self {
            auth: AuthClient::new(transport.clone()),
            chat: ChatClient::new(transport.clone()),
            news: NewsClient::new(transport, settings.api.news_timeout()),
            credentials,
        })
    }

    /// A session manager verifying stored sessions against `/auth/profile`.
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(self.credentials.clone(), Arc::new(self.auth.clone()))
    }
}
