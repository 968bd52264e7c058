//! Typed clients for the Canary HTTP API.

pub mod auth_client;
pub mod chat_client;
pub mod http;
pub mod news_client;

pub use auth_client::AuthClient;
pub use chat_client::ChatClient;
pub use http::ApiTransport;
pub use news_client::NewsClient;
