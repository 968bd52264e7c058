#![allow(dead_code)]

use canary_client::config::{ApiSettings, LoggingSettings, Settings, StorageSettings};
use canary_client::models::User;
use canary_client::storage::{KeyValueStore, MemoryStore, StoredCredential};
use canary_client::CanaryApi;
use canary_core::config::Environment;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use wiremock::MockServer;

pub const TEST_USER_ID: &str = "user_123";
pub const TEST_EMAIL: &str = "test@example.com";
pub const TEST_JWT_SECRET: &str = "test-secret";

#[derive(Serialize)]
struct TestClaims<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    email: &'a str,
    exp: i64,
}

/// HS256 token shaped like the backend's, expiring `seconds` from now.
pub fn mint_token(seconds: i64) -> String {
    let claims = TestClaims {
        user_id: TEST_USER_ID,
        email: TEST_EMAIL,
        exp: Utc::now().timestamp() + seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to mint test token")
}

pub fn test_user() -> User {
    User {
        user_id: TEST_USER_ID.to_string(),
        email: TEST_EMAIL.to_string(),
        username: Some("tester".to_string()),
    }
}

pub fn test_settings(base_url: &str, news_timeout_secs: u64) -> Settings {
    Settings {
        environment: Environment::Development,
        api: ApiSettings {
            development_url: base_url.to_string(),
            production_url: "https://api.canary.invalid".to_string(),
            news_timeout_secs,
            request_timeout_secs: None,
        },
        storage: StorageSettings::default(),
        logging: LoggingSettings::default(),
    }
}

pub struct TestApp {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub api: CanaryApi,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_news_timeout(35).await
    }

    pub async fn spawn_with_news_timeout(news_timeout_secs: u64) -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let settings = test_settings(&format!("{}/api", server.uri()), news_timeout_secs);
        let api = CanaryApi::new(&settings, store.clone()).expect("Failed to build API client");

        TestApp { server, store, api }
    }

    /// Stores a credential as a previous run would have left it.
    pub async fn store_credential(&self, token: &str) {
        self.api
            .credentials
            .write(&StoredCredential {
                token: token.to_string(),
                user: test_user(),
            })
            .await
            .expect("Failed to store credential");
    }

    pub async fn stored_token(&self) -> Option<String> {
        self.store.get("authToken").await.expect("Failed to read store")
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn profile_body() -> serde_json::Value {
    serde_json::json!({
        "userId": TEST_USER_ID,
        "email": TEST_EMAIL,
        "username": "tester",
        "preferences": {
            "interests": ["Technology"],
            "monitoring_topics": [],
            "relevance_threshold": 70
        },
        "createdAt": "2025-06-01T10:00:00.000000Z"
    })
}

pub fn chat_body(chat_id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "chatId": chat_id,
        "userId": TEST_USER_ID,
        "title": title,
        "createdAt": "2025-06-01T10:00:00.000000Z",
        "lastMessageAt": "2025-06-01T10:00:00.000000Z",
        "messageCount": 0,
        "isActive": true
    })
}

pub fn assistant_message_body(chat_id: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "messageId": "msg_ai_1",
        "chatId": chat_id,
        "userId": TEST_USER_ID,
        "content": content,
        "role": "assistant",
        "timestamp": "2025-06-01T10:00:05.000000Z",
        "messageType": "text"
    })
}

pub fn article_body(id: &str, urgency: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Latest: {}", id),
        "summary": "Something happened.",
        "source": "Canary AI News",
        "publishedAt": "2025-06-01T10:00:00.000000Z",
        "url": "https://example.com/article",
        "category": "technology",
        "relevanceScore": 88,
        "urgency": urgency,
        "tags": ["Technology"],
        "citations": []
    })
}
