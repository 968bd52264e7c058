use super::http::{ApiTransport, Auth};
use crate::error::{ClientError, ClientResult};
use crate::models::news::MonitorTopicRequest;
use crate::models::{Article, MonitoringUpdate, Preferences, PreferencesUpdate};
use std::future::Future;
use std::time::Duration;
use tracing::instrument;

/// Client for the `/news` endpoints.
#[derive(Clone)]
pub struct NewsClient {
    transport: ApiTransport,
    news_timeout: Duration,
}

impl NewsClient {
    pub fn new(transport: ApiTransport, news_timeout: Duration) -> Self {
        Self {
            transport,
            news_timeout,
        }
    }

    pub fn news_timeout(&self) -> Duration {
        self.news_timeout
    }

    /// Personalised feed. Gives up after the news timeout; the in-flight
    /// request is dropped with the future.
    #[instrument(skip(self))]
    pub async fn get_news_feed(&self) -> ClientResult<Vec<Article>> {
        self.with_news_timeout(self.transport.get("/news/feed", "Failed to fetch news feed"))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_urgent_news(&self) -> ClientResult<Vec<Article>> {
        self.with_news_timeout(
            self.transport
                .get("/news/urgent", "Failed to fetch urgent news"),
        )
        .await
    }

    pub async fn get_preferences(&self) -> ClientResult<Preferences> {
        self.transport
            .get("/news/preferences", "Failed to fetch preferences")
            .await
    }

    /// Sends only the keys set on `update`; the server merges them.
    #[instrument(skip(self, update))]
    pub async fn update_preferences(&self, update: &PreferencesUpdate) -> ClientResult<Preferences> {
        if update.is_empty() {
            return Err(ClientError::InvalidInput(
                "Preferences update has no fields".to_string(),
            ));
        }

        self.transport
            .post(
                "/news/preferences",
                update,
                Auth::Bearer,
                "Failed to update preferences",
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn add_monitoring_topic(&self, topic: &str) -> ClientResult<MonitoringUpdate> {
        let topic = validate_topic(topic)?;

        self.transport
            .post(
                "/news/monitor",
                &MonitorTopicRequest { topic },
                Auth::Bearer,
                "Failed to add monitoring topic",
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_monitoring_topic(&self, topic: &str) -> ClientResult<MonitoringUpdate> {
        let topic = validate_topic(topic)?;

        self.transport
            .delete(
                &format!("/news/monitor/{}", urlencoding::encode(topic)),
                "Failed to remove monitoring topic",
            )
            .await
    }

    async fn with_news_timeout<T>(
        &self,
        request: impl Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        match tokio::time::timeout(self.news_timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.news_timeout, "News request timed out");
                Err(ClientError::RequestTimedOut(self.news_timeout))
            }
        }
    }
}

fn validate_topic(topic: &str) -> ClientResult<&str> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ClientError::InvalidInput(
            "Monitoring topic must not be empty".to_string(),
        ));
    }
    Ok(topic)
}
