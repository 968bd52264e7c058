use crate::error::{ClientError, ClientResult};
use crate::models::Article;
use crate::services::NewsClient;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub articles: Vec<Article>,
    pub urgent: Vec<Article>,
    /// Message of the last failed feed load; cleared by the next feed success.
    pub feed_error: Option<String>,
    /// Same for urgent news, tracked separately from the feed.
    pub urgent_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Holds the personalised feed between refreshes. A failed refresh keeps the
/// previous articles and records a readable error instead.
pub struct NewsFeed {
    client: NewsClient,
    state: RwLock<FeedState>,
}

impl NewsFeed {
    pub fn new(client: NewsClient) -> Self {
        Self {
            client,
            state: RwLock::new(FeedState::default()),
        }
    }

    pub async fn snapshot(&self) -> FeedState {
        self.state.read().await.clone()
    }

    pub async fn feed_error(&self) -> Option<String> {
        self.state.read().await.feed_error.clone()
    }

    pub async fn urgent_error(&self) -> Option<String> {
        self.state.read().await.urgent_error.clone()
    }

    pub async fn refresh(&self) -> ClientResult<Vec<Article>> {
        let result = self.client.get_news_feed().await;

        let mut state = self.state.write().await;
        match result {
            Ok(articles) => {
                tracing::info!(count = articles.len(), "News feed refreshed");
                state.articles = articles.clone();
                state.feed_error = None;
                state.last_updated = Some(Utc::now());
                Ok(articles)
            }
            Err(e) => {
                tracing::warn!(error = %e, "News feed refresh failed");
                state.feed_error = Some(describe(&e));
                Err(e)
            }
        }
    }

    pub async fn refresh_urgent(&self) -> ClientResult<Vec<Article>> {
        let result = self.client.get_urgent_news().await;

        let mut state = self.state.write().await;
        match result {
            Ok(urgent) => {
                state.urgent = urgent.clone();
                state.urgent_error = None;
                Ok(urgent)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Urgent news refresh failed");
                state.urgent_error = Some(describe(&e));
                Err(e)
            }
        }
    }
}

/// Text shown to the user for a failed load.
pub fn describe(error: &ClientError) -> String {
    match error {
        ClientError::RequestTimedOut(_) => {
            "News feed timed out. Please try again in a moment.".to_string()
        }
        ClientError::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
        ClientError::RequestFailed { message, .. } => message.clone(),
        ClientError::Transport(_) => "Unable to reach the news service.".to_string(),
        other => other.to_string(),
    }
}
