use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A personalised article from `GET /news/feed` or `GET /news/urgent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Scores arrive as integers or floats; anything non-numeric reads as
    /// `None` rather than failing the whole feed.
    #[serde(default, deserialize_with = "lenient_score")]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub citations: Vec<String>,
}

impl Article {
    pub fn is_urgent(&self) -> bool {
        self.urgency.as_deref() == Some("high")
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// News preferences. Keys the client does not model are kept in `extra` so
/// a read-modify-write does not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub monitoring_topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgent_alerts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_frequency_hours: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial update for `POST /news/preferences`; the server merges the keys
/// present into the stored preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreferencesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgent_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_frequency_hours: Option<u32>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Response of the monitoring topic endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringUpdate {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub monitoring_topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MonitorTopicRequest<'a> {
    pub topic: &'a str,
}

/// What the assistant has learned about the user (`GET /ai/memory`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMemory {
    pub summary: String,
    #[serde(default)]
    pub active_monitoring: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub monitoring_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preferences_keep_unknown_keys() {
        let preferences: Preferences = serde_json::from_value(json!({
            "interests": ["Technology"],
            "monitoring_topics": ["Tesla"],
            "relevance_threshold": 75,
            "timezone": "UTC"
        }))
        .unwrap();

        assert_eq!(preferences.relevance_threshold, Some(75));
        assert_eq!(preferences.extra.get("timezone"), Some(&json!("UTC")));

        let round_trip = serde_json::to_value(&preferences).unwrap();
        assert_eq!(round_trip["timezone"], json!("UTC"));
    }

    #[test]
    fn test_update_serializes_only_present_keys() {
        let update = PreferencesUpdate {
            urgent_alerts: Some(false),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"urgent_alerts": false})
        );
        assert!(PreferencesUpdate::default().is_empty());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_article_urgency() {
        let article: Article = serde_json::from_value(json!({
            "id": "a1",
            "title": "Latest: Tesla",
            "summary": "Something happened.",
            "source": "Canary AI News",
            "publishedAt": "2025-06-01T10:00:00.5Z",
            "relevanceScore": 91,
            "urgency": "high",
            "tags": ["Tesla"],
            "gemini_analysis": {"sentiment": "neutral"}
        }))
        .unwrap();

        assert!(article.is_urgent());
        assert_eq!(article.relevance_score, Some(91.0));
    }

    #[test]
    fn test_article_score_accepts_floats_and_ignores_junk() {
        let fractional: Article = serde_json::from_value(json!({
            "id": "a2",
            "title": "Rates",
            "relevanceScore": 82.5
        }))
        .unwrap();
        assert_eq!(fractional.relevance_score, Some(82.5));

        let junk: Article = serde_json::from_value(json!({
            "id": "a3",
            "title": "Rates",
            "relevanceScore": "high"
        }))
        .unwrap();
        assert_eq!(junk.relevance_score, None);

        let null: Article = serde_json::from_value(json!({
            "id": "a4",
            "title": "Rates",
            "relevanceScore": null
        }))
        .unwrap();
        assert_eq!(null.relevance_score, None);
    }
}
