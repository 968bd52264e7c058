use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default title for chats created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Prefix of ids generated client-side for optimistic messages.
const LOCAL_ID_PREFIX: &str = "local-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "messageId", alias = "id")]
    pub id: String,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Set on optimistic messages until the server accepts them.
    #[serde(skip)]
    pub pending: bool,
}

impl ChatMessage {
    /// An optimistic user message with a fresh client-generated id.
    pub fn pending_user(content: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4()),
            content: content.into(),
            role: MessageRole::User,
            timestamp: Utc::now(),
            message_type: Some("text".to_string()),
            image_data: None,
            pending: true,
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub chat_id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: Option<u64>,
}

impl Chat {
    /// Confirms the optimistic message `local_id` and places `reply` right
    /// after it. Returns false when the message is no longer in this chat.
    pub fn reconcile(&mut self, local_id: &str, reply: Option<ChatMessage>) -> bool {
        let Some(index) = self.messages.iter().position(|m| m.id == local_id) else {
            return false;
        };

        self.messages[index].pending = false;
        let mut last = self.messages[index].timestamp;

        if let Some(reply) = reply {
            last = reply.timestamp;
            self.messages.insert(index + 1, reply);
        }

        if self.last_message_at.map_or(true, |at| at < last) {
            self.last_message_at = Some(last);
        }

        true
    }

    /// Removes the optimistic message `local_id`, returning it if present.
    pub fn rollback(&mut self, local_id: &str) -> Option<ChatMessage> {
        let index = self.messages.iter().position(|m| m.id == local_id)?;
        Some(self.messages.remove(index))
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateChatRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub content: &'a str,
}
