use super::http::{ApiTransport, Auth};
use crate::error::ClientResult;
use crate::models::chat::{CreateChatRequest, SendMessageRequest, DEFAULT_CHAT_TITLE};
use crate::models::{AiMemory, Chat, ChatMessage};
use reqwest::Method;
use tracing::instrument;

/// Client for the `/chats` and `/ai` endpoints.
#[derive(Clone)]
pub struct ChatClient {
    transport: ApiTransport,
}

impl ChatClient {
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    #[instrument(skip(self))]
    pub async fn create_chat(&self, title: Option<&str>) -> ClientResult<Chat> {
        let request = CreateChatRequest {
            title: title.unwrap_or(DEFAULT_CHAT_TITLE),
        };

        self.transport
            .post("/chats", &request, Auth::Bearer, "Failed to create chat")
            .await
    }

    pub async fn get_all_chats(&self) -> ClientResult<Vec<Chat>> {
        self.transport.get("/chats", "Failed to fetch chats").await
    }

    #[instrument(skip(self))]
    pub async fn get_chat_by_id(&self, chat_id: &str) -> ClientResult<Chat> {
        self.transport
            .get(
                &format!("/chats/{}", urlencoding::encode(chat_id)),
                "Failed to fetch chat",
            )
            .await
    }

    /// Posts a user message and returns the assistant's reply, if the server
    /// produced one.
    #[instrument(skip(self, content))]
    pub async fn save_message(
        &self,
        chat_id: &str,
        content: &str,
    ) -> ClientResult<Option<ChatMessage>> {
        let path = format!("/chats/{}/messages", urlencoding::encode(chat_id));
        let body = self
            .transport
            .execute(
                Method::POST,
                &path,
                Some(&SendMessageRequest { content }),
                Auth::Bearer,
                "Failed to send message",
            )
            .await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get_ai_memory(&self) -> ClientResult<AiMemory> {
        self.transport
            .get("/ai/memory", "Failed to fetch AI memory")
            .await
    }
}
