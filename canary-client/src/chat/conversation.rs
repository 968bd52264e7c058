use crate::error::{ClientError, ClientResult};
use crate::models::{Chat, ChatMessage};
use crate::services::ChatClient;
use tokio::sync::Mutex;
use tracing::instrument;

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Chat summaries, newest first.
    pub chats: Vec<Chat>,
    /// The selected chat with its messages.
    pub current: Option<Chat>,
}

/// Chat list and selected conversation, with optimistic message sending.
///
/// The state lock is never held across a request, so sends can overlap;
/// each one reconciles its own message by id.
pub struct ChatConversation {
    client: ChatClient,
    state: Mutex<ConversationState>,
    // Held while a send creates the first chat so overlapping sends share it.
    creating: Mutex<()>,
}

impl ChatConversation {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            state: Mutex::new(ConversationState::default()),
            creating: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> ConversationState {
        self.state.lock().await.clone()
    }

    pub async fn current(&self) -> Option<Chat> {
        self.state.lock().await.current.clone()
    }

    pub async fn load_chats(&self) -> ClientResult<Vec<Chat>> {
        let chats = self.client.get_all_chats().await?;
        self.state.lock().await.chats = chats.clone();
        Ok(chats)
    }

    /// Fetches `chat_id` with its messages and makes it the current chat.
    pub async fn select_chat(&self, chat_id: &str) -> ClientResult<Chat> {
        let chat = self.client.get_chat_by_id(chat_id).await?;
        self.state.lock().await.current = Some(chat.clone());
        Ok(chat)
    }

    pub async fn new_chat(&self, title: Option<&str>) -> ClientResult<Chat> {
        let chat = self.client.create_chat(title).await?;

        let mut state = self.state.lock().await;
        state.chats.retain(|existing| existing.chat_id != chat.chat_id);
        state.chats.insert(0, chat.clone());
        state.current = Some(chat.clone());

        tracing::info!(chat_id = %chat.chat_id, "Chat created");
        Ok(chat)
    }

    /// Sends `text` to the current chat, creating one first when none is
    /// selected. The user message shows up immediately as pending and is
    /// removed again if the request fails.
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, text: &str) -> ClientResult<Option<ChatMessage>> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ClientError::InvalidInput(
                "Message must not be empty".to_string(),
            ));
        }

        let chat_id = self.selected_or_new_chat().await?;

        let pending = ChatMessage::pending_user(content);
        let local_id = pending.id.clone();
        {
            let mut state = self.state.lock().await;
            if let Some(chat) = current_chat_mut(&mut state, &chat_id) {
                chat.messages.push(pending);
            }
        }

        let result = self.client.save_message(&chat_id, content).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(reply) => {
                match current_chat_mut(&mut state, &chat_id) {
                    Some(chat) => {
                        chat.reconcile(&local_id, reply.clone());
                        let last_message_at = chat.last_message_at;
                        if let Some(summary) =
                            state.chats.iter_mut().find(|c| c.chat_id == chat_id)
                        {
                            summary.last_message_at = last_message_at;
                        }
                    }
                    None => {
                        tracing::debug!(chat_id = %chat_id, "Chat changed during send, skipping reconcile");
                    }
                }
                Ok(reply)
            }
            Err(e) => {
                if let Some(chat) = current_chat_mut(&mut state, &chat_id) {
                    chat.rollback(&local_id);
                }
                tracing::warn!(error = %e, chat_id = %chat_id, "Failed to send message");
                Err(e)
            }
        }
    }

    async fn selected_chat_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .current
            .as_ref()
            .map(|chat| chat.chat_id.clone())
    }

    async fn selected_or_new_chat(&self) -> ClientResult<String> {
        if let Some(chat_id) = self.selected_chat_id().await {
            return Ok(chat_id);
        }

        let _creating = self.creating.lock().await;
        // Another send may have created the chat while this one waited.
        if let Some(chat_id) = self.selected_chat_id().await {
            return Ok(chat_id);
        }

        Ok(self.new_chat(None).await?.chat_id)
    }
}

fn current_chat_mut<'a>(state: &'a mut ConversationState, chat_id: &str) -> Option<&'a mut Chat> {
    state
        .current
        .as_mut()
        .filter(|chat| chat.chat_id == chat_id)
}
