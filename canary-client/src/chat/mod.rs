pub mod conversation;

pub use conversation::{ChatConversation, ConversationState};
