pub mod chat;
pub mod news;
pub mod user;

pub use chat::{Chat, ChatMessage, MessageRole};
pub use news::{AiMemory, Article, MonitoringUpdate, Preferences, PreferencesUpdate};
pub use user::{AuthResponse, User, UserProfile};
