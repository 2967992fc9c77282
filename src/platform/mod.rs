pub mod telegram;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// A text reply to be delivered to a chat
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    /// Suppress the link preview the platform would otherwise render
    pub disable_link_preview: bool,
}

/// Outbound side of the messaging platform
#[async_trait]
pub trait BotClient: Send + Sync {
    async fn send(&self, message: &OutgoingMessage) -> Result<()>;
}

/// Builds a fresh client for one webhook call
pub trait ClientFactory: Send + Sync {
    fn create(&self, token: &str) -> Arc<dyn BotClient>;
}
