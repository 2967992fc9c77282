use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::LinkPreviewOptions;
use tracing::debug;

use super::{BotClient, ClientFactory, OutgoingMessage};

/// Bot API client backed by teloxide
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl BotClient for TelegramClient {
    async fn send(&self, message: &OutgoingMessage) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(message.chat_id), message.text.clone());
        if message.disable_link_preview {
            request = request.link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            });
        }

        let sent = request
            .await
            .with_context(|| format!("sendMessage to chat {} failed", message.chat_id))?;
        debug!("Delivered message {} to chat {}", sent.id.0, message.chat_id);
        Ok(())
    }
}

/// Creates a new `teloxide::Bot` for every webhook request
pub struct TelegramClientFactory {
    api_url: Option<reqwest::Url>,
}

impl TelegramClientFactory {
    pub fn new(api_url: Option<reqwest::Url>) -> Self {
        Self { api_url }
    }
}

impl ClientFactory for TelegramClientFactory {
    fn create(&self, token: &str) -> Arc<dyn BotClient> {
        let bot = match &self.api_url {
            Some(url) => Bot::new(token).set_api_url(url.clone()),
            None => Bot::new(token),
        };
        Arc::new(TelegramClient::new(bot))
    }
}
