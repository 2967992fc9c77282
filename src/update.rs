//! Telegram webhook payload types.
//!
//! Only the fields the bot reads are modelled; everything else in the update
//! JSON is ignored.

use serde::Deserialize;

/// One incoming update as posted by the Bot API
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    pub message: Option<Message>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub forward_origin: Option<ForwardOrigin>,
}

/// Where a forwarded message originally came from
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForwardOrigin {
    User {
        sender_user: User,
        #[serde(default)]
        date: i64,
    },
    Channel {
        chat: Chat,
        message_id: Option<i64>,
        author_signature: Option<String>,
        #[serde(default)]
        date: i64,
    },
    Chat {
        sender_chat: Chat,
        author_signature: Option<String>,
        #[serde(default)]
        date: i64,
    },
    HiddenUser {
        sender_user_name: String,
        #[serde(default)]
        date: i64,
    },
    /// Any origin kind this bot does not know about yet
    #[serde(other)]
    Unknown,
}

impl ForwardOrigin {
    /// The Bot API `type` tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardOrigin::User { .. } => "user",
            ForwardOrigin::Channel { .. } => "channel",
            ForwardOrigin::Chat { .. } => "chat",
            ForwardOrigin::HiddenUser { .. } => "hidden_user",
            ForwardOrigin::Unknown => "unknown",
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub username: Option<String>,
    pub title: Option<String>,
}

/// Treat `Some("")` like `None`
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
