use tracing::{error, info, warn};

use crate::format::{channel_post_link, format_chat, format_hidden_user, format_user};
use crate::platform::{BotClient, OutgoingMessage};
use crate::update::{non_empty, ForwardOrigin, Message, Update};

const NO_MESSAGE: &str = "No message found.";
const NO_USER_INFO: &str = "No user information available.";
const UNKNOWN_ORIGIN: &str = "Unknown forward origin type.";
const FALLBACK_REPLY: &str = "Error processing message, please try again later.";

/// The text to send back and the chat it belongs in
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub chat_id: Option<i64>,
    pub text: String,
}

/// What happened to the reply for one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The reply failed and the generic error text went out instead
    Fallback,
    /// Both the reply and the fallback failed
    Dropped,
    Skipped,
}

pub fn reply_for(update: &Update) -> Reply {
    match &update.message {
        Some(message) => Reply {
            chat_id: Some(message.chat.id),
            text: describe_message(message).trim_end().to_string(),
        },
        None => {
            warn!("No message found in update {}", update.update_id);
            Reply {
                chat_id: None,
                text: NO_MESSAGE.to_string(),
            }
        }
    }
}

/// Forward origin wins over the direct sender.
fn describe_message(message: &Message) -> String {
    if let Some(origin) = &message.forward_origin {
        info!("Processing forwarded message - type: {}", origin.kind());
        return describe_origin(origin);
    }

    match &message.from {
        Some(user) => {
            info!("Processing regular message from user");
            format_user(user)
        }
        None => {
            warn!("No user information available in message");
            NO_USER_INFO.to_string()
        }
    }
}

fn describe_origin(origin: &ForwardOrigin) -> String {
    match origin {
        ForwardOrigin::User { sender_user, .. } => format_user(sender_user),
        ForwardOrigin::Channel {
            chat, message_id, ..
        } => {
            let mut text = format_chat(chat);
            if let (Some(username), Some(id)) = (non_empty(&chat.username), message_id) {
                text.push_str(&channel_post_link(username, *id));
            }
            text
        }
        ForwardOrigin::Chat { sender_chat, .. } => format_chat(sender_chat),
        ForwardOrigin::HiddenUser {
            sender_user_name,
            date,
        } => format_hidden_user(sender_user_name, *date),
        ForwardOrigin::Unknown => UNKNOWN_ORIGIN.to_string(),
    }
}

/// Work out the reply for `update` and deliver it, falling back to a generic
/// error message once. Never fails.
pub async fn handle_update(client: &dyn BotClient, update: &Update) -> Delivery {
    let reply = reply_for(update);

    let chat_id = match reply.chat_id {
        Some(id) if !reply.text.is_empty() => id,
        _ => {
            warn!("Reply for update {} has no destination", update.update_id);
            return Delivery::Skipped;
        }
    };

    info!("Sending reply - length: {} chars", reply.text.chars().count());
    let outgoing = OutgoingMessage {
        chat_id,
        text: reply.text,
        disable_link_preview: true,
    };

    let Err(e) = client.send(&outgoing).await else {
        return Delivery::Sent;
    };
    error!("Error processing message: {:#}", e);

    let fallback = OutgoingMessage {
        chat_id,
        text: FALLBACK_REPLY.to_string(),
        disable_link_preview: false,
    };
    match client.send(&fallback).await {
        Ok(()) => Delivery::Fallback,
        Err(e) => {
            error!("Failed to send error reply: {:#}", e);
            Delivery::Dropped
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::update::{Chat, User};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every message and fails the first `failures` sends
    #[derive(Default)]
    pub(crate) struct RecordingClient {
        pub sent: Mutex<Vec<OutgoingMessage>>,
        pub failures: Mutex<usize>,
    }

    impl RecordingClient {
        pub fn failing(failures: usize) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failures: Mutex::new(failures),
            }
        }

        pub fn sent(&self) -> Vec<OutgoingMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BotClient for RecordingClient {
        async fn send(&self, message: &OutgoingMessage) -> Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                bail!("Bad Request: chat not found");
            }
            Ok(())
        }
    }

    fn user(id: u64, first_name: &str) -> User {
        User {
            id,
            is_bot: false,
            first_name: first_name.to_string(),
            last_name: None,
            username: None,
            language_code: None,
        }
    }

    fn chat(id: i64, username: Option<&str>, title: Option<&str>) -> Chat {
        Chat {
            id,
            kind: None,
            username: username.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    fn update_with(from: Option<User>, origin: Option<ForwardOrigin>) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 10,
                date: 1_700_000_000,
                chat: chat(555, None, None),
                from,
                forward_origin: origin,
            }),
        }
    }

    #[test]
    fn test_no_message() {
        let update = Update {
            update_id: 9,
            message: None,
        };
        let reply = reply_for(&update);
        assert_eq!(reply.text, "No message found.");
        assert_eq!(reply.chat_id, None);
    }

    #[test]
    fn test_direct_sender() {
        let reply = reply_for(&update_with(Some(user(42, "Ann")), None));
        assert_eq!(reply.chat_id, Some(555));
        assert_eq!(reply.text, "Id: 42\nFirst: Ann");
    }

    #[test]
    fn test_no_sender_information() {
        let reply = reply_for(&update_with(None, None));
        assert_eq!(reply.text, "No user information available.");
    }

    #[test]
    fn test_forward_origin_wins_over_sender() {
        let origin = ForwardOrigin::User {
            sender_user: user(7, "Bo"),
            date: 0,
        };
        let reply = reply_for(&update_with(Some(user(42, "Ann")), Some(origin)));
        assert_eq!(reply.text, "Id: 7\nFirst: Bo");
    }

    #[test]
    fn test_channel_origin_with_link() {
        let origin = ForwardOrigin::Channel {
            chat: chat(-100, Some("news"), Some("News")),
            message_id: Some(321),
            author_signature: None,
            date: 0,
        };
        let reply = reply_for(&update_with(None, Some(origin)));
        assert_eq!(
            reply.text,
            "@news\nId: -100\nTitle: News\nhttps://t.me/news/321"
        );
        assert!(reply.text.ends_with("https://t.me/news/321"));
    }

    #[test]
    fn test_channel_origin_without_handle_or_id() {
        let no_handle = ForwardOrigin::Channel {
            chat: chat(-100, None, Some("Private")),
            message_id: Some(321),
            author_signature: None,
            date: 0,
        };
        let reply = reply_for(&update_with(None, Some(no_handle)));
        assert_eq!(reply.text, "Id: -100\nTitle: Private");

        let no_id = ForwardOrigin::Channel {
            chat: chat(-100, Some("news"), None),
            message_id: None,
            author_signature: None,
            date: 0,
        };
        let reply = reply_for(&update_with(None, Some(no_id)));
        assert_eq!(reply.text, "@news\nId: -100");
        assert!(!reply.text.contains("https://"));
    }

    #[test]
    fn test_chat_origin() {
        let origin = ForwardOrigin::Chat {
            sender_chat: chat(-200, None, Some("Admins")),
            author_signature: Some("boss".to_string()),
            date: 0,
        };
        let reply = reply_for(&update_with(None, Some(origin)));
        assert_eq!(reply.text, "Id: -200\nTitle: Admins");
    }

    #[test]
    fn test_hidden_user_origin() {
        let origin = ForwardOrigin::HiddenUser {
            sender_user_name: "Ghost".to_string(),
            date: 1_700_000_000,
        };
        let reply = reply_for(&update_with(None, Some(origin)));
        assert_eq!(
            reply.text,
            "Hidden User: Ghost\nDate: 11/14/2023, 10:13:20 PM"
        );
    }

    #[test]
    fn test_unknown_origin() {
        let reply = reply_for(&update_with(Some(user(1, "X")), Some(ForwardOrigin::Unknown)));
        assert_eq!(reply.text, "Unknown forward origin type.");
    }

    #[tokio::test]
    async fn test_sends_one_reply_without_preview() {
        let client = RecordingClient::default();
        let delivery = handle_update(&client, &update_with(Some(user(42, "Ann")), None)).await;

        assert_eq!(delivery, Delivery::Sent);
        assert_eq!(
            client.sent(),
            vec![OutgoingMessage {
                chat_id: 555,
                text: "Id: 42\nFirst: Ann".to_string(),
                disable_link_preview: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_nothing_sent_without_message() {
        let client = RecordingClient::default();
        let update = Update {
            update_id: 2,
            message: None,
        };
        assert_eq!(handle_update(&client, &update).await, Delivery::Skipped);
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reply_falls_back_once() {
        let client = RecordingClient::failing(1);
        let delivery = handle_update(&client, &update_with(Some(user(42, "Ann")), None)).await;

        assert_eq!(delivery, Delivery::Fallback);
        let sent = client.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[1].text,
            "Error processing message, please try again later."
        );
        assert_eq!(sent[1].chat_id, 555);
    }

    #[tokio::test]
    async fn test_failed_fallback_is_swallowed() {
        let client = RecordingClient::failing(5);
        let delivery = handle_update(&client, &update_with(Some(user(42, "Ann")), None)).await;

        assert_eq!(delivery, Delivery::Dropped);
        assert_eq!(client.sent().len(), 2);
    }
}
