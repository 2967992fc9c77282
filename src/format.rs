use chrono::DateTime;

use crate::update::{non_empty, Chat, User};

/// Render a user as one field per line: handle, id, names, language
pub fn format_user(user: &User) -> String {
    let mut info = String::new();
    if let Some(username) = non_empty(&user.username) {
        info.push_str(&format!("@{}\n", username));
    }
    info.push_str(&format!("Id: {}\n", user.id));
    info.push_str(&format!("First: {}\n", user.first_name));
    if let Some(last_name) = non_empty(&user.last_name) {
        info.push_str(&format!("Last: {}\n", last_name));
    }
    if let Some(lang) = non_empty(&user.language_code) {
        info.push_str(&format!("Lang: {}\n", lang));
    }
    info
}

/// Render a channel or group chat: handle, id, title
pub fn format_chat(chat: &Chat) -> String {
    let mut info = String::new();
    if let Some(username) = non_empty(&chat.username) {
        info.push_str(&format!("@{}\n", username));
    }
    info.push_str(&format!("Id: {}\n", chat.id));
    if let Some(title) = non_empty(&chat.title) {
        info.push_str(&format!("Title: {}\n", title));
    }
    info
}

pub fn format_hidden_user(sender_user_name: &str, date: i64) -> String {
    format!(
        "Hidden User: {}\nDate: {}\n",
        sender_user_name,
        format_timestamp(date)
    )
}

/// Unix seconds as `M/D/YYYY, h:mm:ss AM` in UTC.
pub fn format_timestamp(epoch_secs: i64) -> String {
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(dt) => dt.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// Public link to a post in a channel that has a username
pub fn channel_post_link(username: &str, message_id: i64) -> String {
    format!("https://t.me/{}/{}", username, message_id)
}
