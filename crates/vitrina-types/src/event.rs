//! Normalized inbound chat events.
//!
//! The chat transport converts whatever its platform delivers into these
//! shapes before handing them to the bot. Delivery mechanism (webhook or
//! long-poll) is invisible here.

use serde::{Deserialize, Serialize};

use crate::product::MediaKind;

/// Who sent an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Chat-platform user identifier, checked against the admin allow-list.
    pub id: i64,
    /// Best-effort human name (first name or username).
    pub display_name: Option<String>,
}

/// One inbound event from a single conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender: Sender,
    pub chat_id: i64,
    pub payload: EventPayload,
}

impl InboundEvent {
    pub fn new(sender: Sender, chat_id: i64, payload: EventPayload) -> Self {
        Self {
            sender,
            chat_id,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// A slash command, name without the leading `/` and lowercased.
    Command { name: String, args: Vec<String> },
    /// Free text.
    Text { text: String },
    /// A photo or video attachment.
    Media { attachment: MediaAttachment },
    /// A button click carrying an opaque payload.
    Callback { data: String },
}

impl EventPayload {
    /// Parse a raw message: `/cmd a b` becomes a command, anything else text.
    ///
    /// A `@botname` suffix on the command is dropped.
    pub fn from_message(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            let head = parts.next().unwrap_or_default();
            if !head.is_empty() {
                let name = head.split('@').next().unwrap_or(head).to_lowercase();
                return EventPayload::Command {
                    name,
                    args: parts.map(str::to_string).collect(),
                };
            }
        }
        EventPayload::Text {
            text: trimmed.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub source: MediaSource,
}

/// Where the attachment's content can be obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    /// Raw bytes already downloaded by the transport.
    Bytes { data: Vec<u8>, file_name: String },
    /// A platform-hosted URL the media host can fetch directly.
    PlatformUrl(String),
}
