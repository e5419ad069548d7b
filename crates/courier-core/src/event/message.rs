//! Message events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Envelope;

/// A tapped quick reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    /// Developer-defined payload of the tapped reply.
    pub payload: String,
}

/// A message attachment (image, audio, fallback, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific body, kept as raw JSON.
    #[serde(default)]
    pub payload: Value,
}

/// The `message` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID.
    pub mid: String,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set when the message was produced by a quick-reply tap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReply>,
    /// Set on echoes of messages sent by the page itself.
    #[serde(default)]
    pub is_echo: bool,
    /// Attachments, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// A message sent to the page.
///
/// `Deref` → [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub message: Message,
}

super::impl_envelope!(MessageEvent);

impl MessageEvent {
    /// Creates a plain text message event.
    pub fn text(envelope: Envelope, mid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            envelope,
            message: Message {
                mid: mid.into(),
                text: Some(text.into()),
                quick_reply: None,
                is_echo: false,
                attachments: Vec::new(),
            },
        }
    }

    /// Creates a message event produced by a quick-reply tap.
    pub fn quick_reply(
        envelope: Envelope,
        mid: impl Into<String>,
        title: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        let mut event = Self::text(envelope, mid, title);
        event.message.quick_reply = Some(QuickReply {
            payload: payload.into(),
        });
        event
    }

    /// Returns `true` if this message came from a quick-reply tap.
    pub fn is_quick_reply(&self) -> bool {
        self.message.quick_reply.is_some()
    }

    /// Returns the quick-reply payload, if any.
    pub fn payload(&self) -> Option<&str> {
        self.message.quick_reply.as_ref().map(|qr| qr.payload.as_str())
    }

    /// Returns the text content, or `""`.
    pub fn text_content(&self) -> &str {
        self.message.text.as_deref().unwrap_or_default()
    }
}
