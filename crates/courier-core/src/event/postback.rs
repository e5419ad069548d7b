//! Postback events.

use serde::{Deserialize, Serialize};

use super::{Envelope, Referral};

/// The `postback` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Postback {
    /// Title of the tapped button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Developer-defined payload of the tapped button.
    pub payload: String,
    /// Present when the conversation was opened through a referral.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral: Option<Referral>,
}

/// A button tap.
///
/// `Deref` → [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostbackEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub postback: Postback,
}

super::impl_envelope!(PostbackEvent);

impl PostbackEvent {
    /// Creates a postback event with the given payload.
    pub fn new(envelope: Envelope, payload: impl Into<String>) -> Self {
        Self {
            envelope,
            postback: Postback {
                title: None,
                payload: payload.into(),
                referral: None,
            },
        }
    }

    /// Returns the button payload.
    pub fn payload(&self) -> &str {
        &self.postback.payload
    }
}
