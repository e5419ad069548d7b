//! Messenger event schema.
//!
//! Every messaging object in a webhook delivery shares an [`Envelope`]
//! (sender, recipient, timestamp) and carries exactly one event body. Each
//! event struct embeds the envelope and `Deref`s to it, so
//! `postback.sender.id` works directly:
//!
//! ```text
//! Envelope { sender, recipient, timestamp }
//! ├── MessageEvent        { message }        ← kind = message
//! ├── PostbackEvent       { postback }       ← kind = postback
//! ├── DeliveryEvent       { delivery }       ← kind = delivery
//! ├── ReadEvent           { read }           ← kind = read
//! ├── OptinEvent          { optin }          ← kind = optin
//! ├── ReferralEvent       { referral }       ← kind = referral
//! ├── GamePlayEvent       { game_play }      ← kind = game_play
//! └── AccountLinkingEvent { account_linking } ← kind = account_linking
//! ```
//!
//! Dispatch only ever looks at three things: [`Event::kind`],
//! [`Event::payload`] and [`Event::is_quick_reply`].

pub mod game_play;
pub mod linking;
pub mod message;
pub mod postback;
pub mod receipt;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use game_play::*;
pub use linking::*;
pub use message::*;
pub use postback::*;
pub use receipt::*;

// ============================================================================
// Event Kind
// ============================================================================

/// The tag of an [`Event`].
///
/// Handler registries are keyed by this value, so lookups are by exact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A message sent to the page (text, attachments, quick-reply taps).
    Message,
    /// A button tap carrying a payload.
    Postback,
    /// Delivery confirmation of outbound messages.
    Delivery,
    /// Read receipt of outbound messages.
    Read,
    /// Plugin opt-in.
    Optin,
    /// m.me link or ad referral.
    Referral,
    /// Instant game round finished.
    GamePlay,
    /// Account (un)linking.
    AccountLinking,
}

impl EventKind {
    /// All known kinds, in schema order.
    pub const ALL: [EventKind; 8] = [
        EventKind::Message,
        EventKind::Postback,
        EventKind::Delivery,
        EventKind::Read,
        EventKind::Optin,
        EventKind::Referral,
        EventKind::GamePlay,
        EventKind::AccountLinking,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Postback => "postback",
            Self::Delivery => "delivery",
            Self::Read => "read",
            Self::Optin => "optin",
            Self::Referral => "referral",
            Self::GamePlay => "game_play",
            Self::AccountLinking => "account_linking",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A page-scoped participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Page-scoped ID.
    pub id: String,
}

/// Fields shared by every messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Who triggered the event.
    pub sender: Party,
    /// The page receiving the event.
    pub recipient: Party,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl Envelope {
    /// Creates an envelope without a timestamp.
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            sender: Party { id: sender.into() },
            recipient: Party {
                id: recipient.into(),
            },
            timestamp: None,
        }
    }
}

/// Implements `Deref<Target = Envelope>` for an event struct with an `envelope` field.
macro_rules! impl_envelope {
    ($($ty:ty),* $(,)?) => {
        $(
            impl std::ops::Deref for $ty {
                type Target = $crate::event::Envelope;

                fn deref(&self) -> &Self::Target {
                    &self.envelope
                }
            }
        )*
    };
}

pub(crate) use impl_envelope;

// ============================================================================
// Event
// ============================================================================

/// One decoded messaging event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Event {
    Message(MessageEvent),
    Postback(PostbackEvent),
    Delivery(DeliveryEvent),
    Read(ReadEvent),
    Optin(OptinEvent),
    Referral(ReferralEvent),
    GamePlay(GamePlayEvent),
    AccountLinking(AccountLinkingEvent),
}

impl Event {
    /// Returns the tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Postback(_) => EventKind::Postback,
            Self::Delivery(_) => EventKind::Delivery,
            Self::Read(_) => EventKind::Read,
            Self::Optin(_) => EventKind::Optin,
            Self::Referral(_) => EventKind::Referral,
            Self::GamePlay(_) => EventKind::GamePlay,
            Self::AccountLinking(_) => EventKind::AccountLinking,
        }
    }

    /// Returns the shared envelope.
    pub fn envelope(&self) -> &Envelope {
        match self {
            Self::Message(e) => &e.envelope,
            Self::Postback(e) => &e.envelope,
            Self::Delivery(e) => &e.envelope,
            Self::Read(e) => &e.envelope,
            Self::Optin(e) => &e.envelope,
            Self::Referral(e) => &e.envelope,
            Self::GamePlay(e) => &e.envelope,
            Self::AccountLinking(e) => &e.envelope,
        }
    }

    /// Returns the sender's page-scoped ID.
    pub fn sender_id(&self) -> &str {
        &self.envelope().sender.id
    }

    /// Returns the routing payload.
    ///
    /// Only postbacks and quick-reply messages carry one.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Message(e) => e.payload(),
            Self::Postback(e) => Some(&e.postback.payload),
            _ => None,
        }
    }

    /// Returns `true` for a message event produced by a quick-reply tap.
    pub fn is_quick_reply(&self) -> bool {
        matches!(self, Self::Message(e) if e.is_quick_reply())
    }

    /// Returns the message event, if this is one.
    pub fn as_message(&self) -> Option<&MessageEvent> {
        match self {
            Self::Message(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the postback event, if this is one.
    pub fn as_postback(&self) -> Option<&PostbackEvent> {
        match self {
            Self::Postback(e) => Some(e),
            _ => None,
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Event {
                fn from(event: $ty) -> Self {
                    Self::$variant(event)
                }
            }
        )*
    };
}

impl_from_event!(
    Message(MessageEvent),
    Postback(PostbackEvent),
    Delivery(DeliveryEvent),
    Read(ReadEvent),
    Optin(OptinEvent),
    Referral(ReferralEvent),
    GamePlay(GamePlayEvent),
    AccountLinking(AccountLinkingEvent),
);

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope {
            sender: Party { id: "user".into() },
            recipient: Party { id: "page".into() },
            timestamp: Some(1_469_111_400_000),
        }
    }

    #[test]
    fn test_kind_wire_names_match_serde() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_plain_message_has_no_payload() {
        let event = Event::from(MessageEvent::text(envelope(), "m1", "hello"));
        assert_eq!(event.kind(), EventKind::Message);
        assert!(!event.is_quick_reply());
        assert_eq!(event.payload(), None);
        assert_eq!(event.sender_id(), "user");
    }

    #[test]
    fn test_quick_reply_and_postback_expose_payload() {
        let qr = Event::from(MessageEvent::quick_reply(envelope(), "m2", "Yes", "ANSWER_YES"));
        assert!(qr.is_quick_reply());
        assert_eq!(qr.payload(), Some("ANSWER_YES"));

        let pb = Event::from(PostbackEvent::new(envelope(), "menu:start"));
        assert_eq!(pb.kind(), EventKind::Postback);
        assert!(!pb.is_quick_reply());
        assert_eq!(pb.payload(), Some("menu:start"));
    }

    #[test]
    fn test_envelope_deref() {
        let read = ReadEvent {
            envelope: envelope(),
            read: Read { watermark: 42 },
        };
        assert_eq!(read.recipient.id, "page");
        assert_eq!(Event::from(read).envelope().timestamp, Some(1_469_111_400_000));
    }
}
