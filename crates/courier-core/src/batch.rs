//! Webhook delivery decoding.
//!
//! A delivery looks like:
//!
//! ```text
//! { "object": "page",
//!   "entry": [ { "id": "<PAGE_ID>", "time": 1458692752478,
//!                "messaging": [ { "sender": {..}, "recipient": {..}, "timestamp": ..,
//!                                 "postback": { "payload": "menu:start" } } ] } ] }
//! ```
//!
//! [`EventBatch::decode`] flattens `entry[].messaging[]` into one ordered
//! list of [`Event`]s.

use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::error::{DecodeError, DecodeResult};
use crate::event::{
    AccountLinking, AccountLinkingEvent, Delivery, DeliveryEvent, Envelope, Event, GamePlay,
    GamePlayEvent, Message, MessageEvent, Optin, OptinEvent, Postback, PostbackEvent, Read,
    ReadEvent, Referral, ReferralEvent,
};

#[derive(Deserialize)]
struct RawWebhook {
    #[serde(default)]
    object: String,
    entry: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    messaging: Vec<RawMessaging>,
}

#[derive(Deserialize)]
struct RawMessaging {
    #[serde(flatten)]
    envelope: Envelope,
    message: Option<Message>,
    postback: Option<Postback>,
    delivery: Option<Delivery>,
    read: Option<Read>,
    optin: Option<Optin>,
    referral: Option<Referral>,
    game_play: Option<GamePlay>,
    account_linking: Option<AccountLinking>,
}

impl RawMessaging {
    fn into_event(self, index: usize) -> DecodeResult<Event> {
        let present = [
            self.message.is_some(),
            self.postback.is_some(),
            self.delivery.is_some(),
            self.read.is_some(),
            self.optin.is_some(),
            self.referral.is_some(),
            self.game_play.is_some(),
            self.account_linking.is_some(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count();

        if present > 1 {
            return Err(DecodeError::AmbiguousEvent { index });
        }

        let envelope = self.envelope;
        let event = if let Some(message) = self.message {
            MessageEvent { envelope, message }.into()
        } else if let Some(postback) = self.postback {
            PostbackEvent { envelope, postback }.into()
        } else if let Some(delivery) = self.delivery {
            DeliveryEvent { envelope, delivery }.into()
        } else if let Some(read) = self.read {
            ReadEvent { envelope, read }.into()
        } else if let Some(optin) = self.optin {
            OptinEvent { envelope, optin }.into()
        } else if let Some(referral) = self.referral {
            ReferralEvent { envelope, referral }.into()
        } else if let Some(game_play) = self.game_play {
            GamePlayEvent {
                envelope,
                game_play,
            }
            .into()
        } else if let Some(account_linking) = self.account_linking {
            AccountLinkingEvent {
                envelope,
                account_linking,
            }
            .into()
        } else {
            return Err(DecodeError::UnknownEvent { index });
        };

        Ok(event)
    }
}

/// The ordered events of one webhook delivery.
///
/// Events are held behind `Arc` so handlers can keep them beyond the
/// dispatch call without copying.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    object: String,
    events: Vec<Arc<Event>>,
}

impl EventBatch {
    /// Creates a batch from already-decoded events.
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            object: "page".to_string(),
            events: events.into_iter().map(Arc::new).collect(),
        }
    }

    /// Decodes a raw webhook body.
    ///
    /// Fails if the body is not valid JSON, misses required fields, or
    /// contains a messaging object that is not exactly one known event.
    pub fn decode(body: &[u8]) -> DecodeResult<Self> {
        let raw: RawWebhook = serde_json::from_slice(body)?;

        let events = raw
            .entry
            .into_iter()
            .flat_map(|entry| entry.messaging)
            .enumerate()
            .map(|(index, messaging)| messaging.into_event(index).map(Arc::new))
            .collect::<DecodeResult<Vec<_>>>()?;

        trace!(object = %raw.object, events = events.len(), "Decoded webhook batch");

        Ok(Self {
            object: raw.object,
            events,
        })
    }

    /// Returns the `object` field of the delivery (`"page"` for Messenger).
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Returns the events in delivery order.
    pub fn events(&self) -> &[Arc<Event>] {
        &self.events
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the batch holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the events in delivery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Event>> {
        self.events.iter()
    }
}

impl FromIterator<Event> for EventBatch {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a Arc<Event>;
    type IntoIter = std::slice::Iter<'a, Arc<Event>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    const DELIVERY: &str = r#"{
        "object": "page",
        "entry": [
            {
                "id": "PAGE", "time": 1458692752478,
                "messaging": [
                    {
                        "sender": {"id": "USER"}, "recipient": {"id": "PAGE"},
                        "timestamp": 1458692752478,
                        "message": {"mid": "m1", "text": "Red", "quick_reply": {"payload": "colors:red"}}
                    },
                    {
                        "sender": {"id": "USER"}, "recipient": {"id": "PAGE"},
                        "timestamp": 1458692752479,
                        "postback": {"title": "Start", "payload": "menu:start"}
                    }
                ]
            },
            {
                "id": "PAGE", "time": 1458692752480,
                "messaging": [
                    {
                        "sender": {"id": "USER"}, "recipient": {"id": "PAGE"},
                        "delivery": {"mids": ["m0"], "watermark": 1458668856253}
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_decode_flattens_entries_in_order() {
        let batch = EventBatch::decode(DELIVERY.as_bytes()).unwrap();
        assert_eq!(batch.object(), "page");

        let kinds: Vec<_> = batch.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Message, EventKind::Postback, EventKind::Delivery]
        );

        let first = &batch.events()[0];
        assert!(first.is_quick_reply());
        assert_eq!(first.payload(), Some("colors:red"));
        assert_eq!(batch.events()[1].payload(), Some("menu:start"));
        assert_eq!(batch.events()[2].payload(), None);
    }

    #[test]
    fn test_decode_game_play() {
        let body = r#"{"object": "page", "entry": [{"messaging": [{
            "sender": {"id": "PSID"}, "recipient": {"id": "PAGE"}, "timestamp": 1469111400000,
            "game_play": {"game_id": "G", "player_id": "P", "context_type": "SOLO", "score": 99}
        }]}]}"#;

        let batch = EventBatch::decode(body.as_bytes()).unwrap();
        let Event::GamePlay(game) = batch.events()[0].as_ref() else {
            panic!("expected game_play event");
        };
        assert_eq!(game.game_play.score, Some(99));
        assert_eq!(game.game_play.context_id, None);
        assert_eq!(game.sender.id, "PSID");
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = EventBatch::decode(b"{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn test_decode_rejects_missing_required_field() {
        let body = r#"{"object": "page", "entry": [{"messaging": [{
            "sender": {"id": "U"}, "recipient": {"id": "P"}, "postback": {"title": "no payload"}
        }]}]}"#;
        assert!(matches!(
            EventBatch::decode(body.as_bytes()),
            Err(DecodeError::Schema(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_and_ambiguous_events() {
        let unknown = r#"{"object": "page", "entry": [{"messaging": [
            {"sender": {"id": "U"}, "recipient": {"id": "P"}, "read": {"watermark": 1}},
            {"sender": {"id": "U"}, "recipient": {"id": "P"}, "reaction": {"emoji": "x"}}
        ]}]}"#;
        assert!(matches!(
            EventBatch::decode(unknown.as_bytes()),
            Err(DecodeError::UnknownEvent { index: 1 })
        ));

        let ambiguous = r#"{"object": "page", "entry": [{"messaging": [{
            "sender": {"id": "U"}, "recipient": {"id": "P"},
            "read": {"watermark": 1}, "delivery": {"watermark": 1}
        }]}]}"#;
        assert!(matches!(
            EventBatch::decode(ambiguous.as_bytes()),
            Err(DecodeError::AmbiguousEvent { index: 0 })
        ));
    }

    #[test]
    fn test_entry_without_messaging_is_empty() {
        let batch = EventBatch::decode(br#"{"object": "page", "entry": [{"id": "P"}]}"#).unwrap();
        assert!(batch.is_empty());
    }
}
