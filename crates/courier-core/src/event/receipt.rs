//! Delivery and read receipts.

use serde::{Deserialize, Serialize};

use super::Envelope;

/// The `delivery` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    /// IDs of the delivered messages, when known.
    #[serde(default)]
    pub mids: Vec<String>,
    /// Everything before this timestamp was delivered.
    pub watermark: i64,
}

/// The `read` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Read {
    /// Everything before this timestamp was read.
    pub watermark: i64,
}

/// Delivery confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub delivery: Delivery,
}

/// Read receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub read: Read,
}

super::impl_envelope!(DeliveryEvent, ReadEvent);
