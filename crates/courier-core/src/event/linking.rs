//! Opt-in, referral and account-linking events.

use serde::{Deserialize, Serialize};

use super::Envelope;

/// The `optin` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optin {
    /// The `data-ref` of the plugin.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Present for checkbox plugin opt-ins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ref: Option<String>,
}

/// The `referral` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    /// The `ref` parameter of the link.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Origin of the referral (`SHORTLINK`, `ADS`, ...).
    pub source: String,
    /// Always `OPEN_THREAD` at the time of writing.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The `account_linking` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLinking {
    /// `linked` or `unlinked`.
    pub status: String,
    /// Present when `status` is `linked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
}

/// Plugin opt-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptinEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub optin: Optin,
}

/// m.me link or ad referral into an existing thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub referral: Referral,
}

/// Account linking status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLinkingEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub account_linking: AccountLinking,
}

super::impl_envelope!(OptinEvent, ReferralEvent, AccountLinkingEvent);

impl AccountLinkingEvent {
    /// Returns `true` if the account was linked rather than unlinked.
    pub fn is_linked(&self) -> bool {
        self.account_linking.status == "linked"
    }
}
