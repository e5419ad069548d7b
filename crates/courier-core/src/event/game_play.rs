//! Instant game events.

use serde::{Deserialize, Serialize};

use super::Envelope;

/// The `game_play` body of a messaging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePlay {
    /// App ID of the game.
    pub game_id: String,
    /// Instant-game-scoped player ID.
    pub player_id: String,
    /// `SOLO` or `THREAD`.
    pub context_type: String,
    /// Present for Messenger thread contexts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    /// Present for classic score-based games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    /// Present for rich games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

/// A finished instant game round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePlayEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub game_play: GamePlay,
}

super::impl_envelope!(GamePlayEvent);
