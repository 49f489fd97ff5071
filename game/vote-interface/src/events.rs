use serde::{Deserialize, Serialize};

use crate::auth::AuthLevel;

/// Unique identity of a connected player, as the game server reports
/// it (the platform account id).
pub type PlayerId = String;

/// A single chat line as received from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub player_id: PlayerId,
    pub player_name: String,
    /// raw, unparsed chat text
    pub message: String,
    pub auth: AuthLevel,
}

/// Lifecycle events the vote service consumes from the host server.
///
/// The payloads carry everything a host needs to keep its server-state
/// mirror current; the vote service itself reads live state through
/// [`crate::facts::ServerFactsInterface`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerEvent {
    /// A new round started on the given layer.
    RoundStarted {
        layer_id: String,
        next_layer_id: Option<String>,
    },
    PlayerConnected { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
    Chat(ChatEvent),
}
