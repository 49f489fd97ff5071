use crate::events::PlayerId;

/// Live server state the vote service reads but never owns.
///
/// Implementors answer from whatever mirror of the game server they
/// maintain; every call returns the state as of now.
pub trait ServerFactsInterface: Send + Sync {
    /// Id of the currently played layer, if known.
    fn current_layer(&self) -> Option<String>;
    /// Id of the layer currently queued as next, if any.
    fn next_layer(&self) -> Option<String>;
    /// Ids of all currently connected players.
    fn player_roster(&self) -> Vec<PlayerId>;
    fn population(&self) -> usize;
    /// Map names of recently finished rounds, most recent first.
    fn recent_map_names(&self) -> Vec<String>;
}
