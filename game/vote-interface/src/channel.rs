use crate::events::PlayerId;

/// Outgoing command surface of the host server.
///
/// All calls are fire-and-forget: delivery is not awaited and transport
/// failures are the implementor's problem (log and drop). The vote
/// service never reads a result back.
pub trait CommandChannelInterface: Send + Sync {
    /// Message shown to every connected player.
    fn broadcast(&self, msg: &str);
    /// Direct message to a single player.
    fn notify(&self, player_id: &PlayerId, msg: &str);
    /// Queue the given layer as the next one to be played.
    fn set_next_layer(&self, layer_id: &str);
    /// Switch the running round over to the given layer.
    fn set_current_layer(&self, layer_id: &str);
}
