//! Per-session audiences.
//!
//! Every session owns exactly two broadcast channels: one for the single
//! host observer and one for the set of joined players. An outbound event is
//! addressed by calling [`SessionChannels::to_host`] or
//! [`SessionChannels::to_players`]; there is no shared bus and no string
//! routing, so an event can never reach a connection belonging to a
//! different session.

use crate::protocol::ServerMessage;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct SessionChannels {
    host: broadcast::Sender<ServerMessage>,
    players: broadcast::Sender<ServerMessage>,
}

impl SessionChannels {
    pub fn new() -> Self {
        let (host, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (players, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { host, players }
    }

    pub fn subscribe_host(&self) -> broadcast::Receiver<ServerMessage> {
        self.host.subscribe()
    }

    pub fn subscribe_players(&self) -> broadcast::Receiver<ServerMessage> {
        self.players.subscribe()
    }

    pub fn to_host(&self, msg: ServerMessage) {
        // Ignore send errors (no receivers connected is fine)
        let _ = self.host.send(msg);
    }

    pub fn to_players(&self, msg: ServerMessage) {
        let _ = self.players.send(msg);
    }
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::new()
    }
}
