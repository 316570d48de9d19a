//! Connection registry: tracks which players/spectators are live on which
//! game, fans broadcast messages out to them, and arbitrates reconnects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use holdem_shared::{PlayerId, ServerMsg};
use tokio::sync::{broadcast, RwLock};

const BROADCAST_CHANNEL_BUFFER: usize = 64;

struct ConnMeta {
    generation: u64,
    last_heartbeat: i64,
}

struct GameChannel {
    tx: broadcast::Sender<ServerMsg>,
    connected: RwLock<HashMap<PlayerId, ConnMeta>>,
    spectator_count: AtomicUsize,
    next_generation: AtomicU64,
}

impl GameChannel {
    fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CHANNEL_BUFFER);
        GameChannel {
            tx,
            connected: RwLock::new(HashMap::new()),
            spectator_count: AtomicUsize::new(0),
            next_generation: AtomicU64::new(1),
        }
    }
}

/// A connection's registration handle. Holding a stale `generation` (because
/// a newer connection for the same player registered after this one) means
/// this socket's read loop should close: the reconnect superseded it.
#[derive(Clone, Copy)]
pub struct Registration {
    pub generation: u64,
}

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    games: Arc<RwLock<HashMap<String, Arc<GameChannel>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry::default()
    }

    async fn channel_for(&self, code: &str) -> Arc<GameChannel> {
        if let Some(ch) = self.games.read().await.get(code) {
            return ch.clone();
        }
        let mut games = self.games.write().await;
        games
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(GameChannel::new()))
            .clone()
    }

    /// Register a new connection for `player_id`, bumping its generation so
    /// any previously-registered socket for the same player is superseded.
    /// Returns a broadcast receiver and this connection's generation.
    pub async fn register_player(
        &self,
        code: &str,
        player_id: PlayerId,
        now: i64,
    ) -> (broadcast::Receiver<ServerMsg>, Registration) {
        let channel = self.channel_for(code).await;
        let generation = channel.next_generation.fetch_add(1, Ordering::SeqCst);
        channel.connected.write().await.insert(
            player_id,
            ConnMeta {
                generation,
                last_heartbeat: now,
            },
        );
        (channel.tx.subscribe(), Registration { generation })
    }

    /// Returns `true` if `reg` is still the current registration for
    /// `player_id` (i.e. no newer reconnect has superseded it).
    pub async fn is_current(&self, code: &str, player_id: PlayerId, reg: Registration) -> bool {
        let channel = self.channel_for(code).await;
        channel
            .connected
            .read()
            .await
            .get(&player_id)
            .map(|m| m.generation == reg.generation)
            .unwrap_or(false)
    }

    /// Remove `player_id`'s registration, but only if `reg` is still current
    /// (a stale disconnecting socket must not remove a newer reconnect).
    pub async fn unregister_player(&self, code: &str, player_id: PlayerId, reg: Registration) {
        let channel = self.channel_for(code).await;
        let mut connected = channel.connected.write().await;
        if connected.get(&player_id).map(|m| m.generation) == Some(reg.generation) {
            connected.remove(&player_id);
        }
    }

    pub async fn heartbeat(&self, code: &str, player_id: PlayerId, now: i64) {
        let channel = self.channel_for(code).await;
        if let Some(meta) = channel.connected.write().await.get_mut(&player_id) {
            meta.last_heartbeat = now;
        }
    }

    /// Player ids whose last heartbeat is older than `timeout_seconds`.
    pub async fn stale_players(&self, code: &str, now: i64, timeout_seconds: i64) -> Vec<PlayerId> {
        let channel = self.channel_for(code).await;
        channel
            .connected
            .read()
            .await
            .iter()
            .filter(|(_, m)| now - m.last_heartbeat > timeout_seconds)
            .map(|(id, _)| *id)
            .collect()
    }

    pub async fn connected_players(&self, code: &str) -> Vec<PlayerId> {
        let channel = self.channel_for(code).await;
        channel.connected.read().await.keys().copied().collect()
    }

    pub async fn register_spectator(&self, code: &str) -> broadcast::Receiver<ServerMsg> {
        let channel = self.channel_for(code).await;
        channel.spectator_count.fetch_add(1, Ordering::SeqCst);
        channel.tx.subscribe()
    }

    pub async fn unregister_spectator(&self, code: &str) {
        let channel = self.channel_for(code).await;
        channel.spectator_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub async fn spectator_count(&self, code: &str) -> usize {
        self.channel_for(code).await.spectator_count.load(Ordering::SeqCst)
    }

    /// Fan a message out to every subscriber (players + spectators) of `code`.
    /// A send error just means nobody is currently subscribed.
    pub async fn broadcast(&self, code: &str, msg: ServerMsg) {
        let channel = self.channel_for(code).await;
        let _ = channel.tx.send(msg);
    }

    /// Drop the registry entry entirely once a game is cleaned up by the
    /// sweeper, so it doesn't linger holding an idle broadcast channel.
    pub async fn remove_game(&self, code: &str) {
        self.games.write().await.remove(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reconnect_supersedes_old_registration() {
        let registry = ConnectionRegistry::new();
        let (_rx1, reg1) = registry.register_player("C", PlayerId(0), 0).await;
        let (_rx2, reg2) = registry.register_player("C", PlayerId(0), 1).await;
        assert!(!registry.is_current("C", PlayerId(0), reg1).await);
        assert!(registry.is_current("C", PlayerId(0), reg2).await);
    }

    #[tokio::test]
    async fn stale_disconnect_does_not_remove_newer_registration() {
        let registry = ConnectionRegistry::new();
        let (_rx1, reg1) = registry.register_player("C", PlayerId(0), 0).await;
        let (_rx2, reg2) = registry.register_player("C", PlayerId(0), 1).await;
        registry.unregister_player("C", PlayerId(0), reg1).await;
        assert!(registry.is_current("C", PlayerId(0), reg2).await);
    }

    #[tokio::test]
    async fn heartbeat_timeout_detected() {
        let registry = ConnectionRegistry::new();
        registry.register_player("C", PlayerId(0), 0).await;
        let stale = registry.stale_players("C", 100, 30).await;
        assert_eq!(stale, vec![PlayerId(0)]);
    }
}
