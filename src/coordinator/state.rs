//! Shared coordinator state: per-game mutexes, the load/modify/save/
//! broadcast protocol, and the operations exposed to the HTTP/WS boundary.
//!
//! Persistence uses two keys per game: `engine:{code}` holds the full
//! `GameEngine` snapshot mutated by every operation, and `game:{code}` holds
//! a lighter catalog record (status, settings, seat roster) kept live during
//! the lobby phase and refreshed on the lobby→active and active→ended
//! transitions. `metrics:{kind}:{timestamp}:{code}` rows record creation and
//! completion events, zero-padded so a prefix scan yields chronological order.

use std::collections::HashMap;
use std::sync::Arc;

use holdem_shared::{
    EngineError, GameSettings, LobbyStatus, LobbyView, LobbyPlayer, PlayerId, ServerMsg,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::game::{self, GameEngine};
use crate::registry::ConnectionRegistry;
use crate::store::Store;

use super::auth::{hash_pin, verify_pin};

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const METRICS_RETENTION_SECONDS: i64 = 90 * 24 * 60 * 60;

fn game_key(code: &str) -> String {
    format!("game:{code}")
}

fn engine_key(code: &str) -> String {
    format!("engine:{code}")
}

fn metric_key(kind: &str, now: i64, code: &str) -> String {
    // now is zero-padded so lexical scan order matches chronological order.
    format!("metrics:{kind}:{now:020}:{code}")
}

/// Catalog record persisted at `game:{code}`. Distinct from the wire-level
/// `LobbyView` in that it carries `pin_hash` (never sent to a client) and a
/// few bookkeeping fields the wire view has no use for.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct LobbyRecord {
    code: String,
    status: LobbyStatus,
    settings: GameSettings,
    players: Vec<LobbyRecordSeat>,
    creator_id: PlayerId,
    created_at: i64,
    last_activity: i64,
    creator_ip: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LobbyRecordSeat {
    id: PlayerId,
    name: String,
    pin_hash: String,
    is_creator: bool,
    connected: bool,
}

fn lobby_status(engine: &GameEngine) -> LobbyStatus {
    if engine.game_over {
        LobbyStatus::Ended
    } else if engine.hand_number > 0 {
        LobbyStatus::Active
    } else {
        LobbyStatus::Lobby
    }
}

/// A single game's serialization lock. `tokio::sync::Mutex` queues waiters
/// FIFO, so concurrent requests against the same table are serialized in
/// arrival order rather than racing.
struct GameSlot {
    engine: Mutex<GameEngine>,
}

#[derive(Clone)]
pub struct CoordinatorState {
    pub store: Arc<dyn Store>,
    pub registry: ConnectionRegistry,
    games: Arc<RwLock<HashMap<String, Arc<GameSlot>>>>,
}

impl CoordinatorState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CoordinatorState {
            store,
            registry: ConnectionRegistry::new(),
            games: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn generate_code(&self) -> String {
        let mut rng = rand::rng();
        (0..ROOM_CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[idx] as char
            })
            .collect()
    }

    /// Get the in-memory slot for `code`, loading it from the store on a
    /// cold start if necessary. Returns `None` if no such game exists.
    async fn slot_for(&self, code: &str) -> Result<Option<Arc<GameSlot>>, EngineError> {
        if let Some(slot) = self.games.read().await.get(code) {
            return Ok(Some(slot.clone()));
        }
        let Some(bytes) = self.store.get(&engine_key(code)).await? else {
            return Ok(None);
        };
        let engine: GameEngine = serde_json::from_slice(&bytes)
            .map_err(|e| EngineError::Internal(format!("corrupt engine record: {e}")))?;
        let slot = Arc::new(GameSlot {
            engine: Mutex::new(engine),
        });
        self.games.write().await.insert(code.to_string(), slot.clone());
        Ok(Some(slot))
    }

    /// The core protocol: lock the game's mutex, load (already resident or
    /// fetched from the store), let `f` mutate it, persist the result, and
    /// broadcast the new view to every connected player and spectator.
    async fn with_game<T>(
        &self,
        code: &str,
        now: i64,
        f: impl FnOnce(&mut GameEngine) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let slot = self
            .slot_for(code)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("game {code}")))?;

        let mut engine = slot.engine.lock().await;
        let prior_status = lobby_status(&engine);
        let result = f(&mut engine)?;
        let new_status = lobby_status(&engine);

        let bytes = serde_json::to_vec(&*engine)
            .map_err(|e| EngineError::Internal(format!("serializing engine record: {e}")))?;
        self.store.put(&engine_key(code), bytes).await?;

        // The catalog record is kept live during the lobby phase (cheap,
        // low-frequency) and otherwise only refreshed on a status
        // transition, matching the coordinator's load/mutate/persist
        // protocol.
        if prior_status == LobbyStatus::Lobby || prior_status != new_status {
            self.refresh_lobby_record(code, &engine, None).await?;
        }
        if prior_status != LobbyStatus::Ended && new_status == LobbyStatus::Ended {
            self.record_metric("completed", code, now).await;
        }

        self.broadcast_views(code, &engine, now).await;
        Ok(result)
    }

    async fn refresh_lobby_record(
        &self,
        code: &str,
        engine: &GameEngine,
        creator_ip: Option<String>,
    ) -> Result<(), EngineError> {
        let creator_ip = match creator_ip {
            Some(ip) => Some(ip),
            None => self
                .store
                .get(&game_key(code))
                .await?
                .and_then(|bytes| serde_json::from_slice::<LobbyRecord>(&bytes).ok())
                .and_then(|r| r.creator_ip),
        };
        let record = LobbyRecord {
            code: code.to_string(),
            status: lobby_status(engine),
            settings: engine.settings,
            players: engine
                .seats
                .iter()
                .map(|s| LobbyRecordSeat {
                    id: s.player_id,
                    name: s.name.clone(),
                    pin_hash: s.pin_hash.clone(),
                    is_creator: s.is_creator,
                    connected: s.connected,
                })
                .collect(),
            creator_id: engine
                .seats
                .iter()
                .find(|s| s.is_creator)
                .map(|s| s.player_id)
                .unwrap_or(PlayerId(0)),
            created_at: engine.game_started_at,
            last_activity: engine.last_activity,
            creator_ip,
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| EngineError::Internal(format!("serializing lobby record: {e}")))?;
        self.store.put(&game_key(code), bytes).await
    }

    async fn record_metric(&self, kind: &str, code: &str, now: i64) {
        if let Err(e) = self.store.put(&metric_key(kind, now, code), code.as_bytes().to_vec()).await {
            tracing::warn!(game = %code, kind, error = %e, "failed to record metric");
        }
    }

    /// Hole cards make a single shared broadcast payload unsafe (every
    /// subscriber would see every other seat's cards), so the broadcast
    /// channel only ever carries a change notification; each connection
    /// reacts by pulling its own filtered view via `view_for`.
    async fn broadcast_views(&self, code: &str, engine: &GameEngine, _now: i64) {
        if engine.hand_number == 0 && !engine.hand_active() {
            self.registry
                .broadcast(code, ServerMsg::LobbyState { data: self.lobby_view(engine) })
                .await;
        } else {
            self.registry.broadcast(code, ServerMsg::Ping).await;
        }
    }

    fn lobby_view(&self, engine: &GameEngine) -> LobbyView {
        LobbyView {
            code: engine.code.clone(),
            status: lobby_status(engine),
            settings: engine.settings,
            players: engine
                .seats
                .iter()
                .map(|s| LobbyPlayer {
                    id: s.player_id,
                    name: s.name.clone(),
                    is_creator: s.is_creator,
                    connected: s.connected,
                })
                .collect(),
            creator_id: engine
                .seats
                .iter()
                .find(|s| s.is_creator)
                .map(|s| s.player_id)
                .unwrap_or(PlayerId(0)),
            created_at: engine.game_started_at,
        }
    }

    /// View of `code` as seen by `viewer`, computed fresh (used for the
    /// initial push to a newly-registered connection, rather than relying on
    /// catching the next broadcast).
    pub async fn view_for(
        &self,
        code: &str,
        viewer: Option<PlayerId>,
        now: i64,
    ) -> Result<ServerMsg, EngineError> {
        let slot = self
            .slot_for(code)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("game {code}")))?;
        let engine = slot.engine.lock().await;
        if engine.hand_number == 0 && !engine.hand_active() {
            Ok(ServerMsg::LobbyState { data: self.lobby_view(&engine) })
        } else {
            Ok(ServerMsg::GameState { data: game::to_view(&engine, viewer, now) })
        }
    }

    pub async fn create_game(
        &self,
        settings: GameSettings,
        creator_name: String,
        creator_pin: String,
        creator_ip: Option<String>,
        now: i64,
    ) -> Result<(String, PlayerId), EngineError> {
        let code = loop {
            let candidate = self.generate_code();
            if self.store.get(&engine_key(&candidate)).await?.is_none() {
                break candidate;
            }
        };
        let creator_id = PlayerId(0);
        let engine = GameEngine::new(
            code.clone(),
            settings,
            creator_id,
            creator_name,
            hash_pin(&creator_pin),
            now,
        );
        let bytes = serde_json::to_vec(&engine)
            .map_err(|e| EngineError::Internal(format!("serializing engine record: {e}")))?;
        self.store.put(&engine_key(&code), bytes).await?;
        self.refresh_lobby_record(&code, &engine, creator_ip).await?;
        self.record_metric("created", &code, now).await;
        self.games.write().await.insert(
            code.clone(),
            Arc::new(GameSlot {
                engine: Mutex::new(engine),
            }),
        );
        tracing::info!(game = %code, "created game");
        Ok((code, creator_id))
    }

    pub async fn join_game(
        &self,
        code: &str,
        name: String,
        pin: String,
        now: i64,
    ) -> Result<PlayerId, EngineError> {
        self.with_game(code, now, move |engine| {
            if engine.hand_number > 0 {
                return Err(EngineError::invalid_state("game_already_started"));
            }
            let name_lower = name.to_lowercase();
            if let Some(seat) = engine.seats.iter().find(|s| s.name.to_lowercase() == name_lower) {
                // Same name already seated: reconnect if the PIN matches,
                // otherwise the name is taken.
                return if verify_pin(&pin, &seat.pin_hash) {
                    Ok(seat.player_id)
                } else {
                    Err(EngineError::Conflict("name already taken".into()))
                };
            }
            let player_id = PlayerId(engine.seats.len() as u32);
            engine
                .seats
                .push(game::Seat::new(player_id, name, hash_pin(&pin), engine.settings.starting_chips));
            Ok(player_id)
        })
        .await
    }

    /// Leave the lobby before the first hand starts. The creator may only
    /// leave if they're the last seat remaining (leaving otherwise would
    /// orphan the table with no one authorized to start or pause it).
    pub async fn leave_game(&self, code: &str, player_id: PlayerId, pin: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_seat(engine, player_id, pin)?;
            if engine.hand_number > 0 {
                return Err(EngineError::invalid_state("game_already_started"));
            }
            let idx = engine
                .seat_idx(player_id)
                .ok_or_else(|| EngineError::NotFound("player".into()))?;
            if engine.seats[idx].is_creator && engine.seats.len() > 1 {
                return Err(EngineError::invalid_state("creator_cannot_leave"));
            }
            engine.seats.remove(idx);
            Ok(())
        })
        .await
    }

    /// Unlike every other mutating operation, `deal` carries no
    /// `(player_id, pin)` — the request contract lists it without the
    /// "creator only" annotation `pause` gets, and the wire `ClientMsg::Deal`
    /// variant is a bare tag with no auth payload. Any connected client may
    /// trigger the next hand once the table is between hands.
    pub async fn start_hand(&self, code: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| engine.start_hand(now)).await
    }

    pub async fn apply_action(
        &self,
        code: &str,
        player_id: PlayerId,
        pin: &str,
        action: holdem_shared::PlayerAction,
        now: i64,
    ) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_seat(engine, player_id, pin)?;
            engine.process_action(player_id, action, now)
        })
        .await
    }

    pub async fn queue_rebuy(&self, code: &str, player_id: PlayerId, pin: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_seat(engine, player_id, pin)?;
            game::queue_rebuy(engine, player_id, now)
        })
        .await
    }

    pub async fn cancel_rebuy(&self, code: &str, player_id: PlayerId, pin: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_seat(engine, player_id, pin)?;
            game::cancel_rebuy(engine, player_id)
        })
        .await
    }

    pub async fn show_cards(&self, code: &str, player_id: PlayerId, pin: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_seat(engine, player_id, pin)?;
            engine.show_cards(player_id)
        })
        .await
    }

    pub async fn pause(&self, code: &str, player_id: PlayerId, pin: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_creator(engine, player_id, pin)?;
            engine.pause(now)
        })
        .await
    }

    pub async fn resume(&self, code: &str, player_id: PlayerId, pin: &str, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            require_creator(engine, player_id, pin)?;
            engine.resume(now)
        })
        .await
    }

    pub async fn mark_connected(&self, code: &str, player_id: PlayerId, connected: bool, now: i64) -> Result<(), EngineError> {
        self.with_game(code, now, move |engine| {
            let idx = engine
                .seat_idx(player_id)
                .ok_or_else(|| EngineError::NotFound("player".into()))?;
            engine.seats[idx].connected = connected;
            Ok(())
        })
        .await
    }

    /// Every known game code, whether or not it's currently resident in
    /// memory. Used by the timer driver and the sweeper, which both need to
    /// walk the full set rather than only what's already loaded.
    pub async fn known_game_codes(&self) -> Result<Vec<String>, EngineError> {
        let entries = self.store.scan_prefix("engine:").await?;
        Ok(entries
            .into_iter()
            .map(|(key, _)| key.trim_start_matches("engine:").to_string())
            .collect())
    }

    /// One tick of the turn-timeout / auto-deal driver for a single game.
    /// Cheap no-op if the game is paused or neither deadline has passed.
    pub async fn tick_timers(&self, code: &str, now: i64) -> Result<(), EngineError> {
        let (needs_auto_action, needs_auto_deal) = {
            let slot = match self.slot_for(code).await? {
                Some(slot) => slot,
                None => return Ok(()),
            };
            let engine = slot.engine.lock().await;
            if engine.paused || engine.game_over {
                (false, false)
            } else {
                let auto_action = engine.settings.turn_timeout_seconds > 0
                    && engine.action_deadline.is_some_and(|d| d < now)
                    && engine.to_act.is_some();
                let auto_deal = !engine.hand_active()
                    && engine.settings.auto_deal_enabled
                    && engine.auto_deal_deadline.is_some_and(|d| d < now);
                (auto_action, auto_deal)
            }
        };

        if needs_auto_action {
            self.with_game(code, now, |engine| {
                let idx = engine.to_act.expect("checked above");
                let player_id = engine.seats[idx].player_id;
                let to_call = engine.current_bet.saturating_sub(engine.seats[idx].bet_this_round);
                let action = if to_call == 0 {
                    holdem_shared::PlayerAction::Check
                } else {
                    holdem_shared::PlayerAction::Fold
                };
                tracing::info!(game = %code, player = %player_id, "auto-action on turn timeout");
                engine.process_action(player_id, action, now)
            })
            .await?;
        }

        if needs_auto_deal {
            let result = self.with_game(code, now, |engine| engine.start_hand(now)).await;
            if let Err(e) = result {
                tracing::info!(game = %code, error = %e, "auto-deal failed, disarming");
                self.with_game(code, now, |engine| {
                    engine.auto_deal_deadline = None;
                    Ok(())
                })
                .await?;
            }
        }

        Ok(())
    }

    /// Whether `code` has been idle long enough to sweep: `idle_retention`
    /// for an ongoing game, `ended_retention` (usually longer, so finished
    /// tables stay visible for a while) once `game_over`.
    pub async fn is_stale(
        &self,
        code: &str,
        now: i64,
        idle_retention_seconds: i64,
        ended_retention_seconds: i64,
    ) -> Result<bool, EngineError> {
        let slot = match self.slot_for(code).await? {
            Some(slot) => slot,
            None => return Ok(false),
        };
        let engine = slot.engine.lock().await;
        let retention = if engine.game_over {
            ended_retention_seconds
        } else {
            idle_retention_seconds
        };
        Ok(now - engine.last_activity > retention)
    }

    /// Remove a game from the in-memory map and both of its KV rows, used by
    /// the sweeper. Honors the same per-game mutex as every other mutation.
    pub async fn remove_game(&self, code: &str) -> Result<(), EngineError> {
        if let Some(slot) = self.slot_for(code).await? {
            let _engine = slot.engine.lock().await;
            self.store.delete(&engine_key(code)).await?;
            self.store.delete(&game_key(code)).await?;
            self.games.write().await.remove(code);
            self.registry.remove_game(code).await;
            self.record_metric("cleaned", code, 0).await;
        }
        Ok(())
    }

    /// Delete `metrics:*` rows older than the 90-day retention window.
    pub async fn prune_metrics(&self, now: i64) -> Result<(), EngineError> {
        let entries = self.store.scan_prefix("metrics:").await?;
        for (key, _) in entries {
            let mut parts = key.splitn(4, ':');
            let (Some(_prefix), Some(_kind), Some(ts), Some(_code)) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            if let Ok(ts) = ts.parse::<i64>() {
                if now - ts > METRICS_RETENTION_SECONDS {
                    self.store.delete(&key).await?;
                }
            }
        }
        Ok(())
    }
}

fn require_seat(engine: &GameEngine, player_id: PlayerId, pin: &str) -> Result<(), EngineError> {
    let seat = engine
        .seat(player_id)
        .ok_or_else(|| EngineError::NotFound("player".into()))?;
    if !verify_pin(pin, &seat.pin_hash) {
        return Err(EngineError::Unauthorized("invalid pin".into()));
    }
    Ok(())
}

fn require_creator(engine: &GameEngine, player_id: PlayerId, pin: &str) -> Result<(), EngineError> {
    require_seat(engine, player_id, pin)?;
    let seat = engine.seat(player_id).expect("checked above");
    if !seat.is_creator {
        return Err(EngineError::Unauthorized("only the creator may do this".into()));
    }
    Ok(())
}
