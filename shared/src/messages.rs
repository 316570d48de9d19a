//! Wire protocol: settings, the view-filtered `EngineView`, and the
//! client/server message envelopes exchanged over HTTP and WebSocket.

use serde::{Deserialize, Serialize};

use crate::action::{ActionEvent, PlayerAction, Street, ValidAction};
use crate::cards::Card;
use crate::hand::HandResult;
use crate::player::{PlayerId, PlayerView};

/// Settings frozen at game creation; never mutated afterwards.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GameSettings {
    pub starting_chips: u32,
    pub small_blind_initial: u32,
    pub big_blind_initial: u32,
    pub allow_rebuys: bool,
    /// 0 = unlimited.
    pub max_rebuys: u32,
    /// 0 = no cutoff.
    pub rebuy_cutoff_minutes: u32,
    /// 0 = off.
    pub turn_timeout_seconds: u32,
    /// 0 = fixed blinds, schedule never advances.
    pub blind_level_duration_minutes: u32,
    pub auto_deal_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            starting_chips: 1000,
            small_blind_initial: 5,
            big_blind_initial: 10,
            allow_rebuys: true,
            max_rebuys: 0,
            rebuy_cutoff_minutes: 0,
            turn_timeout_seconds: 30,
            blind_level_duration_minutes: 20,
            auto_deal_enabled: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Refund {
    pub player_id: PlayerId,
    pub amount: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandResultSummary {
    pub hand_number: u32,
    pub winners: Vec<PlayerId>,
    pub pot_awarded: u32,
    pub community_cards: Vec<Card>,
    pub player_hands: Vec<HandResult>,
    pub refunds: Vec<Refund>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinalStandingEntry {
    pub player_id: PlayerId,
    pub rank: u32,
}

/// View-filtered, per-viewer projection of the engine's full state. Every
/// field named here is required per the external interface contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineView {
    pub game_code: String,
    pub hand_number: u32,
    pub street: Street,
    pub pot: u32,
    pub community_cards: Vec<Card>,
    pub dealer_player_id: Option<PlayerId>,
    pub action_on: Option<PlayerId>,
    pub current_bet: u32,
    pub min_raise: u32,
    pub hand_active: bool,
    pub game_over: bool,
    pub paused: bool,
    pub message: Option<String>,
    pub last_hand_result: Option<HandResultSummary>,
    pub players: Vec<PlayerView>,
    pub my_cards: Option<[Card; 2]>,
    pub valid_actions: Vec<ValidAction>,
    pub turn_timeout: u32,
    pub action_deadline: Option<i64>,
    pub auto_deal_deadline: Option<i64>,
    pub game_started_at: i64,
    pub total_paused_seconds: i64,
    pub small_blind: u32,
    pub big_blind: u32,
    pub blind_level: usize,
    pub blind_level_duration: u32,
    pub blind_schedule: Vec<(u32, u32)>,
    pub next_blind_change_at: Option<i64>,
    pub allow_rebuys: bool,
    pub max_rebuys: u32,
    pub rebuy_cutoff_minutes: u32,
    pub final_standings: Vec<FinalStandingEntry>,
    #[serde(default)]
    pub action_log: Vec<ActionEvent>,
}

/// Pre-start lobby projection (before the creator has started the first
/// hand, or after the game has ended).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LobbyView {
    pub code: String,
    pub status: LobbyStatus,
    pub settings: GameSettings,
    pub players: Vec<LobbyPlayer>,
    pub creator_id: PlayerId,
    pub created_at: i64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LobbyStatus {
    Lobby,
    Active,
    Ended,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_creator: bool,
    pub connected: bool,
}

/// Request DTOs consumed by the thin HTTP collaborator and forwarded to the
/// coordinator unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub settings: GameSettings,
    pub creator_name: String,
    pub creator_pin: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub pin: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player_id: PlayerId,
    pub pin: String,
    pub action: PlayerAction,
}

/// Messages a client may send over the WebSocket connection. HTTP uses the
/// equivalent individual request DTOs above instead of this envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMsg {
    Action {
        player_id: PlayerId,
        pin: String,
        action: PlayerAction,
    },
    RequestState {
        player_id: Option<PlayerId>,
    },
    Deal,
    Rebuy {
        player_id: PlayerId,
        pin: String,
    },
    CancelRebuy {
        player_id: PlayerId,
        pin: String,
    },
    ShowCards {
        player_id: PlayerId,
        pin: String,
    },
    Pause {
        player_id: PlayerId,
        pin: String,
    },
    Resume {
        player_id: PlayerId,
        pin: String,
    },
    Pong,
}

/// Messages the server pushes to a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    GameState { data: EngineView },
    LobbyState { data: LobbyView },
    ConnectionInfo {
        connected_players: Vec<PlayerId>,
        spectator_count: usize,
    },
    Error { message: String },
    Ping,
}
