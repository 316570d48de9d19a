//! Action and event types: what a client may request, what actually
//! happened (richer, used for the history log), and game-level events.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::HandResult;
use crate::player::PlayerId;

/// Street within a hand. `Between` is the inter-hand resting state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Between,
}

/// Action a client requests the engine perform on its behalf. A discriminated
/// union over {fold, check, call, raise(amount), all_in}; unknown tags are
/// rejected by serde as a deserialization error, surfaced as `InvalidArgument`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Raise { amount: u32 },
    AllIn,
}

/// Last action taken by a seat, kept for the view and for `final_standings`
/// presentation. `None` means the seat has not acted yet this hand.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LastAction {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlindKind {
    SmallBlind,
    BigBlind,
}

/// Richer action record kept in the history log (includes amounts).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call(u32),
    Raise { to: u32, by: u32 },
    AllIn(u32),
    PostBlind { kind: BlindKind, amount: u32 },
}

/// A legal move offered to the seat currently `action_on`, with amounts
/// already resolved against that seat's stack.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidAction {
    Fold,
    Check,
    Call { amount: u32 },
    Raise { min_amount: u32, max_amount: u32 },
    AllIn { amount: u32 },
}

/// Dealer/system-level events: dealing, stage changes, showdown, awards,
/// rebuys, pause/resume, blind advances, eliminations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GameAction {
    StageChanged(Street),
    DealtHole { player_id: PlayerId },
    DealtCommunity { cards: Vec<Card> },
    Showdown { hand_results: Vec<HandResult> },
    PotAwarded { winners: Vec<PlayerId>, amount: u32 },
    Refund { player_id: PlayerId, amount: u32 },
    Eliminated { player_id: PlayerId },
    RebuyQueued { player_id: PlayerId },
    RebuyFulfilled { player_id: PlayerId },
    Paused,
    Resumed,
    BlindLevelAdvanced { level: usize, sb: u32, bb: u32 },
}

/// A single recorded event. Player-initiated actions carry the acting seat;
/// everything else is a `GameAction`. This is the canonical in-memory log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ActionEvent {
    PlayerAction {
        player_id: PlayerId,
        action: ActionKind,
    },
    GameAction(GameAction),
}

impl ActionEvent {
    pub fn player(player_id: PlayerId, action: ActionKind) -> Self {
        ActionEvent::PlayerAction { player_id, action }
    }

    pub fn game(action: GameAction) -> Self {
        ActionEvent::GameAction(action)
    }
}
