//! Player identity and the view-filtered per-seat projection sent to clients.

use serde::{Deserialize, Serialize};

use crate::action::LastAction;
use crate::cards::Card;

/// Opaque per-seat identifier, stable for the lifetime of a game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// View-filtered public projection of a seat. `hole_cards` is populated only
/// when the viewer is entitled to see them (own seat, or shown at showdown).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub chips: u32,
    pub bet_this_round: u32,
    pub bet_this_hand: u32,
    pub folded: bool,
    pub all_in: bool,
    pub is_sitting_out: bool,
    pub is_creator: bool,
    pub has_shown_cards: bool,
    pub last_action: Option<LastAction>,
    pub hole_cards: Option<[Card; 2]>,
    pub connected: bool,
}
