//! Hand evaluation types.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::player::PlayerId;

/// Categories of poker hands, ordered weakest to strongest. Royal Flush is
/// its own top category rather than folded into StraightFlush.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandRankCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeKind,
    Straight,
    Flush,
    FullHouse,
    FourKind,
    StraightFlush,
    RoyalFlush,
}

/// Complete hand ranking: category plus tiebreaker ranks in descending
/// significance. Totally ordered by deriving `Ord` field-by-field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandRank {
    pub category: HandRankCategory,
    pub tiebreakers: Vec<u8>,
}

/// Result of evaluating one seat's hand at showdown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandResult {
    pub player_id: PlayerId,
    pub rank: HandRank,
    pub best_five: [Card; 5],
}
