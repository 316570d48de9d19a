//! Deck construction, shuffling, and dealing.

use std::collections::VecDeque;

use holdem_shared::{Card, Suit};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// An ordered sequence of unique cards. `deal(n)` removes and returns the
/// first `n` cards, failing if fewer remain so an engine operation can
/// surface a deck-underflow bug loudly instead of dealing garbage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck(VecDeque<Card>);

impl Deck {
    /// A fresh, unshuffled 52-card deck in suit-major order.
    pub fn fresh() -> Self {
        let mut cards = Vec::with_capacity(52);
        for &suit in Suit::ALL.iter() {
            for rank in 2..=14u8 {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck(VecDeque::from(cards))
    }

    /// Fresh deck shuffled with an OS-seeded RNG (Fisher-Yates via `rand`).
    pub fn shuffled() -> Self {
        let mut cards: Vec<Card> = Self::fresh().0.into();
        cards.shuffle(&mut rand::rng());
        Deck(VecDeque::from(cards))
    }

    /// Deterministic shuffle for tests: a small LCG drives Fisher-Yates so
    /// hand outcomes are reproducible across runs.
    pub fn shuffled_with_seed(seed: u64) -> Self {
        fn lcg(state: &mut u64) -> u32 {
            *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (*state >> 32) as u32
        }
        let mut cards: Vec<Card> = Self::fresh().0.into();
        let mut s = seed;
        for i in (1..cards.len()).rev() {
            let r = lcg(&mut s) as usize % (i + 1);
            cards.swap(i, r);
        }
        Deck(VecDeque::from(cards))
    }

    pub fn deal(&mut self, n: usize) -> Option<Vec<Card>> {
        if self.0.len() < n {
            return None;
        }
        Some((0..n).filter_map(|_| self.0.pop_front()).collect())
    }

    pub fn deal_one(&mut self) -> Option<Card> {
        self.0.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.0.len()
    }
}

pub fn card_str(c: Card) -> String {
    c.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_deck_has_52_unique_cards() {
        let deck = Deck::fresh();
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn shuffled_with_seed_is_deterministic() {
        let a = Deck::shuffled_with_seed(99);
        let b = Deck::shuffled_with_seed(99);
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }

    #[test]
    fn deal_fails_on_underflow() {
        let mut deck = Deck::fresh();
        assert!(deck.deal(53).is_none());
        assert_eq!(deck.remaining(), 52);
    }
}
