//! `start_hand` and blind posting.

use holdem_shared::{ActionEvent, ActionKind, BlindKind, EngineError, GameAction, Street};

use crate::poker::cards::Deck;

use super::engine::GameEngine;

impl GameEngine {
    /// Start a new hand. Preconditions: game not over, at least two seats
    /// with chips and not sitting out. Fulfills queued rebuys, rotates the
    /// dealer, posts blinds, deals hole cards, and sets up preflop action.
    pub fn start_hand(&mut self, now: i64) -> Result<(), EngineError> {
        if self.game_over {
            return Err(EngineError::invalid_state("game_over"));
        }

        super::rebuy::fulfill_queued_rebuys(self);

        let startable = self.startable_seat_indices();
        if startable.len() < 2 {
            return Err(EngineError::invalid_state("not_enough_players"));
        }

        super::blinds::advance(self, now);

        if self.hand_number > 0 {
            self.dealer_idx = next_dealer(self, self.dealer_idx);
        } else {
            self.dealer_idx = startable[0];
        }

        self.hand_number += 1;
        self.deck = Deck::shuffled();
        self.community_cards.clear();
        self.pots.clear();
        self.current_bet = 0;
        self.last_raiser_id = None;
        self.recent_actions.clear();
        self.last_hand_result = None;

        for seat in self.seats.iter_mut() {
            let eligible = seat.chips > 0 && !seat.is_sitting_out;
            seat.folded = !eligible;
            seat.all_in = false;
            seat.has_shown_cards = false;
            seat.bet_this_round = 0;
            seat.bet_this_hand = 0;
            seat.last_action = None;
            if eligible {
                seat.hole_cards = None;
            }
        }

        let mut dealt_events = Vec::new();
        for &idx in &self.startable_seat_indices() {
            let c1 = self
                .deck
                .deal_one()
                .ok_or_else(|| EngineError::Internal("deck underflow dealing hole card 1".into()))?;
            let c2 = self
                .deck
                .deal_one()
                .ok_or_else(|| EngineError::Internal("deck underflow dealing hole card 2".into()))?;
            self.seats[idx].hole_cards = Some([c1, c2]);
            dealt_events.push(ActionEvent::game(GameAction::DealtHole {
                player_id: self.seats[idx].player_id,
            }));
        }
        for ev in dealt_events {
            self.log(ev);
        }

        self.street = Street::Preflop;
        let (sb, bb) = super::blinds::current_blinds(self);
        self.min_raise = bb;

        let n = startable.len();
        if n == 2 {
            let sb_idx = self.dealer_idx;
            let bb_idx = next_active_from(self, sb_idx);
            post_blind(self, sb_idx, BlindKind::SmallBlind, sb);
            post_blind(self, bb_idx, BlindKind::BigBlind, bb);
            self.to_act = Some(sb_idx);
        } else {
            let sb_idx = next_active_from(self, self.dealer_idx);
            let bb_idx = next_active_from(self, sb_idx);
            post_blind(self, sb_idx, BlindKind::SmallBlind, sb);
            post_blind(self, bb_idx, BlindKind::BigBlind, bb);
            self.to_act = Some(next_active_from(self, bb_idx));
        }
        self.current_bet = bb;

        self.log(ActionEvent::game(GameAction::StageChanged(self.street)));
        self.init_round_for_stage();
        self.auto_deal_deadline = None;
        self.refresh_action_deadline(now);
        self.last_activity = now;
        Ok(())
    }
}

fn next_active_from(g: &GameEngine, idx: usize) -> usize {
    let n = g.seats.len();
    let mut i = (idx + 1) % n;
    loop {
        if !g.seats[i].folded && !g.seats[i].all_in {
            return i;
        }
        i = (i + 1) % n;
        if i == idx {
            return idx;
        }
    }
}

fn next_dealer(g: &GameEngine, from: usize) -> usize {
    let n = g.seats.len();
    let mut i = (from + 1) % n;
    loop {
        if g.seats[i].chips > 0 && !g.seats[i].is_sitting_out {
            return i;
        }
        i = (i + 1) % n;
        if i == from {
            return from;
        }
    }
}

fn post_blind(g: &mut GameEngine, idx: usize, kind: BlindKind, amount: u32) {
    let pay = amount.min(g.seats[idx].chips);
    g.seats[idx].chips -= pay;
    g.seats[idx].bet_this_round += pay;
    g.seats[idx].bet_this_hand += pay;
    if pay < amount || g.seats[idx].chips == 0 {
        g.seats[idx].all_in = true;
    }
    g.log(ActionEvent::player(
        g.seats[idx].player_id,
        ActionKind::PostBlind { kind, amount: pay },
    ));
    tracing::info!(
        game = %g.code,
        player = %g.seats[idx].player_id,
        kind = ?kind,
        amount = pay,
        "posted blind"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::{GameSettings, PlayerId};

    fn new_game(n_players: usize) -> GameEngine {
        let settings = GameSettings {
            starting_chips: 1000,
            small_blind_initial: 5,
            big_blind_initial: 10,
            blind_level_duration_minutes: 0,
            ..Default::default()
        };
        let mut g = GameEngine::new("CODE01".into(), settings, PlayerId(0), "P0".into(), "h".into(), 0);
        for i in 1..n_players {
            g.seats.push(super::super::engine::Seat::new(
                PlayerId(i as u32),
                format!("P{i}"),
                "h".into(),
                1000,
            ));
        }
        g
    }

    #[test]
    fn heads_up_dealer_posts_small_blind() {
        let mut g = new_game(2);
        g.start_hand(0).unwrap();
        assert_eq!(g.seats[0].bet_this_round, 5);
        assert_eq!(g.seats[1].bet_this_round, 10);
        assert_eq!(g.to_act, Some(0));
        assert!(g.seats[0].hole_cards.is_some());
        assert!(g.seats[1].hole_cards.is_some());
    }

    #[test]
    fn three_players_blinds_and_action_order() {
        let mut g = new_game(3);
        g.start_hand(0).unwrap();
        assert_eq!(g.seats[1].bet_this_round, 5);
        assert_eq!(g.seats[2].bet_this_round, 10);
        assert_eq!(g.to_act, Some(0));
    }

    #[test]
    fn start_hand_fails_with_one_player() {
        let mut g = new_game(1);
        assert!(g.start_hand(0).is_err());
    }

    #[test]
    fn short_stack_blind_caps_and_marks_all_in() {
        let mut g = new_game(2);
        g.seats[0].chips = 3;
        g.start_hand(0).unwrap();
        assert_eq!(g.seats[0].chips, 0);
        assert!(g.seats[0].all_in);
        assert_eq!(g.seats[0].bet_this_round, 3);
    }
}
