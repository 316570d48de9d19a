//! Betting-round bookkeeping: who acts next, when a round/stage completes,
//! and advancing to the next street.

use holdem_shared::{ActionEvent, EngineError, GameAction, Street};

use super::engine::GameEngine;

impl GameEngine {
    /// After an action is applied, recompute who is still pending, detect
    /// round/hand completion, and advance street or action as appropriate.
    pub(crate) fn post_action_update(&mut self, actor: usize, prev_current_bet: u32, now: i64) -> Result<(), EngineError> {
        if self.current_bet > prev_current_bet {
            self.rebuild_pending_to_act(actor);
        }
        self.remove_from_pending(actor);

        if self.active_seat_indices().len() <= 1 {
            self.street = Street::Showdown;
            super::showdown::finish_showdown(self, now);
            self.street = Street::Between;
            self.to_act = None;
            self.action_deadline = None;
            self.arm_auto_deal(now);
            return Ok(());
        }

        if self.is_betting_round_complete() {
            self.advance_stage()?;
            if self.street == Street::Showdown {
                super::showdown::finish_showdown(self, now);
                self.street = Street::Between;
                self.to_act = None;
                self.action_deadline = None;
                self.arm_auto_deal(now);
                return Ok(());
            }
            self.init_round_for_stage();
        } else {
            self.to_act = self.pending_to_act.first().copied();
        }
        self.refresh_action_deadline(now);
        Ok(())
    }

    fn rebuild_pending_to_act(&mut self, actor: usize) {
        let n = self.seats.len();
        self.pending_to_act.clear();
        for i in 1..=n {
            let idx = (actor + i) % n;
            let s = &self.seats[idx];
            if !s.folded && !s.all_in && s.bet_this_round < self.current_bet {
                self.pending_to_act.push(idx);
            }
        }
    }

    fn remove_from_pending(&mut self, actor: usize) {
        if let Some(pos) = self.pending_to_act.iter().position(|&i| i == actor) {
            let need = self.current_bet.saturating_sub(self.seats[actor].bet_this_round);
            if self.seats[actor].folded || self.seats[actor].all_in || need == 0 {
                self.pending_to_act.remove(pos);
            }
        }
    }

    fn is_betting_round_complete(&self) -> bool {
        self.pending_to_act.is_empty()
    }

    /// Initialize per-street state: who acts first, and (for postflop
    /// streets) reset round contributions. Preflop keeps `bet_this_round`
    /// as posted by the blinds.
    pub(crate) fn init_round_for_stage(&mut self) {
        let n = self.seats.len();
        if self.street != Street::Preflop {
            for s in &mut self.seats {
                s.bet_this_round = 0;
            }
            self.current_bet = 0;
            let (_, bb) = super::blinds::current_blinds(self);
            self.min_raise = bb;
        }

        let start = match self.street {
            Street::Preflop => self.to_act.unwrap_or(self.dealer_idx),
            Street::Flop | Street::Turn | Street::River => next_active_left_of_dealer(self),
            Street::Showdown | Street::Between => self.dealer_idx,
        };

        self.pending_to_act.clear();
        for i in 0..n {
            let idx = (start + i) % n;
            if !self.seats[idx].folded && !self.seats[idx].all_in {
                self.pending_to_act.push(idx);
            }
        }
        self.to_act = self.pending_to_act.first().copied();
    }

    fn advance_stage(&mut self) -> Result<(), EngineError> {
        let deal_err = |what: &str| EngineError::Internal(format!("deck underflow dealing {what}"));
        match self.street {
            Street::Preflop => {
                let cards = self
                    .deck
                    .deal(3)
                    .ok_or_else(|| deal_err("flop"))?;
                self.community_cards.extend(cards);
                self.street = Street::Flop;
            }
            Street::Flop => {
                let c = self.deck.deal_one().ok_or_else(|| deal_err("turn"))?;
                self.community_cards.push(c);
                self.street = Street::Turn;
            }
            Street::Turn => {
                let c = self.deck.deal_one().ok_or_else(|| deal_err("river"))?;
                self.community_cards.push(c);
                self.street = Street::River;
            }
            Street::River => {
                self.street = Street::Showdown;
            }
            Street::Showdown | Street::Between => {}
        }
        if self.street != Street::Showdown {
            self.log(ActionEvent::game(GameAction::DealtCommunity {
                cards: self.community_cards.clone(),
            }));
        }
        self.log(ActionEvent::game(GameAction::StageChanged(self.street)));

        // All-in fast-forward: no one left who can still act this street.
        if self.street != Street::Showdown
            && self
                .active_seat_indices()
                .iter()
                .filter(|&&i| !self.seats[i].all_in)
                .count()
                <= 1
        {
            while self.street != Street::Showdown {
                self.advance_stage_fast_forward()?;
            }
        }
        Ok(())
    }

    fn advance_stage_fast_forward(&mut self) -> Result<(), EngineError> {
        self.advance_stage()
    }
}

fn next_active_left_of_dealer(g: &GameEngine) -> usize {
    let n = g.seats.len();
    let mut i = (g.dealer_idx + 1) % n;
    loop {
        if !g.seats[i].folded && !g.seats[i].all_in {
            return i;
        }
        i = (i + 1) % n;
        if i == g.dealer_idx {
            return g.dealer_idx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::{GameSettings, PlayerAction, PlayerId};

    fn new_heads_up() -> GameEngine {
        let settings = GameSettings {
            starting_chips: 1000,
            small_blind_initial: 5,
            big_blind_initial: 10,
            blind_level_duration_minutes: 0,
            ..Default::default()
        };
        let mut g = GameEngine::new("C".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
        g.seats.push(super::super::engine::Seat::new(PlayerId(1), "B".into(), "h".into(), 1000));
        g.start_hand(0).unwrap();
        g
    }

    #[test]
    fn both_calling_preflop_advances_to_flop() {
        let mut g = new_heads_up();
        let actor = g.to_act.unwrap();
        g.process_action(g.seats[actor].player_id, PlayerAction::Call, 0).unwrap();
        let actor2 = g.to_act.unwrap();
        g.process_action(g.seats[actor2].player_id, PlayerAction::Check, 0).unwrap();
        assert_eq!(g.street, Street::Flop);
        assert_eq!(g.community_cards.len(), 3);
    }

    #[test]
    fn action_deadline_follows_to_act_and_clears_at_hand_end() {
        let mut g = new_heads_up();
        assert_eq!(g.action_deadline, Some(g.settings.turn_timeout_seconds as i64));
        let actor = g.to_act.unwrap();
        g.process_action(g.seats[actor].player_id, PlayerAction::Fold, 100).unwrap();
        assert_eq!(g.action_deadline, None);
        assert!(g.auto_deal_deadline.is_some());
    }
}
