//! Applying a single player action: fold/check/call/raise/all-in.

use holdem_shared::{ActionEvent, ActionKind, EngineError, LastAction, PlayerAction, PlayerId};

use super::engine::GameEngine;

impl GameEngine {
    /// Apply `action` on behalf of `player_id`.
    pub fn process_action(
        &mut self,
        player_id: PlayerId,
        action: PlayerAction,
        now: i64,
    ) -> Result<(), EngineError> {
        let actor = self
            .seat_idx(player_id)
            .ok_or_else(|| EngineError::NotFound("player".into()))?;

        if self.to_act != Some(actor) {
            return Err(EngineError::invalid_state("not_your_turn"));
        }
        if self.seats[actor].folded || self.seats[actor].all_in {
            return Err(EngineError::invalid_state("seat_cannot_act"));
        }

        let prev_current_bet = self.current_bet;
        let to_call = self.current_bet.saturating_sub(self.seats[actor].bet_this_round);

        let (kind, last_action) = match action {
            PlayerAction::Fold => {
                self.seats[actor].folded = true;
                (ActionKind::Fold, LastAction::Fold)
            }
            PlayerAction::Check => {
                if to_call != 0 {
                    return Err(EngineError::invalid_state("cannot_check_facing_bet"));
                }
                (ActionKind::Check, LastAction::Check)
            }
            PlayerAction::Call => {
                let pay = to_call.min(self.seats[actor].chips);
                self.apply_chips(actor, pay);
                if self.seats[actor].chips == 0 {
                    self.seats[actor].all_in = true;
                }
                (ActionKind::Call(pay), LastAction::Call)
            }
            PlayerAction::Raise { amount: raise_to } => self.apply_raise(actor, raise_to)?,
            PlayerAction::AllIn => {
                let chips = self.seats[actor].chips;
                let raise_to = self.seats[actor].bet_this_round + chips;
                if raise_to <= self.current_bet {
                    let pay = chips;
                    self.apply_chips(actor, pay);
                    self.seats[actor].all_in = true;
                    (ActionKind::AllIn(pay), LastAction::AllIn)
                } else {
                    self.apply_raise(actor, raise_to)?
                }
            }
        };

        self.seats[actor].last_action = Some(last_action);
        self.log(ActionEvent::player(player_id, kind));
        self.last_activity = now;
        self.post_action_update(actor, prev_current_bet, now)
    }

    fn apply_chips(&mut self, idx: usize, pay: u32) {
        self.seats[idx].chips -= pay;
        self.seats[idx].bet_this_round += pay;
        self.seats[idx].bet_this_hand += pay;
    }

    /// Raise "to" `raise_to` (a total bet-this-round amount, not a delta).
    /// Enforces the table minimum raise; a short all-in raise is accepted
    /// but does not reopen action (the table's `min_raise` stays unchanged).
    fn apply_raise(&mut self, actor: usize, raise_to: u32) -> Result<(ActionKind, LastAction), EngineError> {
        let seat_total_available = self.seats[actor].bet_this_round + self.seats[actor].chips;
        let raise_to = raise_to.min(seat_total_available);
        if raise_to <= self.current_bet {
            return Err(EngineError::invalid_state("raise_must_exceed_current_bet"));
        }

        let full_min_raise_to = self.current_bet + self.min_raise;
        let is_all_in = raise_to == seat_total_available && self.seats[actor].chips > 0;
        let reopens = raise_to >= full_min_raise_to;

        if !reopens && raise_to < seat_total_available {
            return Err(EngineError::invalid_state("raise_below_minimum"));
        }

        let pay = raise_to - self.seats[actor].bet_this_round;
        self.apply_chips(actor, pay);

        if reopens {
            self.min_raise = raise_to - self.current_bet;
            self.last_raiser_id = Some(self.seats[actor].player_id);
        }
        self.current_bet = self.current_bet.max(raise_to);

        if self.seats[actor].chips == 0 {
            self.seats[actor].all_in = true;
            if is_all_in {
                return Ok((ActionKind::AllIn(pay), LastAction::AllIn));
            }
        }
        Ok((
            ActionKind::Raise {
                to: raise_to,
                by: self.min_raise,
            },
            LastAction::Raise,
        ))
    }
}
