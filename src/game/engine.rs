//! Core `GameEngine` and `Seat` definitions, constructors, and small helpers
//! shared by every other module in `game::*`.

use holdem_shared::{ActionEvent, GameSettings, LastAction, PlayerId, Street};
use serde::{Deserialize, Serialize};

use crate::poker::cards::Deck;

pub(crate) const MAX_RECENT_ACTIONS: usize = 200;

/// Gap between a hand ending and auto-deal becoming eligible, when
/// `auto_deal_enabled`. Not itself a setting; a short pause gives players a
/// moment to see the showdown result before the next hand starts.
pub(crate) const AUTO_DEAL_DELAY_SECONDS: i64 = 5;

/// One player's seat at the table. Stays in `GameEngine::seats` for the
/// lifetime of the game even after elimination (marked `is_sitting_out`);
/// seat order never changes, so indices remain stable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Seat {
    pub player_id: PlayerId,
    pub name: String,
    pub pin_hash: String,
    pub is_creator: bool,
    pub chips: u32,
    pub hole_cards: Option<[holdem_shared::Card; 2]>,
    pub bet_this_round: u32,
    pub bet_this_hand: u32,
    pub folded: bool,
    pub all_in: bool,
    pub is_sitting_out: bool,
    pub rebuy_queued: bool,
    pub has_shown_cards: bool,
    pub last_action: Option<LastAction>,
    pub rebuy_count: u32,
    pub eliminated_hand: Option<u32>,
    pub connected: bool,
}

impl Seat {
    pub(crate) fn new(player_id: PlayerId, name: String, pin_hash: String, chips: u32) -> Self {
        Seat {
            player_id,
            name,
            pin_hash,
            is_creator: false,
            chips,
            hole_cards: None,
            bet_this_round: 0,
            bet_this_hand: 0,
            folded: false,
            all_in: false,
            is_sitting_out: false,
            rebuy_queued: false,
            has_shown_cards: false,
            last_action: None,
            rebuy_count: 0,
            eliminated_hand: None,
            connected: false,
        }
    }
}

/// A side pot: a chip amount and the set of seats eligible to win it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u32,
    pub eligible: Vec<PlayerId>,
}

/// The poker state machine. A deterministic function of its fields plus the
/// incoming operation; operations never suspend and never touch the clock
/// directly (`now` is always passed in by the caller).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEngine {
    pub code: String,
    pub settings: GameSettings,
    pub seats: Vec<Seat>,
    pub dealer_idx: usize,
    pub hand_number: u32,
    pub street: Street,
    pub deck: Deck,
    pub community_cards: Vec<holdem_shared::Card>,
    /// Index into `seats` of the seat currently to act, or `None` between
    /// hands. Kept as an index internally for ergonomic mutation; the view
    /// layer (`game::view`) projects it to a `PlayerId`.
    pub to_act: Option<usize>,
    pub current_bet: u32,
    pub min_raise: u32,
    pub last_raiser_id: Option<PlayerId>,
    pub pots: Vec<Pot>,
    pub pending_to_act: Vec<usize>,

    pub game_started_at: i64,
    pub paused: bool,
    pub pause_started_at: Option<i64>,
    pub total_paused_seconds: i64,
    pub action_deadline: Option<i64>,
    pub auto_deal_deadline: Option<i64>,

    pub blind_level: usize,
    pub blind_schedule: Vec<(u32, u32)>,
    pub level_started_at: i64,

    pub game_over: bool,
    pub elimination_order: Vec<PlayerId>,
    pub last_hand_result: Option<holdem_shared::HandResultSummary>,

    pub last_activity: i64,
    pub recent_actions: Vec<ActionEvent>,
}

impl GameEngine {
    /// Create a new game with a single seat (the creator). `now` seeds
    /// `game_started_at`, `level_started_at`, and `last_activity`.
    pub fn new(
        code: String,
        settings: GameSettings,
        creator_id: PlayerId,
        creator_name: String,
        creator_pin_hash: String,
        now: i64,
    ) -> Self {
        let mut creator = Seat::new(creator_id, creator_name, creator_pin_hash, settings.starting_chips);
        creator.is_creator = true;
        let blind_schedule = super::blinds::build_schedule(&settings);

        GameEngine {
            code,
            settings,
            seats: vec![creator],
            dealer_idx: 0,
            hand_number: 0,
            street: Street::Between,
            deck: Deck::fresh(),
            community_cards: Vec::new(),
            to_act: None,
            current_bet: 0,
            min_raise: 0,
            last_raiser_id: None,
            pots: Vec::new(),
            pending_to_act: Vec::new(),

            game_started_at: now,
            paused: false,
            pause_started_at: None,
            total_paused_seconds: 0,
            action_deadline: None,
            auto_deal_deadline: None,

            blind_level: 0,
            blind_schedule,
            level_started_at: now,

            game_over: false,
            elimination_order: Vec::new(),
            last_hand_result: None,

            last_activity: now,
            recent_actions: Vec::new(),
        }
    }

    pub fn hand_active(&self) -> bool {
        !matches!(self.street, Street::Between)
    }

    pub fn seat_idx(&self, player_id: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.player_id == player_id)
    }

    pub fn seat(&self, player_id: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id == player_id)
    }

    /// `effective_elapsed`: wall time since game start minus accumulated
    /// paused time (and, if currently paused, minus the running pause span).
    pub fn effective_elapsed(&self, now: i64) -> i64 {
        let running_pause = if self.paused {
            self.pause_started_at.map(|t| now - t).unwrap_or(0)
        } else {
            0
        };
        (now - self.game_started_at - self.total_paused_seconds - running_pause).max(0)
    }

    pub(crate) fn log(&mut self, ev: ActionEvent) {
        self.recent_actions.push(ev);
        if self.recent_actions.len() > MAX_RECENT_ACTIONS {
            let drop = self.recent_actions.len() - MAX_RECENT_ACTIONS;
            self.recent_actions.drain(0..drop);
        }
    }

    pub(crate) fn active_seat_indices(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| (!s.folded).then_some(i))
            .collect()
    }

    /// Seats eligible to be dealt a new hand: have chips and are not sitting
    /// out (a seat that just rebuy'd clears `is_sitting_out` at fulfillment).
    pub(crate) fn startable_seat_indices(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| (s.chips > 0 && !s.is_sitting_out).then_some(i))
            .collect()
    }

    /// Pause the game clock. Blind-level advancement and rebuy cutoffs both
    /// measure `effective_elapsed`, which excludes paused spans entirely.
    pub fn pause(&mut self, now: i64) -> Result<(), holdem_shared::EngineError> {
        if self.paused {
            return Err(holdem_shared::EngineError::invalid_state("already_paused"));
        }
        if self.hand_active() {
            return Err(holdem_shared::EngineError::invalid_state("hand_active"));
        }
        self.paused = true;
        self.pause_started_at = Some(now);
        self.log(ActionEvent::game(holdem_shared::GameAction::Paused));
        Ok(())
    }

    pub fn resume(&mut self, now: i64) -> Result<(), holdem_shared::EngineError> {
        if !self.paused {
            return Err(holdem_shared::EngineError::invalid_state("not_paused"));
        }
        if let Some(started) = self.pause_started_at.take() {
            self.total_paused_seconds += (now - started).max(0);
        }
        self.paused = false;
        self.log(ActionEvent::game(holdem_shared::GameAction::Resumed));
        Ok(())
    }

    /// Recompute `action_deadline` from `to_act` and the table's
    /// `turn_timeout_seconds`. Called whenever `to_act` changes.
    pub(crate) fn refresh_action_deadline(&mut self, now: i64) {
        self.action_deadline = if self.to_act.is_some() && self.settings.turn_timeout_seconds > 0 {
            Some(now + self.settings.turn_timeout_seconds as i64)
        } else {
            None
        };
    }

    /// Arm (or disarm) `auto_deal_deadline` once a hand ends.
    pub(crate) fn arm_auto_deal(&mut self, now: i64) {
        self.auto_deal_deadline = if self.settings.auto_deal_enabled && !self.game_over {
            Some(now + AUTO_DEAL_DELAY_SECONDS)
        } else {
            None
        };
    }

    /// A player may voluntarily reveal their hole cards once folded or once
    /// the hand has reached showdown.
    pub fn show_cards(&mut self, player_id: PlayerId) -> Result<(), holdem_shared::EngineError> {
        let idx = self
            .seat_idx(player_id)
            .ok_or_else(|| holdem_shared::EngineError::NotFound("player".into()))?;
        if self.seats[idx].hole_cards.is_none() {
            return Err(holdem_shared::EngineError::invalid_state("no_hole_cards"));
        }
        self.seats[idx].has_shown_cards = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::GameSettings;

    fn settings() -> GameSettings {
        GameSettings {
            starting_chips: 1000,
            small_blind_initial: 5,
            big_blind_initial: 10,
            ..Default::default()
        }
    }

    #[test]
    fn new_game_has_single_creator_seat() {
        let g = GameEngine::new(
            "ABCD12".into(),
            settings(),
            PlayerId(0),
            "Alice".into(),
            "hash".into(),
            1_000,
        );
        assert_eq!(g.seats.len(), 1);
        assert!(g.seats[0].is_creator);
        assert_eq!(g.seats[0].chips, 1000);
        assert!(!g.hand_active());
    }

    #[test]
    fn effective_elapsed_excludes_paused_time() {
        let mut g = GameEngine::new(
            "ABCD12".into(),
            settings(),
            PlayerId(0),
            "Alice".into(),
            "hash".into(),
            0,
        );
        g.paused = true;
        g.pause_started_at = Some(300);
        // Still paused at t=2100: elapsed so far (2100) minus the running
        // pause span (2100-300=1800) leaves 300s of real elapsed time.
        assert_eq!(g.effective_elapsed(2100), 300);
    }

    #[test]
    fn pause_rejected_during_an_active_hand() {
        let mut g = GameEngine::new("ABCD12".into(), settings(), PlayerId(0), "Alice".into(), "hash".into(), 0);
        g.seats.push(Seat::new(PlayerId(1), "Bob".into(), "hash".into(), 1000));
        g.start_hand(0).unwrap();
        assert!(g.pause(10).is_err());
    }

    #[test]
    fn pause_then_resume_accumulates_paused_seconds() {
        let mut g = GameEngine::new("ABCD12".into(), settings(), PlayerId(0), "Alice".into(), "hash".into(), 0);
        g.pause(100).unwrap();
        g.resume(160).unwrap();
        assert!(!g.paused);
        assert_eq!(g.total_paused_seconds, 60);
    }
}
