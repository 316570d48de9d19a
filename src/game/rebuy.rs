//! Rebuy eligibility, queueing, and fulfillment.

use holdem_shared::{ActionEvent, EngineError, GameAction, PlayerId};

use super::engine::GameEngine;

/// Whether `player_id` may currently queue a rebuy: rebuys must be enabled,
/// the seat must be busted, under the rebuy count cap (0 = unlimited), and
/// within the rebuy time window (0 = unlimited) measured from game start.
pub fn can_rebuy(engine: &GameEngine, player_id: PlayerId, now: i64) -> bool {
    if !engine.settings.allow_rebuys {
        return false;
    }
    let Some(seat) = engine.seat(player_id) else {
        return false;
    };
    if seat.chips != 0 {
        return false;
    }
    if engine.settings.max_rebuys != 0 && seat.rebuy_count >= engine.settings.max_rebuys {
        return false;
    }
    if engine.settings.rebuy_cutoff_minutes != 0 {
        let cutoff = engine.settings.rebuy_cutoff_minutes as i64 * 60;
        if engine.effective_elapsed(now) >= cutoff {
            return false;
        }
    }
    true
}

pub fn queue_rebuy(engine: &mut GameEngine, player_id: PlayerId, now: i64) -> Result<(), EngineError> {
    if !can_rebuy(engine, player_id, now) {
        return Err(EngineError::invalid_state("not_eligible_for_rebuy"));
    }
    let idx = engine
        .seat_idx(player_id)
        .ok_or_else(|| EngineError::NotFound("player".into()))?;
    engine.seats[idx].rebuy_queued = true;
    engine.log(ActionEvent::game(GameAction::RebuyQueued { player_id }));
    Ok(())
}

pub fn cancel_rebuy(engine: &mut GameEngine, player_id: PlayerId) -> Result<(), EngineError> {
    let idx = engine
        .seat_idx(player_id)
        .ok_or_else(|| EngineError::NotFound("player".into()))?;
    if !engine.seats[idx].rebuy_queued {
        return Err(EngineError::invalid_state("no_rebuy_queued"));
    }
    engine.seats[idx].rebuy_queued = false;
    Ok(())
}

/// Called at the start of `start_hand`: apply every queued rebuy, restoring
/// the seat to the starting stack and clearing its sitting-out/elimination
/// markers.
pub fn fulfill_queued_rebuys(engine: &mut GameEngine) {
    let starting_chips = engine.settings.starting_chips;
    let mut fulfilled = Vec::new();
    for seat in engine.seats.iter_mut() {
        if seat.rebuy_queued {
            seat.rebuy_queued = false;
            seat.chips = starting_chips;
            seat.is_sitting_out = false;
            seat.rebuy_count += 1;
            seat.eliminated_hand = None;
            fulfilled.push(seat.player_id);
        }
    }
    engine.elimination_order.retain(|id| !fulfilled.contains(id));
    for player_id in fulfilled {
        engine.log(ActionEvent::game(GameAction::RebuyFulfilled { player_id }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::GameSettings;

    fn settings(allow: bool) -> GameSettings {
        GameSettings {
            allow_rebuys: allow,
            starting_chips: 1000,
            max_rebuys: 2,
            rebuy_cutoff_minutes: 10,
            ..Default::default()
        }
    }

    #[test]
    fn busted_player_can_queue_and_gets_refilled_next_hand() {
        let mut g = GameEngine::new("C".into(), settings(true), PlayerId(0), "A".into(), "h".into(), 0);
        g.seats[0].chips = 0;
        g.seats[0].is_sitting_out = true;
        assert!(can_rebuy(&g, PlayerId(0), 60));
        queue_rebuy(&mut g, PlayerId(0), 60).unwrap();
        fulfill_queued_rebuys(&mut g);
        assert_eq!(g.seats[0].chips, 1000);
        assert!(!g.seats[0].is_sitting_out);
        assert_eq!(g.seats[0].rebuy_count, 1);
    }

    #[test]
    fn rebuy_disallowed_past_cutoff() {
        let g = GameEngine::new("C".into(), settings(true), PlayerId(0), "A".into(), "h".into(), 0);
        assert!(!can_rebuy(&g, PlayerId(0), 10 * 60 + 1));
    }

    #[test]
    fn rebuy_disallowed_when_not_busted() {
        let g = GameEngine::new("C".into(), settings(true), PlayerId(0), "A".into(), "h".into(), 0);
        assert!(!can_rebuy(&g, PlayerId(0), 0));
    }
}
