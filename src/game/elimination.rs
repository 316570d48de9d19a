//! Post-hand elimination bookkeeping and final standings.

use holdem_shared::{ActionEvent, FinalStandingEntry, GameAction, PlayerId};

use super::engine::GameEngine;

/// Called right after a hand resolves: any seat left with zero chips and no
/// queued rebuy is eliminated. The game ends only once exactly one seat has
/// chips and no other seat could still rebuy back in.
pub(crate) fn process_eliminations(engine: &mut GameEngine, now: i64) {
    let hand_number = engine.hand_number;
    for seat in engine.seats.iter_mut() {
        if seat.chips == 0 && !seat.rebuy_queued && seat.eliminated_hand.is_none() {
            seat.is_sitting_out = true;
            seat.eliminated_hand = Some(hand_number);
        }
    }
    let newly_eliminated: Vec<PlayerId> = engine
        .seats
        .iter()
        .filter(|s| s.eliminated_hand == Some(hand_number) && !engine.elimination_order.contains(&s.player_id))
        .map(|s| s.player_id)
        .collect();
    for player_id in newly_eliminated {
        engine.elimination_order.push(player_id);
        engine.log(ActionEvent::game(GameAction::Eliminated { player_id }));
    }

    let remaining = engine.startable_seat_indices().len();
    if remaining <= 1 && engine.seats.len() > 1 {
        let others_can_still_rebuy = engine
            .seats
            .iter()
            .filter(|s| s.chips == 0)
            .any(|s| super::rebuy::can_rebuy(engine, s.player_id, now));
        if !others_can_still_rebuy {
            engine.game_over = true;
        }
    }
}

/// Final standings, best finish first: players still in play (best chips
/// first), then eliminated players in reverse elimination order (later
/// elimination = better finish).
pub fn final_standings(engine: &GameEngine) -> Vec<FinalStandingEntry> {
    let mut standings = Vec::new();
    let mut in_play: Vec<_> = engine
        .seats
        .iter()
        .filter(|s| s.chips > 0 && !s.is_sitting_out)
        .collect();
    in_play.sort_by(|a, b| b.chips.cmp(&a.chips));

    let mut rank = 1u32;
    for seat in in_play {
        standings.push(FinalStandingEntry {
            player_id: seat.player_id,
            rank,
        });
        rank += 1;
    }
    for &player_id in engine.elimination_order.iter().rev() {
        standings.push(FinalStandingEntry { player_id, rank });
        rank += 1;
    }
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::GameSettings;

    #[test]
    fn eliminated_player_appended_once() {
        let settings = GameSettings {
            allow_rebuys: false,
            ..GameSettings::default()
        };
        let mut g = GameEngine::new("C".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
        g.seats.push(super::super::engine::Seat::new(PlayerId(1), "B".into(), "h".into(), 1000));
        g.seats[0].chips = 0;
        process_eliminations(&mut g, 0);
        assert_eq!(g.elimination_order, vec![PlayerId(0)]);
        assert!(g.game_over);
        process_eliminations(&mut g, 0);
        assert_eq!(g.elimination_order.len(), 1);
    }

    #[test]
    fn game_continues_while_busted_seat_can_still_rebuy() {
        let settings = GameSettings {
            allow_rebuys: true,
            rebuy_cutoff_minutes: 10,
            ..GameSettings::default()
        };
        let mut g = GameEngine::new("C".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
        g.seats.push(super::super::engine::Seat::new(PlayerId(1), "B".into(), "h".into(), 1000));
        g.seats[0].chips = 0;
        process_eliminations(&mut g, 0);
        assert!(!g.game_over);

        process_eliminations(&mut g, 10 * 60 + 1);
        assert!(g.game_over);
    }

    #[test]
    fn final_standings_orders_in_play_by_chips_then_elimination_reverse() {
        let mut g = GameEngine::new(
            "C".into(),
            GameSettings::default(),
            PlayerId(0),
            "A".into(),
            "h".into(),
            0,
        );
        g.seats.push(super::super::engine::Seat::new(PlayerId(1), "B".into(), "h".into(), 1000));
        g.seats[0].chips = 1500;
        g.elimination_order = vec![PlayerId(2), PlayerId(3)];
        let standings = final_standings(&g);
        assert_eq!(standings[0].player_id, PlayerId(0));
        assert_eq!(standings.last().unwrap().player_id, PlayerId(2));
    }
}
