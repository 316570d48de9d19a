//! Per-viewer projection of `GameEngine` into the wire-level `EngineView`.

use holdem_shared::{EngineView, PlayerId, PlayerView, Street, ValidAction};

use super::engine::GameEngine;

/// Project the engine's state as seen by `viewer` (a seated player, or
/// `None` for a spectator). Hole cards are hidden for every seat except the
/// viewer's own, and except seats that have voluntarily shown at showdown.
pub fn to_view(engine: &GameEngine, viewer: Option<PlayerId>, _now: i64) -> EngineView {
    let (small_blind, big_blind) = super::blinds::current_blinds(engine);

    let players: Vec<PlayerView> = engine
        .seats
        .iter()
        .map(|s| {
            let reveal = Some(s.player_id) == viewer
                || (engine.street == Street::Showdown && !s.folded && s.has_shown_cards);
            PlayerView {
                id: s.player_id,
                name: s.name.clone(),
                chips: s.chips,
                bet_this_round: s.bet_this_round,
                bet_this_hand: s.bet_this_hand,
                folded: s.folded,
                all_in: s.all_in,
                is_sitting_out: s.is_sitting_out,
                is_creator: s.is_creator,
                has_shown_cards: s.has_shown_cards,
                last_action: s.last_action,
                hole_cards: if reveal { s.hole_cards } else { None },
                connected: s.connected,
            }
        })
        .collect();

    let my_cards = viewer
        .and_then(|id| engine.seat(id))
        .and_then(|s| s.hole_cards);

    let valid_actions = viewer
        .and_then(|id| engine.seat_idx(id))
        .filter(|&idx| engine.to_act == Some(idx))
        .map(|idx| valid_actions_for(engine, idx))
        .unwrap_or_default();

    EngineView {
        game_code: engine.code.clone(),
        hand_number: engine.hand_number,
        street: engine.street,
        pot: engine.pots.iter().map(|p| p.amount).sum::<u32>()
            + engine.seats.iter().map(|s| s.bet_this_round).sum::<u32>(),
        community_cards: engine.community_cards.clone(),
        dealer_player_id: engine.seats.get(engine.dealer_idx).map(|s| s.player_id),
        action_on: engine.to_act.and_then(|i| engine.seats.get(i)).map(|s| s.player_id),
        current_bet: engine.current_bet,
        min_raise: engine.min_raise,
        hand_active: engine.hand_active(),
        game_over: engine.game_over,
        paused: engine.paused,
        message: None,
        last_hand_result: engine.last_hand_result.clone(),
        players,
        my_cards,
        valid_actions,
        turn_timeout: engine.settings.turn_timeout_seconds,
        action_deadline: engine.action_deadline,
        auto_deal_deadline: engine.auto_deal_deadline,
        game_started_at: engine.game_started_at,
        total_paused_seconds: engine.total_paused_seconds,
        small_blind,
        big_blind,
        blind_level: engine.blind_level,
        blind_level_duration: engine.settings.blind_level_duration_minutes,
        blind_schedule: engine.blind_schedule.clone(),
        next_blind_change_at: super::blinds::next_blind_change_at(engine),
        allow_rebuys: engine.settings.allow_rebuys,
        max_rebuys: engine.settings.max_rebuys,
        rebuy_cutoff_minutes: engine.settings.rebuy_cutoff_minutes,
        final_standings: if engine.game_over {
            super::elimination::final_standings(engine)
        } else {
            Vec::new()
        },
        action_log: engine.recent_actions.clone(),
    }
}

/// Compute the set of actions legal for the seat currently to act.
pub fn valid_actions_for(engine: &GameEngine, idx: usize) -> Vec<ValidAction> {
    if engine.street == Street::Between || engine.street == Street::Showdown {
        return Vec::new();
    }
    let seat = &engine.seats[idx];
    if seat.folded || seat.all_in {
        return Vec::new();
    }

    let to_call = engine.current_bet.saturating_sub(seat.bet_this_round);
    let mut actions = vec![ValidAction::Fold];

    if to_call == 0 {
        actions.push(ValidAction::Check);
    } else {
        let amount = to_call.min(seat.chips);
        actions.push(ValidAction::Call { amount });
    }

    let total_available = seat.bet_this_round + seat.chips;
    let min_raise_to = engine.current_bet + engine.min_raise;
    if total_available > engine.current_bet {
        if total_available >= min_raise_to {
            actions.push(ValidAction::Raise {
                min_amount: min_raise_to,
                max_amount: total_available,
            });
        } else {
            // Short all-in: covers the call plus some, but can't reach a
            // full raise. Represented as a degenerate raise (min == max),
            // not a separate all-in action.
            actions.push(ValidAction::Raise {
                min_amount: total_available,
                max_amount: total_available,
            });
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::GameSettings;

    #[test]
    fn spectator_sees_no_hole_cards() {
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
        let view = to_view(&g, None, 0);
        assert!(view.my_cards.is_none());
        assert!(view.players.iter().all(|p| p.hole_cards.is_none()));
    }

    #[test]
    fn owner_sees_own_hole_cards_only() {
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
        let view = to_view(&g, Some(PlayerId(0)), 0);
        assert!(view.my_cards.is_some());
        let other = view.players.iter().find(|p| p.id == PlayerId(1)).unwrap();
        assert!(other.hole_cards.is_none());
    }
}
