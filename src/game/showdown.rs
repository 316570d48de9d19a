//! Side-pot construction and showdown resolution.

use std::collections::HashMap;

use holdem_shared::{
    ActionEvent, GameAction, HandResultSummary, HandResult, PlayerId, Refund,
};

use crate::poker::evaluation::{determine_winners, evaluate_best_hand, pick_best_five};

use super::engine::{GameEngine, Pot};

/// Build side pots from each seat's `bet_this_hand`, peeling off the
/// smallest positive contribution as its own pot and shrinking the eligible
/// set as folded/exhausted seats drop out.
pub(crate) fn build_pots(engine: &GameEngine) -> Vec<Pot> {
    let mut contributions: Vec<(PlayerId, u32, bool)> = engine
        .seats
        .iter()
        .filter(|s| s.bet_this_hand > 0)
        .map(|s| (s.player_id, s.bet_this_hand, !s.folded))
        .collect();

    let mut pots = Vec::new();
    loop {
        let Some(&min) = contributions
            .iter()
            .map(|&(_, amt, _)| amt)
            .filter(|&a| a > 0)
            .min()
            .as_ref()
        else {
            break;
        };

        let eligible: Vec<PlayerId> = contributions
            .iter()
            .filter(|&&(_, amt, live)| amt > 0 && live)
            .map(|&(id, _, _)| id)
            .collect();
        let amount = min * contributions.iter().filter(|&&(_, amt, _)| amt > 0).count() as u32;

        if !eligible.is_empty() {
            pots.push(Pot { amount, eligible });
        }

        for c in contributions.iter_mut() {
            if c.1 > 0 {
                c.1 -= min;
            }
        }
    }
    pots
}

/// Resolve the hand at showdown: build pots, evaluate hands for every
/// non-folded seat, award each pot to its winner(s), and record the
/// uncalled-bet refund (if the final raise was never called). Populates
/// `last_hand_result` and leaves chip totals consistent.
pub(crate) fn finish_showdown(engine: &mut GameEngine, now: i64) {
    let live: Vec<usize> = engine.active_seat_indices();

    // Uncalled-bet refund only applies to a genuine multi-way showdown: a
    // simple fold-out hand just awards the whole pot to the last seat
    // standing, with no notion of a call to compare against.
    let mut refund = None;
    if live.len() > 1 {
        let max_bet = engine.seats.iter().map(|s| s.bet_this_hand).max().unwrap_or(0);
        let contributors: Vec<usize> = engine
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.bet_this_hand > 0)
            .map(|(i, _)| i)
            .collect();
        if let Some(&top_idx) = contributors
            .iter()
            .find(|&&i| engine.seats[i].bet_this_hand == max_bet)
        {
            let second_max = contributors
                .iter()
                .filter(|&&i| i != top_idx)
                .map(|&i| engine.seats[i].bet_this_hand)
                .max()
                .unwrap_or(0);
            if max_bet > second_max {
                let excess = max_bet - second_max;
                if excess > 0 {
                    engine.seats[top_idx].chips += excess;
                    engine.seats[top_idx].bet_this_hand -= excess;
                    let player_id = engine.seats[top_idx].player_id;
                    refund = Some(Refund { player_id, amount: excess });
                }
            }
        }
    }

    let pots = build_pots(engine);
    engine.pots = pots.clone();

    let hole: HashMap<PlayerId, [holdem_shared::Card; 2]> = engine
        .seats
        .iter()
        .filter(|s| !s.folded)
        .filter_map(|s| s.hole_cards.map(|c| (s.player_id, c)))
        .collect();

    // Hole cards are reported for every non-folded seat at a genuine
    // showdown, plus any folded seat that voluntarily showed its cards.
    let shown: Vec<usize> = (0..engine.seats.len())
        .filter(|&idx| {
            let live_here = live.len() > 1 && live.contains(&idx);
            live_here || (engine.seats[idx].folded && engine.seats[idx].has_shown_cards)
        })
        .collect();

    let mut hand_results = Vec::new();
    for idx in shown {
        if let Some(cards) = engine.seats[idx].hole_cards {
            let rank = evaluate_best_hand(cards, &engine.community_cards);
            let best_five = pick_best_five(cards, &engine.community_cards);
            hand_results.push(HandResult {
                player_id: engine.seats[idx].player_id,
                rank,
                best_five,
            });
            engine.seats[idx].has_shown_cards = true;
        }
    }
    if !hand_results.is_empty() {
        engine.log(ActionEvent::game(GameAction::Showdown {
            hand_results: hand_results.clone(),
        }));
    }

    let mut winners_all = Vec::new();
    for pot in &pots {
        let eligible: Vec<(PlayerId, [holdem_shared::Card; 2])> = pot
            .eligible
            .iter()
            .filter_map(|&id| hole.get(&id).map(|c| (id, *c)))
            .collect();

        let winners = if eligible.len() == 1 {
            vec![eligible[0].0]
        } else if eligible.is_empty() {
            Vec::new()
        } else {
            determine_winners(&eligible, &engine.community_cards)
        };

        if winners.is_empty() {
            continue;
        }
        let share = pot.amount / winners.len() as u32;
        let remainder = pot.amount - share * winners.len() as u32;
        for (i, &winner) in winners.iter().enumerate() {
            let extra = if i == 0 { remainder } else { 0 };
            if let Some(idx) = engine.seat_idx(winner) {
                engine.seats[idx].chips += share + extra;
            }
        }
        engine.log(ActionEvent::game(GameAction::PotAwarded {
            winners: winners.clone(),
            amount: pot.amount,
        }));
        winners_all.extend(winners);
    }

    if let Some(r) = &refund {
        engine.log(ActionEvent::game(GameAction::Refund {
            player_id: r.player_id,
            amount: r.amount,
        }));
    }

    engine.last_hand_result = Some(HandResultSummary {
        hand_number: engine.hand_number,
        winners: winners_all,
        pot_awarded: pots.iter().map(|p| p.amount).sum(),
        community_cards: engine.community_cards.clone(),
        player_hands: hand_results,
        refunds: refund.into_iter().collect(),
    });

    super::elimination::process_eliminations(engine, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::GameSettings;

    fn bare_engine() -> GameEngine {
        GameEngine::new(
            "C".into(),
            GameSettings::default(),
            PlayerId(0),
            "A".into(),
            "h".into(),
            0,
        )
    }

    #[test]
    fn build_pots_creates_single_pot_when_all_bets_equal() {
        let mut g = bare_engine();
        g.seats.push(super::super::engine::Seat::new(PlayerId(1), "B".into(), "h".into(), 1000));
        g.seats[0].bet_this_hand = 100;
        g.seats[1].bet_this_hand = 100;
        let pots = build_pots(&g);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 200);
    }

    #[test]
    fn build_pots_splits_side_pot_for_short_all_in() {
        let mut g = bare_engine();
        g.seats.push(super::super::engine::Seat::new(PlayerId(1), "B".into(), "h".into(), 1000));
        g.seats.push(super::super::engine::Seat::new(PlayerId(2), "D".into(), "h".into(), 1000));
        g.seats[0].bet_this_hand = 50; // short all-in, folded=false
        g.seats[1].bet_this_hand = 200;
        g.seats[2].bet_this_hand = 200;
        let pots = build_pots(&g);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 150); // 50 * 3 contributors
        assert_eq!(pots[1].amount, 300); // (200-50)*2 remaining
    }
}
