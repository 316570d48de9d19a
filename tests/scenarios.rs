//! End-to-end scenarios driven through the public `GameEngine` surface.
//!
//! Several scenarios need a specific community board rather than whatever
//! the hand's real (random) shuffle deals. Since `Deck`'s contents aren't
//! otherwise settable from outside the crate, these tests override hole
//! cards directly (every `Seat` field is public) and swap in `Deck::fresh()`
//! — a known, fixed card order — before the betting that triggers dealing,
//! rather than fighting the RNG.

use holdem_coordinator::game::{can_rebuy, GameEngine, Seat};
use holdem_coordinator::poker::cards::Deck;
use holdem_shared::{Card, GameSettings, HandRankCategory, PlayerAction, PlayerId, Street, Suit};

fn seat(id: u32, name: &str, chips: u32) -> Seat {
    Seat {
        player_id: PlayerId(id),
        name: name.into(),
        pin_hash: "h".into(),
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
        connected: true,
    }
}

fn check_through_one_street(g: &mut GameEngine) {
    let first = g.seats[g.to_act.unwrap()].player_id;
    g.process_action(first, PlayerAction::Check, 0).unwrap();
    let second = g.seats[g.to_act.unwrap()].player_id;
    g.process_action(second, PlayerAction::Check, 0).unwrap();
}

/// S1 — two seats, blinds 10/20, a plain uncontested-to-showdown hand. The
/// board is overwritten after each street so the outcome is deterministic.
#[test]
fn simple_showdown_pair_of_kings_beats_pair_of_queens() {
    let settings = GameSettings {
        starting_chips: 1000,
        small_blind_initial: 10,
        big_blind_initial: 20,
        blind_level_duration_minutes: 0,
        turn_timeout_seconds: 0,
        auto_deal_enabled: false,
        ..Default::default()
    };
    let mut g = GameEngine::new("CODE01".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
    g.seats.push(seat(1, "B", 1000));
    g.start_hand(0).unwrap();

    g.seats[0].hole_cards = Some([Card::new(13, Suit::Spades), Card::new(13, Suit::Clubs)]);
    g.seats[1].hole_cards = Some([Card::new(12, Suit::Spades), Card::new(12, Suit::Clubs)]);

    let board = [
        Card::new(7, Suit::Hearts),
        Card::new(2, Suit::Diamonds),
        Card::new(5, Suit::Clubs),
        Card::new(9, Suit::Spades),
        Card::new(3, Suit::Diamonds),
    ];

    // Preflop: dealer (A, SB) calls the extra 10 to match the BB; B checks.
    let a = g.seats[0].player_id;
    let b = g.seats[1].player_id;
    g.process_action(a, PlayerAction::Call, 0).unwrap();
    g.process_action(b, PlayerAction::Check, 0).unwrap();
    assert_eq!(g.street, Street::Flop);
    g.community_cards = board[..3].to_vec();

    check_through_one_street(&mut g);
    assert_eq!(g.street, Street::Turn);
    g.community_cards = board[..4].to_vec();

    check_through_one_street(&mut g);
    assert_eq!(g.street, Street::River);
    g.community_cards = board.to_vec();

    check_through_one_street(&mut g);
    assert_eq!(g.street, Street::Between);

    let result = g.last_hand_result.as_ref().unwrap();
    assert_eq!(result.winners, vec![PlayerId(0)]);
    assert_eq!(result.pot_awarded, 40);
    assert!(result.refunds.is_empty());
    let a_hand = result.player_hands.iter().find(|h| h.player_id == PlayerId(0)).unwrap();
    assert_eq!(a_hand.rank.category, HandRankCategory::Pair);
    assert_eq!(a_hand.rank.tiebreakers[0], 13);

    assert_eq!(g.seats[0].chips, 1020);
    assert_eq!(g.seats[1].chips, 980);
}

/// S2 — three-way all-in produces a main pot and a side pot plus a refund
/// of the uncalled excess. Hole cards are chosen so the winner is certain
/// against the deterministic `Deck::fresh()` board rather than matching
/// the illustrative hand values of the source scenario.
#[test]
fn side_pot_and_refund_on_uneven_all_ins() {
    let settings = GameSettings {
        starting_chips: 2000,
        small_blind_initial: 0,
        big_blind_initial: 0,
        blind_level_duration_minutes: 0,
        turn_timeout_seconds: 0,
        auto_deal_enabled: false,
        ..Default::default()
    };
    let mut g = GameEngine::new("CODE02".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
    g.seats.push(seat(1, "B", 500));
    g.seats.push(seat(2, "C", 1500));
    g.seats[0].chips = 2000;
    g.start_hand(0).unwrap();

    g.seats[0].hole_cards = Some([Card::new(7, Suit::Hearts), Card::new(8, Suit::Hearts)]);
    g.seats[1].hole_cards = Some([Card::new(2, Suit::Clubs), Card::new(3, Suit::Clubs)]);
    g.seats[2].hole_cards = Some([Card::new(9, Suit::Spades), Card::new(9, Suit::Diamonds)]);
    g.deck = Deck::fresh();

    let a = g.seats[0].player_id;
    let b = g.seats[1].player_id;
    let c = g.seats[2].player_id;
    g.process_action(a, PlayerAction::AllIn, 0).unwrap();
    g.process_action(b, PlayerAction::AllIn, 0).unwrap();
    g.process_action(c, PlayerAction::Call, 0).unwrap();

    assert_eq!(g.street, Street::Between);

    assert_eq!(g.pots.len(), 2);
    assert_eq!(g.pots[0].amount, 1500);
    let mut main_pot_eligible = g.pots[0].eligible.clone();
    main_pot_eligible.sort_by_key(|p| p.0);
    assert_eq!(main_pot_eligible, vec![a, b, c]);
    assert_eq!(g.pots[1].amount, 2000);
    let mut side_pot_eligible = g.pots[1].eligible.clone();
    side_pot_eligible.sort_by_key(|p| p.0);
    assert_eq!(side_pot_eligible, vec![a, c]);

    let result = g.last_hand_result.as_ref().unwrap();
    assert_eq!(result.refunds.len(), 1);
    assert_eq!(result.refunds[0].player_id, a);
    assert_eq!(result.refunds[0].amount, 500);
    assert_eq!(result.pot_awarded, 3500);
    assert!(result.winners.iter().all(|&w| w == a));

    assert_eq!(g.seats[0].chips, 4000);
    assert_eq!(g.seats[1].chips, 0);
    assert_eq!(g.seats[2].chips, 0);

    let mut busted = g.elimination_order.clone();
    busted.sort_by_key(|p| p.0);
    assert_eq!(busted, vec![b, c]);
}

/// S3 — a short all-in that doesn't meet the full raise increment does not
/// reopen the action; the original raiser may only call or fold.
#[test]
fn short_all_in_does_not_reopen_action_to_original_raiser() {
    let settings = GameSettings {
        starting_chips: 5000,
        small_blind_initial: 10,
        big_blind_initial: 20,
        blind_level_duration_minutes: 0,
        turn_timeout_seconds: 0,
        auto_deal_enabled: false,
        ..Default::default()
    };
    let mut g = GameEngine::new("CODE03".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
    g.seats.push(seat(1, "B", 80));
    g.seats.push(seat(2, "C", 5000));
    g.start_hand(0).unwrap();

    let a = g.seats[0].player_id;
    let b = g.seats[1].player_id;
    let c = g.seats[2].player_id;

    g.process_action(a, PlayerAction::Raise { amount: 60 }, 0).unwrap();
    assert_eq!(g.min_raise, 40);

    g.process_action(b, PlayerAction::AllIn, 0).unwrap();
    assert_eq!(g.seats[1].bet_this_round, 80);
    assert_eq!(g.min_raise, 40, "short all-in must not change the table min-raise");
    assert_eq!(g.current_bet, 80);

    g.process_action(c, PlayerAction::Call, 0).unwrap();
    assert_eq!(g.to_act, Some(0));

    let rejected = g.process_action(a, PlayerAction::Raise { amount: 100 }, 0);
    assert!(rejected.is_err());
}

/// S4 — running the clock well past the built schedule's length extends it
/// with additional ~1.5x levels instead of failing or standing still.
#[test]
fn blind_schedule_extends_past_built_length() {
    let settings = GameSettings {
        starting_chips: 5000,
        blind_level_duration_minutes: 20,
        ..Default::default()
    };
    let mut g = GameEngine::new("CODE04".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
    g.seats.push(seat(1, "B", 5000));

    let original_len = g.blind_schedule.len();
    let last_bb_before = g.blind_schedule.last().unwrap().1;

    let level_duration_secs = 20 * 60;
    let far_future = original_len as i64 * level_duration_secs;
    g.start_hand(far_future).unwrap();

    assert!(g.blind_schedule.len() > original_len);
    assert_eq!(g.blind_level, g.blind_schedule.len() - 1);

    let (new_sb, new_bb) = *g.blind_schedule.last().unwrap();
    assert!(new_bb > last_bb_before);
    assert!(new_bb as f64 > last_bb_before as f64 * 1.2);
    assert!((new_bb as f64) < last_bb_before as f64 * 1.8);
    assert_eq!(new_sb, (new_bb / 2).max(1));
}

/// S5 — a pause excludes its duration from `effective_elapsed`, so a rebuy
/// cutoff measured in real clock time doesn't unfairly count paused time.
#[test]
fn pause_span_is_excluded_from_the_rebuy_cutoff_window() {
    let settings = GameSettings {
        starting_chips: 1000,
        allow_rebuys: true,
        rebuy_cutoff_minutes: 10,
        blind_level_duration_minutes: 0,
        ..Default::default()
    };
    let mut g = GameEngine::new("CODE05".into(), settings, PlayerId(0), "A".into(), "h".into(), 0);
    g.seats.push(seat(1, "B", 1000));

    g.pause(5 * 60).unwrap();
    g.resume(35 * 60).unwrap();

    g.seats[0].chips = 0;
    let effective = g.effective_elapsed(36 * 60);
    assert_eq!(effective, 6 * 60);
    assert!(can_rebuy(&g, PlayerId(0), 36 * 60));
}
