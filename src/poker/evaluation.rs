//! 7-card hand evaluator. Ranks 2..=14 (14 = Ace) map directly onto `Card`,
//! so no rank-remapping table is needed before comparison.

use holdem_shared::{Card, HandRank, HandRankCategory, PlayerId};

const NUM_SUITS: usize = 4;
const RANK_SLOTS: usize = 15; // index 1..=14 used (1 = ace-low for the wheel)

/// Evaluate the best 5-card hand from 2 hole + up to 5 community cards.
pub fn evaluate_best_hand(hole: [Card; 2], community: &[Card]) -> HandRank {
    let mut cards = Vec::with_capacity(7);
    cards.extend_from_slice(&hole);
    cards.extend_from_slice(community);
    best_rank_from_cards(&cards)
}

/// Enumerate all 5-card combinations from the available cards and return the
/// highest-ranked subset. With fewer than 5 cards available (early streets)
/// just returns the highest cards available, padded with nothing extra.
pub fn pick_best_five(hole: [Card; 2], community: &[Card]) -> [Card; 5] {
    let mut all = Vec::with_capacity(7);
    all.extend_from_slice(&hole);
    all.extend_from_slice(community);

    if all.len() < 5 {
        all.sort_unstable_by(|a, b| b.rank.cmp(&a.rank));
        let mut out = [Card::new(14, holdem_shared::Suit::Clubs); 5];
        let n = all.len().min(5);
        out[..n].copy_from_slice(&all[..n]);
        return out;
    }

    let n = all.len();
    let mut best_rank: Option<HandRank> = None;
    let mut best_combo = [Card::new(14, holdem_shared::Suit::Clubs); 5];

    for i in 0..(n - 4) {
        for j in (i + 1)..(n - 3) {
            for k in (j + 1)..(n - 2) {
                for l in (k + 1)..(n - 1) {
                    for m in (l + 1)..n {
                        let subset = [all[i], all[j], all[k], all[l], all[m]];
                        let rank = best_rank_from_cards(&subset);
                        if best_rank.as_ref().is_none_or(|r| rank > *r) {
                            best_rank = Some(rank);
                            best_combo = subset;
                        }
                    }
                }
            }
        }
    }
    best_combo
}

/// For a side pot's eligible set, return the subset whose `HandRank` ties at
/// the maximum.
pub fn determine_winners(
    eligible: &[(PlayerId, [Card; 2])],
    community: &[Card],
) -> Vec<PlayerId> {
    let mut ranked: Vec<(PlayerId, HandRank)> = eligible
        .iter()
        .map(|&(id, hole)| (id, evaluate_best_hand(hole, community)))
        .collect();
    ranked.sort_by(|a, b| a.1.cmp(&b.1));
    let Some((_, best)) = ranked.last().cloned() else {
        return vec![];
    };
    ranked
        .into_iter()
        .filter(|(_, r)| *r == best)
        .map(|(id, _)| id)
        .collect()
}

fn best_rank_from_cards(cards: &[Card]) -> HandRank {
    let flush_suit = find_flush_suit(cards);

    if let Some(sf) = check_straight_flush(cards, flush_suit) {
        return sf;
    }

    let counts = rank_counts(cards);
    let all_values: Vec<u8> = cards.iter().map(|c| c.rank).collect();

    if let Some(r) = check_four_of_a_kind(&counts, &all_values) {
        return r;
    }
    if let Some(r) = check_full_house(&counts) {
        return r;
    }
    if let Some(r) = check_flush(cards, flush_suit) {
        return r;
    }
    if let Some(r) = check_straight(&all_values) {
        return r;
    }
    if let Some(r) = check_n_of_a_kind(&counts, &all_values, 3, 2, HandRankCategory::ThreeKind) {
        return r;
    }
    if let Some(r) = check_two_pair(&counts, &all_values) {
        return r;
    }
    if let Some(r) = check_n_of_a_kind(&counts, &all_values, 2, 3, HandRankCategory::Pair) {
        return r;
    }
    check_high_card(&all_values)
}

fn find_flush_suit(cards: &[Card]) -> Option<holdem_shared::Suit> {
    for &suit in holdem_shared::Suit::ALL.iter() {
        if cards.iter().filter(|c| c.suit == suit).count() >= 5 {
            return Some(suit);
        }
    }
    None
}

fn rank_counts(cards: &[Card]) -> [u8; RANK_SLOTS] {
    let mut counts = [0u8; RANK_SLOTS];
    for c in cards {
        counts[c.rank as usize] += 1;
    }
    counts
}

fn check_straight_flush(cards: &[Card], flush_suit: Option<holdem_shared::Suit>) -> Option<HandRank> {
    let suit = flush_suit?;
    let values: Vec<u8> = cards.iter().filter(|c| c.suit == suit).map(|c| c.rank).collect();
    let high = straight_high(&values)?;
    let category = if high == 14 {
        HandRankCategory::RoyalFlush
    } else {
        HandRankCategory::StraightFlush
    };
    Some(HandRank {
        category,
        tiebreakers: vec![high],
    })
}

fn check_four_of_a_kind(counts: &[u8; RANK_SLOTS], all_values: &[u8]) -> Option<HandRank> {
    find_n_of_a_kind(counts, 4).map(|quad| {
        let kicker = all_values
            .iter()
            .copied()
            .filter(|&v| v != quad)
            .max()
            .unwrap_or(0);
        HandRank {
            category: HandRankCategory::FourKind,
            tiebreakers: vec![quad, kicker],
        }
    })
}

fn check_full_house(counts: &[u8; RANK_SLOTS]) -> Option<HandRank> {
    let mut trips = vec![];
    let mut pairs = vec![];
    for v in (2..=14).rev() {
        if counts[v] >= 3 {
            trips.push(v as u8);
        } else if counts[v] >= 2 {
            pairs.push(v as u8);
        }
    }
    let trip = *trips.first()?;
    let pair = pairs.first().copied().or_else(|| trips.get(1).copied())?;
    Some(HandRank {
        category: HandRankCategory::FullHouse,
        tiebreakers: vec![trip, pair],
    })
}

fn check_flush(cards: &[Card], flush_suit: Option<holdem_shared::Suit>) -> Option<HandRank> {
    let suit = flush_suit?;
    let mut vs: Vec<u8> = cards.iter().filter(|c| c.suit == suit).map(|c| c.rank).collect();
    vs.sort_unstable_by(|a, b| b.cmp(a));
    vs.truncate(5);
    Some(HandRank {
        category: HandRankCategory::Flush,
        tiebreakers: vs,
    })
}

fn check_straight(all_values: &[u8]) -> Option<HandRank> {
    let high = straight_high(all_values)?;
    Some(HandRank {
        category: HandRankCategory::Straight,
        tiebreakers: vec![high],
    })
}

fn check_n_of_a_kind(
    counts: &[u8; RANK_SLOTS],
    all_values: &[u8],
    n: u8,
    kicker_count: usize,
    category: HandRankCategory,
) -> Option<HandRank> {
    let rank = (2..=14).rev().find(|&v| counts[v] == n)? as u8;
    let mut kickers: Vec<u8> = all_values.iter().copied().filter(|&v| v != rank).collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    kickers.dedup();
    kickers.truncate(kicker_count);
    let mut tiebreakers = vec![rank];
    tiebreakers.extend(kickers);
    Some(HandRank {
        category,
        tiebreakers,
    })
}

fn check_two_pair(counts: &[u8; RANK_SLOTS], all_values: &[u8]) -> Option<HandRank> {
    let pairs: Vec<u8> = (2..=14).rev().filter(|&v| counts[v] >= 2).map(|v| v as u8).collect();
    if pairs.len() < 2 {
        return None;
    }
    let (hi, lo) = (pairs[0], pairs[1]);
    let kicker = all_values
        .iter()
        .copied()
        .filter(|&v| v != hi && v != lo)
        .max()
        .unwrap_or(2);
    Some(HandRank {
        category: HandRankCategory::TwoPair,
        tiebreakers: vec![hi, lo, kicker],
    })
}

fn check_high_card(all_values: &[u8]) -> HandRank {
    let mut highs = all_values.to_vec();
    highs.sort_unstable_by(|a, b| b.cmp(a));
    highs.dedup();
    highs.truncate(5);
    HandRank {
        category: HandRankCategory::HighCard,
        tiebreakers: highs,
    }
}

fn find_n_of_a_kind(counts: &[u8; RANK_SLOTS], n: u8) -> Option<u8> {
    (2..=14).rev().find(|&v| counts[v] == n).map(|v| v as u8)
}

/// Highest card of the best 5-in-a-row run, treating Ace as both high (14)
/// and low (1, for the wheel A-2-3-4-5). Wheel straights rank with high
/// card 5, below the 6-high straight 2-3-4-5-6.
fn straight_high(values: &[u8]) -> Option<u8> {
    let mut present = [false; RANK_SLOTS];
    for &v in values {
        if (2..=14).contains(&v) {
            present[v as usize] = true;
        }
    }
    if present[14] {
        present[1] = true;
    }

    let mut best: Option<u8> = None;
    let mut run_len = 0usize;
    let mut last_v = 0usize;
    for v in (1..=14).rev() {
        if present[v] {
            run_len = if last_v == 0 || v + 1 == last_v { run_len + 1 } else { 1 };
            if run_len >= 5 {
                let high = (v + 4) as u8;
                let high = if high == 14 && v == 1 { 5 } else { high };
                if best.is_none_or(|b| high > b) {
                    best = Some(high);
                }
            }
            last_v = v;
        } else {
            run_len = 0;
            last_v = 0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::Suit::*;

    fn c(rank: u8, suit: holdem_shared::Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn royal_flush_outranks_straight_flush() {
        let royal = best_rank_from_cards(&[
            c(14, Hearts),
            c(13, Hearts),
            c(12, Hearts),
            c(11, Hearts),
            c(10, Hearts),
        ]);
        let king_high_sf = best_rank_from_cards(&[
            c(13, Spades),
            c(12, Spades),
            c(11, Spades),
            c(10, Spades),
            c(9, Spades),
        ]);
        assert_eq!(royal.category, HandRankCategory::RoyalFlush);
        assert_eq!(king_high_sf.category, HandRankCategory::StraightFlush);
        assert!(royal > king_high_sf);
    }

    #[test]
    fn wheel_straight_ranks_below_six_high() {
        let wheel = best_rank_from_cards(&[
            c(14, Hearts),
            c(2, Clubs),
            c(3, Diamonds),
            c(4, Spades),
            c(5, Hearts),
        ]);
        let six_high = best_rank_from_cards(&[
            c(2, Hearts),
            c(3, Clubs),
            c(4, Diamonds),
            c(5, Spades),
            c(6, Hearts),
        ]);
        assert_eq!(wheel.category, HandRankCategory::Straight);
        assert_eq!(wheel.tiebreakers, vec![5]);
        assert!(wheel < six_high);
    }

    #[test]
    fn four_of_a_kind_beats_full_house() {
        let quad = best_rank_from_cards(&[
            c(9, Hearts),
            c(9, Clubs),
            c(9, Diamonds),
            c(9, Spades),
            c(2, Hearts),
        ]);
        let full_house = best_rank_from_cards(&[
            c(8, Hearts),
            c(8, Clubs),
            c(8, Diamonds),
            c(3, Spades),
            c(3, Hearts),
        ]);
        assert!(quad > full_house);
    }

    #[test]
    fn rank_is_invariant_under_permutation_of_seven_cards() {
        let hole = [c(14, Hearts), c(14, Clubs)];
        let community = [c(7, Diamonds), c(2, Spades), c(5, Clubs), c(9, Hearts), c(3, Spades)];
        let baseline = evaluate_best_hand(hole, &community);

        let mut shuffled_community = community;
        shuffled_community.reverse();
        let reversed = evaluate_best_hand(hole, &shuffled_community);
        assert_eq!(baseline, reversed);
    }

    #[test]
    fn determine_winners_splits_on_tie() {
        let community = [c(2, Hearts), c(5, Clubs), c(9, Diamonds), c(11, Spades), c(3, Hearts)];
        let a = PlayerId(0);
        let b = PlayerId(1);
        let eligible = vec![
            (a, [c(14, Hearts), c(13, Clubs)]),
            (b, [c(14, Clubs), c(13, Diamonds)]),
        ];
        let winners = determine_winners(&eligible, &community);
        assert_eq!(winners.len(), 2);
    }
}
