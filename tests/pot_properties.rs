/// Property-based tests for the pot ledger, deck, and run-out vote
/// using proptest.
///
/// These verify the engine's conservation invariants across randomly
/// generated inputs: chips never leak out of the pot, every shuffled
/// deck holds 52 unique cards, and vote resolution is order-independent.
use holdem_engine::game::entities::{Chips, Deck, SeatNumber};
use holdem_engine::game::pot::PotLedger;
use holdem_engine::game::vote::AllinVotePoll;
use holdem_engine::RunOuts;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, BTreeSet};

// Strategy for a sequence of (seat, amount) contributions.
fn contributions_strategy() -> impl Strategy<Value = Vec<(SeatNumber, Chips)>> {
    prop::collection::vec((0usize..9, 0u32..500), 0..40)
}

// Strategy for run-out votes, one per seat.
fn votes_strategy() -> impl Strategy<Value = Vec<(SeatNumber, u8)>> {
    prop::collection::vec((0usize..9, 1u8..=3), 0..12)
}

proptest! {
    #[test]
    fn test_pot_total_is_the_sum_of_contributions(entries in contributions_strategy()) {
        let mut pot = PotLedger::new();
        let mut expected: BTreeMap<SeatNumber, Chips> = BTreeMap::new();
        for (seat, amount) in entries {
            pot.contribute(seat, amount, amount).unwrap();
            *expected.entry(seat).or_default() += amount;
        }

        let total: Chips = expected.values().sum();
        prop_assert_eq!(pot.total(), total);
        let highest = expected.values().max().copied().unwrap_or(0);
        prop_assert_eq!(pot.highest_contribution(), highest);
        for (seat, amount) in expected {
            prop_assert_eq!(pot.contribution(seat), amount);
        }
    }

    #[test]
    fn test_settle_distributes_the_whole_pot(
        entries in contributions_strategy(),
        winners in prop::collection::btree_set(0usize..9, 1..5),
    ) {
        let mut pot = PotLedger::new();
        for (seat, amount) in entries {
            pot.contribute(seat, amount, amount).unwrap();
        }
        let total = pot.total();
        let winners: Vec<SeatNumber> = winners.into_iter().collect();
        let payouts = pot.settle(&winners).unwrap();

        let paid: Chips = payouts.values().sum();
        prop_assert_eq!(paid, total, "no chips may be lost to rounding");

        // Everyone but the first winner gets the even share; the first
        // winner in seat order absorbs the remainder.
        let share = total / winners.len() as Chips;
        for (i, seat) in winners.iter().enumerate() {
            let expected = if i == 0 { share + total % winners.len() as Chips } else { share };
            prop_assert_eq!(payouts[seat], expected);
        }
    }

    #[test]
    fn test_every_shuffle_yields_52_unique_cards(seed in any::<u64>()) {
        let mut deck = Deck::shuffled(&mut StdRng::seed_from_u64(seed));
        let cards = deck.deal_community(52).unwrap();
        let unique: BTreeSet<_> = cards.iter().collect();
        prop_assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_dealing_nine_players_never_exhausts_the_deck(
        seed in any::<u64>(),
        players in 2usize..=9,
    ) {
        let mut deck = Deck::shuffled(&mut StdRng::seed_from_u64(seed));
        prop_assert!(deck.deal_hole(players).is_ok());
        prop_assert!(deck.deal_community(5).is_ok());
    }

    #[test]
    fn test_vote_resolution_matches_a_recount(votes in votes_strategy()) {
        let mut poll = AllinVotePoll::new();
        let mut last_vote: BTreeMap<SeatNumber, u8> = BTreeMap::new();
        for (seat, option) in votes {
            poll.cast(seat, RunOuts::try_from(option).unwrap());
            last_vote.insert(seat, option);
        }

        let mut tally: BTreeMap<u8, usize> = BTreeMap::new();
        for option in last_vote.values() {
            *tally.entry(*option).or_default() += 1;
        }
        let best = tally
            .iter()
            .map(|(&option, &count)| (count, std::cmp::Reverse(option)))
            .max()
            .map(|(_, std::cmp::Reverse(option))| option)
            .unwrap_or(1);

        prop_assert_eq!(poll.resolve(), RunOuts::try_from(best).unwrap());
    }
}
