//! Hand lifecycle and the engine command API.
//!
//! [`GameEngine`] owns at most one live hand for its room and advances
//! it strictly through commands: apply an action, handle a timeout,
//! cast a run-out vote, force a seat out. Every successful command
//! leaves behind events for the room shell to publish; every rejected
//! command leaves the hand exactly as it was.

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use super::EngineError;
use super::betting::BettingRound;
use super::constants::{BOARD_SIZE, DEFAULT_TIME_PER_ROUND_SECS, MAX_SEATS};
use super::entities::{
    Action, ActionKind, ActionRecord, Card, Chips, Deck, HandId, HandView, RoomId, Seat,
    SeatNumber, SeatView, Seating, Street,
};
use super::pot::PotLedger;
use super::turn_order::{self, NextActor};
use super::vote::{AllinVotePoll, RunOuts};

/// Everything observable that happens inside a hand. The room shell
/// drains these after each command and forwards them to the
/// notification port.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    HandStarted {
        hand_id: HandId,
        dealer_seat: SeatNumber,
        small_blind_seat: SeatNumber,
        big_blind_seat: SeatNumber,
    },
    BlindPosted {
        seat: SeatNumber,
        amount: Chips,
    },
    ActionApplied {
        record: ActionRecord,
        /// True for timeout fallbacks and forced folds, false for
        /// player-submitted actions.
        auto: bool,
    },
    StreetAdvanced {
        street: Street,
        board: Vec<Card>,
    },
    TimerTick {
        /// The seat on the clock, or `None` while a vote deadline runs.
        seat: Option<SeatNumber>,
        remaining_secs: u16,
        total_secs: u16,
    },
    RunOutVoteOpened {
        eligible: Vec<SeatNumber>,
    },
    RunOutVoteCast {
        seat: SeatNumber,
        option: RunOuts,
    },
    RunOutVoteResolved {
        option: RunOuts,
    },
    RunOutDealt {
        index: usize,
        board: Vec<Card>,
    },
    HandFinished {
        hand_id: HandId,
        payouts: BTreeMap<SeatNumber, Chips>,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HandStarted { dealer_seat, .. } => {
                format!("hand started, button on seat {dealer_seat}")
            }
            Self::BlindPosted { seat, amount } => {
                format!("seat {seat} posts {amount}")
            }
            Self::ActionApplied { record, auto } => {
                let mut repr = if record.amount == 0 {
                    format!("seat {} {}s", record.seat, record.kind)
                } else {
                    format!("seat {} {}s {}", record.seat, record.kind, record.amount)
                };
                if *auto {
                    repr.push_str(" (auto)");
                }
                repr
            }
            Self::StreetAdvanced { street, .. } => format!("dealing the {street}"),
            Self::TimerTick { seat: Some(seat), remaining_secs, .. } => {
                format!("seat {seat} has {remaining_secs}s left")
            }
            Self::TimerTick { seat: None, remaining_secs, .. } => {
                format!("{remaining_secs}s left to vote")
            }
            Self::RunOutVoteOpened { .. } => "voting on the number of run-outs".to_string(),
            Self::RunOutVoteCast { seat, option } => {
                format!("seat {seat} votes for {option} run-out(s)")
            }
            Self::RunOutVoteResolved { option } => {
                format!("running the board {option} time(s)")
            }
            Self::RunOutDealt { index, .. } => format!("run-out {} dealt", index + 1),
            Self::HandFinished { .. } => "hand finished".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// Live run-out poll plus the seats allowed to vote in it.
#[derive(Debug)]
struct RunOutVote {
    poll: AllinVotePoll,
    eligible: Vec<SeatNumber>,
}

/// One hand of play. Owned by the engine, never handed out.
#[derive(Debug)]
struct Hand {
    id: HandId,
    street: Street,
    dealer_seat: SeatNumber,
    small_blind_seat: SeatNumber,
    big_blind_seat: SeatNumber,
    board: Vec<Card>,
    deck: Deck,
    seats: Vec<Seat>,
    pot: PotLedger,
    betting: BettingRound,
    current_actor: Option<SeatNumber>,
    vote: Option<RunOutVote>,
    run_out_boards: Vec<Vec<Card>>,
    records: Vec<ActionRecord>,
}

impl Hand {
    fn seat_index(&self, seat_number: SeatNumber) -> Result<usize, EngineError> {
        self.seats
            .iter()
            .position(|s| s.seat_number == seat_number)
            .ok_or(EngineError::UnknownSeat(seat_number))
    }

    fn non_folded(&self) -> Vec<SeatNumber> {
        self.seats
            .iter()
            .filter(|s| !s.folded)
            .map(|s| s.seat_number)
            .collect()
    }

    fn view(&self) -> HandView {
        HandView {
            hand_id: self.id,
            street: self.street,
            dealer_seat: self.dealer_seat,
            small_blind_seat: self.small_blind_seat,
            big_blind_seat: self.big_blind_seat,
            board: self.board.clone(),
            pot: self.pot.total(),
            current_high_bet: self.betting.high_bet(),
            current_actor: self.current_actor,
            vote_open: self.vote.is_some(),
            run_out_boards: self.run_out_boards.clone(),
            seats: self
                .seats
                .iter()
                .map(|s| SeatView {
                    seat_number: s.seat_number,
                    player_id: s.player_id,
                    stack: s.stack,
                    street_contribution: self.betting.contribution(s.seat_number),
                    hand_contribution: self.pot.contribution(s.seat_number),
                    folded: s.folded,
                    all_in: s.all_in,
                    last_action: s.last_action,
                })
                .collect(),
        }
    }
}

/// The round engine for a single room.
///
/// All commands are synchronous and must be serialized by the caller;
/// the room actor in [`crate::room`] does exactly that. The random
/// source is injected at construction so a hand can be replayed from a
/// seed in tests.
#[derive(Debug)]
pub struct GameEngine {
    room_id: RoomId,
    rng: StdRng,
    hand: Option<Hand>,
    last_dealer: Option<SeatNumber>,
    time_per_round_secs: u16,
    events: VecDeque<GameEvent>,
}

impl GameEngine {
    #[must_use]
    pub fn new(room_id: RoomId) -> Self {
        Self::with_rng(room_id, StdRng::from_os_rng())
    }

    /// Engine with a fixed seed. Shuffles and dealer selection become
    /// reproducible, which is what the scenario tests lean on.
    #[must_use]
    pub fn with_seed(room_id: RoomId, seed: u64) -> Self {
        Self::with_rng(room_id, StdRng::seed_from_u64(seed))
    }

    fn with_rng(room_id: RoomId, rng: StdRng) -> Self {
        Self {
            room_id,
            rng,
            hand: None,
            last_dealer: None,
            time_per_round_secs: DEFAULT_TIME_PER_ROUND_SECS,
            events: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    #[must_use]
    pub fn time_per_round_secs(&self) -> u16 {
        self.time_per_round_secs
    }

    /// Seconds a seat (or the vote) gets before the fallback fires.
    pub fn set_time_per_round(&mut self, secs: u16) {
        self.time_per_round_secs = secs.max(1);
    }

    /// Public snapshot of the live hand, if any.
    #[must_use]
    pub fn view(&self) -> Option<HandView> {
        self.hand.as_ref().map(Hand::view)
    }

    /// A seat's private hole cards.
    pub fn hole_cards(&self, seat: SeatNumber) -> Result<Vec<Card>, EngineError> {
        let hand = self.hand.as_ref().ok_or(EngineError::HandComplete)?;
        let idx = hand.seat_index(seat)?;
        Ok(hand.seats[idx].hole_cards.clone())
    }

    /// The append-only action log of the live hand.
    #[must_use]
    pub fn records(&self) -> &[ActionRecord] {
        self.hand.as_ref().map(|h| h.records.as_slice()).unwrap_or(&[])
    }

    /// Take all events produced since the last drain.
    pub fn drain_events(&mut self) -> VecDeque<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a new hand from the room's current seating.
    ///
    /// Rotates the button, posts blinds, deals hole cards, and hands the
    /// turn to the first seat after the big blind. Seats with an empty
    /// stack are left out of the hand.
    pub fn start_hand(&mut self, seating: &Seating) -> Result<HandView, EngineError> {
        if self.hand.as_ref().is_some_and(|h| h.street != Street::Finished) {
            return Err(EngineError::HandInProgress);
        }

        let mut assignments: Vec<_> = seating.seats.iter().filter(|a| a.stack > 0).collect();
        assignments.sort_by_key(|a| a.seat_number);
        if assignments.len() < seating.min_players.max(2) {
            return Err(EngineError::NotEnoughPlayers);
        }
        if assignments.len() > MAX_SEATS {
            return Err(EngineError::TooManyPlayers);
        }

        let seat_numbers: Vec<SeatNumber> = assignments.iter().map(|a| a.seat_number).collect();
        let dealer = turn_order::rotate_dealer(self.last_dealer, &seat_numbers, &mut self.rng)?;
        let (small_blind, big_blind) = turn_order::assign_blinds(dealer, &seat_numbers)?;
        self.last_dealer = Some(dealer);

        let mut deck = Deck::shuffled(&mut self.rng);
        let mut seats: Vec<Seat> = assignments.iter().map(|a| Seat::new(a)).collect();

        // Two cards each, going around from the dealer's left.
        let dealer_idx = seat_numbers
            .iter()
            .position(|&s| s == dealer)
            .ok_or(EngineError::UnknownSeat(dealer))?;
        for (i, cards) in deck.deal_hole(seats.len())?.into_iter().enumerate() {
            let idx = (dealer_idx + 1 + i) % seats.len();
            seats[idx].hole_cards.extend(cards);
        }

        let mut hand = Hand {
            id: HandId::new_v4(),
            street: Street::PreFlop,
            dealer_seat: dealer,
            small_blind_seat: small_blind,
            big_blind_seat: big_blind,
            board: Vec::with_capacity(BOARD_SIZE),
            deck,
            seats,
            pot: PotLedger::new(),
            betting: BettingRound::new(Street::PreFlop),
            current_actor: None,
            vote: None,
            run_out_boards: Vec::new(),
            records: Vec::new(),
        };

        self.events.push_back(GameEvent::HandStarted {
            hand_id: hand.id,
            dealer_seat: dealer,
            small_blind_seat: small_blind,
            big_blind_seat: big_blind,
        });

        for (seat_number, amount) in
            [(small_blind, seating.blinds.small), (big_blind, seating.blinds.big)]
        {
            self.post_blind(&mut hand, seat_number, amount)?;
        }

        // A short-stacked blind can be all-in before anyone acts, so run
        // the same progression logic an action would.
        let outcome = self.progress(&mut hand, big_blind);
        let view = hand.view();
        self.hand = Some(hand);
        outcome?;
        Ok(view)
    }

    /// Validate and apply one player action for the seat whose turn it
    /// is. Returns the updated public view.
    pub fn apply_action(
        &mut self,
        seat: SeatNumber,
        action: Action,
    ) -> Result<HandView, EngineError> {
        let mut hand = self.hand.take().ok_or(EngineError::HandComplete)?;
        let outcome = self.apply_action_inner(&mut hand, seat, action, false);
        let view = hand.view();
        self.hand = Some(hand);
        outcome?;
        Ok(view)
    }

    /// Timeout fallback for the seat on the clock: check when that's
    /// legal, otherwise fold. Returns `Ok(None)` when the timeout is
    /// stale (seat already acted, folded, or the hand moved on), so a
    /// late timer firing is harmless.
    pub fn handle_timeout(&mut self, seat: SeatNumber) -> Result<Option<HandView>, EngineError> {
        let Some(mut hand) = self.hand.take() else {
            return Ok(None);
        };
        let stale = !hand.street.is_betting()
            || hand.vote.is_some()
            || hand.current_actor != Some(seat)
            || hand
                .seat_index(seat)
                .map(|i| !hand.seats[i].is_active())
                .unwrap_or(true);
        if stale {
            self.hand = Some(hand);
            return Ok(None);
        }

        let outcome = match self.apply_action_inner(&mut hand, seat, Action::Check, true) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::debug!(
                    "room {}: seat {seat} can't auto-check ({err}), auto-folding",
                    self.room_id
                );
                self.apply_action_inner(&mut hand, seat, Action::Fold, true)
            }
        };
        let view = hand.view();
        self.hand = Some(hand);
        outcome?;
        Ok(Some(view))
    }

    /// Record a run-out vote. Resolves the poll as soon as every
    /// eligible seat has voted.
    pub fn cast_allin_vote(
        &mut self,
        seat: SeatNumber,
        option: RunOuts,
    ) -> Result<HandView, EngineError> {
        let mut hand = self.hand.take().ok_or(EngineError::HandComplete)?;
        let outcome = self.cast_vote_inner(&mut hand, seat, option);
        let view = hand.view();
        self.hand = Some(hand);
        outcome?;
        Ok(view)
    }

    /// Resolve an open run-out poll from whatever votes are in, because
    /// its deadline elapsed. `Ok(None)` when no poll is open.
    pub fn handle_vote_deadline(&mut self) -> Result<Option<HandView>, EngineError> {
        let Some(mut hand) = self.hand.take() else {
            return Ok(None);
        };
        if hand.vote.is_none() {
            self.hand = Some(hand);
            return Ok(None);
        }
        let outcome = self.resolve_vote(&mut hand);
        let view = hand.view();
        self.hand = Some(hand);
        outcome?;
        Ok(Some(view))
    }

    /// Fold a seat out of the hand immediately (the player left the
    /// room). Calling it again for an already-folded seat is a no-op.
    pub fn force_player_leave(&mut self, seat: SeatNumber) -> Result<HandView, EngineError> {
        let mut hand = self.hand.take().ok_or(EngineError::HandComplete)?;
        let outcome = self.leave_inner(&mut hand, seat);
        let view = hand.view();
        self.hand = Some(hand);
        outcome?;
        Ok(view)
    }

    fn post_blind(
        &mut self,
        hand: &mut Hand,
        seat_number: SeatNumber,
        amount: Chips,
    ) -> Result<(), EngineError> {
        let idx = hand.seat_index(seat_number)?;
        let seat = &mut hand.seats[idx];
        let paid = amount.min(seat.stack);
        hand.pot.contribute(seat_number, paid, seat.stack)?;
        seat.stack -= paid;
        if seat.stack == 0 {
            seat.all_in = true;
        }
        hand.betting.post_blind(seat_number, paid);
        self.events.push_back(GameEvent::BlindPosted { seat: seat_number, amount: paid });
        Ok(())
    }

    fn apply_action_inner(
        &mut self,
        hand: &mut Hand,
        seat_number: SeatNumber,
        action: Action,
        auto: bool,
    ) -> Result<(), EngineError> {
        if !hand.street.is_betting() {
            return Err(EngineError::HandComplete);
        }
        if hand.vote.is_some() {
            return Err(EngineError::IllegalAction);
        }
        let idx = hand.seat_index(seat_number)?;
        if hand.current_actor != Some(seat_number) {
            return Err(EngineError::IllegalAction);
        }

        let validated = hand.betting.validate(&hand.seats[idx], action)?;
        hand.pot
            .contribute(seat_number, validated.amount, hand.seats[idx].stack)?;

        let seat = &mut hand.seats[idx];
        seat.stack -= validated.amount;
        if seat.stack == 0 {
            seat.all_in = true;
        }
        if validated.kind == ActionKind::Fold {
            seat.folded = true;
        }
        seat.last_action = Some(validated.kind);
        hand.betting.apply(seat_number, validated);

        let record = ActionRecord {
            seat: seat_number,
            street: hand.street,
            kind: validated.kind,
            amount: validated.amount,
            at: Utc::now(),
        };
        hand.records.push(record.clone());
        self.events.push_back(GameEvent::ActionApplied { record, auto });

        self.progress(hand, seat_number)
    }

    fn cast_vote_inner(
        &mut self,
        hand: &mut Hand,
        seat: SeatNumber,
        option: RunOuts,
    ) -> Result<(), EngineError> {
        hand.seat_index(seat)?;
        let Some(vote) = hand.vote.as_mut() else {
            return Err(EngineError::IllegalAction);
        };
        if !vote.eligible.contains(&seat) {
            return Err(EngineError::IllegalAction);
        }
        vote.poll.cast(seat, option);
        let resolved = vote.poll.is_resolved(&vote.eligible);
        self.events.push_back(GameEvent::RunOutVoteCast { seat, option });
        if resolved {
            return self.resolve_vote(hand);
        }
        Ok(())
    }

    fn leave_inner(&mut self, hand: &mut Hand, seat_number: SeatNumber) -> Result<(), EngineError> {
        if hand.street == Street::Finished {
            return Err(EngineError::HandComplete);
        }
        let idx = hand.seat_index(seat_number)?;
        if hand.seats[idx].folded {
            return Ok(());
        }

        let seat = &mut hand.seats[idx];
        seat.folded = true;
        seat.last_action = Some(ActionKind::Fold);
        let record = ActionRecord {
            seat: seat_number,
            street: hand.street,
            kind: ActionKind::Fold,
            amount: 0,
            at: Utc::now(),
        };
        hand.records.push(record.clone());
        self.events.push_back(GameEvent::ActionApplied { record, auto: true });

        if let Some(vote) = hand.vote.as_mut() {
            vote.eligible.retain(|&s| s != seat_number);
            let resolved = vote.poll.is_resolved(&vote.eligible);
            let non_folded = hand.non_folded();
            if non_folded.len() <= 1 {
                return self.finish(hand, &non_folded);
            }
            if resolved {
                return self.resolve_vote(hand);
            }
            return Ok(());
        }

        if hand.current_actor == Some(seat_number) {
            return self.progress(hand, seat_number);
        }
        // Folding a seat that wasn't on the clock must not move the
        // turn, but it can still end the hand or close the street.
        let non_folded = hand.non_folded();
        if non_folded.len() <= 1 {
            return self.finish(hand, &non_folded);
        }
        if hand.betting.is_complete(&hand.seats) {
            return self.close_street(hand);
        }
        Ok(())
    }

    /// Decide what happens after any state change on a betting street:
    /// hand over, street over, or pass the turn along.
    fn progress(&mut self, hand: &mut Hand, from_seat: SeatNumber) -> Result<(), EngineError> {
        let non_folded = hand.non_folded();
        if non_folded.len() <= 1 {
            // Last player standing takes the pot without a showdown.
            return self.finish(hand, &non_folded);
        }
        if hand.betting.is_complete(&hand.seats) {
            return self.close_street(hand);
        }
        hand.current_actor = match turn_order::next_actor(from_seat, &hand.seats) {
            NextActor::Seat(seat) => Some(seat),
            // Rotation is over but the round isn't: the one remaining
            // active seat still owes a response to an all-in.
            NextActor::HandComplete => {
                hand.seats.iter().find(|s| s.is_active()).map(|s| s.seat_number)
            }
        };
        Ok(())
    }

    fn close_street(&mut self, hand: &mut Hand) -> Result<(), EngineError> {
        let non_folded = hand.non_folded();
        let any_all_in = hand.seats.iter().any(|s| !s.folded && s.all_in);

        if any_all_in && non_folded.len() >= 2 && hand.board.len() < BOARD_SIZE {
            // Betting can't continue; the table votes on run-outs
            // before the rest of the board is dealt.
            hand.current_actor = None;
            self.events.push_back(GameEvent::RunOutVoteOpened { eligible: non_folded.clone() });
            hand.vote = Some(RunOutVote { poll: AllinVotePoll::new(), eligible: non_folded });
            return Ok(());
        }

        if hand.street == Street::River {
            return self.finish(hand, &non_folded);
        }

        let next = hand.street.next();
        let dealt = hand.deck.deal_community(next.board_size() - hand.board.len())?;
        hand.board.extend(dealt);
        hand.street = next;
        hand.betting = BettingRound::new(next);
        for seat in &mut hand.seats {
            seat.last_action = None;
        }
        self.events.push_back(GameEvent::StreetAdvanced { street: next, board: hand.board.clone() });

        // Post-flop action starts left of the dealer.
        hand.current_actor = match turn_order::next_actor(hand.dealer_seat, &hand.seats) {
            NextActor::Seat(seat) => Some(seat),
            NextActor::HandComplete => None,
        };
        Ok(())
    }

    fn resolve_vote(&mut self, hand: &mut Hand) -> Result<(), EngineError> {
        let Some(vote) = hand.vote.take() else {
            return Ok(());
        };
        let option = vote.poll.resolve();
        self.events.push_back(GameEvent::RunOutVoteResolved { option });

        for index in 0..option.count() {
            let extra = hand.deck.deal_community(BOARD_SIZE - hand.board.len())?;
            let mut board = hand.board.clone();
            board.extend(extra);
            self.events.push_back(GameEvent::RunOutDealt { index, board: board.clone() });
            hand.run_out_boards.push(board);
        }

        let non_folded = hand.non_folded();
        self.finish(hand, &non_folded)
    }

    /// Settle the pot and close out the hand. Without hand ranking the
    /// winner set is every non-folded seat (or the lone survivor), and
    /// the pot splits evenly among them.
    fn finish(&mut self, hand: &mut Hand, winners: &[SeatNumber]) -> Result<(), EngineError> {
        hand.street = Street::Showdown;
        hand.current_actor = None;
        hand.vote = None;

        let payouts = hand.pot.settle(winners)?;
        for (seat_number, prize) in &payouts {
            if let Ok(idx) = hand.seat_index(*seat_number) {
                hand.seats[idx].stack += prize;
            }
        }
        self.events.push_back(GameEvent::HandFinished { hand_id: hand.id, payouts });
        hand.street = Street::Finished;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Blinds, SeatAssignment};

    fn seating_with_blinds(stacks: &[(SeatNumber, Chips)], blinds: Blinds) -> Seating {
        Seating {
            seats: stacks
                .iter()
                .map(|&(seat_number, stack)| SeatAssignment {
                    seat_number,
                    player_id: seat_number as i64 * 10,
                    stack,
                })
                .collect(),
            blinds,
            min_players: 2,
        }
    }

    fn seating(stacks: &[(SeatNumber, Chips)]) -> Seating {
        seating_with_blinds(stacks, Blinds { small: 10, big: 20 })
    }

    fn three_handed() -> (GameEngine, HandView) {
        let mut engine = GameEngine::with_seed(1, 42);
        let view = engine
            .start_hand(&seating(&[(1, 1_000), (2, 1_000), (3, 1_000)]))
            .unwrap();
        (engine, view)
    }

    fn seat_view(view: &HandView, seat: SeatNumber) -> &SeatView {
        view.seats.iter().find(|s| s.seat_number == seat).unwrap()
    }

    #[test]
    fn test_start_hand_posts_blinds_and_hands_turn_past_big_blind() {
        let (engine, view) = three_handed();
        assert_eq!(view.street, Street::PreFlop);
        assert_eq!(view.pot, 30);
        assert_eq!(view.current_high_bet, 20);
        assert_eq!(seat_view(&view, view.small_blind_seat).street_contribution, 10);
        assert_eq!(seat_view(&view, view.big_blind_seat).street_contribution, 20);
        // Three-handed, the seat after the big blind is the dealer.
        assert_eq!(view.current_actor, Some(view.dealer_seat));
        for seat in &view.seats {
            assert_eq!(engine.hole_cards(seat.seat_number).unwrap().len(), 2);
        }
        assert!(view.board.is_empty());
    }

    #[test]
    fn test_blinds_follow_the_dealer_clockwise() {
        let (_, view) = three_handed();
        let seated = [1, 2, 3];
        let dealer_idx = seated.iter().position(|&s| s == view.dealer_seat).unwrap();
        assert_eq!(view.small_blind_seat, seated[(dealer_idx + 1) % 3]);
        assert_eq!(view.big_blind_seat, seated[(dealer_idx + 2) % 3]);
    }

    #[test]
    fn test_call_call_check_closes_the_street() {
        let (mut engine, view) = three_handed();
        let view = engine.apply_action(view.dealer_seat, Action::Call).unwrap();
        assert_eq!(seat_view(&view, view.dealer_seat).street_contribution, 20);
        let view = engine.apply_action(view.small_blind_seat, Action::Call).unwrap();
        // The small blind only owed the difference.
        assert_eq!(seat_view(&view, view.small_blind_seat).hand_contribution, 20);
        let view = engine.apply_action(view.big_blind_seat, Action::Check).unwrap();

        assert_eq!(view.street, Street::Flop);
        assert_eq!(view.board.len(), 3);
        assert_eq!(view.pot, 60);
        assert_eq!(view.current_high_bet, 0);
        for seat in &view.seats {
            assert_eq!(seat.street_contribution, 0);
        }
        // Post-flop action starts left of the dealer.
        assert_eq!(view.current_actor, Some(view.small_blind_seat));
    }

    #[test]
    fn test_pot_always_equals_the_sum_of_contributions() {
        let (mut engine, start) = three_handed();
        let mut views = vec![start.clone()];
        views.push(engine.apply_action(start.dealer_seat, Action::Raise(60)).unwrap());
        views.push(engine.apply_action(start.small_blind_seat, Action::Call).unwrap());
        views.push(engine.apply_action(start.big_blind_seat, Action::Call).unwrap());
        for view in views {
            let contributed: Chips = view.seats.iter().map(|s| s.hand_contribution).sum();
            assert_eq!(view.pot, contributed);
        }
        // Blinds aside, the pot is exactly what the action log moved.
        let recorded: Chips = engine.records().iter().map(|r| r.amount).sum();
        assert_eq!(engine.view().unwrap().pot, recorded + 30);
    }

    #[test]
    fn test_check_while_owing_is_illegal() {
        let (mut engine, view) = three_handed();
        let err = engine.apply_action(view.dealer_seat, Action::Check).unwrap_err();
        assert_eq!(err, EngineError::IllegalAction);
        // The rejection must not have touched the hand.
        assert_eq!(engine.view().unwrap(), view);
    }

    #[test]
    fn test_out_of_turn_action_is_illegal() {
        let (mut engine, view) = three_handed();
        let err = engine.apply_action(view.small_blind_seat, Action::Call).unwrap_err();
        assert_eq!(err, EngineError::IllegalAction);
    }

    #[test]
    fn test_unknown_seat_is_rejected() {
        let (mut engine, _) = three_handed();
        assert_eq!(
            engine.apply_action(7, Action::Fold).unwrap_err(),
            EngineError::UnknownSeat(7)
        );
    }

    #[test]
    fn test_folding_to_one_player_ends_the_hand() {
        let (mut engine, view) = three_handed();
        engine.apply_action(view.dealer_seat, Action::Fold).unwrap();
        let view = engine.apply_action(view.small_blind_seat, Action::Fold).unwrap();
        assert_eq!(view.street, Street::Finished);
        // The big blind collects the blinds without a showdown.
        assert_eq!(seat_view(&view, view.big_blind_seat).stack, 1_010);
        assert_eq!(
            engine.apply_action(view.big_blind_seat, Action::Check).unwrap_err(),
            EngineError::HandComplete
        );
    }

    #[test]
    fn test_second_start_hand_needs_the_first_to_finish() {
        let (mut engine, view) = three_handed();
        assert_eq!(
            engine.start_hand(&seating(&[(1, 1_000), (2, 1_000), (3, 1_000)])).unwrap_err(),
            EngineError::HandInProgress
        );
        engine.apply_action(view.dealer_seat, Action::Fold).unwrap();
        engine.apply_action(view.small_blind_seat, Action::Fold).unwrap();
        assert!(engine.start_hand(&seating(&[(1, 1_000), (2, 1_000), (3, 1_000)])).is_ok());
    }

    #[test]
    fn test_dealer_rotates_round_robin_across_hands() {
        let mut engine = GameEngine::with_seed(1, 5);
        let stacks = [(2, 1_000), (5, 1_000), (6, 1_000), (9, 1_000)];
        let mut dealers = Vec::new();
        for _ in 0..4 {
            let view = engine.start_hand(&seating(&stacks)).unwrap();
            dealers.push(view.dealer_seat);
            // Fold the hand out to get to the next one.
            loop {
                let view = engine.view().unwrap();
                if view.street == Street::Finished {
                    break;
                }
                engine.apply_action(view.current_actor.unwrap(), Action::Fold).unwrap();
            }
        }
        let mut sorted = dealers.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4, "button must visit every seat once: {dealers:?}");
    }

    #[test]
    fn test_seating_limits() {
        let mut engine = GameEngine::with_seed(1, 0);
        assert_eq!(
            engine.start_hand(&seating(&[(1, 1_000)])).unwrap_err(),
            EngineError::NotEnoughPlayers
        );
        let mut crowd = seating(
            &(1..=10).map(|s| (s as SeatNumber, 1_000)).collect::<Vec<_>>(),
        );
        assert_eq!(engine.start_hand(&crowd).unwrap_err(), EngineError::TooManyPlayers);
        crowd.seats.truncate(2);
        crowd.min_players = 3;
        assert_eq!(engine.start_hand(&crowd).unwrap_err(), EngineError::NotEnoughPlayers);
    }

    #[test]
    fn test_timeout_folds_a_seat_that_owes_chips() {
        let (mut engine, view) = three_handed();
        let actor = view.current_actor.unwrap();
        let after = engine.handle_timeout(actor).unwrap().unwrap();
        assert!(seat_view(&after, actor).folded);
        let record = engine.records().last().unwrap().clone();
        assert_eq!(record.kind, ActionKind::Fold);
        assert_eq!(record.seat, actor);
    }

    #[test]
    fn test_timeout_checks_when_nothing_is_owed() {
        let (mut engine, view) = three_handed();
        engine.apply_action(view.dealer_seat, Action::Call).unwrap();
        engine.apply_action(view.small_blind_seat, Action::Call).unwrap();
        let flop = engine.apply_action(view.big_blind_seat, Action::Check).unwrap();
        assert_eq!(flop.street, Street::Flop);
        let actor = flop.current_actor.unwrap();
        let after = engine.handle_timeout(actor).unwrap().unwrap();
        assert!(!seat_view(&after, actor).folded);
        assert_eq!(engine.records().last().unwrap().kind, ActionKind::Check);
    }

    #[test]
    fn test_stale_timeouts_are_ignored() {
        let (mut engine, view) = three_handed();
        let actor = view.current_actor.unwrap();
        // Not this seat's turn: nothing happens.
        assert_eq!(engine.handle_timeout(view.small_blind_seat).unwrap(), None);
        engine.apply_action(actor, Action::Fold).unwrap();
        // The timer for the seat that just acted fires late: ignored.
        assert_eq!(engine.handle_timeout(actor).unwrap(), None);
        let mut idle = GameEngine::with_seed(2, 0);
        assert_eq!(idle.handle_timeout(1).unwrap(), None);
    }

    #[test]
    fn test_all_in_call_down_opens_the_run_out_vote() {
        let (mut engine, view) = three_handed();
        engine.apply_action(view.dealer_seat, Action::AllIn).unwrap();
        engine.apply_action(view.small_blind_seat, Action::Call).unwrap();
        let view = engine.apply_action(view.big_blind_seat, Action::Call).unwrap();
        assert!(view.vote_open);
        assert_eq!(view.current_actor, None);
        assert!(view.seats.iter().all(|s| s.all_in));
        // No betting while the vote runs.
        assert_eq!(
            engine.apply_action(view.dealer_seat, Action::Check).unwrap_err(),
            EngineError::IllegalAction
        );
    }

    #[test]
    fn test_majority_vote_runs_the_board_twice() {
        let (mut engine, start) = three_handed();
        engine.apply_action(start.dealer_seat, Action::AllIn).unwrap();
        engine.apply_action(start.small_blind_seat, Action::Call).unwrap();
        engine.apply_action(start.big_blind_seat, Action::Call).unwrap();

        engine.cast_allin_vote(start.dealer_seat, RunOuts::Two).unwrap();
        engine.cast_allin_vote(start.small_blind_seat, RunOuts::Two).unwrap();
        let view = engine.cast_allin_vote(start.big_blind_seat, RunOuts::Three).unwrap();

        assert_eq!(view.street, Street::Finished);
        assert!(!view.vote_open);
        assert_eq!(view.run_out_boards.len(), 2);
        for board in &view.run_out_boards {
            assert_eq!(board.len(), 5);
        }
        // Even split of the 3,000-chip pot.
        for seat in &view.seats {
            assert_eq!(seat.stack, 1_000);
        }
    }

    #[test]
    fn test_vote_deadline_resolves_from_partial_votes() {
        let (mut engine, start) = three_handed();
        engine.apply_action(start.dealer_seat, Action::AllIn).unwrap();
        engine.apply_action(start.small_blind_seat, Action::Call).unwrap();
        engine.apply_action(start.big_blind_seat, Action::Call).unwrap();

        engine.cast_allin_vote(start.big_blind_seat, RunOuts::Three).unwrap();
        let view = engine.handle_vote_deadline().unwrap().unwrap();
        assert_eq!(view.street, Street::Finished);
        assert_eq!(view.run_out_boards.len(), 3);
        // A second deadline is a no-op.
        assert_eq!(engine.handle_vote_deadline().unwrap(), None);
    }

    #[test]
    fn test_vote_deadline_defaults_to_one_board() {
        let (mut engine, start) = three_handed();
        engine.apply_action(start.dealer_seat, Action::AllIn).unwrap();
        engine.apply_action(start.small_blind_seat, Action::Call).unwrap();
        engine.apply_action(start.big_blind_seat, Action::Call).unwrap();
        let view = engine.handle_vote_deadline().unwrap().unwrap();
        assert_eq!(view.run_out_boards.len(), 1);
    }

    #[test]
    fn test_voting_outside_a_poll_is_illegal() {
        let (mut engine, view) = three_handed();
        assert_eq!(
            engine.cast_allin_vote(view.dealer_seat, RunOuts::Two).unwrap_err(),
            EngineError::IllegalAction
        );
    }

    #[test]
    fn test_force_leave_folds_immediately_and_is_idempotent() {
        let (mut engine, start) = three_handed();
        let view = engine.force_player_leave(start.small_blind_seat).unwrap();
        assert!(seat_view(&view, start.small_blind_seat).folded);
        // The dealer is still on the clock.
        assert_eq!(view.current_actor, Some(start.dealer_seat));
        let records_before = engine.records().len();
        let again = engine.force_player_leave(start.small_blind_seat).unwrap();
        assert_eq!(engine.records().len(), records_before);
        assert!(seat_view(&again, start.small_blind_seat).folded);
    }

    #[test]
    fn test_force_leave_of_current_actor_passes_the_turn() {
        let (mut engine, start) = three_handed();
        let view = engine.force_player_leave(start.dealer_seat).unwrap();
        assert_eq!(view.current_actor, Some(start.small_blind_seat));
    }

    #[test]
    fn test_checked_down_hand_splits_the_pot_evenly() {
        let (mut engine, start) = three_handed();
        engine.apply_action(start.dealer_seat, Action::Call).unwrap();
        engine.apply_action(start.small_blind_seat, Action::Call).unwrap();
        let mut view = engine.apply_action(start.big_blind_seat, Action::Check).unwrap();
        while view.street.is_betting() {
            view = engine.apply_action(view.current_actor.unwrap(), Action::Check).unwrap();
        }
        assert_eq!(view.street, Street::Finished);
        assert_eq!(view.board.len(), 5);
        for seat in &view.seats {
            assert_eq!(seat.stack, 1_000);
        }
    }

    #[test]
    fn test_odd_pot_remainder_goes_to_the_lowest_winning_seat() {
        let mut engine = GameEngine::with_seed(1, 11);
        let start = engine
            .start_hand(&seating_with_blinds(
                &[(1, 1_000), (2, 1_000), (3, 1_000)],
                Blinds { small: 15, big: 30 },
            ))
            .unwrap();
        engine.apply_action(start.dealer_seat, Action::Call).unwrap();
        let mut view = engine.apply_action(start.small_blind_seat, Action::Fold).unwrap();
        view = engine.apply_action(view.big_blind_seat, Action::Check).unwrap();
        while view.street.is_betting() {
            view = engine.apply_action(view.current_actor.unwrap(), Action::Check).unwrap();
        }

        // 75 chips between two winners: 38 to the lower seat, 37 to the
        // higher one.
        let mut winners: Vec<SeatNumber> = view
            .seats
            .iter()
            .filter(|s| !s.folded)
            .map(|s| s.seat_number)
            .collect();
        winners.sort_unstable();
        assert_eq!(seat_view(&view, winners[0]).stack, 1_000 - 30 + 38);
        assert_eq!(seat_view(&view, winners[1]).stack, 1_000 - 30 + 37);
    }

    #[test]
    fn test_events_tell_the_story_of_the_hand() {
        let (mut engine, view) = three_handed();
        let events = engine.drain_events();
        assert!(matches!(events.front(), Some(GameEvent::HandStarted { .. })));
        let blinds = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BlindPosted { .. }))
            .count();
        assert_eq!(blinds, 2);

        engine.apply_action(view.dealer_seat, Action::Fold).unwrap();
        engine.apply_action(view.small_blind_seat, Action::Fold).unwrap();
        let events = engine.drain_events();
        assert!(matches!(events.back(), Some(GameEvent::HandFinished { .. })));
        // A drained queue stays drained.
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_time_per_round_is_configurable() {
        let (mut engine, _) = three_handed();
        engine.set_time_per_round(15);
        assert_eq!(engine.time_per_round_secs(), 15);
        engine.set_time_per_round(0);
        assert_eq!(engine.time_per_round_secs(), 1);
    }
}
