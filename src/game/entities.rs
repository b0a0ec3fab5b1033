use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::EngineError;
use super::constants::{BOARD_SIZE, HOLE_CARDS_PER_SEAT};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card rank. Deuce is 2, ace is high at 14.
pub type Rank = u8;

/// A card is a tuple of a rank (2u8..=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Rank, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.0 {
            14 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            r => &r.to_string(),
        };
        let repr = format!("{rank}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

/// An ordered 52-card deck, consumed front to back after a shuffle.
///
/// The deck is never reshuffled or reused within a hand; a new hand gets
/// a new deck. Shuffling goes through the caller's random source so tests
/// can replay a hand from a fixed seed.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; 52],
    cursor: usize,
}

impl Deck {
    /// Build a freshly shuffled deck. All 52 cards are unique by
    /// construction.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards: [Card; 52] =
            std::array::from_fn(|i| Card((i / 4 + 2) as Rank, Suit::ALL[i % 4]));
        cards.shuffle(rng);
        Self { cards, cursor: 0 }
    }

    /// Cards not yet dealt.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    fn draw(&mut self) -> Card {
        let card = self.cards[self.cursor];
        self.cursor += 1;
        card
    }

    /// Deal two hole cards for each of `seats` players.
    pub fn deal_hole(&mut self, seats: usize) -> Result<Vec<[Card; 2]>, EngineError> {
        if self.remaining() < seats * HOLE_CARDS_PER_SEAT {
            return Err(EngineError::DeckExhausted);
        }
        Ok((0..seats).map(|_| [self.draw(), self.draw()]).collect())
    }

    /// Deal `count` community cards.
    pub fn deal_community(&mut self, count: usize) -> Result<Vec<Card>, EngineError> {
        if self.remaining() < count {
            return Err(EngineError::DeckExhausted);
        }
        Ok((0..count).map(|_| self.draw()).collect())
    }
}

/// Type alias for whole chips. Stacks, bets, and pots are all counted in
/// whole chips; fractions of a chip don't exist at the table.
pub type Chips = u32;

/// Type alias for seat positions at the table.
pub type SeatNumber = usize;

/// Type alias for the player occupying a seat. Assigned by whatever user
/// system surrounds the engine.
pub type PlayerId = i64;

/// Type alias for the room a hand belongs to.
pub type RoomId = i64;

/// Type alias for hand identifiers.
pub type HandId = uuid::Uuid;

/// One betting phase of a hand, plus the two terminal phases.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Finished,
}

impl Street {
    /// Community cards visible on this street.
    #[must_use]
    pub fn board_size(self) -> usize {
        match self {
            Self::PreFlop => 0,
            Self::Flop => 3,
            Self::Turn => 4,
            Self::River | Self::Showdown | Self::Finished => BOARD_SIZE,
        }
    }

    /// Whether seats still act on this street.
    #[must_use]
    pub fn is_betting(self) -> bool {
        matches!(self, Self::PreFlop | Self::Flop | Self::Turn | Self::River)
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::PreFlop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River | Self::Showdown => Self::Showdown,
            Self::Finished => Self::Finished,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// A betting command as submitted by a player.
///
/// `Bet` and `Raise` carry the additional chips the seat is putting in
/// on top of its current street contribution.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    AllIn,
    Bet(Chips),
    Call,
    Check,
    Fold,
    Raise(Chips),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn => "all-ins",
            Self::Bet(amount) => &format!("bets {amount}"),
            Self::Call => "calls",
            Self::Check => "checks",
            Self::Fold => "folds",
            Self::Raise(amount) => &format!("raises {amount}"),
        };
        write!(f, "{repr}")
    }
}

/// What an action turned out to be once validated. A call that empties
/// the stack records as `AllIn`, not `Call`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ActionKind {
    AllIn,
    Bet,
    Call,
    Check,
    Fold,
    Raise,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn => "all-in",
            Self::Bet => "bet",
            Self::Call => "call",
            Self::Check => "check",
            Self::Fold => "fold",
            Self::Raise => "raise",
        };
        write!(f, "{repr}")
    }
}

/// One applied action. Append-only: records are written once and never
/// touched again, which is what makes the log trustworthy for replay.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionRecord {
    pub seat: SeatNumber,
    pub street: Street,
    pub kind: ActionKind,
    pub amount: Chips,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}/{}", self.small, self.big);
        write!(f, "{repr}")
    }
}

/// One occupied seat as reported by the seating collaborator.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatAssignment {
    pub seat_number: SeatNumber,
    pub player_id: PlayerId,
    pub stack: Chips,
}

/// Snapshot of a room's seating, taken when a hand starts.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seating {
    pub seats: Vec<SeatAssignment>,
    pub blinds: Blinds,
    pub min_players: usize,
}

/// A seat as owned by a live hand. The stack here is authoritative only
/// for the hand's duration; final stacks travel back out in the
/// hand-finished event.
#[derive(Clone, Debug)]
pub struct Seat {
    pub seat_number: SeatNumber,
    pub player_id: PlayerId,
    pub stack: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub last_action: Option<ActionKind>,
    pub(crate) hole_cards: Vec<Card>,
}

impl Seat {
    #[must_use]
    pub fn new(assignment: &SeatAssignment) -> Self {
        Self {
            seat_number: assignment.seat_number,
            player_id: assignment.player_id,
            stack: assignment.stack,
            folded: false,
            all_in: false,
            last_action: None,
            hole_cards: Vec::with_capacity(HOLE_CARDS_PER_SEAT),
        }
    }

    /// A seat that can still act: dealt in, not folded, not all-in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.folded && !self.all_in
    }
}

/// Public per-seat state. Hole cards are deliberately absent; they are
/// only reachable through the engine's per-seat accessor.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub seat_number: SeatNumber,
    pub player_id: PlayerId,
    pub stack: Chips,
    pub street_contribution: Chips,
    pub hand_contribution: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub last_action: Option<ActionKind>,
}

/// Public snapshot of a hand, safe to broadcast to every client.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HandView {
    pub hand_id: HandId,
    pub street: Street,
    pub dealer_seat: SeatNumber,
    pub small_blind_seat: SeatNumber,
    pub big_blind_seat: SeatNumber,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub current_high_bet: Chips,
    pub current_actor: Option<SeatNumber>,
    pub vote_open: bool,
    pub run_out_boards: Vec<Vec<Card>>,
    pub seats: Vec<SeatView>,
}
