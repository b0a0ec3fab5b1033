//! One street's betting round.
//!
//! The round validates an action against an immutable view of the seat,
//! then applies the validated result. Splitting the two keeps every
//! rejection side-effect free: a rejected action leaves the round, the
//! pot, and the seat untouched.

use std::collections::{HashMap, HashSet};

use super::EngineError;
use super::entities::{Action, ActionKind, Chips, Seat, SeatNumber, Street};

/// An action that passed validation.
///
/// `amount` is the chips the seat commits now, on top of whatever it
/// already has in for the street. `kind` may differ from the submitted
/// action: a call that the stack can't fully cover comes back as
/// [`ActionKind::AllIn`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Validated {
    pub kind: ActionKind,
    pub amount: Chips,
}

/// Betting state for a single street.
///
/// A street starts open, absorbs one action at a time, and is complete
/// once every seat that can still act has matched the high bet and has
/// acted at least once. Blind posts seed contributions without counting
/// as actions, which is what gives the big blind its option pre-flop.
#[derive(Clone, Debug)]
pub struct BettingRound {
    street: Street,
    contributions: HashMap<SeatNumber, Chips>,
    acted: HashSet<SeatNumber>,
    high_bet: Chips,
}

impl BettingRound {
    #[must_use]
    pub fn new(street: Street) -> Self {
        Self {
            street,
            contributions: HashMap::new(),
            acted: HashSet::new(),
            high_bet: 0,
        }
    }

    #[must_use]
    pub fn street(&self) -> Street {
        self.street
    }

    /// The amount every active seat must match this street.
    #[must_use]
    pub fn high_bet(&self) -> Chips {
        self.high_bet
    }

    /// What `seat` has put in this street.
    #[must_use]
    pub fn contribution(&self, seat: SeatNumber) -> Chips {
        self.contributions.get(&seat).copied().unwrap_or(0)
    }

    /// Seed a forced blind. Raises the high bet but does not mark the
    /// seat as having acted.
    pub fn post_blind(&mut self, seat: SeatNumber, amount: Chips) {
        let contribution = self.contributions.entry(seat).or_default();
        *contribution += amount;
        self.high_bet = self.high_bet.max(*contribution);
    }

    /// Check an action against the current round state without applying
    /// it.
    pub fn validate(&self, seat: &Seat, action: Action) -> Result<Validated, EngineError> {
        if !seat.is_active() {
            return Err(EngineError::IllegalAction);
        }
        let contribution = self.contribution(seat.seat_number);
        match action {
            Action::Fold => Ok(Validated { kind: ActionKind::Fold, amount: 0 }),
            Action::Check => {
                if contribution == self.high_bet {
                    Ok(Validated { kind: ActionKind::Check, amount: 0 })
                } else {
                    Err(EngineError::IllegalAction)
                }
            }
            Action::Call => {
                if self.high_bet <= contribution {
                    return Err(EngineError::IllegalAction);
                }
                let owed = self.high_bet - contribution;
                if owed > seat.stack {
                    // Forced call capped at the stack: the seat is
                    // putting in everything it has.
                    Ok(Validated { kind: ActionKind::AllIn, amount: seat.stack })
                } else {
                    Ok(Validated { kind: ActionKind::Call, amount: owed })
                }
            }
            Action::Bet(amount) | Action::Raise(amount) => {
                if amount.saturating_add(contribution) <= self.high_bet {
                    return Err(EngineError::IllegalAction);
                }
                if amount > seat.stack {
                    return Err(EngineError::InsufficientStack {
                        seat: seat.seat_number,
                        amount,
                    });
                }
                let kind = match action {
                    Action::Bet(_) => ActionKind::Bet,
                    _ => ActionKind::Raise,
                };
                Ok(Validated { kind, amount })
            }
            Action::AllIn => {
                if seat.stack == 0 {
                    return Err(EngineError::IllegalAction);
                }
                Ok(Validated { kind: ActionKind::AllIn, amount: seat.stack })
            }
        }
    }

    /// Record a validated action. The caller moves the chips; the round
    /// only tracks street totals and who has acted.
    pub fn apply(&mut self, seat: SeatNumber, validated: Validated) {
        let contribution = self.contributions.entry(seat).or_default();
        *contribution += validated.amount;
        self.high_bet = self.high_bet.max(*contribution);
        self.acted.insert(seat);
    }

    /// Whether the street is closed: every seat that can still act has
    /// matched the high bet and acted at least once.
    #[must_use]
    pub fn is_complete(&self, seats: &[Seat]) -> bool {
        seats.iter().filter(|s| s.is_active()).all(|s| {
            self.contribution(s.seat_number) == self.high_bet
                && self.acted.contains(&s.seat_number)
        })
    }
}
