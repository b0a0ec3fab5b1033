//! Seat rotation: dealer button movement, blind assignment, and the
//! next-actor lookup used between actions.
//!
//! "Clockwise" everywhere below means ascending seat number, wrapping
//! at the highest occupied seat.

use rand::Rng;

use super::EngineError;
use super::entities::{Seat, SeatNumber};

/// Outcome of a next-actor lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NextActor {
    Seat(SeatNumber),
    /// One or zero seats can still act, so the hand can't continue
    /// rotating.
    HandComplete,
}

/// Move the dealer button.
///
/// With a previous dealer, the button goes to the next occupied seat
/// clockwise, so over consecutive hands it visits every occupied seat
/// exactly once before repeating. With no previous dealer (the room's
/// first hand), an occupied seat is picked at random.
///
/// `seated` must be the occupied seat numbers in ascending order.
pub fn rotate_dealer<R: Rng + ?Sized>(
    previous: Option<SeatNumber>,
    seated: &[SeatNumber],
    rng: &mut R,
) -> Result<SeatNumber, EngineError> {
    if seated.is_empty() {
        return Err(EngineError::NotEnoughPlayers);
    }
    match previous {
        None => Ok(seated[rng.random_range(0..seated.len())]),
        Some(prev) => Ok(*seated.iter().find(|&&s| s > prev).unwrap_or(&seated[0])),
    }
}

/// Assign the small and big blinds: the next two occupied seats
/// clockwise after the dealer. Heads-up this wraps the big blind back
/// onto the dealer.
pub fn assign_blinds(
    dealer: SeatNumber,
    seated: &[SeatNumber],
) -> Result<(SeatNumber, SeatNumber), EngineError> {
    if seated.len() < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }
    let dealer_idx = seated
        .iter()
        .position(|&s| s == dealer)
        .ok_or(EngineError::UnknownSeat(dealer))?;
    let small = seated[(dealer_idx + 1) % seated.len()];
    let big = seated[(dealer_idx + 2) % seated.len()];
    Ok((small, big))
}

/// Find the next seat to act after `current`: the next occupied seat
/// clockwise that has neither folded nor gone all-in.
///
/// Returns [`NextActor::HandComplete`] when at most one such seat
/// remains, in which case rotation is over and the betting round logic
/// decides what happens next.
///
/// `seats` must be ordered by ascending seat number. `current` doesn't
/// have to be active itself (it usually just folded or went all-in).
pub fn next_actor(current: SeatNumber, seats: &[Seat]) -> NextActor {
    let active = seats.iter().filter(|s| s.is_active()).count();
    if active <= 1 {
        return NextActor::HandComplete;
    }

    // Start just past `current`, or at its insertion point if the seat
    // vanished from the hand.
    let start = seats
        .iter()
        .position(|s| s.seat_number == current)
        .map(|i| i + 1)
        .unwrap_or_else(|| {
            seats
                .iter()
                .position(|s| s.seat_number > current)
                .unwrap_or(0)
        });

    for offset in 0..seats.len() {
        let seat = &seats[(start + offset) % seats.len()];
        if seat.is_active() {
            return NextActor::Seat(seat.seat_number);
        }
    }
    NextActor::HandComplete
}
