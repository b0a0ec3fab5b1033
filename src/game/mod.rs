//! Hold'em round engine core.
//!
//! Everything in this module is synchronous and deterministic: given a
//! seeded random source, a hand plays out identically every time. The
//! async room shell in [`crate::room`] owns an instance of
//! [`engine::GameEngine`] and serializes access to it.
//!
//! Submodules:
//! - [`entities`]: cards, chips, seats, actions, and public views
//! - [`pot`]: per-seat contribution ledger and payout settlement
//! - [`turn_order`]: dealer rotation, blind assignment, next-actor lookup
//! - [`betting`]: single-street betting round state machine
//! - [`vote`]: run-out count poll for all-in hands
//! - [`engine`]: hand lifecycle and the command API

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod betting;
pub mod constants;
pub mod engine;
pub mod entities;
pub mod pot;
pub mod turn_order;
pub mod vote;

use entities::SeatNumber;

/// Errors returned by engine commands.
///
/// None of these are fatal: the transport layer decides how to surface
/// them, and the room that produced one keeps running.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum EngineError {
    #[error("pot was already settled")]
    AlreadySettled,
    #[error("not enough cards left in the deck")]
    DeckExhausted,
    #[error("hand is already over")]
    HandComplete,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("action not allowed right now")]
    IllegalAction,
    #[error("seat {seat} can't cover {amount} chips")]
    InsufficientStack { seat: SeatNumber, amount: u32 },
    #[error("need 2+ players")]
    NotEnoughPlayers,
    #[error("too many seats for one deck")]
    TooManyPlayers,
    #[error("seat {0} is not in this hand")]
    UnknownSeat(SeatNumber),
}
