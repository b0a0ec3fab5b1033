//! Room actor message types.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::game::EngineError;
use crate::game::entities::{Action, Card, HandView, SeatNumber};
use crate::game::vote::RunOuts;
use crate::ports::PortError;

/// Why a room command failed.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("seating lookup failed: {0}")]
    Seating(#[from] PortError),
}

/// The room actor is gone and its inbox with it.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("room is closed")]
pub struct RoomClosed;

/// What a state-changing command hands back: the updated public view.
pub type CommandResult = Result<HandView, RoomError>;

/// Messages that can be sent to a [`crate::room::RoomActor`].
#[derive(Debug)]
pub enum RoomMessage {
    /// Start a hand from the room's current seating.
    StartHand {
        response: oneshot::Sender<CommandResult>,
    },

    /// Player action (fold, check, call, bet, raise, all-in).
    TakeAction {
        seat: SeatNumber,
        action: Action,
        response: oneshot::Sender<CommandResult>,
    },

    /// Vote on the number of run-outs in an all-in hand.
    CastRunOutVote {
        seat: SeatNumber,
        option: RunOuts,
        response: oneshot::Sender<CommandResult>,
    },

    /// A player left the room mid-hand; fold them out.
    LeaveSeat {
        seat: SeatNumber,
        response: oneshot::Sender<CommandResult>,
    },

    /// Change the per-turn countdown for this room.
    SetTimePerRound {
        secs: u16,
        response: oneshot::Sender<()>,
    },

    /// Current public hand view, if a hand is live.
    GetView {
        response: oneshot::Sender<Option<HandView>>,
    },

    /// A seat's private hole cards.
    GetHoleCards {
        seat: SeatNumber,
        response: oneshot::Sender<Result<Vec<Card>, RoomError>>,
    },

    /// Shut the room down, cancelling any pending countdown.
    Close {
        response: oneshot::Sender<()>,
    },
}
