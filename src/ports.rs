//! Collaborator ports.
//!
//! The engine is embedded in a larger system that owns accounts, room
//! CRUD, storage, and the client transport. Those collaborators plug in
//! here: seating is read through [`SeatingProvider`] when a hand
//! starts, and state changes flow out through [`NotificationSink`] and
//! [`PersistenceSink`]. Sink calls are best-effort; the room shell
//! logs failures and keeps playing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::game::engine::GameEvent;
use crate::game::entities::{
    ActionRecord, Blinds, Chips, HandId, RoomId, SeatAssignment, SeatNumber,
};

/// Failure reported by a collaborator port.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{0}")]
pub struct PortError(pub String);

/// Read access to a room's seating, blind sizes, and player minimum.
#[async_trait]
pub trait SeatingProvider: Send + Sync {
    /// Occupied seats with their current stacks, in any order.
    async fn seated_players(&self, room_id: RoomId) -> Result<Vec<SeatAssignment>, PortError>;

    /// Players required before a hand may start.
    async fn min_players(&self, room_id: RoomId) -> Result<usize, PortError>;

    /// The room's blind sizes.
    async fn blinds(&self, room_id: RoomId) -> Result<Blinds, PortError>;
}

/// Outbound state-change events, consumed by whatever pub/sub transport
/// the surrounding system uses.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, room_id: RoomId, event: GameEvent) -> Result<(), PortError>;
}

/// Durable records of what happened in a hand.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn record_action(
        &self,
        room_id: RoomId,
        hand_id: HandId,
        record: ActionRecord,
    ) -> Result<(), PortError>;

    async fn record_hand_result(
        &self,
        room_id: RoomId,
        hand_id: HandId,
        payouts: BTreeMap<SeatNumber, Chips>,
    ) -> Result<(), PortError>;
}
