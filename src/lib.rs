//! # Hold'em Engine
//!
//! An embeddable Texas Hold'em game round engine: seating, dealing,
//! betting-round progression, per-seat timeouts with automatic fallback
//! actions, and showdown payout, including the all-in "multiple
//! run-out" vote.
//!
//! The engine is a library, not a service. It knows nothing about
//! accounts, authentication, storage schemas, or wire formats; the
//! surrounding system supplies those through three small ports and
//! calls the engine's command API from its transport layer.
//!
//! ## Architecture
//!
//! - [`game`]: the synchronous core. [`game::engine::GameEngine`]
//!   advances one hand at a time through its streets, validating
//!   actions, tracking the pot, and settling the showdown. Fully
//!   deterministic under a seeded random source.
//! - [`room`]: the async shell. One tokio actor task per room
//!   serializes player commands against the turn countdown, so a manual
//!   action and a timeout can never race.
//! - [`ports`]: the seams to the outside world. Seating comes in
//!   through [`SeatingProvider`]; events and records go out through
//!   [`NotificationSink`] and [`PersistenceSink`], best-effort.
//!
//! ## Example
//!
//! ```
//! use holdem_engine::{GameEngine, game::entities::{Blinds, SeatAssignment, Seating}};
//!
//! let seating = Seating {
//!     seats: vec![
//!         SeatAssignment { seat_number: 1, player_id: 101, stack: 1_000 },
//!         SeatAssignment { seat_number: 2, player_id: 102, stack: 1_000 },
//!     ],
//!     blinds: Blinds { small: 10, big: 20 },
//!     min_players: 2,
//! };
//!
//! let mut engine = GameEngine::with_seed(1, 7);
//! let view = engine.start_hand(&seating).unwrap();
//! assert_eq!(view.pot, 30);
//! ```

/// Core game logic: entities, betting, pot, turn order, and the engine.
pub mod game;
pub use game::{
    EngineError,
    engine::{GameEngine, GameEvent},
    entities::{self, Action, ActionKind, ActionRecord, Chips, HandView, Seating},
    vote::RunOuts,
};

/// Collaborator ports for seating, notifications, and persistence.
pub mod ports;
pub use ports::{NotificationSink, PersistenceSink, PortError, SeatingProvider};

/// Per-room async actor shell.
pub mod room;
pub use room::{RoomActor, RoomConfig, RoomHandle, RoomMessage};
