//! Room shell: one async actor per room.
//!
//! This module implements:
//! - `RoomActor`: async actor owning a single room's engine and timer
//! - Message-based command API over tokio channels
//! - The per-seat countdown with auto-check/auto-fold fallback
//!
//! ## Architecture
//!
//! Each room runs in its own tokio task with an mpsc inbox. All
//! commands for the room, and its once-a-second timer tick, are
//! processed on that task, which is what serializes user actions
//! against timeouts. Rooms share nothing with each other.
//!
//! ## Example
//!
//! ```ignore
//! use holdem_engine::room::{RoomActor, RoomConfig, RoomMessage};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = RoomActor::new(
//!         1,
//!         RoomConfig::default(),
//!         seating,       // Arc<dyn SeatingProvider>
//!         notifications, // Arc<dyn NotificationSink>
//!         persistence,   // Arc<dyn PersistenceSink>
//!     );
//!     tokio::spawn(actor.run());
//!
//!     // Use the handle to send commands.
//!     // handle.send(RoomMessage::StartHand { .. }).await;
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;
pub mod timer;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use messages::{CommandResult, RoomClosed, RoomError, RoomMessage};
pub use timer::{RoundTimer, TimerBinding};
