//! Engine-wide constants.

/// Hard cap on seats dealt into a hand. A 52-card deck covers 9 players
/// (18 hole cards) plus up to three full run-out boards (15 community
/// cards) with room to spare; a tenth seat would not.
pub const MAX_SEATS: usize = 9;

/// Hole cards dealt to each seat.
pub const HOLE_CARDS_PER_SEAT: usize = 2;

/// Community cards on a complete board.
pub const BOARD_SIZE: usize = 5;

/// Seconds a seat has to act before the fallback action fires.
pub const DEFAULT_TIME_PER_ROUND_SECS: u16 = 30;
