//! Run-out vote for all-in hands.
//!
//! Once betting can't continue because somebody is all-in, the seats
//! still in the hand vote on how many times the remaining community
//! cards get run out (one, two, or three boards).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::EngineError;
use super::entities::SeatNumber;

/// How many boards to deal out.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum RunOuts {
    One,
    Two,
    Three,
}

impl RunOuts {
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl TryFrom<u8> for RunOuts {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(EngineError::IllegalAction),
        }
    }
}

impl fmt::Display for RunOuts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Collects one run-out vote per seat.
///
/// Voting again overwrites the seat's earlier choice. Resolution is by
/// majority; a tie goes to the lowest count, so the outcome never
/// depends on vote arrival order.
#[derive(Clone, Debug, Default)]
pub struct AllinVotePoll {
    votes: BTreeMap<SeatNumber, RunOuts>,
}

impl AllinVotePoll {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cast(&mut self, seat: SeatNumber, option: RunOuts) {
        self.votes.insert(seat, option);
    }

    /// True once every eligible seat has voted.
    #[must_use]
    pub fn is_resolved(&self, eligible: &[SeatNumber]) -> bool {
        eligible.iter().all(|seat| self.votes.contains_key(seat))
    }

    /// Pick the winning run-out count from the votes cast so far.
    /// Nobody voting at all means a single run-out.
    #[must_use]
    pub fn resolve(&self) -> RunOuts {
        let mut tally: BTreeMap<RunOuts, usize> = BTreeMap::new();
        for option in self.votes.values() {
            *tally.entry(*option).or_default() += 1;
        }
        tally
            .into_iter()
            .min_by_key(|&(option, count)| (std::cmp::Reverse(count), option))
            .map(|(option, _)| option)
            .unwrap_or(RunOuts::One)
    }
}
