//! Pot ledger: who has put how much into the hand, and how it pays out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::EngineError;
use super::entities::{Chips, SeatNumber};

/// Cumulative per-seat contributions for one hand.
///
/// Contributions only ever grow, and the pot total is always exactly the
/// sum of them. Settlement happens once per hand; a second call reports
/// [`EngineError::AlreadySettled`] instead of paying out twice.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PotLedger {
    // BTreeMap keeps payout iteration in seat order.
    contributions: BTreeMap<SeatNumber, Chips>,
    settled: bool,
}

impl PotLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add chips from a seat. `remaining_stack` is the seat's stack
    /// before the contribution; anything larger than that is rejected.
    /// Negative amounts are unrepresentable by the chip type.
    pub fn contribute(
        &mut self,
        seat: SeatNumber,
        amount: Chips,
        remaining_stack: Chips,
    ) -> Result<(), EngineError> {
        if amount > remaining_stack {
            return Err(EngineError::InsufficientStack { seat, amount });
        }
        *self.contributions.entry(seat).or_default() += amount;
        Ok(())
    }

    /// Everything in the pot.
    #[must_use]
    pub fn total(&self) -> Chips {
        self.contributions.values().sum()
    }

    /// The largest single-seat contribution this hand.
    #[must_use]
    pub fn highest_contribution(&self) -> Chips {
        self.contributions.values().max().copied().unwrap_or(0)
    }

    /// What `seat` has put in so far this hand.
    #[must_use]
    pub fn contribution(&self, seat: SeatNumber) -> Chips {
        self.contributions.get(&seat).copied().unwrap_or(0)
    }

    /// Split the pot evenly across `winners`.
    ///
    /// When the total doesn't divide evenly, the remainder goes to the
    /// first winner in seat order, so every chip in the pot is paid out
    /// and the assignment is deterministic. Callers pass at least one
    /// winner; the engine guarantees a non-folded seat always exists.
    pub fn settle(
        &mut self,
        winners: &[SeatNumber],
    ) -> Result<BTreeMap<SeatNumber, Chips>, EngineError> {
        if self.settled {
            return Err(EngineError::AlreadySettled);
        }
        self.settled = true;

        let mut ordered: Vec<SeatNumber> = winners.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut payouts = BTreeMap::new();
        if ordered.is_empty() {
            return Ok(payouts);
        }

        let total = self.total();
        let share = total / ordered.len() as Chips;
        let remainder = total % ordered.len() as Chips;
        for (i, seat) in ordered.iter().enumerate() {
            let prize = if i == 0 { share + remainder } else { share };
            payouts.insert(*seat, prize);
        }
        Ok(payouts)
    }
}
