//! # Bid — one committed entry in an auction's ledger
//!
//! A `Bid` exists only after the BidProcessor accepted it inside the
//! auction's exclusive section. It is immutable from that point on:
//! never mutated, never deleted, never reordered. Its `sequence` is the
//! position in the auction's append-only ledger and its `placed_at` is
//! the commit instant (the same instant the clock check used), not the
//! instant the bidder hit submit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionId, BidId, BidderId};

/// A committed bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Globally unique bid identifier, derived from `(auction_id, sequence)`.
    pub id: BidId,
    /// The auction this bid belongs to.
    pub auction_id: AuctionId,
    /// Who placed the bid.
    pub bidder_id: BidderId,
    /// The offered amount. Strictly positive, validated before commit.
    pub amount: Decimal,
    /// Position in the auction's ledger. Contiguous from 1, assigned at
    /// commit, never reused.
    pub sequence: u64,
    /// UTC instant of commit.
    pub placed_at: DateTime<Utc>,
}

impl Bid {
    /// Build a bid for the given ledger slot. The id is derived from the
    /// slot, so re-running the same commit produces the same bid.
    #[must_use]
    pub fn new(
        auction_id: AuctionId,
        bidder_id: BidderId,
        amount: Decimal,
        sequence: u64,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BidId::deterministic(auction_id, sequence),
            auction_id,
            bidder_id,
            amount,
            sequence,
            placed_at,
        }
    }
}

/// Dummy bids for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Bid {
    /// A dummy bid by a fresh bidder, placed now.
    pub fn dummy(auction_id: AuctionId, amount: Decimal, sequence: u64) -> Self {
        Self::new(auction_id, BidderId::new(), amount, sequence, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn id_is_derived_from_the_ledger_slot() {
        let auction_id = AuctionId::from_bytes([9; 16]);
        let a = Bid::new(auction_id, BidderId::new(), dec(1000), 1, Utc::now());
        let b = Bid::new(auction_id, BidderId::new(), dec(2000), 1, Utc::now());
        // Same slot, same id, regardless of bidder or amount.
        assert_eq!(a.id, b.id);
        let c = Bid::new(auction_id, BidderId::new(), dec(1000), 2, Utc::now());
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn dummy_carries_the_given_slot() {
        let auction_id = AuctionId::new();
        let bid = Bid::dummy(auction_id, dec(1050), 2);
        assert_eq!(bid.auction_id, auction_id);
        assert_eq!(bid.amount, dec(1050));
        assert_eq!(bid.sequence, 2);
    }

    #[test]
    fn serde_roundtrip() {
        let bid = Bid::dummy(AuctionId::new(), dec(1000), 1);
        let json = serde_json::to_string(&bid).unwrap();
        let back: Bid = serde_json::from_str(&json).unwrap();
        assert_eq!(bid, back);
    }
}
