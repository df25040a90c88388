//! The append-only bid ledger: one totally ordered log per auction.
//!
//! Every accepted bid occupies exactly one `(auction_id, sequence)` slot.
//! Sequences are contiguous from 1, assigned at commit, never reused;
//! entries are never mutated, reordered, or deleted. The BidProcessor is
//! the only writer and appends only while holding the auction's exclusive
//! section, so the ledger itself just has to make appends atomic with
//! sequence occupancy and keep concurrent reads tear-free.
//!
//! Reads are snapshots: `history` hands back a fresh copy that can be
//! re-queried from the start at any time.

use std::collections::HashMap;

use openbid_types::{AuctionId, Bid, BidError, BidderId, Result};
use parking_lot::RwLock;

/// Per-auction append-only logs of accepted bids.
pub struct BidLedger {
    /// Logs in sequence order. Guarded so readers never observe a torn
    /// entry while a commit appends.
    logs: RwLock<HashMap<AuctionId, Vec<Bid>>>,
}

impl BidLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
        }
    }

    /// The sequence the next accepted bid for this auction will receive.
    ///
    /// Only meaningful while holding the auction's exclusive section;
    /// outside it the answer may be stale before it returns.
    #[must_use]
    pub fn next_sequence(&self, auction_id: AuctionId) -> u64 {
        let logs = self.logs.read();
        logs.get(&auction_id).map_or(0, Vec::len) as u64 + 1
    }

    /// Append a committed bid to its auction's log.
    ///
    /// The bid must carry the next contiguous sequence for its auction.
    /// Returns the occupied sequence.
    ///
    /// # Errors
    /// Returns [`BidError::SequenceConflict`] if the slot is already
    /// occupied or would leave a gap.
    pub fn append(&self, bid: Bid) -> Result<u64> {
        let mut logs = self.logs.write();
        let log = logs.entry(bid.auction_id).or_default();
        let next = log.len() as u64 + 1;
        if bid.sequence != next {
            return Err(BidError::SequenceConflict {
                auction_id: bid.auction_id,
                sequence: bid.sequence,
            });
        }
        let auction_id = bid.auction_id;
        let sequence = bid.sequence;
        log.push(bid);
        tracing::debug!(auction = %auction_id, sequence, "Bid appended");
        Ok(sequence)
    }

    /// The current highest accepted bid for an auction.
    ///
    /// Acceptance enforces a strictly increasing amount, so the highest
    /// bid is always the last entry in the log.
    #[must_use]
    pub fn current_highest(&self, auction_id: AuctionId) -> Option<Bid> {
        let logs = self.logs.read();
        logs.get(&auction_id).and_then(|log| log.last().cloned())
    }

    /// Full bid history for an auction, ascending by sequence.
    #[must_use]
    pub fn history(&self, auction_id: AuctionId) -> Vec<Bid> {
        let logs = self.logs.read();
        logs.get(&auction_id).cloned().unwrap_or_default()
    }

    /// All bids placed by one bidder across every auction, ascending by
    /// commit time.
    #[must_use]
    pub fn bids_by_bidder(&self, bidder_id: BidderId) -> Vec<Bid> {
        let logs = self.logs.read();
        let mut bids: Vec<Bid> = logs
            .values()
            .flat_map(|log| log.iter().filter(|bid| bid.bidder_id == bidder_id))
            .cloned()
            .collect();
        bids.sort_by_key(|bid| bid.placed_at);
        bids
    }

    /// Number of accepted bids for an auction.
    #[must_use]
    pub fn bid_count(&self, auction_id: AuctionId) -> usize {
        let logs = self.logs.read();
        logs.get(&auction_id).map_or(0, Vec::len)
    }

    /// Every auction that has at least one accepted bid.
    #[must_use]
    pub fn auction_ids(&self) -> Vec<AuctionId> {
        let logs = self.logs.read();
        logs.keys().copied().collect()
    }

    /// `true` if no auction has any accepted bid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let logs = self.logs.read();
        logs.values().all(Vec::is_empty)
    }
}

impl Default for BidLedger {
    fn default() -> Self {
        Self::new()
    }
}
