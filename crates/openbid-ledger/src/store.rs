//! The persistence seam: where accepted mutations become durable.
//!
//! The engine keeps its working state in memory and writes through this
//! trait to the document store behind it. `persist_commit` is the
//! atomicity unit of bid acceptance: the updated auction record and the
//! new bid row land together or not at all. The commit path retries
//! retryable faults a bounded number of times and applies nothing in
//! memory until persistence succeeded, so a failed commit leaves no
//! partial state.
//!
//! Rows are keyed by auction id and `(auction_id, sequence)` and written
//! as upserts. A crash between a successful persist and the in-memory
//! apply can orphan a row at a sequence the ledger never occupied; the
//! next commit at that sequence supersedes it.

use std::collections::{BTreeMap, HashMap};

use openbid_types::{Auction, AuctionId, Bid, Result};
use parking_lot::RwLock;

/// Write-through interface to the document store.
///
/// Implementations must be safe to call from many threads; the engine
/// invokes `persist_commit` inside per-auction exclusive sections, so
/// per-auction calls never overlap.
pub trait BidStore: Send + Sync {
    /// Upsert the auction record alone (creation, settle).
    fn persist_auction(&self, auction: &Auction) -> Result<()>;

    /// Durably record one accepted bid together with the auction row it
    /// produced. Atomic: both rows or neither.
    fn persist_commit(&self, auction: &Auction, bid: &Bid) -> Result<()>;
}

/// In-memory reference store mirroring the persisted layout: one auction
/// record per id, one append-only bid collection keyed
/// `(auction_id, sequence)`.
pub struct MemoryStore {
    auctions: RwLock<HashMap<AuctionId, Auction>>,
    bids: RwLock<BTreeMap<(AuctionId, u64), Bid>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            auctions: RwLock::new(HashMap::new()),
            bids: RwLock::new(BTreeMap::new()),
        }
    }

    /// The stored auction row, if any.
    #[must_use]
    pub fn auction_row(&self, auction_id: AuctionId) -> Option<Auction> {
        self.auctions.read().get(&auction_id).cloned()
    }

    /// The stored bid rows for an auction, ascending by sequence.
    #[must_use]
    pub fn bid_rows(&self, auction_id: AuctionId) -> Vec<Bid> {
        self.bids
            .read()
            .range((auction_id, 0)..=(auction_id, u64::MAX))
            .map(|(_, bid)| bid.clone())
            .collect()
    }

    /// Total bid rows across all auctions.
    #[must_use]
    pub fn bid_row_count(&self) -> usize {
        self.bids.read().len()
    }
}

impl BidStore for MemoryStore {
    fn persist_auction(&self, auction: &Auction) -> Result<()> {
        self.auctions
            .write()
            .insert(auction.auction_id, auction.clone());
        Ok(())
    }

    fn persist_commit(&self, auction: &Auction, bid: &Bid) -> Result<()> {
        // Take both locks before writing either row so the pair lands
        // together even if a reader interleaves.
        let mut auctions = self.auctions.write();
        let mut bids = self.bids.write();
        auctions.insert(auction.auction_id, auction.clone());
        bids.insert((bid.auction_id, bid.sequence), bid.clone());
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
