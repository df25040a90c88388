//! The auction book: every auction record this engine knows about.
//!
//! The book owns auction rows. Reads go through [`AuctionBook::snapshot`],
//! which patches in the window-derived status without writing anything,
//! so any number of reader threads see a current (possibly momentarily
//! stale, never torn) view with no coordination. The stored row only
//! changes through [`AuctionBook::insert`] and [`AuctionBook::apply`];
//! the decision plane calls those with the auction's exclusive section
//! held and persistence already done, so a row in the book is always a
//! row in the store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use openbid_types::{Auction, AuctionId, BidError, Result};
use parking_lot::RwLock;

/// Owner of all auction records.
pub struct AuctionBook {
    auctions: RwLock<HashMap<AuctionId, Auction>>,
}

impl AuctionBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auctions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new auction record.
    ///
    /// # Errors
    /// Returns [`BidError::DuplicateAuction`] if the id is already registered.
    pub fn insert(&self, auction: Auction) -> Result<()> {
        let mut auctions = self.auctions.write();
        if auctions.contains_key(&auction.auction_id) {
            return Err(BidError::DuplicateAuction(auction.auction_id));
        }
        auctions.insert(auction.auction_id, auction);
        Ok(())
    }

    /// The stored row as-is. The status may lag the wall clock; most
    /// callers want [`AuctionBook::snapshot`].
    #[must_use]
    pub fn get(&self, auction_id: AuctionId) -> Option<Auction> {
        self.auctions.read().get(&auction_id).cloned()
    }

    /// The stored row with its status replaced by the lazily evaluated
    /// one. This is the read path; it never writes.
    #[must_use]
    pub fn snapshot(&self, auction_id: AuctionId, now: DateTime<Utc>) -> Option<Auction> {
        let auctions = self.auctions.read();
        auctions.get(&auction_id).map(|auction| {
            let mut view = auction.clone();
            view.status = auction.effective_status(now);
            view
        })
    }

    #[must_use]
    pub fn contains(&self, auction_id: AuctionId) -> bool {
        self.auctions.read().contains_key(&auction_id)
    }

    #[must_use]
    pub fn auction_count(&self) -> usize {
        self.auctions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auctions.read().is_empty()
    }

    #[must_use]
    pub fn auction_ids(&self) -> Vec<AuctionId> {
        self.auctions.read().keys().copied().collect()
    }

    /// Replace a row wholesale with the outcome of an accepted mutation.
    /// Call only while holding the auction's exclusive section.
    pub fn apply(&self, auction: Auction) {
        self.auctions.write().insert(auction.auction_id, auction);
    }
}

impl Default for AuctionBook {
    fn default() -> Self {
        Self::new()
    }
}
