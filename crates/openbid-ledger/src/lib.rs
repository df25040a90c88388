//! # openbid-ledger
//!
//! **Data plane** of the OpenBid engine: the append-only bid ledger, the
//! auction book, and the persistence seam behind them.
//!
//! ## Architecture
//!
//! - [`BidLedger`] — one totally ordered, append-only log of accepted
//!   bids per auction; sequences contiguous from 1, assigned at commit
//! - [`AuctionBook`] — every auction record, with lazily evaluated
//!   lifecycle status on the read path and exclusive-section mutation on
//!   the write path
//! - [`BidStore`] — write-through trait to the document store;
//!   `persist_commit` is the atomicity unit of bid acceptance
//! - [`MemoryStore`] — in-memory reference store mirroring the persisted
//!   layout
//! - [`audit`] — history root hashing and offline invariant verification
//!
//! Nothing in this crate takes an auction's exclusive section itself;
//! callers (the decision plane) hold it across validate and commit.

pub mod audit;
pub mod book;
pub mod ledger;
pub mod store;

pub use book::AuctionBook;
pub use ledger::BidLedger;
pub use store::{BidStore, MemoryStore};
