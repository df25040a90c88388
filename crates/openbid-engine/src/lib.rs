//! # OpenBid Engine
//!
//! The write path of the bidding system: per-auction serialization, the
//! bid validation pipeline, atomic commits, and post-commit outbid
//! notices.
//!
//! The pieces:
//!
//! - [`AuctionRegistry`] hands out per-auction exclusive sections with
//!   lease-bounded acquisition and idle eviction.
//! - [`BidProcessor`] runs every bid and settle call through that
//!   section: validate in order, persist the commit as one unit, then
//!   apply it in memory.
//! - [`Outbox`] queues an [`OutbidNotice`] per accepted bid and fans the
//!   batch out to [`NotificationHook`]s when drained.
//! - [`PlaceBidResponse`] flattens pipeline outcomes for the wire.
//!
//! The engine owns no storage of its own. It drives the in-memory
//! `AuctionBook` and `BidLedger` plus a durable `BidStore`, and commits
//! to the store before anything becomes visible, so no reader ever sees
//! a half-applied bid.

pub mod api;
pub mod outbox;
pub mod processor;
pub mod registry;

pub use api::PlaceBidResponse;
pub use outbox::{NotificationHook, Outbox, OutbidNotice};
pub use processor::{BidAccepted, BidProcessor, BidSubmission};
pub use registry::AuctionRegistry;
