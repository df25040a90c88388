//! # openbid-types
//!
//! Shared types, errors, and configuration for the **OpenBid** bidding engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AuctionId`], [`ListingId`], [`BidderId`], [`BidId`]
//! - **Auction model**: [`Auction`], [`AuctionParams`], [`AuctionStatus`]
//! - **Bid model**: [`Bid`]
//! - **Clock model**: [`AuctionWindow`], [`WindowState`]
//! - **Retry model**: [`RetryPolicy`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`BidError`] with `OB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod auction;
pub mod bid;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod retry;

// Re-export all primary types at crate root for ergonomic imports:
//   use openbid_types::{Auction, Bid, BidError, ...};

pub use auction::*;
pub use bid::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use retry::*;

// Constants are accessed via `openbid_types::constants::FOO`
// (not re-exported to avoid name collisions).
