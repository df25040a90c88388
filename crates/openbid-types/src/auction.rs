//! # Auction — the per-listing bidding state
//!
//! An `Auction` augments exactly one listing with a starting price, a
//! minimum increment, and a bidding window. Its lifecycle is a strictly
//! forward state machine driven by the wall clock:
//!
//! ```text
//!   ┌─────────┐ opens_at ┌──────┐ closes_at ┌────────┐ settle() ┌─────────┐
//!   │ PENDING ├─────────▶│ OPEN ├──────────▶│ CLOSED ├─────────▶│ SETTLED │
//!   └────┬────┘          └──────┘           └────────┘          └─────────┘
//!        │                     window already elapsed ▲
//!        └────────────────────────────────────────────┘
//! ```
//!
//! Time-driven transitions are evaluated **lazily** on access via
//! [`Auction::effective_status`]: readers derive the current status from
//! the window without writing anything, and the stored field catches up
//! the next time a commit path holds the auction's exclusive section.
//! `SETTLED` is the one transition that never happens implicitly; it
//! requires an explicit settle call after the auction is `CLOSED`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionId, AuctionWindow, BidError, BidId, ListingId, Result, WindowState, constants};

/// The lifecycle state of an auction.
///
/// Transitions are **monotonic** (never go backwards). Declaration order
/// is the lifecycle order and `Ord` follows it, so
/// `stored.max(derived)` always picks the status further along.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AuctionStatus {
    /// Created, bidding window not yet open.
    Pending,
    /// Inside the bidding window. Bids may be accepted.
    Open,
    /// Bidding window has ended (with or without bids). No further bids.
    Closed,
    /// Settlement workflow has claimed the outcome. **Irreversible.**
    Settled,
}

impl AuctionStatus {
    /// Can this status transition to the given target?
    ///
    /// `Pending -> Closed` is legal: a window can elapse without any
    /// access while it was open. `Settled` is reachable only from
    /// `Closed`, and only via the explicit settle call.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Open | Self::Closed)
                | (Self::Open, Self::Closed)
                | (Self::Closed, Self::Settled)
        )
    }

    /// `true` once no further bids can ever be accepted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Settled)
    }
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuctionParams — creation inputs from the Listing Service
// ---------------------------------------------------------------------------

/// Everything the external Listing Service supplies when it puts a listing
/// under auction. Validated once, before the auction record exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionParams {
    /// Identity of the new auction (1:1 with the listing).
    pub auction_id: AuctionId,
    /// The listing this auction augments.
    pub listing_id: ListingId,
    /// Price the first bid must reach. May be zero.
    pub starting_price: Decimal,
    /// Minimum step over the current highest bid. Strictly positive.
    pub bid_increment: Decimal,
    /// The bidding window, `[opens_at, closes_at)` UTC.
    pub window: AuctionWindow,
}

impl AuctionParams {
    /// Validate the creation inputs.
    ///
    /// # Errors
    /// Returns [`BidError::InvalidAuction`] naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.starting_price < Decimal::ZERO {
            return Err(BidError::InvalidAuction {
                reason: format!("starting_price must be >= 0, got {}", self.starting_price),
            });
        }
        if self.bid_increment <= Decimal::ZERO {
            return Err(BidError::InvalidAuction {
                reason: format!("bid_increment must be > 0, got {}", self.bid_increment),
            });
        }
        let max_amount = Decimal::from(constants::MAX_BID_AMOUNT);
        if self.starting_price > max_amount {
            return Err(BidError::InvalidAuction {
                reason: format!(
                    "starting_price {} exceeds maximum {max_amount}",
                    self.starting_price
                ),
            });
        }
        if self.bid_increment > max_amount {
            return Err(BidError::InvalidAuction {
                reason: format!(
                    "bid_increment {} exceeds maximum {max_amount}",
                    self.bid_increment
                ),
            });
        }
        self.window.validate()
    }
}

// ---------------------------------------------------------------------------
// Auction
// ---------------------------------------------------------------------------

/// The auction record: pricing rules, window, lifecycle status, and a
/// reference to the current highest bid.
///
/// `current_highest`, `status`, and `version` are mutated only inside the
/// auction's exclusive section (or the explicit settle call, which takes
/// the same section). Everything else is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    /// Globally unique auction identifier.
    pub auction_id: AuctionId,
    /// The listing this auction augments.
    pub listing_id: ListingId,
    /// Price the first bid must reach.
    pub starting_price: Decimal,
    /// Minimum step over the current highest bid.
    pub bid_increment: Decimal,
    /// The bidding window.
    pub window: AuctionWindow,
    /// Stored lifecycle status. May lag the wall clock; see
    /// [`Auction::effective_status`].
    pub status: AuctionStatus,
    /// The current highest accepted bid, if any bid has been accepted.
    pub current_highest: Option<BidId>,
    /// Monotonic counter, incremented once per accepted mutation
    /// (creation = 1). Lets callers detect stale reads cheaply.
    pub version: u64,
    /// When the auction record was created.
    pub created_at: DateTime<Utc>,
    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}

impl Auction {
    /// Build a fresh `Pending` auction from validated params.
    ///
    /// # Errors
    /// Returns [`BidError::InvalidAuction`] if the params fail validation.
    pub fn new(params: AuctionParams, now: DateTime<Utc>) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            auction_id: params.auction_id,
            listing_id: params.listing_id,
            starting_price: params.starting_price,
            bid_increment: params.bid_increment,
            window: params.window,
            status: AuctionStatus::Pending,
            current_highest: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// The lazily evaluated status: the stored status or the one the
    /// window implies at `now`, whichever is further along. Pure, so any
    /// number of readers can call it without coordination.
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> AuctionStatus {
        let derived = match self.window.state(now) {
            WindowState::NotYetOpen => AuctionStatus::Pending,
            WindowState::Open => AuctionStatus::Open,
            WindowState::Closed => AuctionStatus::Closed,
        };
        self.status.max(derived)
    }

    /// `true` iff a bid arriving at `now` could be accepted.
    #[must_use]
    pub fn is_biddable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == AuctionStatus::Open
    }

    /// The minimum acceptable amount given the current highest bid amount.
    ///
    /// The first bid only has to reach the starting price; every later bid
    /// must clear the current highest by at least the increment.
    #[must_use]
    pub fn minimum_bid(&self, current_highest_amount: Option<Decimal>) -> Decimal {
        match current_highest_amount {
            Some(highest) => highest + self.bid_increment,
            None => self.starting_price,
        }
    }

    /// Advance the stored status.
    ///
    /// # Errors
    /// Returns [`BidError::InvalidTransition`] if the move is not a legal
    /// forward transition.
    pub fn advance(&mut self, target: AuctionStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(BidError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}

/// Dummy auctions for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AuctionParams {
    /// Params with the conventional unit-test pricing: starting price
    /// 1000, increment 50.
    pub fn dummy(opens_at: DateTime<Utc>, closes_at: DateTime<Utc>) -> Self {
        Self {
            auction_id: AuctionId::new(),
            listing_id: ListingId::new(),
            starting_price: Decimal::new(1000, 0),
            bid_increment: Decimal::new(50, 0),
            window: AuctionWindow::new(opens_at, closes_at),
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Auction {
    /// A dummy auction whose window is currently open around `now`.
    pub fn dummy_open(now: DateTime<Utc>) -> Self {
        let params = AuctionParams::dummy(
            now - chrono::Duration::minutes(5),
            now + chrono::Duration::hours(1),
        );
        Self {
            auction_id: params.auction_id,
            listing_id: params.listing_id,
            starting_price: params.starting_price,
            bid_increment: params.bid_increment,
            window: params.window,
            status: AuctionStatus::Pending,
            current_highest: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}
