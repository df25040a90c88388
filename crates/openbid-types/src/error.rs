//! Error types for the OpenBid bidding engine.
//!
//! All errors use the `OB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Auction lifecycle errors
//! - 2xx: Bid validation errors
//! - 3xx: Ledger errors
//! - 4xx: Registry / exclusive-section errors
//! - 9xx: General / internal errors
//!
//! Validation failures (1xx/2xx) are expected outcomes of concurrent
//! bidding and are returned synchronously to the caller as data. Only
//! `Storage` is retryable; everything else is terminal for the request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AuctionId, AuctionStatus};

/// Central error enum for all OpenBid operations.
#[derive(Debug, Error)]
pub enum BidError {
    // =================================================================
    // Auction Lifecycle Errors (1xx)
    // =================================================================
    /// No auction exists under this id.
    #[error("OB_ERR_100: Auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// The auction creation inputs failed validation.
    #[error("OB_ERR_101: Invalid auction: {reason}")]
    InvalidAuction { reason: String },

    /// An auction with this id already exists.
    #[error("OB_ERR_102: Auction already exists: {0}")]
    DuplicateAuction(AuctionId),

    /// The bidding window has not opened yet.
    #[error("OB_ERR_103: Auction not open yet: bidding opens at {opens_at}")]
    AuctionNotYetOpen { opens_at: DateTime<Utc> },

    /// The bidding window has ended (or the auction is settled).
    #[error("OB_ERR_104: Auction closed: bidding ended at {closed_at}")]
    AuctionClosed { closed_at: DateTime<Utc> },

    /// The requested status change is not a legal forward transition.
    #[error("OB_ERR_105: Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AuctionStatus,
        to: AuctionStatus,
    },

    // =================================================================
    // Bid Validation Errors (2xx)
    // =================================================================
    /// The offered amount is not a positive value.
    #[error("OB_ERR_200: Invalid bid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The offered amount does not reach the current minimum. Carries the
    /// minimum so the caller can render "minimum required is {minimum}".
    #[error("OB_ERR_201: Bid below minimum: offered {offered}, minimum required {minimum}")]
    BelowMinimum { offered: Decimal, minimum: Decimal },

    // =================================================================
    // Ledger Errors (3xx)
    // =================================================================
    /// An append targeted a sequence slot that is already occupied.
    #[error("OB_ERR_300: Sequence conflict on auction {auction_id}: slot {sequence} occupied")]
    SequenceConflict { auction_id: AuctionId, sequence: u64 },

    /// An offline audit of the ledger found a broken invariant.
    #[error("OB_ERR_301: Ledger invariant violation: {reason}")]
    LedgerInvariantViolation { reason: String },

    // =================================================================
    // Registry / Exclusive-Section Errors (4xx)
    // =================================================================
    /// The auction's exclusive section could not be acquired within the
    /// lease window. The caller produced no side effects and may retry.
    #[error("OB_ERR_400: Lease timeout: auction {auction_id} still held after {waited_ms}ms")]
    LeaseTimeout { auction_id: AuctionId, waited_ms: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// A fault in the backing store. Transient; the commit path retries
    /// these a bounded number of times before giving up.
    #[error("OB_ERR_901: Storage error: {0}")]
    Storage(String),
}

impl BidError {
    /// The stable `OB_ERR_` code for this error, for log grepping and
    /// API-layer mapping.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuctionNotFound(_) => "OB_ERR_100",
            Self::InvalidAuction { .. } => "OB_ERR_101",
            Self::DuplicateAuction(_) => "OB_ERR_102",
            Self::AuctionNotYetOpen { .. } => "OB_ERR_103",
            Self::AuctionClosed { .. } => "OB_ERR_104",
            Self::InvalidTransition { .. } => "OB_ERR_105",
            Self::InvalidAmount { .. } => "OB_ERR_200",
            Self::BelowMinimum { .. } => "OB_ERR_201",
            Self::SequenceConflict { .. } => "OB_ERR_300",
            Self::LedgerInvariantViolation { .. } => "OB_ERR_301",
            Self::LeaseTimeout { .. } => "OB_ERR_400",
            Self::Internal(_) => "OB_ERR_900",
            Self::Storage(_) => "OB_ERR_901",
        }
    }

    /// `true` for transient faults worth retrying inside the commit path.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BidError>;

// Conversion from std::io::Error, for BidStore implementations backed by
// real storage.
impl From<std::io::Error> for BidError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
