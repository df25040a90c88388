//! The bid acceptance pipeline.
//!
//! [`BidProcessor`] is the serialization point every bid goes through.
//! Inside the auction's exclusive section the pipeline runs:
//!
//! ```text
//!   exists? ──▶ window open? ──▶ amount in range? ──▶ reaches minimum? ──▶ commit
//!   (ERR_100)   (ERR_103/104)    (ERR_200)            (ERR_201)
//! ```
//!
//! in exactly that order, so a bid on a closed auction always reports the
//! closure, never a minimum. The commit builds the bid row and the
//! auction row that follows it, persists both as one unit (retrying
//! transient store faults in place), and only then makes them visible in
//! memory. A commit that fails leaves no partial state anywhere.
//!
//! Outbid notices are handed to the outbox only after the exclusive
//! section is released, so notification work never stretches the
//! serialized window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use openbid_ledger::{AuctionBook, BidLedger, BidStore, audit};
use openbid_types::{
    Auction, AuctionId, AuctionParams, AuctionStatus, Bid, BidError, BidderId, EngineConfig,
    Result, RetryPolicy, constants,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::outbox::{OutbidNotice, Outbox};
use crate::registry::AuctionRegistry;

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// A bid as it arrives from a bidder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidSubmission {
    pub auction_id: AuctionId,
    pub bidder_id: BidderId,
    /// Offered amount. Must be strictly positive and no larger than
    /// [`constants::MAX_BID_AMOUNT`].
    pub amount: Decimal,
    /// When the bidder submitted, by the submitter's clock. Kept for
    /// queue-delay observability; acceptance is judged and stamped with
    /// the engine clock.
    pub submitted_at: DateTime<Utc>,
}

impl BidSubmission {
    #[must_use]
    pub fn new(auction_id: AuctionId, bidder_id: BidderId, amount: Decimal) -> Self {
        Self {
            auction_id,
            bidder_id,
            amount,
            submitted_at: Utc::now(),
        }
    }
}

/// The outcome of an accepted bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidAccepted {
    /// The committed bid, with its assigned sequence and engine timestamp.
    pub bid: Bid,
    /// What the next bid on this auction must reach.
    pub next_minimum: Decimal,
    /// Auction record version after this commit.
    pub auction_version: u64,
}

// ---------------------------------------------------------------------------
// BidProcessor
// ---------------------------------------------------------------------------

/// The serialization point for all auction mutations.
pub struct BidProcessor {
    book: Arc<AuctionBook>,
    ledger: Arc<BidLedger>,
    store: Arc<dyn BidStore>,
    outbox: Arc<Outbox>,
    registry: AuctionRegistry,
    commit_retry: RetryPolicy,
    idle_eviction: Duration,
}

impl BidProcessor {
    #[must_use]
    pub fn new(
        book: Arc<AuctionBook>,
        ledger: Arc<BidLedger>,
        store: Arc<dyn BidStore>,
        outbox: Arc<Outbox>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            book,
            ledger,
            store,
            outbox,
            registry: AuctionRegistry::new(config.lease_timeout),
            commit_retry: config.commit_retry,
            idle_eviction: config.idle_eviction,
        }
    }

    // ===== Auction creation =====

    /// Register a new auction from the Listing Service's inputs.
    ///
    /// The record is persisted before it becomes visible in the book, so
    /// a bid can only ever race a creation that is already durable.
    ///
    /// # Errors
    /// [`BidError::InvalidAuction`] for bad params,
    /// [`BidError::DuplicateAuction`] for an id that already exists,
    /// [`BidError::LeaseTimeout`] if the id's section stayed contended,
    /// [`BidError::Storage`] once persistence retries are exhausted.
    pub fn create_auction(&self, params: AuctionParams) -> Result<Auction> {
        self.create_auction_at(params, Utc::now())
    }

    /// [`BidProcessor::create_auction`] with an explicit clock, for tests
    /// and replay.
    pub fn create_auction_at(&self, params: AuctionParams, now: DateTime<Utc>) -> Result<Auction> {
        let auction = Auction::new(params, now)?;
        // Creation runs inside the auction's exclusive section like every
        // other mutation: racing creations for one id must agree on which
        // row the store and the book both keep.
        self.registry.with_auction(auction.auction_id, || {
            if self.book.contains(auction.auction_id) {
                return Err(BidError::DuplicateAuction(auction.auction_id));
            }
            self.commit_retry.run(|| self.store.persist_auction(&auction))?;
            self.book.insert(auction.clone())
        })??;
        tracing::info!(
            auction = %auction.auction_id,
            listing = %auction.listing_id,
            starting_price = %auction.starting_price,
            increment = %auction.bid_increment,
            window = %auction.window,
            "Auction created"
        );
        Ok(auction)
    }

    // ===== Bidding =====

    /// Place a bid. Everything from the status check to the commit runs
    /// inside the auction's exclusive section, one bid at a time per
    /// auction; bids on different auctions proceed in parallel.
    ///
    /// # Errors
    /// The full rejection taxonomy: not found, not yet open, closed,
    /// invalid amount, below minimum, lease timeout, storage exhaustion.
    /// Every rejection leaves the auction and its ledger untouched.
    pub fn place_bid(&self, submission: &BidSubmission) -> Result<BidAccepted> {
        self.place_bid_at(submission, Utc::now())
    }

    /// [`BidProcessor::place_bid`] with an explicit clock.
    pub fn place_bid_at(
        &self,
        submission: &BidSubmission,
        now: DateTime<Utc>,
    ) -> Result<BidAccepted> {
        match self.run_bid_pipeline(submission, now) {
            Ok((accepted, previous_leader)) => {
                // The notice leaves the pipeline only after the section
                // released.
                self.outbox.publish(OutbidNotice {
                    auction_id: accepted.bid.auction_id,
                    new_highest_bid: accepted.bid.clone(),
                    previous_highest_bidder: previous_leader,
                });
                Ok(accepted)
            }
            Err(err) => {
                tracing::debug!(
                    auction = %submission.auction_id,
                    bidder = %submission.bidder_id,
                    amount = %submission.amount,
                    code = err.code(),
                    "Bid rejected"
                );
                Err(err)
            }
        }
    }

    /// Existence check plus the exclusive-section pipeline.
    fn run_bid_pipeline(
        &self,
        submission: &BidSubmission,
        now: DateTime<Utc>,
    ) -> Result<(BidAccepted, Option<BidderId>)> {
        // Checked before touching the registry: a bid for an id nobody
        // created must not leave a gate behind.
        if !self.book.contains(submission.auction_id) {
            return Err(BidError::AuctionNotFound(submission.auction_id));
        }
        self.registry.with_auction(submission.auction_id, || {
            self.decide_and_commit(submission, now)
        })?
    }

    /// The validation-and-commit pipeline. Runs with the auction's
    /// exclusive section held.
    fn decide_and_commit(
        &self,
        submission: &BidSubmission,
        now: DateTime<Utc>,
    ) -> Result<(BidAccepted, Option<BidderId>)> {
        let auction = self
            .book
            .get(submission.auction_id)
            .ok_or(BidError::AuctionNotFound(submission.auction_id))?;

        match auction.effective_status(now) {
            AuctionStatus::Open => {}
            AuctionStatus::Pending => {
                return Err(BidError::AuctionNotYetOpen {
                    opens_at: auction.window.opens_at,
                });
            }
            AuctionStatus::Closed | AuctionStatus::Settled => {
                return Err(BidError::AuctionClosed {
                    closed_at: auction.window.closes_at,
                });
            }
        }

        if submission.amount <= Decimal::ZERO {
            return Err(BidError::InvalidAmount {
                reason: format!("amount must be positive, got {}", submission.amount),
            });
        }
        let max_amount = Decimal::from(constants::MAX_BID_AMOUNT);
        if submission.amount > max_amount {
            return Err(BidError::InvalidAmount {
                reason: format!("amount {} exceeds maximum {max_amount}", submission.amount),
            });
        }

        let highest = self.ledger.current_highest(submission.auction_id);
        let minimum = auction.minimum_bid(highest.as_ref().map(|bid| bid.amount));
        if submission.amount < minimum {
            return Err(BidError::BelowMinimum {
                offered: submission.amount,
                minimum,
            });
        }

        // Build both rows of the commit: the bid in its sequence slot and
        // the auction as it will read afterwards.
        let sequence = self.ledger.next_sequence(submission.auction_id);
        let bid = Bid::new(
            submission.auction_id,
            submission.bidder_id,
            submission.amount,
            sequence,
            now,
        );

        let mut after = auction;
        if after.status == AuctionStatus::Pending {
            after.advance(AuctionStatus::Open)?;
        }
        after.current_highest = Some(bid.id);
        after.version += 1;
        after.updated_at = now;

        // Persist first. The in-memory apply below cannot fail, so either
        // the whole commit happened or none of it did.
        let mut attempt = 0u32;
        self.commit_retry.run(|| {
            attempt += 1;
            if attempt > 1 {
                tracing::warn!(
                    auction = %after.auction_id,
                    attempt,
                    "Retrying bid commit after storage fault"
                );
            }
            self.store.persist_commit(&after, &bid)
        })?;
        self.ledger.append(bid.clone())?;
        self.book.apply(after.clone());

        tracing::info!(
            auction = %bid.auction_id,
            bid = %bid.id,
            bidder = %bid.bidder_id,
            amount = %bid.amount,
            sequence = bid.sequence,
            version = after.version,
            queue_ms = (now - submission.submitted_at).num_milliseconds(),
            "Bid accepted"
        );

        let next_minimum = after.minimum_bid(Some(bid.amount));
        Ok((
            BidAccepted {
                bid,
                next_minimum,
                auction_version: after.version,
            },
            highest.map(|previous| previous.bidder_id),
        ))
    }

    // ===== Settlement =====

    /// Settle a closed auction: the explicit, irreversible final step.
    ///
    /// Settlement takes the same exclusive section as bidding, so it can
    /// never interleave with a late bid's commit.
    ///
    /// # Errors
    /// [`BidError::InvalidTransition`] unless the auction is `CLOSED` at
    /// `now`, plus the not-found, lease, and storage cases.
    pub fn settle(&self, auction_id: AuctionId) -> Result<Auction> {
        self.settle_at(auction_id, Utc::now())
    }

    /// [`BidProcessor::settle`] with an explicit clock.
    pub fn settle_at(&self, auction_id: AuctionId, now: DateTime<Utc>) -> Result<Auction> {
        if !self.book.contains(auction_id) {
            return Err(BidError::AuctionNotFound(auction_id));
        }

        let settled = self
            .registry
            .with_auction(auction_id, || -> Result<Auction> {
                let auction = self
                    .book
                    .get(auction_id)
                    .ok_or(BidError::AuctionNotFound(auction_id))?;

                let effective = auction.effective_status(now);
                if !effective.can_transition_to(AuctionStatus::Settled) {
                    return Err(BidError::InvalidTransition {
                        from: effective,
                        to: AuctionStatus::Settled,
                    });
                }

                // Catch the stored status up to the window before the
                // final move; one version bump covers the whole mutation.
                let mut settled = auction;
                if settled.status != effective {
                    settled.advance(effective)?;
                }
                settled.advance(AuctionStatus::Settled)?;
                settled.version += 1;
                settled.updated_at = now;

                self.commit_retry
                    .run(|| self.store.persist_auction(&settled))?;
                self.book.apply(settled.clone());
                Ok(settled)
            })??;

        let history = self.ledger.history(auction_id);
        tracing::info!(
            auction = %auction_id,
            winning_bid = %settled
                .current_highest
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
            bids = history.len(),
            history_root = %audit::history_root_hex(&settled, &history),
            version = settled.version,
            "Auction settled"
        );
        Ok(settled)
    }

    // ===== Maintenance =====

    /// Evict registry gates of auctions that are terminal and idle.
    /// Intended to run from a periodic operational sweep.
    pub fn compact(&self) -> usize {
        self.compact_at(Utc::now())
    }

    /// [`BidProcessor::compact`] with an explicit clock.
    pub fn compact_at(&self, now: DateTime<Utc>) -> usize {
        let evicted = self.registry.evict_idle(self.idle_eviction, |auction_id| {
            self.book
                .snapshot(auction_id, now)
                .is_none_or(|auction| auction.status.is_terminal())
        });
        if evicted > 0 {
            tracing::debug!(
                evicted,
                gates = self.registry.gate_count(),
                "Evicted idle auction gates"
            );
        }
        evicted
    }

    /// Number of live gates in the registry.
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.registry.gate_count()
    }
}
