//! Offline audit of a ledger history against its auction's rules.
//!
//! The `history_root` is a deterministic hash over an auction's ordered
//! bid history: the same history always produces the same root, so two
//! replicas (or a replica and the backing store) can compare histories
//! without shipping full payloads. `verify_history` re-checks the full
//! invariant set the engine enforced online, for audit jobs and
//! post-incident forensics.

use chrono::{DateTime, Utc};
use openbid_types::{Auction, Bid, BidError, BidId, Result, constants};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Compute the root hash over an auction's ordered bid history.
///
/// The hash covers each bid's identity, bidder, amount, and sequence,
/// in order. Commit timestamps are deliberately excluded: two stores
/// holding the same accepted bids agree on the root even if their clock
/// precision differs.
#[must_use]
pub fn history_root(auction: &Auction, bids: &[Bid]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"openbid:history_root:v1:");
    hasher.update(auction.auction_id.0.as_bytes());
    hasher.update((bids.len() as u64).to_le_bytes());

    for bid in bids {
        hasher.update(bid.id.0.as_bytes());
        hasher.update(bid.bidder_id.0.as_bytes());
        hasher.update(bid.amount.to_string().as_bytes());
        hasher.update(bid.sequence.to_le_bytes());
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Hex rendering of [`history_root`], for logs and operator tooling.
#[must_use]
pub fn history_root_hex(auction: &Auction, bids: &[Bid]) -> String {
    hex::encode(history_root(auction, bids))
}

/// Verify that a history matches an expected root.
#[must_use]
pub fn verify_history_root(auction: &Auction, bids: &[Bid], expected_root: &[u8; 32]) -> bool {
    history_root(auction, bids) == *expected_root
}

/// Re-check every ledger invariant for one auction's history.
///
/// Checks, in order, per entry: auction binding, contiguous sequence,
/// slot-derived bid id, amount inside the engine's positive range, the
/// starting-price/increment chain, and commit time inside the bidding
/// window and never behind its predecessor. Finally the auction's
/// `current_highest` pointer must reference the last entry (or be empty
/// for an empty history).
///
/// # Errors
/// Returns [`BidError::LedgerInvariantViolation`] naming the first
/// violated invariant.
pub fn verify_history(auction: &Auction, bids: &[Bid]) -> Result<()> {
    let mut previous_amount: Option<Decimal> = None;
    let mut previous_placed_at: Option<DateTime<Utc>> = None;

    for (index, bid) in bids.iter().enumerate() {
        let expected_sequence = index as u64 + constants::FIRST_SEQUENCE;

        if bid.auction_id != auction.auction_id {
            return Err(violation(format!(
                "bid {} belongs to auction {}, not {}",
                bid.id, bid.auction_id, auction.auction_id
            )));
        }
        if bid.sequence != expected_sequence {
            return Err(violation(format!(
                "sequence gap: expected {expected_sequence}, found {} at position {index}",
                bid.sequence
            )));
        }
        if bid.id != BidId::deterministic(auction.auction_id, bid.sequence) {
            return Err(violation(format!(
                "bid id {} does not match its slot (sequence {})",
                bid.id, bid.sequence
            )));
        }
        if bid.amount <= Decimal::ZERO {
            return Err(violation(format!(
                "non-positive amount {} at sequence {}",
                bid.amount, bid.sequence
            )));
        }
        // Checked before the minimum computation: an amount past the
        // engine bound would overflow `minimum_bid` for the next entry.
        if bid.amount > Decimal::from(constants::MAX_BID_AMOUNT) {
            return Err(violation(format!(
                "amount {} at sequence {} exceeds maximum {}",
                bid.amount,
                bid.sequence,
                constants::MAX_BID_AMOUNT
            )));
        }
        let minimum = auction.minimum_bid(previous_amount);
        if bid.amount < minimum {
            return Err(violation(format!(
                "amount {} at sequence {} below required minimum {minimum}",
                bid.amount, bid.sequence
            )));
        }
        if !auction.window.is_open(bid.placed_at) {
            return Err(violation(format!(
                "commit time {} at sequence {} outside window {}",
                bid.placed_at, bid.sequence, auction.window
            )));
        }
        if let Some(earlier) = previous_placed_at {
            if bid.placed_at < earlier {
                return Err(violation(format!(
                    "commit time {} at sequence {} regresses behind {earlier}",
                    bid.placed_at, bid.sequence
                )));
            }
        }
        previous_amount = Some(bid.amount);
        previous_placed_at = Some(bid.placed_at);
    }

    let expected_pointer = bids.last().map(|bid| bid.id);
    if auction.current_highest != expected_pointer {
        return Err(violation(format!(
            "current_highest is {:?}, history ends at {:?}",
            auction.current_highest, expected_pointer
        )));
    }
    Ok(())
}

fn violation(reason: String) -> BidError {
    BidError::LedgerInvariantViolation { reason }
}
