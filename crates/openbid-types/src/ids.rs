//! Globally unique identifiers used throughout OpenBid.
//!
//! All entity IDs use UUIDv7 for time-ordered lexicographic sorting.
//! `BidId` can additionally be derived deterministically from the bid's
//! ledger position, so a committed bid's identity never depends on the
//! node that accepted it.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AuctionId
// ---------------------------------------------------------------------------

/// Globally unique auction identifier. One auction augments exactly one
/// listing; the listing itself is owned by the external Listing Service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AuctionId(pub Uuid);

impl AuctionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Extract the embedded timestamp (milliseconds since UNIX epoch) from UUIDv7.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        let bytes = self.0.as_bytes();
        u64::from_be_bytes([
            0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
        ])
    }
}

impl Default for AuctionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ListingId
// ---------------------------------------------------------------------------

/// Identifier of the listing an auction augments. Owned by the external
/// Listing Service; opaque to the bidding core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ListingId(pub Uuid);

impl ListingId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BidderId
// ---------------------------------------------------------------------------

/// Unique identifier for a bidder. Identity itself (accounts, sessions,
/// verification) is owned by the external Identity Service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BidderId(pub Uuid);

impl BidderId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for BidderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BidderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BidId
// ---------------------------------------------------------------------------

/// Globally unique bid identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BidId(pub Uuid);

impl BidId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic `BidId` from the auction and the bid's ledger sequence.
    ///
    /// A committed bid occupies exactly one `(auction_id, sequence)` slot,
    /// so its identity is a pure function of that slot. Replaying the same
    /// ledger always reproduces the same ids.
    #[must_use]
    pub fn deterministic(auction_id: AuctionId, sequence: u64) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"openbid:bid_id:v1:");
        hasher.update(auction_id.0.as_bytes());
        hasher.update(sequence.to_le_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash[..16].try_into().expect("SHA-256 produces 32 bytes");
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for BidId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auction_id_uniqueness() {
        let a = AuctionId::new();
        let b = AuctionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn auction_id_ordering() {
        let a = AuctionId::new();
        let b = AuctionId::new();
        assert!(a < b);
    }

    #[test]
    #[allow(clippy::cast_possible_truncation)]
    fn auction_id_timestamp_extraction() {
        let before = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let id = AuctionId::new();
        let after = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let ts = id.timestamp_ms();
        assert!(
            ts >= before && ts <= after,
            "ts={ts}, before={before}, after={after}"
        );
    }

    #[test]
    fn bidder_id_uniqueness() {
        let a = BidderId::new();
        let b = BidderId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn bid_id_deterministic() {
        let auction = AuctionId::from_bytes([7; 16]);
        let a = BidId::deterministic(auction, 1);
        let b = BidId::deterministic(auction, 1);
        assert_eq!(a, b);
        let c = BidId::deterministic(auction, 2);
        assert_ne!(a, c);
    }

    #[test]
    fn bid_id_deterministic_differs_by_auction() {
        let a = BidId::deterministic(AuctionId::from_bytes([1; 16]), 1);
        let b = BidId::deterministic(AuctionId::from_bytes([2; 16]), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn serde_roundtrips() {
        let aid = AuctionId::new();
        let json = serde_json::to_string(&aid).unwrap();
        let back: AuctionId = serde_json::from_str(&json).unwrap();
        assert_eq!(aid, back);

        let bid = BidId::new();
        let json = serde_json::to_string(&bid).unwrap();
        let back: BidId = serde_json::from_str(&json).unwrap();
        assert_eq!(bid, back);
    }
}
