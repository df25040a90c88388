//! Per-auction exclusive sections.
//!
//! Correct bid acceptance hangs on one rule: for any single auction,
//! validate-then-commit runs one bid at a time. The registry hands that
//! guarantee out as a closure runner, [`AuctionRegistry::with_auction`]:
//!
//! - One gate per auction id, created lazily on first touch.
//! - Acquisition is lease-bounded. A caller that cannot enter within the
//!   configured window gets [`BidError::LeaseTimeout`] back and has
//!   produced no side effects.
//! - Release is RAII. A closure that panics unwinds through the guard and
//!   the gate opens for the next caller (`parking_lot` mutexes do not
//!   poison).
//! - Gates of finished auctions are evicted once idle, so the map tracks
//!   live auctions rather than history.
//!
//! Different auctions never contend here: the gate map's lock is held
//! only long enough to clone a handle, never while waiting on a gate.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use openbid_types::{AuctionId, BidError, Result};
use parking_lot::{Mutex, RwLock};

/// One auction's gate: the exclusive-section mutex plus the release
/// timestamp the idle sweep reads.
struct AuctionGate {
    section: Mutex<()>,
    /// Unix milliseconds of the most recent release.
    released_at_ms: AtomicI64,
}

impl AuctionGate {
    fn new() -> Self {
        Self {
            section: Mutex::new(()),
            released_at_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    fn touch(&self) {
        self.released_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }
}

/// Hands out per-auction exclusive sections.
pub struct AuctionRegistry {
    gates: RwLock<HashMap<AuctionId, Arc<AuctionGate>>>,
    lease_timeout: Duration,
}

impl AuctionRegistry {
    #[must_use]
    pub fn new(lease_timeout: Duration) -> Self {
        Self {
            gates: RwLock::new(HashMap::new()),
            lease_timeout,
        }
    }

    /// Run `f` inside the auction's exclusive section.
    ///
    /// # Errors
    /// Returns [`BidError::LeaseTimeout`] if the section stayed held past
    /// the lease window. `f` did not run; the caller may safely retry.
    pub fn with_auction<R>(&self, auction_id: AuctionId, f: impl FnOnce() -> R) -> Result<R> {
        let gate = self.gate(auction_id);
        let started = Instant::now();
        let Some(_guard) = gate.section.try_lock_for(self.lease_timeout) else {
            let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(
                auction = %auction_id,
                waited_ms,
                "Exclusive section lease timed out"
            );
            return Err(BidError::LeaseTimeout {
                auction_id,
                waited_ms,
            });
        };
        let out = f();
        gate.touch();
        Ok(out)
    }

    /// Clone the auction's gate handle, creating it on first touch. The
    /// map lock is released before anyone waits on the gate itself.
    fn gate(&self, auction_id: AuctionId) -> Arc<AuctionGate> {
        if let Some(gate) = self.gates.read().get(&auction_id) {
            return Arc::clone(gate);
        }
        let mut gates = self.gates.write();
        Arc::clone(
            gates
                .entry(auction_id)
                .or_insert_with(|| Arc::new(AuctionGate::new())),
        )
    }

    /// Number of live gates.
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.gates.read().len()
    }

    /// Drop one auction's gate if nobody holds or waits on it. Returns
    /// whether an eviction happened.
    pub fn evict(&self, auction_id: AuctionId) -> bool {
        let mut gates = self.gates.write();
        // The map entry is the only handle left iff no caller is inside
        // with_auction for this id: every holder and waiter keeps a clone.
        match gates.get(&auction_id) {
            Some(gate) if Arc::strong_count(gate) == 1 => {
                gates.remove(&auction_id);
                true
            }
            _ => false,
        }
    }

    /// Sweep out gates that are unused, idle past `idle_for`, and whose
    /// auction `is_evictable` (reached a terminal status, or does not
    /// exist at all). Returns the number of gates dropped.
    pub fn evict_idle(
        &self,
        idle_for: Duration,
        is_evictable: impl Fn(AuctionId) -> bool,
    ) -> usize {
        let idle_ms = i64::try_from(idle_for.as_millis()).unwrap_or(i64::MAX);
        let cutoff_ms = Utc::now().timestamp_millis().saturating_sub(idle_ms);
        let mut gates = self.gates.write();
        let before = gates.len();
        gates.retain(|auction_id, gate| {
            Arc::strong_count(gate) > 1
                || gate.released_at_ms.load(Ordering::Relaxed) > cutoff_ms
                || !is_evictable(*auction_id)
        });
        before - gates.len()
    }
}
