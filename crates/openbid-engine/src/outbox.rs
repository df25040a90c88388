//! Post-commit outbid notices.
//!
//! Accepting a bid and telling the previous leader about it are
//! deliberately decoupled. The pipeline queues an [`OutbidNotice`] only
//! after the auction's exclusive section has been released; a delivery
//! loop (or a test) drains the queue with [`Outbox::drain_pending`],
//! which fans each notice out to every registered [`NotificationHook`].
//! Delivery is fire-and-forget: a hook error is logged and swallowed,
//! and the committed bid stands regardless.
//!
//! The queue is bounded. On overflow the oldest notice is dropped,
//! keeping recent outbid information over complete history.

use std::collections::VecDeque;

use openbid_types::{AuctionId, Bid, BidderId, Result, constants};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// One "you have been outbid" event, produced for every accepted bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutbidNotice {
    pub auction_id: AuctionId,
    /// The bid that took the lead.
    pub new_highest_bid: Bid,
    /// Who led before this bid. `None` on an auction's first bid.
    pub previous_highest_bidder: Option<BidderId>,
}

/// A downstream consumer of outbid notices: a push service, an email
/// fan-out, a test recorder.
pub trait NotificationHook: Send + Sync {
    /// Deliver one notice. Errors are logged by the outbox and swallowed;
    /// delivery never affects the committed bid.
    fn outbid(&self, notice: &OutbidNotice) -> Result<()>;
}

/// Bounded queue of pending notices plus the hooks that consume them.
pub struct Outbox {
    pending: Mutex<VecDeque<OutbidNotice>>,
    hooks: RwLock<Vec<Box<dyn NotificationHook>>>,
    max_pending: usize,
}

impl Outbox {
    /// An outbox with the default queue bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(constants::MAX_PENDING_NOTICES)
    }

    /// An outbox holding at most `max_pending` undelivered notices.
    #[must_use]
    pub fn with_capacity(max_pending: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            hooks: RwLock::new(Vec::new()),
            max_pending,
        }
    }

    pub fn register_hook(&self, hook: Box<dyn NotificationHook>) {
        self.hooks.write().push(hook);
    }

    /// Queue a notice for later delivery. Never blocks on delivery work.
    pub fn publish(&self, notice: OutbidNotice) {
        let mut pending = self.pending.lock();
        if pending.len() >= self.max_pending {
            if let Some(dropped) = pending.pop_front() {
                tracing::warn!(
                    auction = %dropped.auction_id,
                    bid = %dropped.new_highest_bid.id,
                    "Outbox full, dropping oldest notice"
                );
            }
        }
        pending.push_back(notice);
    }

    /// Take every queued notice, fan each out to all hooks, and return
    /// the batch. Hook failures are logged and do not stop the drain.
    pub fn drain_pending(&self) -> Vec<OutbidNotice> {
        let drained: Vec<OutbidNotice> = {
            let mut pending = self.pending.lock();
            pending.drain(..).collect()
        };
        if drained.is_empty() {
            return drained;
        }
        let hooks = self.hooks.read();
        for notice in &drained {
            for hook in hooks.iter() {
                if let Err(err) = hook.outbid(notice) {
                    tracing::warn!(
                        auction = %notice.auction_id,
                        error = %err,
                        "Notification hook failed"
                    );
                }
            }
        }
        drained
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}
