//! System-wide constants for the OpenBid bidding engine.

/// Bid sequences start at 1; sequence 0 never exists in a ledger.
pub const FIRST_SEQUENCE: u64 = 1;

/// Upper bound for any bid amount, starting price, or bid increment, in
/// currency units. Keeps minimum-bid arithmetic inside `Decimal`'s range.
pub const MAX_BID_AMOUNT: i64 = 1_000_000_000_000;

/// Default maximum wait for an auction's exclusive section, in
/// milliseconds. The section performs no external I/O beyond the bounded
/// store commit, so waits past this point indicate something is wedged.
pub const DEFAULT_LEASE_TIMEOUT_MS: u64 = 250;

/// Default total attempts for a store commit (first try included).
pub const DEFAULT_COMMIT_ATTEMPTS: u32 = 3;

/// Default backoff before the second commit attempt, in milliseconds.
pub const DEFAULT_RETRY_BASE_MS: u64 = 5;

/// Default ceiling for a single commit backoff, in milliseconds.
pub const DEFAULT_RETRY_MAX_MS: u64 = 100;

/// Default idle period after which a terminal auction's gate may be
/// evicted from the registry, in seconds.
pub const DEFAULT_IDLE_EVICTION_SECS: u64 = 300;

/// Maximum outbid notices the outbox buffers before dropping the oldest.
pub const MAX_PENDING_NOTICES: usize = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenBid";
