//! The auction clock: pure wall-clock arithmetic over bidding windows.
//!
//! Everything here is a pure function of `(window, now)` so any number of
//! threads can evaluate it without coordination, and tests can pin `now`
//! to exact boundary instants. All instants are UTC; callers supply `now`,
//! the clock never reads the system time itself.
//!
//! Boundary semantics: the window start is **inclusive**, the end is
//! **exclusive**. A bid arriving exactly at `opens_at` is in-window; a bid
//! arriving exactly at `closes_at` is not.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{BidError, Result};

/// Where an instant falls relative to a bidding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowState {
    /// Before `opens_at`: bidding has not started.
    NotYetOpen,
    /// Within `[opens_at, closes_at)`: bids may be accepted.
    Open,
    /// At or after `closes_at`: bidding has ended.
    Closed,
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotYetOpen => write!(f, "NOT_YET_OPEN"),
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// The bidding window of an auction: `[opens_at, closes_at)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionWindow {
    /// First instant at which bids are accepted (inclusive).
    pub opens_at: DateTime<Utc>,
    /// First instant at which bids are no longer accepted (exclusive).
    pub closes_at: DateTime<Utc>,
}

impl AuctionWindow {
    #[must_use]
    pub fn new(opens_at: DateTime<Utc>, closes_at: DateTime<Utc>) -> Self {
        Self { opens_at, closes_at }
    }

    /// Check that the window is well-formed (`closes_at` strictly after
    /// `opens_at`). Enforced once, at auction creation.
    pub fn validate(&self) -> Result<()> {
        if self.closes_at <= self.opens_at {
            return Err(BidError::InvalidAuction {
                reason: format!(
                    "closes_at ({}) must be after opens_at ({})",
                    self.closes_at, self.opens_at
                ),
            });
        }
        Ok(())
    }

    /// Classify `now` against this window.
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> WindowState {
        if now < self.opens_at {
            WindowState::NotYetOpen
        } else if now < self.closes_at {
            WindowState::Open
        } else {
            WindowState::Closed
        }
    }

    /// `true` iff `now` is inside `[opens_at, closes_at)`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == WindowState::Open
    }

    /// Total length of the window.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.closes_at - self.opens_at
    }
}

impl fmt::Display for AuctionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.opens_at, self.closes_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> AuctionWindow {
        let t0 = Utc::now();
        AuctionWindow::new(t0, t0 + Duration::seconds(3600))
    }

    #[test]
    fn start_boundary_is_inclusive() {
        let w = window();
        assert_eq!(w.state(w.opens_at), WindowState::Open);
        assert!(w.is_open(w.opens_at));
    }

    #[test]
    fn end_boundary_is_exclusive() {
        let w = window();
        assert_eq!(w.state(w.closes_at), WindowState::Closed);
        assert!(!w.is_open(w.closes_at));
    }

    #[test]
    fn before_open_is_not_yet_open() {
        let w = window();
        let before = w.opens_at - Duration::milliseconds(1);
        assert_eq!(w.state(before), WindowState::NotYetOpen);
        assert!(!w.is_open(before));
    }

    #[test]
    fn last_instant_inside_window_is_open() {
        let w = window();
        let last = w.closes_at - Duration::milliseconds(1);
        assert_eq!(w.state(last), WindowState::Open);
    }

    #[test]
    fn after_close_is_closed() {
        let w = window();
        assert_eq!(w.state(w.closes_at + Duration::seconds(1)), WindowState::Closed);
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let t0 = Utc::now();
        let w = AuctionWindow::new(t0, t0 - Duration::seconds(1));
        assert!(matches!(
            w.validate(),
            Err(BidError::InvalidAuction { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_window() {
        let t0 = Utc::now();
        let w = AuctionWindow::new(t0, t0);
        assert!(w.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_window() {
        assert!(window().validate().is_ok());
    }

    #[test]
    fn duration_spans_the_window() {
        let w = window();
        assert_eq!(w.duration(), Duration::seconds(3600));
    }

    #[test]
    fn window_state_display() {
        assert_eq!(format!("{}", WindowState::NotYetOpen), "NOT_YET_OPEN");
        assert_eq!(format!("{}", WindowState::Open), "OPEN");
        assert_eq!(format!("{}", WindowState::Closed), "CLOSED");
    }

    #[test]
    fn window_serde_roundtrip() {
        let w = window();
        let json = serde_json::to_string(&w).unwrap();
        let back: AuctionWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}
