//! Wire envelope for the service layer in front of the engine.
//!
//! Inside the engine a rejection is an error variant; on the wire it is
//! data. [`PlaceBidResponse`] flattens the pipeline outcome into the
//! shape bidder-facing services return as JSON, with the `OB_ERR_` code
//! embedded in the reason string for log and client correlation.

use openbid_types::{Bid, BidError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::processor::BidAccepted;

/// The flattened outcome of a place-bid call.
///
/// On acceptance `bid` is the committed record and `minimum_required`
/// the amount the next bid must reach. On rejection `reason` carries the
/// coded message, and `minimum_required` is populated for below-minimum
/// rejections so clients can prompt without a second round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidResponse {
    pub accepted: bool,
    pub bid: Option<Bid>,
    pub minimum_required: Option<Decimal>,
    pub reason: Option<String>,
}

impl PlaceBidResponse {
    #[must_use]
    pub fn from_outcome(outcome: &Result<BidAccepted>) -> Self {
        match outcome {
            Ok(accepted) => Self {
                accepted: true,
                bid: Some(accepted.bid.clone()),
                minimum_required: Some(accepted.next_minimum),
                reason: None,
            },
            Err(err) => Self {
                accepted: false,
                bid: None,
                minimum_required: match err {
                    BidError::BelowMinimum { minimum, .. } => Some(*minimum),
                    _ => None,
                },
                reason: Some(err.to_string()),
            },
        }
    }
}
