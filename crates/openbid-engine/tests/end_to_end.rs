//! Integration test: the full auction lifecycle
//!
//! CREATE → OPEN → BID → CLOSE → SETTLE
//!
//! Drives the engine through its public API only: auction creation, the
//! documented pricing walk-through, window boundary semantics, outbid
//! notices, and the final audit of the settled history.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use openbid_engine::{
    BidProcessor, BidSubmission, NotificationHook, Outbox, OutbidNotice, PlaceBidResponse,
};
use openbid_ledger::{AuctionBook, BidLedger, BidStore, MemoryStore, audit};
use openbid_types::*;
use parking_lot::Mutex;
use rust_decimal::Decimal;

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

struct Pipeline {
    book: Arc<AuctionBook>,
    ledger: Arc<BidLedger>,
    store: Arc<MemoryStore>,
    outbox: Arc<Outbox>,
    processor: BidProcessor,
}

fn pipeline() -> Pipeline {
    let book = Arc::new(AuctionBook::new());
    let ledger = Arc::new(BidLedger::new());
    let store = Arc::new(MemoryStore::new());
    let outbox = Arc::new(Outbox::new());
    let processor = BidProcessor::new(
        Arc::clone(&book),
        Arc::clone(&ledger),
        Arc::clone(&store) as Arc<dyn BidStore>,
        Arc::clone(&outbox),
        &EngineConfig::default(),
    );
    Pipeline {
        book,
        ledger,
        store,
        outbox,
        processor,
    }
}

/// The auction used throughout: starting price 1000, increment 50, open
/// for exactly one hour from `opens_at`.
fn hour_auction(p: &Pipeline, opens_at: DateTime<Utc>) -> Auction {
    let params = AuctionParams::dummy(opens_at, opens_at + Duration::hours(1));
    p.processor
        .create_auction_at(params, opens_at - Duration::hours(1))
        .unwrap()
}

#[test]
fn full_auction_lifecycle() {
    // =====================================================================
    // CREATE: the listing goes under auction, window opens at T0
    // =====================================================================
    let p = pipeline();
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let auction = hour_auction(&p, t0);
    assert_eq!(auction.status, AuctionStatus::Pending);

    // =====================================================================
    // BID: the pricing walk-through (1000 accepted, 1049 short, 1050 in)
    // =====================================================================
    let in_window = t0 + Duration::minutes(10);
    let alice = BidderId::new();
    let bob = BidderId::new();

    let first = p
        .processor
        .place_bid_at(
            &BidSubmission::new(auction.auction_id, alice, dec(1000)),
            in_window,
        )
        .unwrap();
    assert_eq!(first.bid.sequence, 1);
    assert_eq!(first.next_minimum, dec(1050));

    // 1049 beats the leader by 49 but falls short of the increment step.
    let short = p
        .processor
        .place_bid_at(
            &BidSubmission::new(auction.auction_id, bob, dec(1049)),
            in_window + Duration::seconds(1),
        )
        .unwrap_err();
    assert!(matches!(short, BidError::BelowMinimum { minimum, .. } if minimum == dec(1050)));

    let second = p
        .processor
        .place_bid_at(
            &BidSubmission::new(auction.auction_id, bob, dec(1050)),
            in_window + Duration::seconds(2),
        )
        .unwrap();
    assert_eq!(second.bid.sequence, 2);
    assert_eq!(second.next_minimum, dec(1100));

    // =====================================================================
    // CLOSE: the window ends; late bids bounce
    // =====================================================================
    let after_close = t0 + Duration::hours(1);
    let late = p
        .processor
        .place_bid_at(
            &BidSubmission::new(auction.auction_id, alice, dec(2000)),
            after_close,
        )
        .unwrap_err();
    assert!(matches!(late, BidError::AuctionClosed { .. }));

    // =====================================================================
    // SETTLE: explicit and irreversible
    // =====================================================================
    let settled = p
        .processor
        .settle_at(auction.auction_id, after_close + Duration::minutes(1))
        .unwrap();
    assert_eq!(settled.status, AuctionStatus::Settled);
    assert_eq!(settled.current_highest, Some(second.bid.id));
    assert_eq!(
        p.book.get(auction.auction_id).unwrap().status,
        AuctionStatus::Settled
    );

    // The ledger kept everything in order and the history audits clean.
    let history = p.ledger.history(auction.auction_id);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, dec(1000));
    assert_eq!(history[1].amount, dec(1050));
    audit::verify_history(&settled, &history).unwrap();

    // Store and book agree on the final row.
    let store_row = p.store.auction_row(auction.auction_id).unwrap();
    assert_eq!(store_row.status, AuctionStatus::Settled);
    assert_eq!(store_row.version, settled.version);
}

#[test]
fn window_boundaries_start_inclusive_end_exclusive() {
    let p = pipeline();
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let auction = hour_auction(&p, t0);
    let bidder = BidderId::new();

    // One second before T0: not open yet, and the rejection says when.
    let early = p
        .processor
        .place_bid_at(
            &BidSubmission::new(auction.auction_id, bidder, dec(1000)),
            t0 - Duration::seconds(1),
        )
        .unwrap_err();
    assert!(matches!(early, BidError::AuctionNotYetOpen { opens_at } if opens_at == t0));

    // Exactly T0: open.
    p.processor
        .place_bid_at(&BidSubmission::new(auction.auction_id, bidder, dec(1000)), t0)
        .unwrap();

    // Exactly T0 + 3600s: closed.
    let at_close = t0 + Duration::seconds(3600);
    let late = p
        .processor
        .place_bid_at(
            &BidSubmission::new(auction.auction_id, bidder, dec(1100)),
            at_close,
        )
        .unwrap_err();
    assert!(matches!(late, BidError::AuctionClosed { closed_at } if closed_at == at_close));
}

/// Records delivered notices; clones share the log.
#[derive(Clone, Default)]
struct PushGateway {
    delivered: Arc<Mutex<Vec<OutbidNotice>>>,
}

impl NotificationHook for PushGateway {
    fn outbid(&self, notice: &OutbidNotice) -> Result<()> {
        self.delivered.lock().push(notice.clone());
        Ok(())
    }
}

#[test]
fn outbid_notices_reach_the_hook_in_bid_order() {
    let p = pipeline();
    let gateway = PushGateway::default();
    p.outbox.register_hook(Box::new(gateway.clone()));

    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let auction = hour_auction(&p, t0);
    let in_window = t0 + Duration::minutes(1);

    let alice = BidderId::new();
    let bob = BidderId::new();
    for (bidder, amount) in [(alice, 1000), (bob, 1050), (alice, 1100)] {
        p.processor
            .place_bid_at(
                &BidSubmission::new(auction.auction_id, bidder, dec(amount)),
                in_window,
            )
            .unwrap();
    }

    // Nothing is delivered until the delivery loop drains.
    assert!(gateway.delivered.lock().is_empty());
    assert_eq!(p.outbox.pending_count(), 3);

    let drained = p.outbox.drain_pending();
    assert_eq!(drained.len(), 3);
    assert_eq!(p.outbox.pending_count(), 0);

    let delivered = gateway.delivered.lock();
    assert_eq!(delivered.len(), 3);
    // The first bid had nobody to outbid; later notices name the loser.
    assert_eq!(delivered[0].previous_highest_bidder, None);
    assert_eq!(delivered[1].previous_highest_bidder, Some(alice));
    assert_eq!(delivered[2].previous_highest_bidder, Some(bob));
    assert_eq!(delivered[2].new_highest_bid.amount, dec(1100));
}

#[test]
fn bid_history_queries_by_auction_and_bidder() {
    let p = pipeline();
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let first = hour_auction(&p, t0);
    let second = hour_auction(&p, t0);
    let in_window = t0 + Duration::minutes(1);

    let collector = BidderId::new();
    let rival = BidderId::new();
    p.processor
        .place_bid_at(
            &BidSubmission::new(first.auction_id, collector, dec(1000)),
            in_window,
        )
        .unwrap();
    p.processor
        .place_bid_at(
            &BidSubmission::new(second.auction_id, rival, dec(1000)),
            in_window + Duration::seconds(1),
        )
        .unwrap();
    p.processor
        .place_bid_at(
            &BidSubmission::new(second.auction_id, collector, dec(1050)),
            in_window + Duration::seconds(2),
        )
        .unwrap();

    // Per-auction history is ordered and isolated.
    assert_eq!(p.ledger.history(first.auction_id).len(), 1);
    assert_eq!(p.ledger.history(second.auction_id).len(), 2);

    // The cross-auction view finds everything one bidder did.
    let mine = p.ledger.bids_by_bidder(collector);
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|bid| bid.bidder_id == collector));
    let auctions: Vec<AuctionId> = mine.iter().map(|bid| bid.auction_id).collect();
    assert!(auctions.contains(&first.auction_id));
    assert!(auctions.contains(&second.auction_id));
}

#[test]
fn settling_an_auction_nobody_bid_on() {
    let p = pipeline();
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let auction = hour_auction(&p, t0);

    let settled = p
        .processor
        .settle_at(auction.auction_id, t0 + Duration::hours(2))
        .unwrap();
    assert_eq!(settled.status, AuctionStatus::Settled);
    assert!(settled.current_highest.is_none());
    assert_eq!(settled.version, 2);
    audit::verify_history(&settled, &p.ledger.history(auction.auction_id)).unwrap();
}

#[test]
fn wire_envelope_reflects_the_pipeline_outcome() {
    let p = pipeline();
    let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let auction = hour_auction(&p, t0);
    let in_window = t0 + Duration::minutes(1);
    let bidder = BidderId::new();

    let outcome = p.processor.place_bid_at(
        &BidSubmission::new(auction.auction_id, bidder, dec(1000)),
        in_window,
    );
    let ok = PlaceBidResponse::from_outcome(&outcome);
    assert!(ok.accepted);
    assert_eq!(ok.minimum_required, Some(dec(1050)));
    assert!(ok.reason.is_none());

    let outcome = p.processor.place_bid_at(
        &BidSubmission::new(auction.auction_id, bidder, dec(1010)),
        in_window,
    );
    let rejected = PlaceBidResponse::from_outcome(&outcome);
    assert!(!rejected.accepted);
    assert_eq!(rejected.minimum_required, Some(dec(1050)));
    assert!(rejected.reason.unwrap().contains("OB_ERR_201"));
}
