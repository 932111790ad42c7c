//! Book-level scenario tests: crossing, cancellation, modification and the
//! boundary conditions of the operation surface.

use crossbook::{
    BookError, Event, EventKind, Order, OrderBook, OrderId, OrderKind, OrderStatus, Side, Ticker,
    MAX_PRICE,
};

fn limit(id: &[u8], side: Side, price: u32, qty: u64) -> Order {
    Order {
        id: OrderId::new(id),
        ticker: Ticker::new(b"TEST"),
        timestamp: 1,
        price,
        qty,
        side,
        kind: OrderKind::Limit,
        status: OrderStatus::New,
    }
}

fn market(id: &[u8], side: Side, qty: u64) -> Order {
    let mut order = limit(id, side, 0, qty);
    order.kind = OrderKind::Market;
    order
}

fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|ev| ev.kind).collect()
}

// ============================================================================
// Crossing scenarios
// ============================================================================

#[test]
fn partial_fill_leaves_buyer_resting() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"B", Side::Buy, 100, 10), &mut events).unwrap();
    book.add(&limit(b"S", Side::Sell, 90, 5), &mut events).unwrap();
    book.execute(&mut events);

    let fills: Vec<&Event> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::TradeReport)
        .collect();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].order_id, OrderId::new(b"B"));
    assert_eq!(fills[0].price, 100);
    assert_eq!(fills[0].secondary.unwrap().order_id, OrderId::new(b"S"));
    assert_eq!(fills[0].secondary.unwrap().price, 90);
    assert_eq!(fills[0].qty, 5);

    assert_eq!(book.depth_at(Side::Buy, 100), (5, 1));
    assert!(!book.contains(&OrderId::new(b"S")));
    assert_eq!(book.best_bid(), Some(100));
    assert_eq!(book.best_ask(), None);
    book.assert_invariants();
}

#[test]
fn cascade_consumes_levels_in_priority_order() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"B1", Side::Buy, 100, 5), &mut events).unwrap();
    book.add(&limit(b"B2", Side::Buy, 95, 10), &mut events).unwrap();
    book.add(&limit(b"S2", Side::Sell, 85, 10), &mut events).unwrap();
    book.add(&limit(b"S1", Side::Sell, 90, 6), &mut events).unwrap();

    events.clear();
    book.execute(&mut events);

    let filled: u64 = events
        .iter()
        .filter(|ev| ev.kind == EventKind::TradeReport)
        .map(|ev| ev.qty)
        .sum();
    assert_eq!(filled, 15);

    for gone in [b"B1" as &[u8], b"B2", b"S2"] {
        assert!(!book.contains(&OrderId::new(gone)), "{:?} should be gone", gone);
    }
    assert!(book.contains(&OrderId::new(b"S1")));
    assert_eq!(book.depth_at(Side::Sell, 90), (1, 1));
    assert_eq!(book.best_ask(), Some(90));
    assert_eq!(book.best_bid(), None);
    book.assert_invariants();
}

#[test]
fn full_cross_then_cancel_empties_book() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"B", Side::Buy, 100, 10), &mut events).unwrap();
    book.add(&limit(b"S", Side::Sell, 95, 20), &mut events).unwrap();
    book.execute(&mut events);
    book.cancel(&OrderId::new(b"S"), &mut events).unwrap();

    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
    assert!(book.is_empty());

    assert_eq!(
        kinds(&events),
        vec![
            EventKind::PriceLevelUpdate,
            EventKind::PriceLevelUpdate,
            EventKind::TradeReport,
            EventKind::Cancel,
        ]
    );
    let fill = &events[2];
    assert_eq!(fill.qty, 10);
    let cancel = &events[3];
    assert_eq!(cancel.order_id, OrderId::new(b"S"));
    assert_eq!(cancel.qty, 10);
    book.assert_invariants();
}

// ============================================================================
// Rejections and boundaries
// ============================================================================

#[test]
fn duplicate_id_leaves_prior_order_untouched() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"X", Side::Buy, 100, 10), &mut events).unwrap();
    assert_eq!(
        book.add(&limit(b"X", Side::Sell, 101, 5), &mut events),
        Err(BookError::DuplicateId)
    );

    assert_eq!(book.order_count(), 1);
    assert_eq!(book.depth_at(Side::Buy, 100), (10, 1));
    assert_eq!(book.best_ask(), None);
    book.assert_invariants();
}

#[test]
fn price_boundaries() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    assert!(book.add(&limit(b"MAX", Side::Sell, MAX_PRICE, 1), &mut events).is_ok());
    assert_eq!(
        book.add(&limit(b"OVER", Side::Sell, MAX_PRICE + 1, 1), &mut events),
        Err(BookError::InvalidPrice)
    );
    assert_eq!(book.order_count(), 1);
}

#[test]
fn cancel_unknown_id_leaves_book_unchanged() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"A", Side::Buy, 100, 10), &mut events).unwrap();
    events.clear();

    assert_eq!(
        book.cancel(&OrderId::new(b"NOPE"), &mut events),
        Err(BookError::OrderNotFound)
    );
    assert!(events.is_empty());
    assert_eq!(book.order_count(), 1);
    assert_eq!(book.best_bid(), Some(100));
}

// ============================================================================
// Round-trip and idempotence laws
// ============================================================================

#[test]
fn add_then_cancel_restores_best_prices() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"B", Side::Buy, 100, 10), &mut events).unwrap();
    book.add(&limit(b"S", Side::Sell, 110, 10), &mut events).unwrap();
    let (bid_before, ask_before) = (book.best_bid(), book.best_ask());

    book.add(&limit(b"T", Side::Buy, 105, 7), &mut events).unwrap();
    assert_eq!(book.best_bid(), Some(105));
    book.cancel(&OrderId::new(b"T"), &mut events).unwrap();

    assert_eq!(book.best_bid(), bid_before);
    assert_eq!(book.best_ask(), ask_before);
    book.assert_invariants();
}

#[test]
fn modify_with_identical_order_requeues_at_tail() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"A", Side::Sell, 100, 4), &mut events).unwrap();
    book.add(&limit(b"B", Side::Sell, 100, 4), &mut events).unwrap();

    // Re-submitting A unchanged demotes it behind B.
    book.modify(&OrderId::new(b"A"), &limit(b"A", Side::Sell, 100, 4), &mut events)
        .unwrap();

    events.clear();
    book.add(&limit(b"T", Side::Buy, 100, 4), &mut events).unwrap();
    book.execute(&mut events);

    let fill = events
        .iter()
        .find(|ev| ev.kind == EventKind::TradeReport)
        .unwrap();
    assert_eq!(fill.secondary.unwrap().order_id, OrderId::new(b"B"));
    book.assert_invariants();
}

#[test]
fn modify_across_sides_moves_the_order() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();
    let id = OrderId::new(b"X");

    book.add(&limit(b"X", Side::Buy, 100, 10), &mut events).unwrap();
    book.modify(&id, &limit(b"X", Side::Sell, 105, 15), &mut events).unwrap();

    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), Some(105));
    assert!(book.contains(&id));

    let modify = events.last().unwrap();
    assert_eq!(modify.kind, EventKind::Modify);
    assert_eq!(modify.price, 105);
    assert_eq!(modify.side, Side::Sell);
    let old = modify.secondary.unwrap();
    assert_eq!(old.price, 100);
    assert_eq!(old.side, Side::Buy);
    assert_eq!(old.qty, 10);
    book.assert_invariants();
}

#[test]
fn execute_with_no_new_mutations_emits_nothing() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"B", Side::Buy, 100, 8), &mut events).unwrap();
    book.add(&limit(b"S", Side::Sell, 92, 8), &mut events).unwrap();
    book.execute(&mut events);
    assert!(book.is_empty());

    events.clear();
    book.execute(&mut events);
    assert!(events.is_empty());
}

// ============================================================================
// Market orders
// ============================================================================

#[test]
fn market_buy_sweeps_asks_then_discards_residual() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&limit(b"S1", Side::Sell, 101, 3), &mut events).unwrap();
    book.add(&limit(b"S2", Side::Sell, 102, 3), &mut events).unwrap();
    book.add(&market(b"M", Side::Buy, 10), &mut events).unwrap();

    events.clear();
    book.execute(&mut events);

    let fills: Vec<&Event> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::TradeReport)
        .collect();
    assert_eq!(fills.len(), 2);
    assert_eq!(fills.iter().map(|f| f.qty).sum::<u64>(), 6);

    let cancels: Vec<&Event> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::Cancel)
        .collect();
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].qty, 4);
    assert!(!book.contains(&OrderId::new(b"M")));
    assert!(book.is_empty());
    book.assert_invariants();
}

#[test]
fn market_order_on_empty_book_cancels_in_full() {
    let mut book = OrderBook::new();
    let mut events = Vec::new();

    book.add(&market(b"M", Side::Sell, 9), &mut events).unwrap();
    book.execute(&mut events);

    assert!(book.is_empty());
    let cancel = events.last().unwrap();
    assert_eq!(cancel.kind, EventKind::Cancel);
    assert_eq!(cancel.order_id, OrderId::new(b"M"));
    assert_eq!(cancel.qty, 9);
}
