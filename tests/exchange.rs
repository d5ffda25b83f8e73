use std::sync::Arc;

use rust_decimal_macros::dec;

use crypto_exchange::config::{MarketConfig, Settings};
use crypto_exchange::settlement::MemoryLedger;
use crypto_exchange::{Exchange, ExchangeError, Side};

const MARKET: &str = "ETH-USD";

fn settings() -> Settings {
    Settings {
        markets: vec![MarketConfig {
            symbol: MARKET.to_string(),
        }],
        snapshot_depth: 10,
    }
}

fn exchange() -> (Exchange, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::new());
    (Exchange::new(&settings(), ledger.clone()), ledger)
}

#[tokio::test]
async fn market_order_settles_each_fill_ask_party_to_bid_party() {
    let (exchange, ledger) = exchange();
    exchange
        .place_limit_order(MARKET, 6, Side::Ask, dec!(5_000), dec!(12))
        .unwrap();
    exchange
        .place_limit_order(MARKET, 7, Side::Ask, dec!(7_000), dec!(5))
        .unwrap();

    let events = exchange
        .place_market_order(MARKET, 8, Side::Bid, dec!(14))
        .await
        .unwrap();
    assert_eq!(events.len(), 2);

    let transfers = ledger.transfers();
    assert_eq!(transfers.len(), 2);
    assert_eq!((transfers[0].from, transfers[0].to), (6, 8));
    assert_eq!(transfers[0].size, dec!(12));
    assert_eq!(transfers[0].price, dec!(5_000));
    assert_eq!((transfers[1].from, transfers[1].to), (7, 8));
    assert_eq!(transfers[1].size, dec!(2));
    assert_eq!(transfers[1].price, dec!(7_000));

    assert_eq!(ledger.balance(8), dec!(14));
    assert_eq!(ledger.balance(6), dec!(-12));
    assert_eq!(ledger.balance(7), dec!(-2));

    assert_eq!(exchange.ask_total_volume(MARKET).unwrap(), dec!(3));
}

#[tokio::test]
async fn market_sell_settles_taker_to_maker() {
    let (exchange, ledger) = exchange();
    exchange
        .place_limit_order(MARKET, 1, Side::Bid, dec!(19_000), dec!(5))
        .unwrap();

    let events = exchange
        .place_market_order(MARKET, 2, Side::Ask, dec!(3))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].bid_order_id(), events[0].maker_order_id);

    let transfers = ledger.transfers();
    assert_eq!((transfers[0].from, transfers[0].to), (2, 1));
    assert_eq!(transfers[0].size, dec!(3));
}

#[tokio::test]
async fn maker_ownership_is_forgotten_once_fully_consumed() {
    let (exchange, _ledger) = exchange();
    let maker_id = exchange
        .place_limit_order(MARKET, 1, Side::Ask, dec!(100), dec!(2))
        .unwrap();
    assert_eq!(exchange.owner(maker_id), Some(1));

    exchange
        .place_market_order(MARKET, 2, Side::Bid, dec!(1))
        .await
        .unwrap();
    // Partially filled: still resting, still owned.
    assert_eq!(exchange.owner(maker_id), Some(1));
    assert_eq!(
        exchange.resting_order(MARKET, maker_id).unwrap().unwrap().size,
        dec!(1)
    );

    exchange
        .place_market_order(MARKET, 2, Side::Bid, dec!(1))
        .await
        .unwrap();
    assert_eq!(exchange.owner(maker_id), None);
    assert!(exchange.resting_order(MARKET, maker_id).unwrap().is_none());
}

#[test]
fn cancel_is_a_no_op_for_unknown_ids() {
    let (exchange, _ledger) = exchange();
    let order_id = exchange
        .place_limit_order(MARKET, 1, Side::Bid, dec!(5_000), dec!(5))
        .unwrap();
    assert_eq!(exchange.bid_total_volume(MARKET).unwrap(), dec!(5));

    assert!(exchange.cancel_order(MARKET, order_id).unwrap());
    assert_eq!(exchange.bid_total_volume(MARKET).unwrap(), dec!(0));
    assert_eq!(exchange.owner(order_id), None);

    // Second cancel and a never-issued id both report "not resting".
    assert!(!exchange.cancel_order(MARKET, order_id).unwrap());
    assert!(!exchange.cancel_order(MARKET, 999).unwrap());
}

#[tokio::test]
async fn rejects_unknown_market_and_degenerate_orders() {
    let (exchange, _ledger) = exchange();

    let err = exchange
        .place_limit_order("DOGE-USD", 1, Side::Bid, dec!(1), dec!(1))
        .unwrap_err();
    assert!(matches!(err, ExchangeError::UnknownMarket(_)));

    let err = exchange
        .place_limit_order(MARKET, 1, Side::Bid, dec!(1), dec!(0))
        .unwrap_err();
    assert!(matches!(err, ExchangeError::ZeroSize));

    let err = exchange
        .place_limit_order(MARKET, 1, Side::Bid, dec!(0), dec!(1))
        .unwrap_err();
    assert!(matches!(err, ExchangeError::NonPositivePrice));

    let err = exchange
        .place_market_order(MARKET, 1, Side::Bid, dec!(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::ZeroSize));
}

#[tokio::test]
async fn partial_fill_is_detected_by_comparing_requested_and_filled() {
    let (exchange, _ledger) = exchange();
    exchange
        .place_limit_order(MARKET, 1, Side::Ask, dec!(100), dec!(4))
        .unwrap();

    let requested = dec!(10);
    let events = exchange
        .place_market_order(MARKET, 2, Side::Bid, requested)
        .await
        .unwrap();
    let filled = events
        .iter()
        .fold(rust_decimal::Decimal::ZERO, |acc, e| acc + e.size);
    assert_eq!(filled, dec!(4));
    assert!(filled < requested);
    // The remainder is discarded, not rested on the bid side.
    assert_eq!(exchange.bid_total_volume(MARKET).unwrap(), dec!(0));
}

#[test]
fn snapshot_serializes_for_the_request_layer() {
    let (exchange, _ledger) = exchange();
    exchange
        .place_limit_order(MARKET, 1, Side::Ask, dec!(101), dec!(2))
        .unwrap();
    exchange
        .place_limit_order(MARKET, 2, Side::Bid, dec!(99), dec!(3))
        .unwrap();

    let snapshot = exchange.book_snapshot(MARKET, 10).unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["asks"][0]["price"], serde_json::json!("101"));
    assert_eq!(json["bid_total_volume"], serde_json::json!("3"));
}
