pub mod level;
pub mod orderbook;

pub use level::PriceLevel;
pub use orderbook::OrderBook;

use serde::Serialize;

use crate::types::{OrderId, Price, Side, Volume};

/// A single order's mutable state. `size` is the remaining unfilled
/// quantity and only ever decreases; `ts` breaks ties between orders
/// resting at the same price.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub size: Volume,
    pub ts: u64,
}

impl Order {
    pub fn new(id: OrderId, side: Side, size: Volume, ts: u64) -> Self {
        Self { id, side, size, ts }
    }

    pub fn is_filled(&self) -> bool {
        self.size.is_zero()
    }
}

/// Record of one fill, produced by market-order matching and never mutated
/// afterwards. The price is the maker's limit price, and `taker_side` tags
/// which side was the aggressor at creation time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchEvent {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub taker_side: Side,
    pub price: Price,
    pub size: Volume,
}

impl MatchEvent {
    pub fn bid_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Bid => self.taker_order_id,
            Side::Ask => self.maker_order_id,
        }
    }

    pub fn ask_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Ask => self.taker_order_id,
            Side::Bid => self.maker_order_id,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub side: Side,
    pub size: Volume,
    pub ts: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LevelView {
    pub price: Price,
    pub total_volume: Volume,
    pub orders: Vec<OrderView>,
}

/// Depth-limited view of both sides, bids best-first and asks best-first,
/// for the request-handling collaborator to serialize.
#[derive(Clone, Debug, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
    pub bid_total_volume: Volume,
    pub ask_total_volume: Volume,
}
