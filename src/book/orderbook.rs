use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::book::{BookSnapshot, LevelView, MatchEvent, Order, OrderView, PriceLevel};
use crate::types::{OrderId, Price, Side, Volume};

/// One instrument's book: price-keyed levels per side plus an index from
/// order id to the level currently holding it. An id is in the index iff
/// the order is reachable from exactly one level on exactly one side.
#[derive(Debug, Default)]
pub struct OrderBook {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    index: HashMap<OrderId, (Side, Price)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rests `order` at `price`, creating the level on first use.
    ///
    /// Placement never matches, even when the price crosses resting
    /// opposite liquidity; only market orders consume the book.
    pub fn place_limit(&mut self, price: Price, order: Order) {
        let order_id = order.id;
        let side = order.side;
        let levels = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .add(order);
        self.index.insert(order_id, (side, price));
    }

    /// Matches `order` against the best opposite-side liquidity, best price
    /// first and FIFO within a price. Fills execute at the maker's limit
    /// price. Any remainder once the opposite side is exhausted is
    /// discarded: a market order never rests and is never indexed.
    pub fn place_market(&mut self, mut order: Order) -> Vec<MatchEvent> {
        let taker_side = order.side;
        let maker_side = taker_side.opposite();
        let mut events = Vec::new();

        while !order.is_filled() {
            let best = match maker_side {
                Side::Ask => self.asks.keys().next().copied(),
                Side::Bid => self.bids.keys().next_back().copied(),
            };
            let Some(price) = best else { break };
            let level = match maker_side {
                Side::Ask => self.asks.get_mut(&price),
                Side::Bid => self.bids.get_mut(&price),
            }
            .expect("best price points at a live level");

            while !order.is_filled() {
                let Some((maker_id, filled, maker_exhausted)) = level.fill_front(order.size)
                else {
                    break;
                };
                order.size -= filled;
                events.push(MatchEvent {
                    maker_order_id: maker_id,
                    taker_order_id: order.id,
                    taker_side,
                    price,
                    size: filled,
                });
                if maker_exhausted {
                    self.index.remove(&maker_id);
                }
            }

            if level.is_empty() {
                match maker_side {
                    Side::Ask => self.asks.remove(&price),
                    Side::Bid => self.bids.remove(&price),
                };
            }
        }

        events
    }

    /// Removes a resting order. `None` when the id is not resting (already
    /// filled or already canceled), which callers treat as a no-op.
    pub fn cancel(&mut self, order_id: OrderId) -> Option<Order> {
        let (side, price) = self.index.remove(&order_id)?;
        let levels = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        let level = levels
            .get_mut(&price)
            .expect("indexed order has a live level");
        let order = level.remove(order_id);
        if level.is_empty() {
            levels.remove(&price);
        }
        Some(order)
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let &(side, price) = self.index.get(&order_id)?;
        let level = match side {
            Side::Bid => self.bids.get(&price),
            Side::Ask => self.asks.get(&price),
        }
        .expect("indexed order has a live level");
        level.orders().find(|o| o.id == order_id)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Ask levels in ascending price order, best first.
    pub fn asks(&self) -> impl Iterator<Item = &PriceLevel> {
        self.asks.values()
    }

    /// Bid levels in descending price order, best first.
    pub fn bids(&self) -> impl Iterator<Item = &PriceLevel> {
        self.bids.values().rev()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    pub fn ask_total_volume(&self) -> Volume {
        self.asks
            .values()
            .fold(Decimal::ZERO, |acc, level| acc + level.total_volume())
    }

    pub fn bid_total_volume(&self) -> Volume {
        self.bids
            .values()
            .fold(Decimal::ZERO, |acc, level| acc + level.total_volume())
    }

    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            bids: self.bids.values().rev().take(depth).map(level_view).collect(),
            asks: self.asks.values().take(depth).map(level_view).collect(),
            bid_total_volume: self.bid_total_volume(),
            ask_total_volume: self.ask_total_volume(),
        }
    }
}

fn level_view(level: &PriceLevel) -> LevelView {
    LevelView {
        price: level.price(),
        total_volume: level.total_volume(),
        orders: level
            .orders()
            .map(|o| OrderView {
                order_id: o.id,
                side: o.side,
                size: o.size,
                ts: o.ts,
            })
            .collect(),
    }
}
