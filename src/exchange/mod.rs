use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use metrics::counter;
use parking_lot::Mutex;
use tracing::{info, instrument};

use crate::book::{BookSnapshot, MatchEvent, Order, OrderBook};
use crate::config::Settings;
use crate::metrics::names;
use crate::settlement::Settlement;
use crate::types::{AccountId, MarketId, OrderId, Price, Side, Volume};

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("unknown market `{0}`")]
    UnknownMarket(MarketId),
    #[error("order size must be positive")]
    ZeroSize,
    #[error("limit price must be positive")]
    NonPositivePrice,
    #[error("no owner recorded for order {0}")]
    UnknownOwner(OrderId),
    #[error("settlement failed: {0}")]
    Settlement(#[from] anyhow::Error),
}

/// Front door over the per-market books. Each book sits behind its own
/// mutex, held only for the duration of a single book operation; the books
/// of different markets are fully independent. Settlement runs strictly
/// after the lock is released, driven by the returned MatchEvents.
pub struct Exchange {
    books: DashMap<MarketId, Mutex<OrderBook>>,
    owners: DashMap<OrderId, AccountId>,
    next_order_id: AtomicU64,
    clock: AtomicU64,
    settlement: Arc<dyn Settlement>,
}

impl Exchange {
    pub fn new(settings: &Settings, settlement: Arc<dyn Settlement>) -> Self {
        let books = DashMap::new();
        for market in &settings.markets {
            books.insert(market.symbol.clone(), Mutex::new(OrderBook::new()));
        }
        Self {
            books,
            owners: DashMap::new(),
            next_order_id: AtomicU64::new(1),
            clock: AtomicU64::new(1),
            settlement,
        }
    }

    pub fn markets(&self) -> Vec<MarketId> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Rests a limit order on the book. Placement is book-only: the order
    /// rests even if it crosses the opposite side, and only a later market
    /// order can consume it.
    #[instrument(skip(self))]
    pub fn place_limit_order(
        &self,
        market: &str,
        account: AccountId,
        side: Side,
        price: Price,
        size: Volume,
    ) -> Result<OrderId, ExchangeError> {
        if size <= Volume::ZERO {
            return Err(ExchangeError::ZeroSize);
        }
        if price <= Price::ZERO {
            return Err(ExchangeError::NonPositivePrice);
        }
        let book = self
            .books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;

        let order = self.new_order(side, size);
        let order_id = order.id;
        // The owner must be visible before the order can match, so a
        // concurrent market order on this book always finds it.
        self.owners.insert(order_id, account);
        book.lock().place_limit(price, order);

        counter!(names::LIMIT_ORDERS_PLACED).increment(1);
        info!(market, order_id, account, "limit order resting");
        Ok(order_id)
    }

    /// Matches a market order against the book and settles each fill,
    /// ask party to bid party. Any unfilled remainder is discarded.
    #[instrument(skip(self))]
    pub async fn place_market_order(
        &self,
        market: &str,
        account: AccountId,
        side: Side,
        size: Volume,
    ) -> Result<Vec<MatchEvent>, ExchangeError> {
        if size <= Volume::ZERO {
            return Err(ExchangeError::ZeroSize);
        }
        let order = self.new_order(side, size);
        let order_id = order.id;

        let (events, transfers) = {
            let book = self
                .books
                .get(market)
                .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;
            let mut book = book.lock();
            let events = book.place_market(order);

            let mut transfers = Vec::with_capacity(events.len());
            for event in &events {
                let maker_account = self
                    .owners
                    .get(&event.maker_order_id)
                    .map(|entry| *entry.value())
                    .ok_or(ExchangeError::UnknownOwner(event.maker_order_id))?;
                let (from, to) = match event.taker_side {
                    Side::Bid => (maker_account, account),
                    Side::Ask => (account, maker_account),
                };
                transfers.push((from, to, event.size, event.price));
                if !book.contains(event.maker_order_id) {
                    self.owners.remove(&event.maker_order_id);
                }
            }
            (events, transfers)
        };

        counter!(names::MARKET_ORDERS_PLACED).increment(1);
        counter!(names::FILLS).increment(events.len() as u64);
        info!(market, order_id, account, fills = events.len(), "market order matched");

        for (from, to, size, price) in transfers {
            self.settlement.transfer(from, to, size, price).await?;
        }
        Ok(events)
    }

    /// Cancels a resting order. Returns `false` when the id is not resting
    /// (already filled or already canceled); repeated cancels are no-ops.
    #[instrument(skip(self))]
    pub fn cancel_order(&self, market: &str, order_id: OrderId) -> Result<bool, ExchangeError> {
        let book = self
            .books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;
        let canceled = book.lock().cancel(order_id);
        drop(book);

        match canceled {
            Some(_) => {
                self.owners.remove(&order_id);
                counter!(names::ORDERS_CANCELED).increment(1);
                info!(market, order_id, "order canceled");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn resting_order(&self, market: &str, order_id: OrderId) -> Result<Option<Order>, ExchangeError> {
        let book = self
            .books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;
        let order = book.lock().order(order_id).cloned();
        Ok(order)
    }

    pub fn owner(&self, order_id: OrderId) -> Option<AccountId> {
        self.owners.get(&order_id).map(|entry| *entry.value())
    }

    pub fn book_snapshot(&self, market: &str, depth: usize) -> Result<BookSnapshot, ExchangeError> {
        let book = self
            .books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;
        let snapshot = book.lock().snapshot(depth);
        Ok(snapshot)
    }

    pub fn ask_total_volume(&self, market: &str) -> Result<Volume, ExchangeError> {
        let book = self
            .books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;
        let volume = book.lock().ask_total_volume();
        Ok(volume)
    }

    pub fn bid_total_volume(&self, market: &str) -> Result<Volume, ExchangeError> {
        let book = self
            .books
            .get(market)
            .ok_or_else(|| ExchangeError::UnknownMarket(market.to_string()))?;
        let volume = book.lock().bid_total_volume();
        Ok(volume)
    }

    fn new_order(&self, side: Side, size: Volume) -> Order {
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let ts = self.clock.fetch_add(1, Ordering::Relaxed);
        Order::new(id, side, size, ts)
    }
}
