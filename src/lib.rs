pub mod book;
pub mod config;
pub mod exchange;
pub mod settlement;
pub mod types;

pub mod metrics;

pub use book::{BookSnapshot, MatchEvent, Order, OrderBook, PriceLevel};
pub use exchange::{Exchange, ExchangeError};
pub use settlement::{MemoryLedger, Settlement};
pub use types::{AccountId, MarketId, OrderId, Price, Side, Volume};
