use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::types::{AccountId, Price, Volume};

/// Moves value between the two parties of a fill. Implementations may do
/// real I/O (a chain transfer, a ledger call); the exchange only invokes
/// this after the book lock has been released.
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        size: Volume,
        price: Price,
    ) -> anyhow::Result<()>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub size: Volume,
    pub price: Price,
}

/// In-memory settlement backend: account balances plus an append-only
/// transfer log. Used by tests and the demo binary.
#[derive(Default)]
pub struct MemoryLedger {
    balances: Mutex<HashMap<AccountId, Volume>>,
    transfers: Mutex<Vec<Transfer>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&self, account: AccountId, amount: Volume) {
        *self.balances.lock().entry(account).or_default() += amount;
    }

    pub fn balance(&self, account: AccountId) -> Volume {
        self.balances
            .lock()
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().clone()
    }
}

#[async_trait]
impl Settlement for MemoryLedger {
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        size: Volume,
        price: Price,
    ) -> anyhow::Result<()> {
        {
            let mut balances = self.balances.lock();
            *balances.entry(from).or_default() -= size;
            *balances.entry(to).or_default() += size;
        }
        self.transfers.lock().push(Transfer {
            from,
            to,
            size,
            price,
        });
        debug!(from, to, %size, %price, "settled fill");
        Ok(())
    }
}
