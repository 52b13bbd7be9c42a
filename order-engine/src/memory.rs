//! In-memory order store
//!
//! Reference implementation for tests and the demo orchestrator.

use crate::store::OrderStore;
use crate::types::{Order, OrderId};
use crate::{Error, Result};
use dashmap::DashMap;
use ledger_core::AccountId;

/// Keyed in-memory store
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: DashMap<OrderId, Order>,
}

impl MemoryOrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for MemoryOrderStore {
    fn insert(&self, order: &Order) -> Result<()> {
        self.orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.orders.get(id).map(|o| o.value().clone()))
    }

    fn update(&self, order: &Order) -> Result<()> {
        match self.orders.get_mut(&order.id) {
            Some(mut slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(Error::NotFound(order.id.to_string())),
        }
    }

    fn remove(&self, id: &OrderId) -> Result<()> {
        self.orders.remove(id);
        Ok(())
    }

    fn orders_for(&self, account: AccountId) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .iter()
            .filter(|entry| entry.account == account)
            .map(|entry| entry.value().clone())
            .collect())
    }
}
