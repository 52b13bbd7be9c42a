//! Persistence interface for orders

use crate::types::{Order, OrderId};
use crate::Result;
use ledger_core::AccountId;

/// Keyed store for order records
pub trait OrderStore: Send + Sync {
    /// Insert a new order
    fn insert(&self, order: &Order) -> Result<()>;

    /// Fetch an order by id
    fn get(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Replace a stored order
    fn update(&self, order: &Order) -> Result<()>;

    /// Remove an order (placement rollback only)
    fn remove(&self, id: &OrderId) -> Result<()>;

    /// All orders owned by an account, in no particular order
    fn orders_for(&self, account: AccountId) -> Result<Vec<Order>>;
}
