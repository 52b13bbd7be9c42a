//! In-memory promo store
//!
//! Reference implementation for tests and the demo orchestrator.

use crate::store::PromoStore;
use crate::types::{PromoCode, PromoUsage};
use crate::Result;
use dashmap::DashMap;
use ledger_core::AccountId;
use parking_lot::RwLock;

/// Keyed in-memory store
#[derive(Default)]
pub struct MemoryPromoStore {
    codes: DashMap<String, PromoCode>,
    usages: RwLock<Vec<PromoUsage>>,
}

impl MemoryPromoStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the launch campaign codes
    pub fn seeded() -> Self {
        let store = Self::new();
        for promo in [
            PromoCode::percent("YANGI20", 20, 1000),
            PromoCode::flat("SMM50", 5_000, 500, 10_000),
        ] {
            store.codes.insert(promo.code.clone(), promo);
        }
        store
    }
}

impl PromoStore for MemoryPromoStore {
    fn get(&self, code: &str) -> Result<Option<PromoCode>> {
        Ok(self.codes.get(code).map(|p| p.value().clone()))
    }

    fn put(&self, promo: &PromoCode) -> Result<()> {
        self.codes.insert(promo.code.clone(), promo.clone());
        Ok(())
    }

    fn usage_exists(&self, code: &str, account: AccountId) -> Result<bool> {
        Ok(self
            .usages
            .read()
            .iter()
            .any(|u| u.code == code && u.account == account))
    }

    fn record_usage(&self, usage: &PromoUsage) -> Result<()> {
        self.usages.write().push(usage.clone());
        Ok(())
    }
}
