//! Promo redemption engine
//!
//! Validation order is fixed: existence/active/expiry, usage cap, minimum
//! order amount, then per-account usage. The first failing check wins and
//! maps to its own error variant so the calling layer can show a specific
//! message.

use crate::{
    store::PromoStore,
    types::{Discount, PromoCode, PromoUsage},
    Error, Result,
};
use chrono::Utc;
use dashmap::DashMap;
use ledger_core::AccountId;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Promo redemption engine
pub struct PromoEngine {
    /// Persistence interface
    store: Arc<dyn PromoStore>,

    /// Per-code critical sections; existence check, counter increment and
    /// usage insert must be indivisible
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PromoEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<dyn PromoStore>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// Normalize a user-supplied code (input is case-insensitive)
    fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    async fn acquire(&self, code: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Validate and atomically redeem a code for one account
    ///
    /// On success the usage counter and the usage record are committed
    /// together; a concurrent redemption for the same code waits on the
    /// per-code mutex and then fails the usage check.
    pub async fn redeem(
        &self,
        code: &str,
        account: AccountId,
        order_amount: Option<i64>,
    ) -> Result<Discount> {
        let normalized = Self::normalize(code);
        let _guard = self.acquire(&normalized).await;

        let mut promo = self
            .store
            .get(&normalized)?
            .filter(|p| p.is_active)
            .ok_or(Error::NotFound)?;
        if promo.is_expired(Utc::now()) {
            return Err(Error::NotFound);
        }
        if promo.used_count >= promo.max_uses {
            return Err(Error::LimitReached);
        }
        if let Some(amount) = order_amount {
            if amount < promo.min_amount {
                return Err(Error::BelowMinimum {
                    minimum: promo.min_amount,
                });
            }
        }
        if self.store.usage_exists(&normalized, account)? {
            return Err(Error::AlreadyUsed);
        }

        let discount = compute_discount(&promo, order_amount);

        promo.used_count += 1;
        self.store.put(&promo)?;
        self.store.record_usage(&PromoUsage {
            code: normalized.clone(),
            account,
            used_at: Utc::now(),
        })?;

        tracing::info!(
            code = %normalized,
            account = %account,
            discount = discount.amount,
            uses = promo.used_count,
            "promo redeemed"
        );
        Ok(discount)
    }

    /// Register a new code (administrative)
    pub fn create_code(&self, promo: PromoCode) -> Result<PromoCode> {
        let mut promo = promo;
        promo.code = Self::normalize(&promo.code);
        self.store.put(&promo)?;
        tracing::info!(code = %promo.code, "promo code created");
        Ok(promo)
    }

    /// Activate or deactivate a code (administrative)
    pub fn set_active(&self, code: &str, active: bool) -> Result<PromoCode> {
        let normalized = Self::normalize(code);
        let mut promo = self.store.get(&normalized)?.ok_or(Error::NotFound)?;
        promo.is_active = active;
        self.store.put(&promo)?;
        Ok(promo)
    }
}

/// Percentage takes priority; flat amount applies only when the percentage
/// is zero. The result is clamped so a discounted total can never go
/// negative.
fn compute_discount(promo: &PromoCode, order_amount: Option<i64>) -> Discount {
    let raw = if promo.discount_percent > 0 {
        order_amount.unwrap_or(0) * promo.discount_percent as i64 / 100
    } else {
        promo.discount_amount
    };
    let amount = match order_amount {
        Some(total) => raw.max(0).min(total.max(0)),
        None => raw.max(0),
    };
    Discount {
        code: promo.code.clone(),
        percent: promo.discount_percent,
        flat: promo.discount_amount,
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPromoStore;

    fn engine() -> PromoEngine {
        PromoEngine::new(Arc::new(MemoryPromoStore::seeded()))
    }

    #[tokio::test]
    async fn test_percentage_redemption() {
        let engine = engine();
        let account = AccountId::new(1);

        let discount = engine
            .redeem("YANGI20", account, Some(10_000))
            .await
            .unwrap();
        assert_eq!(discount.amount, 2_000);
        assert_eq!(discount.percent, 20);
    }

    #[tokio::test]
    async fn test_case_insensitive_input() {
        let engine = engine();
        let discount = engine
            .redeem("  yangi20 ", AccountId::new(1), Some(10_000))
            .await
            .unwrap();
        assert_eq!(discount.code, "YANGI20");
    }

    #[tokio::test]
    async fn test_second_redemption_already_used() {
        let engine = engine();
        let account = AccountId::new(1);

        engine.redeem("YANGI20", account, Some(10_000)).await.unwrap();
        let second = engine.redeem("YANGI20", account, Some(10_000)).await;
        assert_eq!(second.unwrap_err(), Error::AlreadyUsed);
    }

    #[tokio::test]
    async fn test_counter_increments_once_per_account() {
        let store = Arc::new(MemoryPromoStore::seeded());
        let engine = PromoEngine::new(store.clone());
        let account = AccountId::new(1);

        engine.redeem("YANGI20", account, Some(10_000)).await.unwrap();
        let _ = engine.redeem("YANGI20", account, Some(10_000)).await;

        assert_eq!(store.get("YANGI20").unwrap().unwrap().used_count, 1);
    }

    #[tokio::test]
    async fn test_flat_discount_with_minimum() {
        let engine = engine();
        let account = AccountId::new(1);

        let below = engine.redeem("SMM50", account, Some(8_000)).await;
        assert_eq!(below.unwrap_err(), Error::BelowMinimum { minimum: 10_000 });

        let discount = engine.redeem("SMM50", account, Some(12_000)).await.unwrap();
        assert_eq!(discount.amount, 5_000);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_codes() {
        let engine = engine();
        let account = AccountId::new(1);

        assert_eq!(
            engine.redeem("NOPE", account, Some(1_000)).await.unwrap_err(),
            Error::NotFound
        );

        engine.set_active("YANGI20", false).unwrap();
        assert_eq!(
            engine.redeem("YANGI20", account, Some(1_000)).await.unwrap_err(),
            Error::NotFound
        );
    }

    #[tokio::test]
    async fn test_expired_code_behaves_as_missing() {
        let engine = engine();
        let mut promo = PromoCode::percent("OLD10", 10, 100);
        promo.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        engine.create_code(promo).unwrap();

        assert_eq!(
            engine
                .redeem("OLD10", AccountId::new(1), Some(1_000))
                .await
                .unwrap_err(),
            Error::NotFound
        );
    }

    #[tokio::test]
    async fn test_limit_reached() {
        let engine = engine();
        let mut promo = PromoCode::percent("ONCE", 10, 1);
        promo.used_count = 0;
        engine.create_code(promo).unwrap();

        engine.redeem("ONCE", AccountId::new(1), Some(1_000)).await.unwrap();
        assert_eq!(
            engine
                .redeem("ONCE", AccountId::new(2), Some(1_000))
                .await
                .unwrap_err(),
            Error::LimitReached
        );
    }

    #[tokio::test]
    async fn test_discount_clamped_to_order_amount() {
        let engine = engine();
        // flat 5_000 with the minimum waived, applied to a cheaper order
        let promo = PromoCode::flat("BIG", 5_000, 10, 0);
        engine.create_code(promo).unwrap();

        let discount = engine
            .redeem("BIG", AccountId::new(1), Some(3_000))
            .await
            .unwrap();
        assert_eq!(discount.amount, 3_000);
    }

    #[tokio::test]
    async fn test_percentage_priority_over_flat() {
        let engine = engine();
        let mut promo = PromoCode::percent("BOTH", 10, 10);
        promo.discount_amount = 9_999;
        engine.create_code(promo).unwrap();

        let discount = engine
            .redeem("BOTH", AccountId::new(1), Some(10_000))
            .await
            .unwrap();
        assert_eq!(discount.amount, 1_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_double_redeem_admits_one() {
        let store = Arc::new(MemoryPromoStore::seeded());
        let engine = Arc::new(PromoEngine::new(store.clone()));
        let account = AccountId::new(1);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.redeem("YANGI20", account, Some(10_000)).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.get("YANGI20").unwrap().unwrap().used_count, 1);
    }
}
