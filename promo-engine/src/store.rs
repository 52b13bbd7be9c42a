//! Persistence interface for promo codes and usage records

use crate::types::{PromoCode, PromoUsage};
use crate::Result;
use ledger_core::AccountId;

/// Keyed store for promo codes and their redemption records
///
/// Codes are keyed by their upper-cased form; callers normalize before
/// lookup.
pub trait PromoStore: Send + Sync {
    /// Fetch a code by its normalized form
    fn get(&self, code: &str) -> Result<Option<PromoCode>>;

    /// Insert or replace a code
    fn put(&self, promo: &PromoCode) -> Result<()>;

    /// Whether a usage record exists for this (code, account) pair
    fn usage_exists(&self, code: &str, account: AccountId) -> Result<bool>;

    /// Append a usage record
    fn record_usage(&self, usage: &PromoUsage) -> Result<()>;
}
