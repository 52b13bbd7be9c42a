//! Promo code types

use chrono::{DateTime, Utc};
use ledger_core::AccountId;
use serde::{Deserialize, Serialize};

/// A discount code
///
/// Codes are stored upper-cased; lookups normalize their input. When both
/// discount fields are set the percentage takes priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    /// Unique code, upper-cased
    pub code: String,

    /// Percentage discount (0 disables)
    pub discount_percent: u32,

    /// Flat discount in minor units (used when percentage is 0)
    pub discount_amount: i64,

    /// Global redemption cap
    pub max_uses: u32,

    /// Redemptions so far; never exceeds `max_uses`
    pub used_count: u32,

    /// Minimum order amount required to apply the code
    pub min_amount: i64,

    /// Inactive codes behave as nonexistent
    pub is_active: bool,

    /// Optional expiry; expired codes behave as nonexistent
    pub expires_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    /// Create an active percentage-discount code
    pub fn percent(code: impl Into<String>, percent: u32, max_uses: u32) -> Self {
        Self {
            code: code.into().to_uppercase(),
            discount_percent: percent,
            discount_amount: 0,
            max_uses,
            used_count: 0,
            min_amount: 0,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Create an active flat-discount code
    pub fn flat(code: impl Into<String>, amount: i64, max_uses: u32, min_amount: i64) -> Self {
        Self {
            code: code.into().to_uppercase(),
            discount_percent: 0,
            discount_amount: amount,
            max_uses,
            used_count: 0,
            min_amount,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// True when an expiry is set and has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires) if expires <= now)
    }
}

/// One redemption record; its existence is the sole source of truth for
/// "already used"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoUsage {
    /// Redeemed code, upper-cased
    pub code: String,

    /// Redeeming account
    pub account: AccountId,

    /// Redemption timestamp
    pub used_at: DateTime<Utc>,
}

/// Outcome of a successful redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// The redeemed code
    pub code: String,

    /// Percentage applied (0 when a flat discount was used)
    pub percent: u32,

    /// Flat amount configured on the code
    pub flat: i64,

    /// Computed discount in minor units, clamped to the order amount
    pub amount: i64,
}
