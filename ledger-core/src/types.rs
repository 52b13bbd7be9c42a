//! Core types for the account ledger
//!
//! Amounts are signed integers in the smallest currency unit. Debits are
//! stored with a negative sign, so an account balance is always the plain
//! sum of its completed transaction amounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identifier (numeric platform user id)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AccountId(i64);

impl AccountId {
    /// Create new account ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw platform id
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Referral code derived from the identity
    pub fn referral_code(&self) -> String {
        format!("REF{}", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable profile fields, refreshed on every authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Platform handle
    pub username: String,
}

/// A user's monetary and identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable external identifier
    pub id: AccountId,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Platform handle
    pub username: String,

    /// Balance in minor currency units
    pub balance: i64,

    /// Lifetime number of placed orders
    pub total_orders: u32,

    /// Lifetime purchase spend in minor units
    pub total_spent: i64,

    /// This account's own referral code
    pub referral_code: String,

    /// Referring account, set once at creation and immutable thereafter
    pub referred_by: Option<AccountId>,

    /// Number of accounts that signed up through this one
    pub referral_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a fresh account with zero balance
    pub fn new(id: AccountId, profile: Profile, referred_by: Option<AccountId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            username: profile.username,
            balance: 0,
            total_orders: 0,
            total_spent: 0,
            referral_code: id.referral_code(),
            referred_by,
            referral_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnKind {
    /// Signup welcome bonus
    Bonus,
    /// Referral bonus granted to the referring account
    Referral,
    /// Order purchase debit
    Purchase,
    /// Balance top-up
    Deposit,
    /// Refund for a cancelled order
    Refund,
    /// Administrative adjustment
    AdminAdjust,
}

impl TxnKind {
    /// Human-traceable transaction-id prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            TxnKind::Bonus => "BONUS",
            TxnKind::Referral => "REF",
            TxnKind::Purchase => "TXN",
            TxnKind::Deposit => "DEP",
            TxnKind::Refund => "REFUND",
            TxnKind::AdminAdjust => "ADMIN",
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxnKind::Bonus => "bonus",
            TxnKind::Referral => "referral",
            TxnKind::Purchase => "purchase",
            TxnKind::Deposit => "deposit",
            TxnKind::Refund => "refund",
            TxnKind::AdminAdjust => "admin_adjust",
        };
        write!(f, "{}", name)
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnStatus {
    /// Recorded but not yet applied to the balance (deposits awaiting
    /// confirmation)
    Pending,
    /// Applied to the balance; immutable from here on
    Completed,
}

/// Unique transaction identifier with a kind-indicating prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxnId(String);

impl TxnId {
    /// Generate a new id for the given kind (UUIDv7 token, time-ordered)
    pub fn generate(kind: TxnKind) -> Self {
        let token = Uuid::now_v7().simple().to_string().to_uppercase();
        Self(format!("{}-{}", kind.prefix(), token))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique id, prefixed by kind
    pub id: TxnId,

    /// Owning account
    pub account: AccountId,

    /// Transaction kind
    pub kind: TxnKind,

    /// Signed amount in minor units; debits are negative
    pub amount: i64,

    /// Pending or completed
    pub status: TxnStatus,

    /// Payment channel for deposits
    pub method: Option<String>,

    /// Free-text description
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Monotonic insertion sequence; breaks timestamp ties in history order
    pub seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_code_derivation() {
        let id = AccountId::new(5425876);
        assert_eq!(id.referral_code(), "REF5425876");
    }

    #[test]
    fn test_txn_id_prefixes() {
        assert!(TxnId::generate(TxnKind::Purchase).as_str().starts_with("TXN-"));
        assert!(TxnId::generate(TxnKind::Deposit).as_str().starts_with("DEP-"));
        assert!(TxnId::generate(TxnKind::Refund).as_str().starts_with("REFUND-"));
        assert!(TxnId::generate(TxnKind::Bonus).as_str().starts_with("BONUS-"));
        assert!(TxnId::generate(TxnKind::Referral).as_str().starts_with("REF-"));
        assert!(TxnId::generate(TxnKind::AdminAdjust).as_str().starts_with("ADMIN-"));
    }

    #[test]
    fn test_txn_ids_unique() {
        let a = TxnId::generate(TxnKind::Purchase);
        let b = TxnId::generate(TxnKind::Purchase);
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_account_defaults() {
        let profile = Profile {
            first_name: "Aziz".to_string(),
            last_name: String::new(),
            username: "aziz".to_string(),
        };
        let account = Account::new(AccountId::new(42), profile, None);
        assert_eq!(account.balance, 0);
        assert_eq!(account.total_orders, 0);
        assert_eq!(account.referral_code, "REF42");
        assert!(account.referred_by.is_none());
    }
}
