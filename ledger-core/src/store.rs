//! Persistence interface consumed by the ledger
//!
//! The physical mechanism (file, database) lives outside this crate; the
//! ledger only requires that a successful mutating call is visible to every
//! subsequent read before it returns. [`crate::memory::MemoryLedgerStore`]
//! is the bundled reference implementation.

use crate::types::{Account, AccountId, Transaction, TxnId};
use crate::Result;

/// Keyed store for accounts and their transaction trail
pub trait LedgerStore: Send + Sync {
    /// Fetch an account by id
    fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Insert or replace an account record
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Resolve a referral code to its owning account
    fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>>;

    /// Append a transaction to the trail
    fn append_transaction(&self, txn: &Transaction) -> Result<()>;

    /// Fetch a transaction by id
    fn get_transaction(&self, id: &TxnId) -> Result<Option<Transaction>>;

    /// Replace a stored transaction (pending confirmation only)
    fn update_transaction(&self, txn: &Transaction) -> Result<()>;

    /// All transactions owned by an account, in no particular order
    fn transactions_for(&self, account: AccountId) -> Result<Vec<Transaction>>;

    /// Allocate the next monotonic insertion sequence number
    fn next_seq(&self) -> u64;
}
