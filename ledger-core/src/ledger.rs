//! Main ledger facade
//!
//! Ties the persistence interface and the per-account lock registry into a
//! high-level API for balance mutation. Every balance-affecting call runs
//! inside the owning account's critical section, which makes the
//! check-then-mutate sequences (debit, pending confirmation) atomic with
//! respect to concurrent callers on the same account.
//!
//! # Example
//!
//! ```
//! use ledger_core::{AccountId, Ledger, MemoryLedgerStore, TxnKind};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> ledger_core::Result<()> {
//! let ledger = Ledger::new(Arc::new(MemoryLedgerStore::new()));
//! let id = AccountId::new(1001);
//! ledger
//!     .create_account(ledger_core::Account::new(id, Default::default(), None))
//!     .await?;
//! ledger.credit(id, 10_000, TxnKind::Bonus, "Welcome bonus").await?;
//! assert_eq!(ledger.balance(id)?, 10_000);
//! # Ok(())
//! # }
//! ```

use crate::{
    locks::AccountLocks,
    metrics::Metrics,
    store::LedgerStore,
    types::{Account, AccountId, Profile, Transaction, TxnId, TxnKind, TxnStatus},
    Error, Result,
};
use chrono::Utc;
use std::sync::Arc;

/// Account ledger: balances plus the append-only transaction trail
pub struct Ledger {
    /// Persistence interface
    store: Arc<dyn LedgerStore>,

    /// Per-account critical sections
    locks: AccountLocks,

    /// Prometheus counters
    metrics: Metrics,
}

impl Ledger {
    /// Create a ledger over the given store
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            locks: AccountLocks::new(),
            metrics: Metrics::default(),
        }
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    // ---- accounts ----

    /// Insert a new account; fails if the id is already taken
    pub async fn create_account(&self, account: Account) -> Result<Account> {
        let _guard = self.locks.acquire(account.id).await;
        if self.store.get_account(account.id)?.is_some() {
            return Err(Error::AccountExists(account.id));
        }
        self.store.put_account(&account)?;
        tracing::info!(account = %account.id, "account created");
        Ok(account)
    }

    /// Fetch an account, failing when it does not exist
    pub fn get_account(&self, id: AccountId) -> Result<Account> {
        self.store
            .get_account(id)?
            .ok_or(Error::AccountNotFound(id))
    }

    /// Fetch an account if present
    pub fn find_account(&self, id: AccountId) -> Result<Option<Account>> {
        self.store.get_account(id)
    }

    /// Resolve a referral code to its owning account
    pub fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>> {
        self.store.find_by_referral_code(code)
    }

    /// Refresh mutable profile fields; the monetary state is untouched
    pub async fn update_profile(&self, id: AccountId, profile: &Profile) -> Result<Account> {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.get_account(id)?;
        account.first_name = profile.first_name.clone();
        account.last_name = profile.last_name.clone();
        account.username = profile.username.clone();
        account.updated_at = Utc::now();
        self.store.put_account(&account)?;
        Ok(account)
    }

    /// Bump the referral counter of a referring account
    pub async fn increment_referral_count(&self, id: AccountId) -> Result<Account> {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.get_account(id)?;
        account.referral_count += 1;
        account.updated_at = Utc::now();
        self.store.put_account(&account)?;
        Ok(account)
    }

    /// Update lifetime order count and spend after a successful purchase
    pub async fn record_purchase_stats(&self, id: AccountId, price: i64) -> Result<Account> {
        let _guard = self.locks.acquire(id).await;
        let mut account = self.get_account(id)?;
        account.total_orders += 1;
        account.total_spent += price;
        account.updated_at = Utc::now();
        self.store.put_account(&account)?;
        Ok(account)
    }

    // ---- balance mutation ----

    /// Increase the balance and append a completed transaction
    ///
    /// `amount` must be positive; crediting cannot fail for an existing
    /// account.
    pub async fn credit(
        &self,
        account: AccountId,
        amount: i64,
        kind: TxnKind,
        description: impl Into<String>,
    ) -> Result<Transaction> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let _guard = self.locks.acquire(account).await;
        let mut record = self.get_account(account)?;
        record.balance += amount;
        record.updated_at = Utc::now();

        let txn = self.build_txn(account, kind, amount, TxnStatus::Completed, None, description);
        self.store.append_transaction(&txn)?;
        self.store.put_account(&record)?;
        self.metrics.record_transaction();
        tracing::info!(account = %account, txn = %txn.id, amount, kind = %kind, "credit applied");
        Ok(txn)
    }

    /// Decrease the balance and append a completed transaction with a
    /// negative amount
    ///
    /// Fails with [`Error::InsufficientFunds`] when the balance cannot cover
    /// `amount`; the check and the mutation happen inside the same critical
    /// section.
    pub async fn debit(
        &self,
        account: AccountId,
        amount: i64,
        kind: TxnKind,
        description: impl Into<String>,
    ) -> Result<Transaction> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let _guard = self.locks.acquire(account).await;
        let mut record = self.get_account(account)?;
        if record.balance < amount {
            self.metrics.record_debit_rejected();
            return Err(Error::InsufficientFunds {
                required: amount,
                available: record.balance,
            });
        }
        record.balance -= amount;
        record.updated_at = Utc::now();

        let txn = self.build_txn(account, kind, -amount, TxnStatus::Completed, None, description);
        self.store.append_transaction(&txn)?;
        self.store.put_account(&record)?;
        self.metrics.record_transaction();
        tracing::info!(account = %account, txn = %txn.id, amount, kind = %kind, "debit applied");
        Ok(txn)
    }

    /// Record a transaction with no balance effect, awaiting confirmation
    pub async fn record_pending(
        &self,
        account: AccountId,
        amount: i64,
        kind: TxnKind,
        method: Option<String>,
        description: impl Into<String>,
    ) -> Result<Transaction> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let _guard = self.locks.acquire(account).await;
        // the account must exist before anything is recorded against it
        self.get_account(account)?;

        let txn = self.build_txn(account, kind, amount, TxnStatus::Pending, method, description);
        self.store.append_transaction(&txn)?;
        self.metrics.record_pending();
        tracing::info!(account = %account, txn = %txn.id, amount, "pending transaction recorded");
        Ok(txn)
    }

    /// Complete a pending transaction and apply its balance effect exactly
    /// once
    pub async fn confirm_pending(&self, id: &TxnId) -> Result<Transaction> {
        // resolve the owning account first, then re-read under its lock
        let owner = self
            .store
            .get_transaction(id)?
            .ok_or_else(|| Error::TransactionNotFound(id.to_string()))?
            .account;

        let _guard = self.locks.acquire(owner).await;
        let mut txn = self
            .store
            .get_transaction(id)?
            .ok_or_else(|| Error::TransactionNotFound(id.to_string()))?;
        if txn.status == TxnStatus::Completed {
            return Err(Error::AlreadyConfirmed(id.to_string()));
        }

        let mut record = self.get_account(txn.account)?;
        record.balance += txn.amount;
        record.updated_at = Utc::now();
        txn.status = TxnStatus::Completed;

        self.store.update_transaction(&txn)?;
        self.store.put_account(&record)?;
        self.metrics.record_pending_confirmed();
        tracing::info!(account = %txn.account, txn = %txn.id, amount = txn.amount, "pending transaction confirmed");
        Ok(txn)
    }

    // ---- queries ----

    /// Transaction history, newest first; ties broken by insertion sequence
    pub fn history(&self, account: AccountId) -> Result<Vec<Transaction>> {
        let mut txns = self.store.transactions_for(account)?;
        txns.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(txns)
    }

    /// Current balance
    pub fn balance(&self, account: AccountId) -> Result<i64> {
        Ok(self.get_account(account)?.balance)
    }

    fn build_txn(
        &self,
        account: AccountId,
        kind: TxnKind,
        amount: i64,
        status: TxnStatus,
        method: Option<String>,
        description: impl Into<String>,
    ) -> Transaction {
        Transaction {
            id: TxnId::generate(kind),
            account,
            kind,
            amount,
            status,
            method,
            description: description.into(),
            created_at: Utc::now(),
            seq: self.store.next_seq(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLedgerStore;

    async fn ledger_with_account(id: i64, balance: i64) -> (Ledger, AccountId) {
        let ledger = Ledger::new(Arc::new(MemoryLedgerStore::new()));
        let account = AccountId::new(id);
        ledger
            .create_account(Account::new(account, Profile::default(), None))
            .await
            .unwrap();
        if balance > 0 {
            ledger
                .credit(account, balance, TxnKind::Deposit, "seed")
                .await
                .unwrap();
        }
        (ledger, account)
    }

    #[tokio::test]
    async fn test_create_account_twice_fails() {
        let (ledger, account) = ledger_with_account(1, 0).await;
        let result = ledger
            .create_account(Account::new(account, Profile::default(), None))
            .await;
        assert!(matches!(result, Err(Error::AccountExists(_))));
    }

    #[tokio::test]
    async fn test_credit_and_debit() {
        let (ledger, account) = ledger_with_account(1, 10_000).await;

        let txn = ledger
            .debit(account, 4_000, TxnKind::Purchase, "Order: tg members")
            .await
            .unwrap();
        assert_eq!(txn.amount, -4_000);
        assert!(txn.id.as_str().starts_with("TXN-"));
        assert_eq!(ledger.balance(account).unwrap(), 6_000);
    }

    #[tokio::test]
    async fn test_debit_insufficient_funds() {
        let (ledger, account) = ledger_with_account(1, 3_000).await;

        let result = ledger
            .debit(account, 5_000, TxnKind::Purchase, "Order: yt views")
            .await;
        match result {
            Err(Error::InsufficientFunds { required, available }) => {
                assert_eq!(required, 5_000);
                assert_eq!(available, 3_000);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        // nothing mutated, nothing appended
        assert_eq!(ledger.balance(account).unwrap(), 3_000);
        assert_eq!(ledger.history(account).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_amounts_rejected() {
        let (ledger, account) = ledger_with_account(1, 1_000).await;
        assert!(ledger.credit(account, 0, TxnKind::Bonus, "x").await.is_err());
        assert!(ledger.credit(account, -5, TxnKind::Bonus, "x").await.is_err());
        assert!(ledger.debit(account, 0, TxnKind::Purchase, "x").await.is_err());
    }

    #[tokio::test]
    async fn test_pending_confirms_exactly_once() {
        let (ledger, account) = ledger_with_account(1, 0).await;

        let txn = ledger
            .record_pending(account, 8_000, TxnKind::Deposit, Some("card".into()), "Deposit (card)")
            .await
            .unwrap();
        assert_eq!(ledger.balance(account).unwrap(), 0);

        let confirmed = ledger.confirm_pending(&txn.id).await.unwrap();
        assert_eq!(confirmed.status, TxnStatus::Completed);
        assert_eq!(ledger.balance(account).unwrap(), 8_000);

        let repeat = ledger.confirm_pending(&txn.id).await;
        assert!(matches!(repeat, Err(Error::AlreadyConfirmed(_))));
        assert_eq!(ledger.balance(account).unwrap(), 8_000);
    }

    #[tokio::test]
    async fn test_confirm_unknown_transaction() {
        let (ledger, _) = ledger_with_account(1, 0).await;
        let bogus = TxnId::generate(TxnKind::Deposit);
        assert!(matches!(
            ledger.confirm_pending(&bogus).await,
            Err(Error::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let (ledger, account) = ledger_with_account(1, 0).await;
        for i in 1..=5 {
            ledger
                .credit(account, i * 100, TxnKind::Deposit, format!("top-up {}", i))
                .await
                .unwrap();
        }

        let history = ledger.history(account).unwrap();
        assert_eq!(history.len(), 5);
        // newest first, with insertion sequence as the tiebreak
        for pair in history.windows(2) {
            assert!(pair[0].seq > pair[1].seq);
        }
        assert_eq!(history[0].amount, 500);
    }

    #[tokio::test]
    async fn test_balance_matches_completed_sum() {
        let (ledger, account) = ledger_with_account(1, 20_000).await;
        ledger
            .debit(account, 7_000, TxnKind::Purchase, "Order")
            .await
            .unwrap();
        ledger
            .credit(account, 7_000, TxnKind::Refund, "Refund: Order")
            .await
            .unwrap();
        ledger
            .record_pending(account, 9_999, TxnKind::Deposit, None, "unconfirmed")
            .await
            .unwrap();

        let completed_sum: i64 = ledger
            .history(account)
            .unwrap()
            .iter()
            .filter(|t| t.status == TxnStatus::Completed)
            .map(|t| t.amount)
            .sum();
        assert_eq!(ledger.balance(account).unwrap(), completed_sum);
        assert_eq!(ledger.balance(account).unwrap(), 20_000);
    }
}
