//! In-memory reference store
//!
//! Backs tests and the demo orchestrator. Production deployments supply
//! their own [`LedgerStore`] over durable storage.

use crate::store::LedgerStore;
use crate::types::{Account, AccountId, Transaction, TxnId};
use crate::Result;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Keyed in-memory store
#[derive(Default)]
pub struct MemoryLedgerStore {
    accounts: DashMap<AccountId, Account>,
    transactions: RwLock<Vec<Transaction>>,
    seq: AtomicU64,
}

impl MemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.referral_code == code)
            .map(|entry| entry.value().clone()))
    }

    fn append_transaction(&self, txn: &Transaction) -> Result<()> {
        self.transactions.write().push(txn.clone());
        Ok(())
    }

    fn get_transaction(&self, id: &TxnId) -> Result<Option<Transaction>> {
        Ok(self
            .transactions
            .read()
            .iter()
            .find(|t| &t.id == id)
            .cloned())
    }

    fn update_transaction(&self, txn: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.write();
        match transactions.iter_mut().find(|t| t.id == txn.id) {
            Some(slot) => {
                *slot = txn.clone();
                Ok(())
            }
            None => Err(crate::Error::TransactionNotFound(txn.id.to_string())),
        }
    }

    fn transactions_for(&self, account: AccountId) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|t| t.account == account)
            .cloned()
            .collect())
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Profile, TxnKind, TxnStatus};
    use chrono::Utc;

    fn test_account(id: i64) -> Account {
        Account::new(AccountId::new(id), Profile::default(), None)
    }

    #[test]
    fn test_account_roundtrip() {
        let store = MemoryLedgerStore::new();
        let account = test_account(7);
        store.put_account(&account).unwrap();

        let loaded = store.get_account(account.id).unwrap().unwrap();
        assert_eq!(loaded.id, account.id);
        assert_eq!(loaded.referral_code, "REF7");

        assert!(store.get_account(AccountId::new(8)).unwrap().is_none());
    }

    #[test]
    fn test_referral_code_lookup() {
        let store = MemoryLedgerStore::new();
        store.put_account(&test_account(11)).unwrap();
        store.put_account(&test_account(12)).unwrap();

        let found = store.find_by_referral_code("REF12").unwrap().unwrap();
        assert_eq!(found.id, AccountId::new(12));
        assert!(store.find_by_referral_code("REF99").unwrap().is_none());
    }

    #[test]
    fn test_seq_monotonic() {
        let store = MemoryLedgerStore::new();
        let a = store.next_seq();
        let b = store.next_seq();
        let c = store.next_seq();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_update_unknown_transaction_fails() {
        let store = MemoryLedgerStore::new();
        let txn = Transaction {
            id: TxnId::generate(TxnKind::Deposit),
            account: AccountId::new(1),
            kind: TxnKind::Deposit,
            amount: 5000,
            status: TxnStatus::Pending,
            method: None,
            description: String::new(),
            created_at: Utc::now(),
            seq: 1,
        };
        assert!(store.update_transaction(&txn).is_err());
    }
}
