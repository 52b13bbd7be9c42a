//! Error types for the ledger

use crate::types::AccountId;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every variant except [`Error::Storage`] is a recoverable domain failure
/// meant to be matched by the calling layer.
#[derive(Error, Debug)]
pub enum Error {
    /// A debit would drive the balance negative
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount the operation needed
        required: i64,
        /// Balance at the time of the check
        available: i64,
    },

    /// Account does not exist
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account already exists (duplicate creation)
    #[error("account already exists: {0}")]
    AccountExists(AccountId),

    /// Transaction id is unknown
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    /// Pending transaction was already confirmed
    #[error("transaction already confirmed: {0}")]
    AlreadyConfirmed(String),

    /// Amount failed validation (zero or negative where positive required)
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Persistence failure; fatal for the request
    #[error("storage error: {0}")]
    Storage(String),
}
