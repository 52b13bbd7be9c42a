//! Error types for account management

use thiserror::Error;

/// Result type for account operations
pub type Result<T> = std::result::Result<T, Error>;

/// Account management errors
#[derive(Error, Debug)]
pub enum Error {
    /// Deposit amount below the configured minimum
    #[error("deposit below minimum: {minimum}")]
    DepositBelowMinimum {
        /// Minimum deposit in minor units
        minimum: i64,
    },

    /// Ledger failure (insufficient funds, unknown account, storage)
    #[error(transparent)]
    Ledger(#[from] ledger_core::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
