//! Error types for the order lifecycle

use crate::types::OrderStatus;
use thiserror::Error;

/// Result type for order operations
pub type Result<T> = std::result::Result<T, Error>;

/// Order lifecycle errors
#[derive(Error, Debug)]
pub enum Error {
    /// Balance cannot cover the order price
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Order price
        required: i64,
        /// Balance at the time of the check
        available: i64,
    },

    /// Order id is unknown
    #[error("order not found: {0}")]
    NotFound(String),

    /// Transition not permitted by the state machine
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Request failed validation before any mutation
    #[error("invalid order request: {0}")]
    InvalidRequest(String),

    /// Ledger failure other than insufficient funds
    #[error(transparent)]
    Ledger(ledger_core::Error),

    /// Persistence failure; fatal for the request
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ledger_core::Error> for Error {
    fn from(err: ledger_core::Error) -> Self {
        match err {
            ledger_core::Error::InsufficientFunds {
                required,
                available,
            } => Error::InsufficientFunds {
                required,
                available,
            },
            other => Error::Ledger(other),
        }
    }
}
