//! Error types for promo redemption

use thiserror::Error;

/// Result type for promo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Promo redemption errors
///
/// Each variant maps to a distinct user-facing corrective message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Code does not exist, is inactive, or has expired
    #[error("promo code not found or expired")]
    NotFound,

    /// Global usage cap exhausted
    #[error("promo code usage limit reached")]
    LimitReached,

    /// Order amount below the code's minimum
    #[error("order amount below promo minimum: {minimum}")]
    BelowMinimum {
        /// Minimum order amount in minor units
        minimum: i64,
    },

    /// This account already redeemed the code
    #[error("promo code already used by this account")]
    AlreadyUsed,

    /// Persistence failure; fatal for the request
    #[error("storage error: {0}")]
    Storage(String),
}
