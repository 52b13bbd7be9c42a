//! Error types for external adapters

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
#[derive(Error, Debug)]
pub enum Error {
    /// Fulfillment dispatch failed
    #[error("fulfillment dispatch failed: {0}")]
    Dispatch(String),

    /// External order reference is unknown to the panel
    #[error("external order not found: {0}")]
    OrderNotFound(String),

    /// Notification delivery failed
    #[error("notification failed: {0}")]
    Notify(String),
}
