//! External collaborator interfaces
//!
//! The engine core never talks to the outside world directly; it is handed
//! trait objects for the fulfillment panel and the notification channel.
//! This crate defines those traits plus the simulation/test implementations.

pub mod error;
pub mod fulfillment;
pub mod notify;

pub use error::{Error, Result};
pub use fulfillment::{
    ExternalOrderRef, FulfillmentClient, FulfillmentStatus, MockFulfillmentClient,
};
pub use notify::{NoopNotifier, Notifier, NotifyEvent, RecordingNotifier, TracingNotifier};
