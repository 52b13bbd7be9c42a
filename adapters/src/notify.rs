//! Notification channel interface
//!
//! Lifecycle events are pushed to users and operators over an external
//! channel (bot messages in production). Delivery is strictly best-effort:
//! callers swallow and log failures, they never propagate them.

use crate::error::Result;
use async_trait::async_trait;
use ledger_core::AccountId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Lifecycle event delivered to an account's owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifyEvent {
    /// First authentication; signup bonus granted
    Welcome {
        /// Bonus amount in minor units
        bonus: i64,
    },
    /// Someone signed up through this account's referral code
    ReferralJoined {
        /// First name of the referred user
        referred: String,
        /// Referral bonus in minor units
        bonus: i64,
    },
    /// A pending deposit was confirmed and applied
    DepositConfirmed {
        /// Deposited amount in minor units
        amount: i64,
        /// Payment channel
        method: String,
        /// Balance after confirmation
        balance: i64,
    },
    /// An operator adjusted the balance
    BalanceAdjusted {
        /// Signed adjustment in minor units
        delta: i64,
        /// Operator-supplied reason
        reason: String,
    },
    /// An order was accepted and charged
    OrderAccepted {
        /// Order id
        order_id: String,
        /// Human service label
        service_name: String,
        /// Ordered quantity
        quantity: u32,
        /// Charged price in minor units
        price: i64,
    },
    /// An order was delivered in full
    OrderCompleted {
        /// Order id
        order_id: String,
        /// Human service label
        service_name: String,
    },
    /// An order was cancelled and refunded
    OrderCancelled {
        /// Order id
        order_id: String,
        /// Refunded amount in minor units
        refunded: i64,
    },
}

/// Fire-and-forget notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event to the account's owner
    async fn notify(&self, account: AccountId, event: NotifyEvent) -> Result<()>;
}

/// Notifier that emits events as structured log lines
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, account: AccountId, event: NotifyEvent) -> Result<()> {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| format!("{:?}", event));
        info!(account = %account, payload = %payload, "notification");
        Ok(())
    }
}

/// Notifier that drops every event
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _account: AccountId, _event: NotifyEvent) -> Result<()> {
        Ok(())
    }
}

/// Notifier that records events for test assertions
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(AccountId, NotifyEvent)>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn events(&self) -> Vec<(AccountId, NotifyEvent)> {
        self.events.lock().clone()
    }

    /// Events delivered to one account
    pub fn events_for(&self, account: AccountId) -> Vec<NotifyEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(id, _)| *id == account)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, account: AccountId, event: NotifyEvent) -> Result<()> {
        self.events.lock().push((account, event));
        Ok(())
    }
}
