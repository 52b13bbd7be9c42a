//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `ledger_transactions_total` - Completed transactions appended
//! - `ledger_pending_total` - Pending transactions recorded
//! - `ledger_pending_confirmed_total` - Pending transactions confirmed
//! - `ledger_debits_rejected_total` - Debits rejected for insufficient funds

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Counters are registered against an owned registry so multiple ledgers
/// (one per test) never collide.
#[derive(Clone)]
pub struct Metrics {
    /// Completed transactions appended
    pub transactions_total: IntCounter,

    /// Pending transactions recorded
    pub pending_total: IntCounter,

    /// Pending transactions confirmed
    pub pending_confirmed_total: IntCounter,

    /// Debits rejected for insufficient funds
    pub debits_rejected_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transactions_total = IntCounter::new(
            "ledger_transactions_total",
            "Completed transactions appended",
        )?;
        registry.register(Box::new(transactions_total.clone()))?;

        let pending_total =
            IntCounter::new("ledger_pending_total", "Pending transactions recorded")?;
        registry.register(Box::new(pending_total.clone()))?;

        let pending_confirmed_total = IntCounter::new(
            "ledger_pending_confirmed_total",
            "Pending transactions confirmed",
        )?;
        registry.register(Box::new(pending_confirmed_total.clone()))?;

        let debits_rejected_total = IntCounter::new(
            "ledger_debits_rejected_total",
            "Debits rejected for insufficient funds",
        )?;
        registry.register(Box::new(debits_rejected_total.clone()))?;

        Ok(Self {
            transactions_total,
            pending_total,
            pending_confirmed_total,
            debits_rejected_total,
            registry,
        })
    }

    /// Record a completed transaction append
    pub fn record_transaction(&self) {
        self.transactions_total.inc();
    }

    /// Record a pending transaction
    pub fn record_pending(&self) {
        self.pending_total.inc();
    }

    /// Record a pending confirmation
    pub fn record_pending_confirmed(&self) {
        self.pending_confirmed_total.inc();
    }

    /// Record a rejected debit
    pub fn record_debit_rejected(&self) {
        self.debits_rejected_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
